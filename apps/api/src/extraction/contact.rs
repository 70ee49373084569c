//! Contact extraction: pure regex over the full text, no model dependency.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::resume::ContactInfo;

/// Separator used when a field has more than one distinct match.
pub const MULTI_VALUE_SEPARATOR: &str = ", ";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

// Optional +1 country code, then (555) 123-4567 / 555.123.4567 / 555 123 4567 / 5551234567.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w+])(?P<phone>(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4})\b")
        .expect("valid phone regex")
});

static LINKEDIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/in/[A-Za-z0-9_%-]+/?")
        .expect("valid linkedin regex")
});

static GITHUB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?github\.com/[A-Za-z0-9_.-]+")
        .expect("valid github regex")
});

/// Extracts email, phone, LinkedIn and GitHub references from `text`.
pub fn extract_contact_info(text: &str) -> ContactInfo {
    ContactInfo {
        email: extract_email(text),
        phone: extract_phone(text),
        linkedin: join_distinct(LINKEDIN_RE.find_iter(text).map(|m| m.as_str())),
        github: join_distinct(GITHUB_RE.find_iter(text).map(|m| m.as_str())),
    }
}

/// `text` with every email, LinkedIn and GitHub reference blanked out.
pub fn strip_contact_spans(text: &str) -> String {
    let text = EMAIL_RE.replace_all(text, " ");
    let text = LINKEDIN_RE.replace_all(&text, " ").into_owned();
    GITHUB_RE.replace_all(&text, " ").into_owned()
}

pub fn extract_email(text: &str) -> Option<String> {
    join_distinct(EMAIL_RE.find_iter(text).map(|m| m.as_str()))
}

pub fn extract_phone(text: &str) -> Option<String> {
    join_distinct(
        PHONE_RE
            .captures_iter(text)
            .filter_map(|caps| caps.name("phone"))
            .map(|m| m.as_str().trim()),
    )
}

/// Joins distinct matches in order of first appearance; `None` when there are none.
fn join_distinct<'a>(matches: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut seen: Vec<&str> = Vec::new();
    for m in matches {
        let m = m.trim_end_matches(['.', '/']);
        if !m.is_empty() && !seen.iter().any(|s| s.eq_ignore_ascii_case(m)) {
            seen.push(m);
        }
    }
    if seen.is_empty() {
        None
    } else {
        Some(seen.join(MULTI_VALUE_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_email_returned_exactly() {
        let info = extract_contact_info("John Smith\njohn.smith@example.com\nSkills");
        assert_eq!(info.email.as_deref(), Some("john.smith@example.com"));
    }

    #[test]
    fn test_multiple_emails_joined_in_order() {
        let text = "a@x.io then b@y.org and again a@x.io";
        assert_eq!(extract_email(text).as_deref(), Some("a@x.io, b@y.org"));
    }

    #[test]
    fn test_us_phone_formats() {
        assert_eq!(extract_phone("Call (555) 123-4567").as_deref(), Some("(555) 123-4567"));
        assert_eq!(extract_phone("tel: 555.123.4567").as_deref(), Some("555.123.4567"));
        assert_eq!(extract_phone("+1 555 123 4567").as_deref(), Some("+1 555 123 4567"));
        assert_eq!(extract_phone("5551234567").as_deref(), Some("5551234567"));
    }

    #[test]
    fn test_year_ranges_are_not_phones() {
        assert!(extract_phone("2011 - 2015 | Stanford").is_none());
        assert!(extract_phone("Jan 2020 - Present").is_none());
    }

    #[test]
    fn test_profile_urls() {
        let text = "linkedin.com/in/janedoe | https://github.com/janedoe";
        let info = extract_contact_info(text);
        assert_eq!(info.linkedin.as_deref(), Some("linkedin.com/in/janedoe"));
        assert_eq!(info.github.as_deref(), Some("https://github.com/janedoe"));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let info = extract_contact_info("no contact details here");
        assert!(info.email.is_none());
        assert!(info.phone.is_none());
        assert!(info.linkedin.is_none());
        assert!(info.github.is_none());
    }
}
