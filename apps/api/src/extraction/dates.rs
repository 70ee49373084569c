//! Date-range detection for education and experience entries.
//!
//! Patterns are tried in priority order; the first pattern class that
//! matches anywhere in the block wins.

use once_cell::sync::Lazy;
use regex::Regex;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";
const DASH: &str = r"\s*(?:-|–|—|to|until)\s*";
const PRESENT: &str = r"(?:present|current|now|today|ongoing)";
const YEAR: &str = r"(?:19|20)\d{2}";

/// The kind of date expression that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    MonthYearRange,
    YearRange,
    MonthYearToPresent,
    YearToPresent,
    NumericMonthRange,
    BareYear,
}

/// A date range found in a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub pattern: DatePattern,
}

static DATE_PATTERNS: Lazy<Vec<(DatePattern, Regex)>> = Lazy::new(|| {
    let compile = |pattern: String| Regex::new(&pattern).expect("valid date pattern");
    vec![
        (
            DatePattern::MonthYearRange,
            compile(format!(r"(?i)\b{MONTH}\s*,?\s*{YEAR}{DASH}{MONTH}\s*,?\s*{YEAR}\b")),
        ),
        (
            DatePattern::YearRange,
            compile(format!(r"(?i)\b{YEAR}{DASH}{YEAR}\b")),
        ),
        (
            DatePattern::MonthYearToPresent,
            compile(format!(r"(?i)\b{MONTH}\s*,?\s*{YEAR}{DASH}{PRESENT}\b")),
        ),
        (
            DatePattern::YearToPresent,
            compile(format!(r"(?i)\b{YEAR}{DASH}{PRESENT}\b")),
        ),
        (
            DatePattern::NumericMonthRange,
            compile(format!(
                r"(?i)\b\d{{1,2}}/{YEAR}{DASH}(?:\d{{1,2}}/{YEAR}|{PRESENT})\b"
            )),
        ),
        (DatePattern::BareYear, compile(format!(r"\b{YEAR}\b"))),
    ]
});

static DATE_RANGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*(?:{MONTH}\s*,?\s*)?(?:\d{{1,2}}/)?{YEAR}{DASH}(?:(?:{MONTH}\s*,?\s*)?(?:\d{{1,2}}/)?{YEAR}|{PRESENT})\s*$"
    ))
    .expect("valid date line regex")
});

/// Finds the highest-priority date expression in `text`.
pub fn find_date_range(text: &str) -> Option<DateMatch> {
    DATE_PATTERNS.iter().find_map(|(pattern, regex)| {
        regex.find(text).map(|m| DateMatch {
            text: m.as_str().trim().to_string(),
            start: m.start(),
            end: m.end(),
            pattern: *pattern,
        })
    })
}

/// True when the whole line is nothing but a date range ("2019 - 2021", "Jan 2020 - Present").
pub fn is_date_range_line(line: &str) -> bool {
    DATE_RANGE_LINE.is_match(line)
}

/// Removes the matched date expression from `text`.
pub fn remove_date(text: &str, date: &DateMatch) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..date.start]);
    out.push_str(&text[date.end..]);
    out
}
