//! Resume parsing: orchestrates the extraction pipeline for one resume.
//!
//! Flow: NER over the text (name + skill augmentation + entry headers) →
//!       contact regexes → section segmentation → skills → entries.
//!
//! Total for any input: model failures degrade to the regex paths and an
//! empty text yields an empty record.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extraction::contact::extract_contact_info;
use crate::extraction::entries::{parse_education, parse_experience, TITLE_RE};
use crate::extraction::normalize::{collapse_whitespace, is_blank, normalize_lines};
use crate::extraction::sections::{Section, SectionSegmenter};
use crate::extraction::skills::SkillExtractor;
use crate::models::resume::ResumeRecord;
use crate::ner::{Entity, EntityExtractor, EntityLabel};

/// Only PERSON entities starting inside this window are taken as the name.
pub const NAME_WINDOW_CHARS: usize = 500;
/// Lines inspected by the name-line fallback.
const NAME_SCAN_LINES: usize = 5;

// Two to four capitalized words, allowing initials and hyphenated names.
static NAME_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][A-Za-z'.\-]*(?:[ \t]+[A-Z][A-Za-z'.\-]*){1,3}$").expect("valid name regex")
});

pub fn parse_resume(text: &str, ner: &EntityExtractor) -> ResumeRecord {
    let text = normalize_lines(text);
    if is_blank(&text) {
        debug!("Empty resume text; returning empty record");
        return ResumeRecord::default();
    }

    let entities = ner.infer(&text);
    let sections = SectionSegmenter::resume().segment(&text);

    let name = name_from_entities(&entities).or_else(|| name_from_lines(&text));
    let contact_info = extract_contact_info(&text);
    let summary = sections.get(Section::Summary).map(str::to_string);
    let skills =
        SkillExtractor::shared().extract(&text, sections.get(Section::Skills), &entities);
    let education = sections
        .get(Section::Education)
        .map(|s| parse_education(s, &entities))
        .unwrap_or_default();
    let experience = sections
        .get(Section::Experience)
        .map(|s| parse_experience(s, &entities))
        .unwrap_or_default();

    debug!(
        "Parsed resume: {} sections, {} entities, {} skills, {} education, {} experience",
        sections.len(),
        entities.len(),
        skills.len(),
        education.len(),
        experience.len()
    );

    ResumeRecord {
        name,
        contact_info,
        summary,
        skills,
        education,
        experience,
    }
}

/// First PERSON entity near the top of the document.
fn name_from_entities(entities: &[Entity]) -> Option<String> {
    entities
        .iter()
        .filter(|e| e.label == EntityLabel::Person && e.start < NAME_WINDOW_CHARS)
        .map(|e| collapse_whitespace(&e.text))
        .find(|name| name.chars().filter(|c| c.is_alphabetic()).count() >= 2)
}

/// First early line shaped like a personal name that is not a header,
/// contact detail or job title.
fn name_from_lines(text: &str) -> Option<String> {
    let segmenter = SectionSegmenter::resume();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(NAME_SCAN_LINES)
        .find(|line| {
            NAME_LINE_RE.is_match(line)
                && !line.contains('@')
                && !line.chars().any(|c| c.is_ascii_digit())
                && !segmenter.is_header(line)
                && !TITLE_RE.is_match(line)
        })
        .map(collapse_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::testing::StubModel;

    const SAMPLE: &str = "John Smith\njohn.smith@example.com\nSkills\nPython, SQL\nExperience\nSoftware Engineer at Acme Corp | Jan 2020 - Present\n- Built things.";

    #[test]
    fn test_sample_resume_without_ner() {
        let record = parse_resume(SAMPLE, &EntityExtractor::disabled());

        assert!(record.name.as_deref().unwrap().contains("John Smith"));
        assert_eq!(
            record.contact_info.email.as_deref(),
            Some("john.smith@example.com")
        );
        let skills: Vec<String> = record.skills.iter().map(|s| s.to_lowercase()).collect();
        assert!(skills.contains(&"python".to_string()));
        assert!(skills.contains(&"sql".to_string()));

        assert_eq!(record.experience.len(), 1);
        let job = &record.experience[0];
        assert!(job.company.as_deref().unwrap().contains("Acme"));
        assert!(job.date_range.as_deref().unwrap().contains("2020"));
        assert!(record.education.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_record() {
        let record = parse_resume("", &EntityExtractor::disabled());
        assert_eq!(record, ResumeRecord::default());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["name"], "N/A");
        assert_eq!(value["contactInfo"]["email"], "N/A");
        assert_eq!(value["contactInfo"]["phone"], "N/A");
        assert_eq!(value["skills"], serde_json::json!(["N/A"]));
        assert_eq!(value["education"], serde_json::json!([]));
        assert_eq!(value["experience"], serde_json::json!([]));
    }

    #[test]
    fn test_whitespace_only_input() {
        let record = parse_resume(" \n\t\r\n", &EntityExtractor::disabled());
        assert_eq!(record, ResumeRecord::default());
    }

    #[test]
    fn test_person_entity_wins_over_name_line() {
        let ner = StubModel::extractor(vec![("Jane Q. Public", EntityLabel::Person)]);
        let record = parse_resume("RESUME OF\nJane Q. Public\njane@example.com", &ner);
        assert_eq!(record.name.as_deref(), Some("Jane Q. Public"));
    }

    #[test]
    fn test_name_line_skips_headers_and_titles() {
        let text = "Summary\nSenior Software Engineer\nMaria Garcia\nmaria@example.com";
        assert_eq!(name_from_lines(text).as_deref(), Some("Maria Garcia"));
    }

    #[test]
    fn test_ner_entities_feed_skills_and_entries() {
        let ner = StubModel::extractor(vec![
            ("Kubernetes", EntityLabel::Misc),
            ("Initech", EntityLabel::Org),
        ]);
        let text = "Ana Lima\nExperience\nSite Reliability Engineer Initech\n2018 - 2022\n- Ran Kubernetes clusters";
        let record = parse_resume(text, &ner);
        assert!(record.skills.contains(&"Kubernetes".to_string()));
        assert_eq!(record.experience[0].company.as_deref(), Some("Initech"));
        assert_eq!(
            record.experience[0].job_title.as_deref(),
            Some("Site Reliability Engineer")
        );
    }

    #[test]
    fn test_education_and_summary_sections() {
        let text = "Jane Doe\nSummary\nBackend engineer who likes queues.\nEducation\nB.S. Computer Science, Stanford University, 2011 - 2015";
        let record = parse_resume(text, &EntityExtractor::disabled());
        assert_eq!(
            record.summary.as_deref(),
            Some("Backend engineer who likes queues.")
        );
        assert_eq!(record.education.len(), 1);
        assert_eq!(
            record.education[0].institution.as_deref(),
            Some("Stanford University")
        );
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let ner = EntityExtractor::disabled();
        assert_eq!(parse_resume(SAMPLE, &ner), parse_resume(SAMPLE, &ner));
    }
}
