use serde::{Deserialize, Serialize};

use crate::models::sentinel;

/// Contact details found anywhere in a resume. Multiple distinct matches of
/// one kind are joined with ", ".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(with = "sentinel::optional", default)]
    pub email: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub phone: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub linkedin: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(with = "sentinel::optional", default)]
    pub institution: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub degree: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub date_range: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(with = "sentinel::optional", default)]
    pub job_title: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub company: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub date_range: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub description: Option<String>,
}

/// Structured view of one resume. Built fresh per parse and never mutated
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(with = "sentinel::optional", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(with = "sentinel::optional", default)]
    pub summary: Option<String>,
    /// Canonicalized skills, sorted case-insensitively.
    #[serde(with = "sentinel::skills", default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_record_serializes_every_key() {
        let value = serde_json::to_value(ResumeRecord::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "N/A",
                "contactInfo": {
                    "email": "N/A",
                    "phone": "N/A",
                    "linkedin": "N/A",
                    "github": "N/A"
                },
                "summary": "N/A",
                "skills": ["N/A"],
                "education": [],
                "experience": []
            })
        );
    }

    #[test]
    fn test_entry_fields_are_camel_case() {
        let entry = ExperienceEntry {
            job_title: Some("Software Engineer".to_string()),
            company: Some("Acme Corp".to_string()),
            date_range: Some("Jan 2020 - Present".to_string()),
            description: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["jobTitle"], "Software Engineer");
        assert_eq!(value["dateRange"], "Jan 2020 - Present");
        assert_eq!(value["description"], "N/A");
    }

    #[test]
    fn test_record_round_trips_through_sentinels() {
        let record = ResumeRecord {
            name: Some("Jane Doe".to_string()),
            skills: vec!["Rust".to_string()],
            education: vec![EducationEntry {
                institution: Some("MIT".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ResumeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
