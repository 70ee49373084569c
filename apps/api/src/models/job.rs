use serde::{Deserialize, Serialize};

use crate::models::sentinel;

/// Structured view of one job posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionRecord {
    #[serde(with = "sentinel::optional", default)]
    pub job_title: Option<String>,
    #[serde(with = "sentinel::optional", default)]
    pub company_name: Option<String>,
    /// One of Manager, Principal, Staff, Lead, Senior, Mid-Level, Junior.
    #[serde(with = "sentinel::optional", default)]
    pub seniority: Option<String>,
    /// Normalized phrase: "{n}+ years", "{a}-{b} years" or "{n} years".
    #[serde(with = "sentinel::optional", default)]
    pub experience_years: Option<String>,
    /// Every skill the posting mentions; this is what matching consumes.
    #[serde(with = "sentinel::skills", default)]
    pub skills: Vec<String>,
    #[serde(with = "sentinel::skills", default)]
    pub required_skills: Vec<String>,
    #[serde(with = "sentinel::skills", default)]
    pub nice_to_have_skills: Vec<String>,
    /// Most frequent non-stop-words of the posting, most frequent first.
    #[serde(default)]
    pub summary_keywords: Vec<String>,
}
