use std::fmt;

use serde::{Deserialize, Serialize};

/// Qualitative band for a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrength {
    Excellent,
    Strong,
    Good,
    Moderate,
    Weak,
}

impl MatchStrength {
    /// Excellent >= 80, Strong >= 70, Good >= 60, Moderate >= 50, else Weak.
    pub fn from_score(score_percent: f64) -> Self {
        if score_percent >= 80.0 {
            MatchStrength::Excellent
        } else if score_percent >= 70.0 {
            MatchStrength::Strong
        } else if score_percent >= 60.0 {
            MatchStrength::Good
        } else if score_percent >= 50.0 {
            MatchStrength::Moderate
        } else {
            MatchStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrength::Excellent => "Excellent",
            MatchStrength::Strong => "Strong",
            MatchStrength::Good => "Good",
            MatchStrength::Moderate => "Moderate",
            MatchStrength::Weak => "Weak",
        }
    }
}

impl fmt::Display for MatchStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing a resume's skills against a job's skills.
///
/// The skill lists are real results, so an empty list stays `[]` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub additional_skills: Vec<String>,
    /// 0 - 100, rounded to two decimals.
    pub match_score_percent: f64,
    pub match_strength: MatchStrength,
    pub recommendation: String,
}
