//! Skill matching: compares a resume's skills against a job's skills.
//!
//! Pure and deterministic. Comparison is case-insensitive; output keeps the
//! caller's spelling and order. A resume skill covers a job skill when they
//! are equal or when the resume skill is a substring of the job skill
//! ("react" covers "ReactJS" and "java" covers "javascript").

use crate::extraction::normalize::{dedup_case_insensitive, fold};
use crate::models::matching::{MatchResult, MatchStrength};

/// Missing skills named in the recommendation.
const RECOMMENDATION_GAPS: usize = 3;

pub fn match_skills(resume_skills: &[String], job_skills: &[String]) -> MatchResult {
    let resume = clean_skills(resume_skills);
    let job = clean_skills(job_skills);

    let (matching_skills, additional_skills): (Vec<String>, Vec<String>) = resume
        .iter()
        .cloned()
        .partition(|r| job.iter().any(|j| covers(r, j)));

    let missing_skills: Vec<String> = job
        .iter()
        .filter(|j| !resume.iter().any(|r| covers(r, j)))
        .cloned()
        .collect();

    let match_score_percent = if job.is_empty() {
        0.0
    } else {
        let covered = job.len() - missing_skills.len();
        round2(100.0 * covered as f64 / job.len() as f64)
    };
    let match_strength = MatchStrength::from_score(match_score_percent);
    let recommendation =
        build_recommendation(match_score_percent, match_strength, job.is_empty(), &missing_skills);

    MatchResult {
        matching_skills,
        missing_skills,
        additional_skills,
        match_score_percent,
        match_strength,
        recommendation,
    }
}

/// Trims, drops blanks, and removes case-insensitive duplicates keeping the
/// first spelling.
fn clean_skills(skills: &[String]) -> Vec<String> {
    dedup_case_insensitive(
        skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// True when `resume_skill` is a case-insensitive substring of `job_skill`.
pub fn covers(resume_skill: &str, job_skill: &str) -> bool {
    let needle = fold(resume_skill);
    !needle.is_empty() && fold(job_skill).contains(&needle)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn build_recommendation(
    score: f64,
    strength: MatchStrength,
    no_job_skills: bool,
    missing: &[String],
) -> String {
    if no_job_skills {
        return "No job skills to compare against. Provide a job description with concrete requirements."
            .to_string();
    }

    let top_gaps = missing
        .iter()
        .take(RECOMMENDATION_GAPS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    match strength {
        MatchStrength::Excellent if missing.is_empty() => {
            "Excellent match. Your skills cover every listed requirement.".to_string()
        }
        MatchStrength::Excellent | MatchStrength::Strong => format!(
            "{strength} match ({score}%). Your skills cover the key requirements; consider highlighting: {top_gaps}."
        ),
        MatchStrength::Good | MatchStrength::Moderate => format!(
            "{strength} match ({score}%). Consider building experience with: {top_gaps}."
        ),
        MatchStrength::Weak => format!(
            "Weak match ({score}%). Significant gaps: {top_gaps}. Consider tailoring your resume before applying."
        ),
    }
}
