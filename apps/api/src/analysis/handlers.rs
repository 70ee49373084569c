use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::job::analyze_job;
use crate::analysis::matching::match_skills;
use crate::analysis::resume::parse_resume;
use crate::errors::AppError;
use crate::models::job::JobDescriptionRecord;
use crate::models::matching::MatchResult;
use crate::models::resume::ResumeRecord;
use crate::models::sentinel;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatchRequest {
    #[serde(default, deserialize_with = "sentinel::skills::deserialize")]
    pub resume_skills: Vec<String>,
    #[serde(default, deserialize_with = "sentinel::skills::deserialize")]
    pub job_skills: Vec<String>,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub resume: ResumeRecord,
    pub job: JobDescriptionRecord,
    #[serde(rename = "match")]
    pub result: MatchResult,
}

/// POST /api/v1/resumes/parse
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<ResumeRecord>, AppError> {
    check_size("text", &req.text, state.config.max_text_bytes)?;
    let ner = state.ner.clone();
    let record = tokio::task::spawn_blocking(move || parse_resume(&req.text, &ner))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in resume parse: {e}")))?;
    Ok(Json(record))
}

/// POST /api/v1/jobs/analyze
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<JobDescriptionRecord>, AppError> {
    check_size("text", &req.text, state.config.max_text_bytes)?;
    let ner = state.ner.clone();
    let record = tokio::task::spawn_blocking(move || analyze_job(&req.text, &ner))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in job analysis: {e}")))?;
    Ok(Json(record))
}

/// POST /api/v1/match
///
/// Parses both texts and matches the resume's skills against the job's.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    check_size("resumeText", &req.resume_text, state.config.max_text_bytes)?;
    check_size("jobText", &req.job_text, state.config.max_text_bytes)?;

    let ner = state.ner.clone();
    let response = tokio::task::spawn_blocking(move || {
        let resume = parse_resume(&req.resume_text, &ner);
        let job = analyze_job(&req.job_text, &ner);
        let result = match_skills(&resume.skills, &job.skills);
        MatchResponse { resume, job, result }
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in match: {e}")))?;
    Ok(Json(response))
}

/// POST /api/v1/match/skills
pub async fn handle_match_skills(
    Json(req): Json<SkillMatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    Ok(Json(match_skills(&req.resume_skills, &req.job_skills)))
}

fn check_size(field: &str, text: &str, max_bytes: usize) -> Result<(), AppError> {
    if text.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "{field} is {} bytes; the limit is {max_bytes}",
            text.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::ner::testing::StubModel;
    use crate::ner::{EntityExtractor, EntityLabel};
    use crate::routes::build_router;
    use crate::state::AppState;

    fn app_with(config: Config, ner: EntityExtractor) -> Router {
        build_router(AppState::new(config, ner))
    }

    fn app() -> Router {
        app_with(Config::default(), EntityExtractor::disabled())
    }

    async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_parse_resume_endpoint() {
        let text = "John Smith\njohn.smith@example.com\nSkills\nPython, SQL\nExperience\nSoftware Engineer at Acme Corp | Jan 2020 - Present\n- Built things.";
        let (status, body) = post(app(), "/api/v1/resumes/parse", json!({ "text": text })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contactInfo"]["email"], "john.smith@example.com");
        assert_eq!(body["contactInfo"]["linkedin"], "N/A");
        assert_eq!(body["experience"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_is_not_an_error() {
        let (status, body) = post(app(), "/api/v1/resumes/parse", json!({ "text": "" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "N/A");
        assert_eq!(body["skills"], json!(["N/A"]));

        let (status, body) = post(app(), "/api/v1/jobs/analyze", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["experienceYears"], "N/A");
    }

    #[tokio::test]
    async fn test_analyze_job_endpoint() {
        let text = "Senior Backend Developer\n5+ years of experience with Rust and AWS.";
        let (status, body) = post(app(), "/api/v1/jobs/analyze", json!({ "text": text })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobTitle"], "Senior Backend Developer");
        assert_eq!(body["seniority"], "Senior");
        assert_eq!(body["experienceYears"], "5+ years");
        assert_eq!(body["skills"], json!(["AWS", "Rust"]));
    }

    #[tokio::test]
    async fn test_oversized_text_is_rejected() {
        let config = Config {
            max_text_bytes: 16,
            ..Config::default()
        };
        let app = app_with(config, EntityExtractor::disabled());
        let (status, body) = post(
            app,
            "/api/v1/resumes/parse",
            json!({ "text": "this text is longer than sixteen bytes" }),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_full_match_endpoint() {
        let ner = StubModel::extractor(vec![("Jane Doe", EntityLabel::Person)]);
        let (status, body) = post(
            app_with(Config::default(), ner),
            "/api/v1/match",
            json!({
                "resumeText": "Jane Doe\nSkills\nPython, SQL",
                "jobText": "Data Analyst\nRequired: Python, SQL and AWS."
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume"]["name"], "Jane Doe");
        assert_eq!(body["job"]["jobTitle"], "Data Analyst");
        assert_eq!(body["match"]["missingSkills"], json!(["AWS"]));
        assert_eq!(body["match"]["matchScorePercent"], 66.67);
    }

    #[tokio::test]
    async fn test_match_skills_endpoint() {
        let (status, body) = post(
            app(),
            "/api/v1/match/skills",
            json!({ "resumeSkills": ["python", "sql"], "jobSkills": ["python", "sql", "aws"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matchingSkills"], json!(["python", "sql"]));
        assert_eq!(body["missingSkills"], json!(["aws"]));
        assert_eq!(body["matchStrength"], "Good");
    }

    #[tokio::test]
    async fn test_match_skills_drops_placeholder_lists() {
        let (status, body) = post(
            app(),
            "/api/v1/match/skills",
            json!({ "resumeSkills": ["N/A", "Python"], "jobSkills": ["N/A"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["additionalSkills"], json!(["Python"]));
        assert_eq!(body["missingSkills"], json!([]));
        assert_eq!(body["matchScorePercent"], 0.0);

        let (status, body) = post(
            app(),
            "/api/v1/match/skills",
            json!({ "resumeSkills": null, "jobSkills": ["AWS"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["missingSkills"], json!(["AWS"]));
    }

    #[tokio::test]
    async fn test_malformed_json_is_client_error() {
        let response = app()
            .oneshot(
                Request::post("/api/v1/match/skills")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
