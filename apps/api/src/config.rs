use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Nothing is required: with no NER endpoint the service runs regex-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Token-classification inference endpoint. `None` disables NER.
    pub ner_endpoint: Option<String>,
    pub ner_api_token: Option<String>,
    pub ner_timeout_secs: u64,
    /// Entities scored below this are discarded.
    pub ner_min_score: f32,
    /// Largest text body the API accepts, in bytes.
    pub max_text_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            ner_endpoint: None,
            ner_api_token: None,
            ner_timeout_secs: 30,
            ner_min_score: 0.5,
            max_text_bytes: 256 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            ner_endpoint: optional_env("NER_ENDPOINT"),
            ner_api_token: optional_env("NER_API_TOKEN"),
            ner_timeout_secs: parse_env("NER_TIMEOUT_SECS", defaults.ner_timeout_secs)
                .context("NER_TIMEOUT_SECS must be a whole number of seconds")?,
            ner_min_score: parse_env("NER_MIN_SCORE", defaults.ner_min_score)
                .context("NER_MIN_SCORE must be a number between 0 and 1")?,
            max_text_bytes: parse_env("MAX_TEXT_BYTES", defaults.max_text_bytes)
                .context("MAX_TEXT_BYTES must be a positive integer")?,
        })
    }
}

/// Unset or blank variables are treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for environment variable '{key}'")),
        None => Ok(default),
    }
}
