/// Entity extraction: the single point of entry for all NER model calls.
///
/// ARCHITECTURAL RULE: no other module talks to an inference backend
/// directly. Everything goes through `EntityExtractor`, which loads the
/// model lazily, exactly once per process, and turns every model failure
/// into "no entities" so callers can fall back to regex-only logic.
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::ner::remote::{RemoteNerModel, RemoteSettings};

pub mod remote;

#[derive(Debug, Error)]
pub enum NerError {
    #[error("NER is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Inference endpoint error (status {status}): {message}")]
    Endpoint { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model load failed: {0}")]
    Load(String),
}

/// Entity category, normalized across CoNLL and OntoNotes tag sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Org,
    Loc,
    Misc,
    Date,
    Product,
    Other,
}

impl EntityLabel {
    /// Parses a model tag such as `PER`, `B-ORG`, `I-MISC` or `GPE`.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        let tag = tag
            .strip_prefix("B-")
            .or_else(|| tag.strip_prefix("I-"))
            .unwrap_or(tag);
        match tag.to_ascii_uppercase().as_str() {
            "PER" | "PERSON" => EntityLabel::Person,
            "ORG" | "ORGANIZATION" => EntityLabel::Org,
            "LOC" | "GPE" | "LOCATION" => EntityLabel::Loc,
            "MISC" | "NORP" | "EVENT" | "WORK_OF_ART" | "LANGUAGE" => EntityLabel::Misc,
            "DATE" | "TIME" => EntityLabel::Date,
            "PRODUCT" => EntityLabel::Product,
            _ => EntityLabel::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Loc => "LOC",
            EntityLabel::Misc => "MISC",
            EntityLabel::Date => "DATE",
            EntityLabel::Product => "PRODUCT",
            EntityLabel::Other => "OTHER",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labelled span. `start`/`end` are character offsets into the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

/// A loaded token-classification model. Implementations must be safe to
/// call from many threads at once.
pub trait NerModel: Send + Sync {
    fn name(&self) -> &str;

    fn infer(&self, text: &str) -> Result<Vec<Entity>, NerError>;
}

type ModelLoader = Box<dyn Fn() -> Result<Arc<dyn NerModel>, NerError> + Send + Sync>;

/// Lazily loaded, process-wide model handle.
///
/// The first caller runs the loader while concurrent first callers block on
/// the same cell. The outcome, failure included, is memoized: a model that
/// failed to load stays unavailable for the life of the process.
pub struct EntityExtractor {
    loader: ModelLoader,
    model: OnceCell<Option<Arc<dyn NerModel>>>,
    min_score: f32,
}

impl EntityExtractor {
    pub fn new<F>(loader: F, min_score: f32) -> Self
    where
        F: Fn() -> Result<Arc<dyn NerModel>, NerError> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            model: OnceCell::new(),
            min_score,
        }
    }

    /// Remote backend when `NER_ENDPOINT` is set, otherwise disabled.
    pub fn from_config(config: &Config) -> Self {
        let Some(endpoint) = config.ner_endpoint.clone() else {
            return Self::disabled();
        };
        let settings = RemoteSettings {
            endpoint,
            api_token: config.ner_api_token.clone(),
            timeout: Duration::from_secs(config.ner_timeout_secs),
        };
        Self::new(
            move || {
                RemoteNerModel::load(&settings).map(|model| Arc::new(model) as Arc<dyn NerModel>)
            },
            config.ner_min_score,
        )
    }

    /// Wraps an already-constructed model.
    pub fn with_model(model: Arc<dyn NerModel>) -> Self {
        Self::new(move || Ok(model.clone()), 0.0)
    }

    /// An extractor that never has a model; every call degrades to no entities.
    pub fn disabled() -> Self {
        Self::new(|| Err(NerError::NotConfigured), 0.0)
    }

    /// Loads the model if no load has been attempted yet. Idempotent.
    /// Returns whether a model is available.
    pub fn ensure_loaded(&self) -> bool {
        self.model().is_some()
    }

    /// Same as `ensure_loaded`: availability is only known once loading
    /// has been attempted.
    pub fn is_available(&self) -> bool {
        self.ensure_loaded()
    }

    /// Runs the model over `text`. Any failure is logged and yields an
    /// empty list.
    pub fn infer(&self, text: &str) -> Vec<Entity> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        // The Arc is cloned out of the cell so no lock is held during inference.
        let Some(model) = self.model() else {
            return Vec::new();
        };

        match model.infer(text) {
            Ok(entities) => {
                let entities: Vec<Entity> = entities
                    .into_iter()
                    .filter(|e| e.score >= self.min_score && !e.text.trim().is_empty())
                    .collect();
                debug!("NER ({}) found {} entities", model.name(), entities.len());
                entities
            }
            Err(e) => {
                warn!("NER inference failed, continuing without entities: {e}");
                Vec::new()
            }
        }
    }

    /// Entity texts with one of `labels`, in document order.
    pub fn extract(&self, text: &str, labels: &[EntityLabel]) -> Vec<String> {
        self.infer(text)
            .into_iter()
            .filter(|e| labels.contains(&e.label))
            .map(|e| e.text)
            .collect()
    }

    fn model(&self) -> Option<Arc<dyn NerModel>> {
        self.model
            .get_or_init(|| match (self.loader)() {
                Ok(model) => {
                    info!("NER model loaded: {}", model.name());
                    Some(model)
                }
                Err(NerError::NotConfigured) => {
                    info!("NER disabled; using regex-only extraction");
                    None
                }
                Err(e) => {
                    warn!("NER model unavailable, using regex-only extraction: {e}");
                    None
                }
            })
            .clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test doubles
// ────────────────────────────────────────────────────────────────────────────
