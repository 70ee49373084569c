//! Token-classification over HTTP, speaking the inference-endpoint protocol
//! of hosted transformer models (grouped entities, `aggregation_strategy`).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ner::{Entity, EntityLabel, NerError, NerModel};

/// Text sent once at load time to prove the endpoint answers.
const PROBE_TEXT: &str = "Jane Doe works at Acme Corporation in Berlin.";

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    aggregation_strategy: &'static str,
}

/// One element of the endpoint's response array. Aggregated responses use
/// `entity_group`; raw token responses use `entity`.
#[derive(Debug, Deserialize)]
struct RawEntity {
    #[serde(alias = "entity")]
    entity_group: String,
    word: String,
    score: f32,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
}

pub struct RemoteNerModel {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl RemoteNerModel {
    /// Builds the client and runs one probe inference. A failed probe is a
    /// failed load.
    pub fn load(settings: &RemoteSettings) -> Result<Self, NerError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let model = Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_token: settings.api_token.clone(),
        };
        let probe = model
            .infer(PROBE_TEXT)
            .map_err(|e| NerError::Load(format!("probe against {} failed: {e}", model.endpoint)))?;
        debug!("NER probe returned {} entities", probe.len());
        Ok(model)
    }
}

impl NerModel for RemoteNerModel {
    fn name(&self) -> &str {
        &self.endpoint
    }

    fn infer(&self, text: &str) -> Result<Vec<Entity>, NerError> {
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                aggregation_strategy: "simple",
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        let payload = response.text()?;

        if !status.is_success() {
            return Err(NerError::Endpoint {
                status: status.as_u16(),
                message: payload,
            });
        }

        let raw: Vec<RawEntity> = serde_json::from_str(&payload)?;
        Ok(decode_entities(text, raw))
    }
}

/// Converts endpoint output into entities, preferring the source span over
/// the model's re-tokenized `word` when offsets are present.
fn decode_entities(text: &str, raw: Vec<RawEntity>) -> Vec<Entity> {
    raw.into_iter()
        .filter_map(|r| {
            let span = match (r.start, r.end) {
                (Some(start), Some(end)) if end > start => {
                    let slice: String = text.chars().skip(start).take(end - start).collect();
                    Some((start, end, slice))
                }
                _ => None,
            };
            let (start, end, surface) = match span {
                Some((start, end, slice)) if !slice.trim().is_empty() => (start, end, slice),
                _ => {
                    let word = join_word_pieces(&r.word);
                    let start = r.start.unwrap_or(0);
                    (start, start + word.chars().count(), word)
                }
            };
            let surface = surface.trim().to_string();
            if surface.is_empty() {
                return None;
            }
            Some(Entity {
                text: surface,
                label: EntityLabel::from_tag(&r.entity_group),
                score: r.score,
                start,
                end,
            })
        })
        .collect()
}

/// Joins WordPiece continuation markers: "Tensor ##Flow" -> "TensorFlow".
fn join_word_pieces(word: &str) -> String {
    word.replace(" ##", "").replace("##", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> Vec<RawEntity> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_grouped_entities_uses_source_span() {
        let text = "John Smith works at Acme Corp";
        let entities = decode_entities(
            text,
            raw(r#"[
                {"entity_group": "PER", "word": "John Smith", "score": 0.99, "start": 0, "end": 10},
                {"entity_group": "ORG", "word": "acme corp", "score": 0.97, "start": 20, "end": 29}
            ]"#),
        );
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].label, EntityLabel::Person);
        assert_eq!(entities[0].text, "John Smith");
        assert_eq!(entities[1].label, EntityLabel::Org);
        assert_eq!(entities[1].text, "Acme Corp");
    }

    #[test]
    fn test_decode_token_level_entities_without_offsets() {
        let entities = decode_entities(
            "",
            raw(r#"[{"entity": "B-MISC", "word": "Tensor ##Flow", "score": 0.8}]"#),
        );
        assert_eq!(entities[0].label, EntityLabel::Misc);
        assert_eq!(entities[0].text, "TensorFlow");
        assert_eq!(entities[0].end, 10);
    }

    #[test]
    fn test_offsets_are_character_based() {
        let text = "José Núñez at Globex";
        let entities = decode_entities(
            text,
            raw(r#"[{"entity_group": "ORG", "word": "Globex", "score": 0.9, "start": 14, "end": 20}]"#),
        );
        assert_eq!(entities[0].text, "Globex");
    }

    #[test]
    fn test_blank_words_are_dropped() {
        let entities = decode_entities(
            "x",
            raw(r#"[{"entity_group": "ORG", "word": " ", "score": 0.9}]"#),
        );
        assert!(entities.is_empty());
    }

    #[test]
    fn test_request_body_shape() {
        let body = InferenceRequest {
            inputs: "hello",
            parameters: InferenceParameters {
                aggregation_strategy: "simple",
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"inputs": "hello", "parameters": {"aggregation_strategy": "simple"}})
        );
    }
}
