use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::BackendError;
use crate::transport::ModelTransport;

const TOP_K: u32 = 250;
const TOP_P: f32 = 0.999;

/// Sampling settings for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub top_k: u32,
    pub stop_sequences: Vec<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub messages: Vec<RequestMessage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

/// A typed part of a message body.
///
/// Part types this crate does not know about deserialize as `Unknown` and are
/// skipped when collecting text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    pub content: Vec<ContentPart>,
}

impl GenerationResponse {
    /// Concatenate every text part in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Unknown => None,
            })
            .collect()
    }
}

/// Stateless single-turn text generation against a fixed model.
#[derive(Clone)]
pub struct DirectGenerator {
    transport: Arc<dyn ModelTransport>,
    model_id: String,
    anthropic_version: String,
    defaults: GenerationParams,
}

impl std::fmt::Debug for DirectGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectGenerator")
            .field("model_id", &self.model_id)
            .field("anthropic_version", &self.anthropic_version)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl DirectGenerator {
    pub fn new(
        transport: Arc<dyn ModelTransport>,
        model_id: impl Into<String>,
        anthropic_version: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            model_id: model_id.into(),
            anthropic_version: anthropic_version.into(),
            defaults: GenerationParams::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: GenerationParams) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn build_request(&self, prompt: &str, params: GenerationParams) -> GenerationRequest {
        GenerationRequest {
            anthropic_version: self.anthropic_version.clone(),
            max_tokens: params.max_tokens,
            top_k: TOP_K,
            stop_sequences: Vec::new(),
            temperature: params.temperature,
            top_p: TOP_P,
            messages: vec![RequestMessage {
                role: "user".to_string(),
                content: vec![ContentPart::Text {
                    text: prompt.to_string(),
                }],
            }],
        }
    }

    /// Generate with the configured default parameters.
    pub async fn generate_default(&self, prompt: &str) -> Result<String, BackendError> {
        self.generate(prompt, self.defaults).await
    }

    pub async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, BackendError> {
        info!(
            model = %self.model_id,
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            "Generating"
        );

        let body = serde_json::to_vec(&self.build_request(prompt, params))?;
        let raw = self.transport.invoke_model(&self.model_id, body).await?;

        let response: GenerationResponse = serde_json::from_slice(&raw).map_err(|e| {
            BackendError::Decode(format!(
                "Malformed generation response: {e} (length={})",
                raw.len()
            ))
        })?;

        debug!(parts = response.content.len(), "Received generation response");
        Ok(response.text())
    }
}
