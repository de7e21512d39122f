//! Client for a hosted tabular-model prediction endpoint.
//!
//! Unlike the chat backends this client never returns an error: failures
//! are logged and surface as `None`.

use std::time::Duration;

use planner_models::PredictionConfig;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::BackendError;

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionInput {
    Json(serde_json::Value),
    Text(String),
}

impl PredictionInput {
    fn into_body(self) -> String {
        match self {
            PredictionInput::Json(value) => value.to_string(),
            PredictionInput::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Json(serde_json::Value),
    Text(String),
}

pub struct PredictionClient {
    client: reqwest::Client,
    endpoint_url: String,
    content_type: String,
    auth_header: Option<(String, SecretString)>,
}

impl std::fmt::Debug for PredictionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionClient")
            .field("endpoint_url", &self.endpoint_url)
            .field("content_type", &self.content_type)
            .field(
                "auth_header",
                &self.auth_header.as_ref().map(|(name, _)| name),
            )
            .finish()
    }
}

impl PredictionClient {
    pub fn new(config: &PredictionConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BackendError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Both halves are needed for the header to be sent.
        let auth_header = match (&config.auth_header_name, &config.auth_header_value) {
            (Some(name), Some(value)) => Some((name.clone(), SecretString::from(value.clone()))),
            _ => None,
        };

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
            content_type: config.content_type.clone(),
            auth_header,
        })
    }

    /// POST `input` to the endpoint. JSON replies decode to
    /// `Prediction::Json`, anything else is returned as text.
    pub async fn invoke(&self, input: PredictionInput) -> Option<Prediction> {
        let mut request = self
            .client
            .post(&self.endpoint_url)
            .header("Content-Type", &self.content_type)
            .body(input.into_body());
        if let Some((name, value)) = &self.auth_header {
            request = request.header(name.as_str(), value.expose_secret());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %self.endpoint_url, error = %e, "Error invoking endpoint");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint_url, status = %status, "Endpoint returned error status");
            return None;
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(endpoint = %self.endpoint_url, error = %e, "Failed to read endpoint response");
                return None;
            }
        };

        debug!(length = text.len(), "Received prediction");
        Some(match serde_json::from_str(&text) {
            Ok(value) => Prediction::Json(value),
            Err(_) => Prediction::Text(text),
        })
    }
}
