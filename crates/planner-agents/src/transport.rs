//! Wire-level access to the two model backends.
//!
//! `DirectGenerator` and `KnowledgeAgent` only see these traits, so tests
//! swap in the scripted transports from `test_support`.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BackendError;

/// Request sent to the knowledge agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub input_text: String,
    pub agent_alias_id: String,
    pub agent_id: String,
    pub session_id: String,
}

/// One piece of a chunked completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionChunk {
    pub bytes: Vec<u8>,
}

/// The agent's reply: the session id it wants used next, and the completion
/// chunks in arrival order.
pub struct AgentInvocation {
    pub session_id: String,
    pub completion: BoxStream<'static, Result<CompletionChunk, BackendError>>,
}

impl std::fmt::Debug for AgentInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentInvocation")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// Non-streaming request/response call to a hosted model.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Send a serialized request envelope to `model_id`, returning the raw
    /// response body.
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, BackendError>;
}

/// Call into a stateful retrieval agent.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn invoke_agent(&self, request: &AgentRequest) -> Result<AgentInvocation, BackendError>;
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Config(format!("Failed to create HTTP client: {e}")))
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, "Backend returned error status");
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Model runtime reached over HTTPS with a bearer token.
pub struct HttpModelTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for HttpModelTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpModelTransport")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpModelTransport {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.map(SecretString::from),
        })
    }
}

#[async_trait]
impl ModelTransport for HttpModelTransport {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, BackendError> {
        let url = format!("{}/model/{}/invoke", self.endpoint, model_id);
        debug!(url = %url, bytes = body.len(), "Invoking model");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = ensure_success(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Agent gateway answering with `{sessionId, completion: [{chunk: {bytes}}]}`.
///
/// `bytes` is a JSON array of integers 0-255 holding the chunk's raw UTF-8,
/// e.g. `{"bytes": [72, 105]}` for "Hi". Base64 strings are not accepted.
/// Events without a `chunk` key are dropped.
#[derive(Debug)]
pub struct HttpAgentTransport {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentResponseBody {
    session_id: String,
    #[serde(default)]
    completion: Vec<CompletionEvent>,
}

/// Completion events other than chunks (traces, citations) carry no text.
#[derive(Debug, Deserialize)]
struct CompletionEvent {
    chunk: Option<CompletionChunk>,
}

impl HttpAgentTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AgentTransport for HttpAgentTransport {
    async fn invoke_agent(&self, request: &AgentRequest) -> Result<AgentInvocation, BackendError> {
        debug!(endpoint = %self.endpoint, session_id = %request.session_id, "Invoking agent");

        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let response = ensure_success(response).await?;
        let raw = response.bytes().await?;
        let body: AgentResponseBody = serde_json::from_slice(&raw)
            .map_err(|e| BackendError::Decode(format!("Agent response: {e}")))?;

        let chunks: Vec<Result<CompletionChunk, BackendError>> = body
            .completion
            .into_iter()
            .filter_map(|event| event.chunk)
            .map(Ok)
            .collect();

        Ok(AgentInvocation {
            session_id: body.session_id,
            completion: stream::iter(chunks).boxed(),
        })
    }
}
