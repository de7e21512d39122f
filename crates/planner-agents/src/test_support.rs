//! Scripted transports and responders for exercising the router and the
//! turn loop without a live model provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use planner_models::{AgentSession, RouteMode};

use crate::error::BackendError;
use crate::router::Responder;
use crate::transport::{
    AgentInvocation, AgentRequest, AgentTransport, CompletionChunk, ModelTransport,
};

enum ModelReply {
    Body(Vec<u8>),
    Failure(String),
}

/// A model transport that replays queued bodies and records every call as
/// `(model_id, request JSON)`.
#[derive(Default)]
pub struct MockModelTransport {
    replies: Mutex<VecDeque<ModelReply>>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

impl MockModelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_raw(&self, body: Vec<u8>) {
        self.lock_replies().push_back(ModelReply::Body(body));
    }

    pub fn push_json(&self, body: serde_json::Value) {
        self.push_raw(body.to_string().into_bytes());
    }

    /// Queue a response holding a single text part.
    pub fn push_text(&self, text: &str) {
        self.push_json(serde_json::json!({
            "content": [{"type": "text", "text": text}]
        }));
    }

    pub fn push_failure(&self, message: &str) {
        self.lock_replies()
            .push_back(ModelReply::Failure(message.to_string()));
    }

    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<ModelReply>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ModelTransport for MockModelTransport {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, BackendError> {
        let request = serde_json::from_slice(&body)?;
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((model_id.to_string(), request));

        match self.lock_replies().pop_front() {
            Some(ModelReply::Body(body)) => Ok(body),
            Some(ModelReply::Failure(message)) => Err(BackendError::Transport(message)),
            None => Err(BackendError::Transport("no scripted reply".to_string())),
        }
    }
}

enum AgentReply {
    Chunks {
        session_id: String,
        chunks: Vec<Vec<u8>>,
        trailing_error: Option<String>,
    },
    Failure(String),
}

/// An agent transport that replays queued completions and records requests.
#[derive(Default)]
pub struct MockAgentTransport {
    replies: Mutex<VecDeque<AgentReply>>,
    requests: Mutex<Vec<AgentRequest>>,
}

impl MockAgentTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a completion made of UTF-8 chunks, answered under `session_id`.
    pub fn push_reply(&self, session_id: &str, chunks: &[&str]) {
        self.push_raw_reply(
            session_id,
            chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
        );
    }

    pub fn push_raw_reply(&self, session_id: &str, chunks: Vec<Vec<u8>>) {
        self.lock_replies().push_back(AgentReply::Chunks {
            session_id: session_id.to_string(),
            chunks,
            trailing_error: None,
        });
    }

    /// Queue a completion whose stream fails after `chunks`.
    pub fn push_broken_reply(&self, session_id: &str, chunks: &[&str], error: &str) {
        self.lock_replies().push_back(AgentReply::Chunks {
            session_id: session_id.to_string(),
            chunks: chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
            trailing_error: Some(error.to_string()),
        });
    }

    pub fn push_failure(&self, message: &str) {
        self.lock_replies()
            .push_back(AgentReply::Failure(message.to_string()));
    }

    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<AgentReply>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AgentTransport for MockAgentTransport {
    async fn invoke_agent(&self, request: &AgentRequest) -> Result<AgentInvocation, BackendError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match self.lock_replies().pop_front() {
            Some(AgentReply::Chunks {
                session_id,
                chunks,
                trailing_error,
            }) => {
                let mut events: Vec<Result<CompletionChunk, BackendError>> = chunks
                    .into_iter()
                    .map(|bytes| Ok(CompletionChunk { bytes }))
                    .collect();
                if let Some(message) = trailing_error {
                    events.push(Err(BackendError::Transport(message)));
                }
                Ok(AgentInvocation {
                    session_id,
                    completion: stream::iter(events).boxed(),
                })
            }
            Some(AgentReply::Failure(message)) => Err(BackendError::Transport(message)),
            None => Err(BackendError::Transport("no scripted reply".to_string())),
        }
    }
}

/// A responder with a fixed outcome, counting how often it is called.
pub struct MockResponder {
    mode: RouteMode,
    answer: Option<String>,
    next_session: Option<String>,
    calls: AtomicUsize,
}

impl MockResponder {
    pub fn answering(mode: RouteMode, answer: &str) -> Self {
        Self {
            mode,
            answer: Some(answer.to_string()),
            next_session: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(mode: RouteMode) -> Self {
        Self {
            mode,
            answer: None,
            next_session: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Move the caller's session to `id` on every successful answer.
    pub fn with_next_session(mut self, id: &str) -> Self {
        self.next_session = Some(id.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Responder for MockResponder {
    fn mode(&self) -> RouteMode {
        self.mode
    }

    async fn respond(
        &self,
        _query: &str,
        session: &mut AgentSession,
    ) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Some(answer) => {
                if let Some(id) = &self.next_session {
                    session.update(id.clone());
                }
                Ok(answer.clone())
            }
            None => Err(BackendError::Transport("Mock failure".to_string())),
        }
    }
}
