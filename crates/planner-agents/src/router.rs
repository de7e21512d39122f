use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use planner_models::{AgentSession, RouteMode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::direct::DirectGenerator;
use crate::error::BackendError;
use crate::knowledge::KnowledgeAgent;
use crate::prompts::build_prompt;

/// Anything that can answer a chat turn. Mockable for testing.
#[async_trait]
pub trait Responder: Send + Sync {
    fn mode(&self) -> RouteMode;

    async fn respond(&self, query: &str, session: &mut AgentSession)
        -> Result<String, BackendError>;
}

/// The two production backends.
#[derive(Debug, Clone)]
pub enum Backend {
    Direct(DirectGenerator),
    Knowledge(KnowledgeAgent),
}

#[async_trait]
impl Responder for Backend {
    fn mode(&self) -> RouteMode {
        match self {
            Backend::Direct(_) => RouteMode::Direct,
            Backend::Knowledge(_) => RouteMode::Knowledge,
        }
    }

    /// Direct generation gets the advisor preamble; the knowledge agent has
    /// its own grounding and receives the raw query.
    async fn respond(
        &self,
        query: &str,
        session: &mut AgentSession,
    ) -> Result<String, BackendError> {
        match self {
            Backend::Direct(generator) => generator.generate_default(&build_prompt(query)).await,
            Backend::Knowledge(agent) => agent.ask(query, session).await,
        }
    }
}

/// Outcome of a routed turn: an answer or an error message, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedResult {
    Answer(String),
    Error(String),
}

impl NormalizedResult {
    pub fn text(&self) -> Option<&str> {
        match self {
            NormalizedResult::Answer(text) => Some(text),
            NormalizedResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            NormalizedResult::Answer(_) => None,
            NormalizedResult::Error(message) => Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NormalizedResult::Error(_))
    }
}

/// Picks the backend for a turn and folds its outcome into a
/// `NormalizedResult`. Backend errors stop here.
pub struct QueryRouter {
    backends: Vec<Arc<dyn Responder>>,
}

impl QueryRouter {
    pub fn new(backends: Vec<Arc<dyn Responder>>) -> Self {
        Self { backends }
    }

    pub fn modes(&self) -> Vec<RouteMode> {
        self.backends.iter().map(|b| b.mode()).collect()
    }

    fn backend(&self, mode: RouteMode) -> Option<&Arc<dyn Responder>> {
        self.backends.iter().find(|b| b.mode() == mode)
    }

    /// Answer `query` with the backend registered for `mode`. Not retried.
    pub async fn route(
        &self,
        query: &str,
        mode: RouteMode,
        session: &mut AgentSession,
    ) -> NormalizedResult {
        let start = Instant::now();
        let Some(backend) = self.backend(mode) else {
            warn!(mode = %mode, "No backend registered");
            return NormalizedResult::Error(format!("No backend configured for {mode} mode"));
        };

        match backend.respond(query, session).await {
            Ok(text) => {
                info!(
                    mode = %mode,
                    length = text.len(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "Turn answered"
                );
                NormalizedResult::Answer(text)
            }
            Err(e) => {
                warn!(
                    mode = %mode,
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Backend failed"
                );
                NormalizedResult::Error(format!("The {mode} backend failed: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockAgentTransport, MockModelTransport, MockResponder};

    fn exactly_one(result: &NormalizedResult) -> bool {
        result.text().is_some() != result.error().is_some()
    }

    fn real_router(
        model: Arc<MockModelTransport>,
        agent: Arc<MockAgentTransport>,
    ) -> QueryRouter {
        QueryRouter::new(vec![
            Arc::new(Backend::Direct(DirectGenerator::new(
                model,
                "test-model",
                "bedrock-2023-05-31",
            ))),
            Arc::new(Backend::Knowledge(KnowledgeAgent::new(agent, "AGENT", "ALIAS"))),
        ])
    }

    #[tokio::test]
    async fn direct_mode_prefixes_prompt() {
        let model = Arc::new(MockModelTransport::new());
        model.push_text("Prioritise bungalows.");
        let router = real_router(Arc::clone(&model), Arc::new(MockAgentTransport::new()));

        let mut session = AgentSession::new("s-1");
        let result = router.route("What next?", RouteMode::Direct, &mut session).await;

        assert_eq!(result.text(), Some("Prioritise bungalows."));
        assert!(exactly_one(&result));
        let sent = model.calls()[0].1["messages"][0]["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(sent, build_prompt("What next?"));
        assert_eq!(session.id, "s-1");
    }

    #[tokio::test]
    async fn knowledge_mode_sends_raw_query_and_threads_session() {
        let agent = Arc::new(MockAgentTransport::new());
        agent.push_reply("s-2", &["Grounded ", "answer"]);
        let router = real_router(Arc::new(MockModelTransport::new()), Arc::clone(&agent));

        let mut session = AgentSession::new("s-1");
        let result = router
            .route("What next?", RouteMode::Knowledge, &mut session)
            .await;

        assert_eq!(result.text(), Some("Grounded answer"));
        assert_eq!(agent.requests()[0].input_text, "What next?");
        assert_eq!(session.id, "s-2");
    }

    #[tokio::test]
    async fn backend_errors_become_error_results() {
        let model = Arc::new(MockModelTransport::new());
        model.push_failure("timed out");
        model.push_raw(b"{\"content\": 7}".to_vec());
        let agent = Arc::new(MockAgentTransport::new());
        agent.push_failure("access denied");
        let router = real_router(model, agent);

        let mut session = AgentSession::new("s-1");
        for mode in [RouteMode::Direct, RouteMode::Direct, RouteMode::Knowledge] {
            let result = router.route("q", mode, &mut session).await;
            assert!(result.is_error());
            assert!(exactly_one(&result));
            assert!(result.error().unwrap().contains(&mode.to_string()));
        }
        assert_eq!(session.id, "s-1");
    }

    #[tokio::test]
    async fn failures_are_not_retried() {
        let failing = Arc::new(MockResponder::failing(RouteMode::Direct));
        let router = QueryRouter::new(vec![Arc::clone(&failing) as Arc<dyn Responder>]);

        let mut session = AgentSession::new("s-1");
        router.route("q", RouteMode::Direct, &mut session).await;
        assert_eq!(failing.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_backend_is_error_result() {
        let router = QueryRouter::new(vec![
            Arc::new(MockResponder::answering(RouteMode::Direct, "hi")) as Arc<dyn Responder>,
        ]);

        let mut session = AgentSession::new("s-1");
        let result = router.route("q", RouteMode::Knowledge, &mut session).await;
        assert!(exactly_one(&result));
        assert!(result.error().unwrap().contains("knowledge"));
        assert_eq!(router.modes(), vec![RouteMode::Direct]);
    }

    #[test]
    fn normalized_result_accessors() {
        let answer = NormalizedResult::Answer("a".to_string());
        let error = NormalizedResult::Error("e".to_string());
        assert_eq!((answer.text(), answer.error()), (Some("a"), None));
        assert_eq!((error.text(), error.error()), (None, Some("e")));
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!({"error": "e"})
        );
    }
}
