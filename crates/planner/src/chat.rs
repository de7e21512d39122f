use planner_agents::{NormalizedResult, QueryRouter};
use planner_models::{AgentSession, ConversationTurn, RouteMode};
use tracing::{debug, warn};

/// Shown after a failed turn so the user knows to try again.
pub const RETRY_NOTICE: &str = "Invalid response received. Probably a server error. Try again.";

/// What a turn produced, plus the text to put in front of the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub result: NormalizedResult,
    pub display: String,
}

/// One conversation: its history, the agent session id and the active mode.
#[derive(Debug, Clone)]
pub struct ChatSession {
    turns: Vec<ConversationTurn>,
    agent_session: AgentSession,
    mode: RouteMode,
}

impl ChatSession {
    pub fn new(agent_session: AgentSession, mode: RouteMode) -> Self {
        Self {
            turns: Vec::new(),
            agent_session,
            mode,
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn agent_session(&self) -> &AgentSession {
        &self.agent_session
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RouteMode) {
        debug!(from = %self.mode, to = %mode, "Switching mode");
        self.mode = mode;
    }

    /// Run one turn: record the query, route it, record the reply.
    ///
    /// A failed turn still records an assistant turn holding the error text.
    pub async fn handle_turn(&mut self, router: &QueryRouter, query: &str) -> TurnOutcome {
        self.turns.push(ConversationTurn::user(query));

        let result = router
            .route(query, self.mode, &mut self.agent_session)
            .await;

        let display = match &result {
            NormalizedResult::Answer(text) => {
                self.turns.push(ConversationTurn::assistant(text.clone()));
                text.clone()
            }
            NormalizedResult::Error(message) => {
                warn!(session = %self.agent_session.id, "Turn failed");
                self.turns.push(ConversationTurn::assistant(message.clone()));
                format!("{message}\n{RETRY_NOTICE}")
            }
        };

        TurnOutcome { result, display }
    }
}
