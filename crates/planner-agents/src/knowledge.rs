use std::sync::Arc;

use futures::StreamExt;
use planner_models::AgentSession;
use tracing::{debug, info};

use crate::error::BackendError;
use crate::transport::{AgentRequest, AgentTransport};

/// Retrieval-augmented agent that keeps conversational memory through a
/// session id.
#[derive(Clone)]
pub struct KnowledgeAgent {
    transport: Arc<dyn AgentTransport>,
    agent_id: String,
    agent_alias_id: String,
}

impl std::fmt::Debug for KnowledgeAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeAgent")
            .field("agent_id", &self.agent_id)
            .field("agent_alias_id", &self.agent_alias_id)
            .finish_non_exhaustive()
    }
}

impl KnowledgeAgent {
    pub fn new(
        transport: Arc<dyn AgentTransport>,
        agent_id: impl Into<String>,
        agent_alias_id: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            agent_id: agent_id.into(),
            agent_alias_id: agent_alias_id.into(),
        }
    }

    /// Ask the agent a question within `session`.
    ///
    /// Chunks are decoded and joined in arrival order. On success `session`
    /// is moved to the id the agent returned; on failure it is left as sent.
    pub async fn ask(&self, query: &str, session: &mut AgentSession) -> Result<String, BackendError> {
        let request = AgentRequest {
            input_text: query.to_string(),
            agent_alias_id: self.agent_alias_id.clone(),
            agent_id: self.agent_id.clone(),
            session_id: session.id.clone(),
        };

        info!(agent_id = %self.agent_id, session_id = %session.id, "Asking knowledge agent");
        let invocation = self.transport.invoke_agent(&request).await?;

        let mut completion = invocation.completion;
        let mut answer = String::new();
        let mut index = 0usize;
        while let Some(chunk) = completion.next().await {
            let chunk = chunk?;
            let text = String::from_utf8(chunk.bytes).map_err(|e| {
                BackendError::Decode(format!("Completion chunk {index} is not valid UTF-8: {e}"))
            })?;
            answer.push_str(&text);
            index += 1;
        }

        if invocation.session_id != session.id {
            debug!(
                sent = %session.id,
                returned = %invocation.session_id,
                "Agent moved the session"
            );
        }
        session.update(invocation.session_id);

        debug!(chunks = index, length = answer.len(), "Reassembled agent completion");
        Ok(answer)
    }
}
