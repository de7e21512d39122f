use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// Which backend answers a turn.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Stateless single-turn generation with the advisor persona.
    #[default]
    Direct,
    /// Stateful retrieval agent carrying an `AgentSession`.
    Knowledge,
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMode::Direct => f.write_str("direct"),
            RouteMode::Knowledge => f.write_str("knowledge"),
        }
    }
}

impl FromStr for RouteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(RouteMode::Direct),
            "knowledge" => Ok(RouteMode::Knowledge),
            other => Err(format!("unknown route mode: {other}")),
        }
    }
}

/// One entry of the chat history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Session identifier shared with the knowledge agent.
///
/// Owned by the conversation and passed by `&mut` into every agent call so
/// the id the backend hands back is carried into the next turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentSession {
    pub id: String,
}

impl AgentSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Build a fresh id of the form `<prefix>-<random>`.
    pub fn generate(prefix: &str) -> Self {
        Self {
            id: format!("{prefix}-{}", Uuid::new_v4().simple()),
        }
    }

    pub fn update(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_sessions_differ() {
        let a = AgentSession::generate("planner");
        let b = AgentSession::generate("planner");
        assert!(a.id.starts_with("planner-"));
        assert_ne!(a, b);
    }

    #[test]
    fn update_replaces_id() {
        let mut session = AgentSession::new("sent");
        session.update("returned");
        assert_eq!(session.id, "returned");
    }

    #[test]
    fn parse_route_mode() {
        assert_eq!("direct".parse::<RouteMode>().unwrap(), RouteMode::Direct);
        assert_eq!(" Knowledge ".parse::<RouteMode>().unwrap(), RouteMode::Knowledge);
        assert!("agent".parse::<RouteMode>().is_err());
    }

    #[test]
    fn turn_roles_serialize_lowercase() {
        let turn = ConversationTurn::assistant("hello");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(Role::User.to_string(), "user");
    }
}
