use serde::{Deserialize, Serialize};

use crate::conversation::RouteMode;

/// Top-level configuration for the planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    pub backends: BackendsConfig,
    pub agent: AgentConfig,
    pub report: ReportConfig,
    pub prediction: Option<PredictionConfig>,
}

/// Configuration for the direct text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendsConfig {
    pub region: String,
    /// Inference profile or model identifier requests are sent to.
    pub model_id: String,
    /// Protocol version tag carried in every request envelope.
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Override for the runtime base URL. Derived from `region` when unset.
    pub endpoint: Option<String>,
    /// Environment variable holding the bearer token for the runtime.
    pub api_key_env: String,
    /// Backend used when a turn does not name one.
    pub default_mode: RouteMode,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            model_id: "us.anthropic.claude-3-7-sonnet-20250219-v1:0".to_string(),
            anthropic_version: "bedrock-2023-05-31".to_string(),
            max_tokens: 500,
            temperature: 1.0,
            timeout_seconds: 60,
            endpoint: None,
            api_key_env: "AWS_BEARER_TOKEN_BEDROCK".to_string(),
            default_mode: RouteMode::Direct,
        }
    }
}

impl BackendsConfig {
    pub fn runtime_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", self.region))
    }
}

/// Configuration for the knowledge (retrieval) agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub agent_id: String,
    pub agent_alias_id: String,
    /// URL of the agent gateway that accepts invoke requests.
    pub endpoint: String,
    /// Prefix of the session id generated at startup.
    pub session_prefix: String,
    pub timeout_seconds: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: "HOUSINGKB".to_string(),
            agent_alias_id: "TSTALIASID".to_string(),
            endpoint: "http://localhost:8080/invoke-agent".to_string(),
            session_prefix: "planner".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Configuration for report regeneration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Where the CLI writes the workbook layout.
    pub output_path: String,
    /// Rebuild the report after every chat turn.
    pub regenerate_each_turn: bool,
    /// Optional JSON forecast document to use instead of the built-in dataset.
    pub forecast_path: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: "bungalow_housing_forecast_analysis.xlsx".to_string(),
            regenerate_each_turn: true,
            forecast_path: None,
        }
    }
}

/// Configuration for a hosted prediction endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionConfig {
    pub endpoint_url: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    pub auth_header_name: Option<String>,
    pub auth_header_value: Option<String>,
    #[serde(default = "default_prediction_timeout")]
    pub timeout_seconds: u64,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_prediction_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_planner_config() {
        let config = PlannerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PlannerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn default_backend_settings() {
        let backends = BackendsConfig::default();
        assert_eq!(backends.max_tokens, 500);
        assert_eq!(backends.anthropic_version, "bedrock-2023-05-31");
        assert_eq!(
            backends.runtime_endpoint(),
            "https://bedrock-runtime.us-west-2.amazonaws.com"
        );
    }

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
[backends]
region = "eu-west-2"
max_tokens = 800
default_mode = "knowledge"

[agent]
agent_id = "AGENT123"
agent_alias_id = "ALIAS456"

[prediction]
endpoint_url = "https://example.invalid/endpoints/housing/invocations"
auth_header_name = "X-Custom-Auth"
auth_header_value = "token"
"#;

        let config: PlannerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backends.region, "eu-west-2");
        assert_eq!(config.backends.max_tokens, 800);
        assert_eq!(config.backends.default_mode, RouteMode::Knowledge);
        // Unset keys fall back to defaults.
        assert_eq!(config.backends.temperature, 1.0);
        assert_eq!(config.agent.agent_id, "AGENT123");
        assert_eq!(config.agent.session_prefix, "planner");
        assert!(config.report.regenerate_each_turn);

        let prediction = config.prediction.unwrap();
        assert_eq!(prediction.content_type, "application/json");
        assert_eq!(prediction.timeout_seconds, 30);
    }

    #[test]
    fn empty_toml_is_default() {
        let config: PlannerConfig = toml::from_str("").unwrap();
        assert_eq!(config, PlannerConfig::default());
    }
}
