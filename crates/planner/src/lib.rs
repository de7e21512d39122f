//! Predictive Planner - housing forecast assistant
//!
//! Answers planning questions with a direct text-generation backend or a
//! retrieval-grounded knowledge agent, next to a fixed five-year housing
//! forecast and the report built from it.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use planner::models::{AgentSession, PlannerConfig, RouteMode};
//! use planner::agents::{QueryRouter, NormalizedResult};
//! use planner::report::{build_summary, ForecastStore, StaticForecastStore};
//! use planner::{ChatSession, ForecastReport};
//! ```

pub use planner_agents as agents;
pub use planner_models as models;
pub use planner_report as report;

pub mod chat;
pub mod error;
pub mod render;
pub mod xlsx;

pub use chat::{ChatSession, TurnOutcome, RETRY_NOTICE};
pub use error::ReportError;
pub use render::{render_content, RenderError, Rendered, Table};
pub use xlsx::write_xlsx;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use planner_agents::transport::{HttpAgentTransport, HttpModelTransport};
use planner_agents::{
    Backend, BackendError, DirectGenerator, GenerationParams, KnowledgeAgent, QueryRouter,
    Responder,
};
use planner_models::{
    ChartSpecs, DerivedMetrics, PlannerConfig, ReportConfig, SummaryRow, Workbook,
};
use planner_report::{
    build_summary, build_workbook, chart_specs, derive_metrics, DataIntegrityError,
    ForecastStore, JsonForecastStore, StaticForecastStore,
};
use serde::Serialize;
use tracing::{debug, info};

/// Build a QueryRouter with both backends from configuration.
pub fn build_router(config: &PlannerConfig) -> Result<QueryRouter, BackendError> {
    let backends = &config.backends;
    let api_key = std::env::var(&backends.api_key_env).ok();
    if api_key.is_none() {
        debug!(var = %backends.api_key_env, "No model runtime token in environment");
    }

    let model_transport = HttpModelTransport::new(
        backends.runtime_endpoint(),
        api_key,
        Duration::from_secs(backends.timeout_seconds),
    )?;
    let generator = DirectGenerator::new(
        Arc::new(model_transport),
        backends.model_id.clone(),
        backends.anthropic_version.clone(),
    )
    .with_defaults(GenerationParams {
        max_tokens: backends.max_tokens,
        temperature: backends.temperature,
    });

    let agent_transport = HttpAgentTransport::new(
        config.agent.endpoint.clone(),
        Duration::from_secs(config.agent.timeout_seconds),
    )?;
    let agent = KnowledgeAgent::new(
        Arc::new(agent_transport),
        config.agent.agent_id.clone(),
        config.agent.agent_alias_id.clone(),
    );

    let responders: Vec<Arc<dyn Responder>> = vec![
        Arc::new(Backend::Direct(generator)),
        Arc::new(Backend::Knowledge(agent)),
    ];
    Ok(QueryRouter::new(responders))
}

/// Open the configured forecast source, or the built-in dataset.
pub fn build_store(config: &ReportConfig) -> Result<Box<dyn ForecastStore>, DataIntegrityError> {
    match &config.forecast_path {
        Some(path) => Ok(Box::new(JsonForecastStore::open(path)?)),
        None => Ok(Box::new(StaticForecastStore)),
    }
}

/// Everything the report step produces for one forecast.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastReport {
    pub region: String,
    pub summary: Vec<SummaryRow>,
    pub metrics: Vec<DerivedMetrics>,
    pub charts: ChartSpecs,
    pub workbook: Workbook,
}

impl ForecastReport {
    pub fn from_store(store: &dyn ForecastStore) -> Self {
        let records = store.list();
        Self {
            region: store.region().to_string(),
            summary: build_summary(records),
            metrics: derive_metrics(records),
            charts: chart_specs(records),
            workbook: build_workbook(records),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Overwrite `path` with the report: an .xlsx workbook when the path
    /// ends in `.xlsx`, the report JSON otherwise.
    pub fn write_to(&self, path: impl AsRef<Path>, pretty: bool) -> Result<(), ReportError> {
        let path = path.as_ref();
        if is_xlsx(path) {
            write_xlsx(&self.workbook, path)?;
        } else {
            std::fs::write(path, self.to_json(pretty)?)?;
        }
        info!(path = %path.display(), rows = self.summary.len(), "Report written");
        Ok(())
    }
}

fn is_xlsx(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_models::RouteMode;

    #[test]
    fn router_has_both_modes() {
        let router = build_router(&PlannerConfig::default()).unwrap();
        assert_eq!(router.modes(), vec![RouteMode::Direct, RouteMode::Knowledge]);
    }

    #[test]
    fn default_store_is_builtin_dataset() {
        let store = build_store(&ReportConfig::default()).unwrap();
        assert_eq!(store.region(), "Cirencester");
        assert_eq!(store.list().len(), 5);
    }

    #[test]
    fn missing_forecast_file_is_io_error() {
        let config = ReportConfig {
            forecast_path: Some("/nonexistent/forecast.json".to_string()),
            ..ReportConfig::default()
        };
        assert!(matches!(build_store(&config), Err(DataIntegrityError::Io(_))));
    }

    #[test]
    fn report_from_builtin_store() {
        let report = ForecastReport::from_store(&StaticForecastStore);
        let gaps: Vec<i64> = report.summary.iter().map(|r| r.demand_supply_gap).collect();
        assert_eq!(gaps, vec![450, 480, 500, 530, 550]);
        assert_eq!(report.metrics.len(), 5);

        let json: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();
        assert_eq!(json["region"], "Cirencester");
        assert_eq!(json["summary"][0]["year"], 2025);
    }

    #[test]
    fn report_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = ForecastReport::from_store(&StaticForecastStore);

        report.write_to(&path, true).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"Forecast Summary\""));
    }

    #[test]
    fn report_written_as_spreadsheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bungalow_housing_forecast_analysis.XLSX");
        let report = ForecastReport::from_store(&StaticForecastStore);

        report.write_to(&path, false).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn write_failure_is_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");
        let report = ForecastReport::from_store(&StaticForecastStore);

        let result = report.write_to(&path, false);
        assert!(matches!(result, Err(ReportError::Io(_))));
    }
}
