pub mod config;
pub mod conversation;
pub mod dataset;
pub mod forecast;
pub mod report;

pub use config::{AgentConfig, BackendsConfig, PlannerConfig, PredictionConfig, ReportConfig};
pub use conversation::{AgentSession, ConversationTurn, Role, RouteMode};
pub use dataset::fixed_forecast;
pub use forecast::{Forecast, ForecastRecord, PopulationMakeup};
pub use report::{
    column_name, CellRange, CellRef, CellValue, ChartKind, ChartPlacement, ChartSpec, ChartSpecs,
    DerivedMetrics, SeriesRange, Sheet, SummaryRow, Workbook, SUMMARY_COLUMNS,
};
