pub mod builder;
pub mod error;
pub mod store;
pub mod validation;

pub use builder::{build_summary, build_workbook, chart_specs, derive_metrics, SUMMARY_SHEET};
pub use error::DataIntegrityError;
pub use store::{ForecastStore, JsonForecastStore, StaticForecastStore};
pub use validation::validate_forecast;
