use std::path::Path;

use planner_models::{fixed_forecast, Forecast, ForecastRecord};
use tracing::info;

use crate::error::DataIntegrityError;
use crate::validation::validate_forecast;

/// Read access to a chronologically ordered forecast.
///
/// The report builder only ever sees `list()`, so the source behind it can
/// change without touching report code.
pub trait ForecastStore: Send + Sync {
    fn region(&self) -> &str;

    fn list(&self) -> &[ForecastRecord];
}

/// The built-in dataset compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticForecastStore;

impl ForecastStore for StaticForecastStore {
    fn region(&self) -> &str {
        &fixed_forecast().region
    }

    fn list(&self) -> &[ForecastRecord] {
        &fixed_forecast().forecast
    }
}

/// A forecast read from a JSON document shaped like `Forecast`.
#[derive(Debug, Clone)]
pub struct JsonForecastStore {
    forecast: Forecast,
}

impl JsonForecastStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataIntegrityError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let store = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            region = %store.forecast.region,
            years = store.forecast.forecast.len(),
            "Loaded forecast"
        );
        Ok(store)
    }

    pub fn from_json(json: &str) -> Result<Self, DataIntegrityError> {
        let forecast: Forecast = serde_json::from_str(json)?;
        Self::from_forecast(forecast)
    }

    pub fn from_forecast(forecast: Forecast) -> Result<Self, DataIntegrityError> {
        validate_forecast(&forecast)?;
        Ok(Self { forecast })
    }
}

impl ForecastStore for JsonForecastStore {
    fn region(&self) -> &str {
        &self.forecast.region
    }

    fn list(&self) -> &[ForecastRecord] {
        &self.forecast.forecast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn static_store_lists_fixed_years() {
        let store = StaticForecastStore;
        assert_eq!(store.region(), "Cirencester");
        assert_eq!(store.list().len(), 5);
        assert_eq!(store.list()[0].year, 2025);
    }

    #[test]
    fn json_store_roundtrips_fixed_dataset() {
        let json = serde_json::to_string(fixed_forecast()).unwrap();
        let store = JsonForecastStore::from_json(&json).unwrap();
        assert_eq!(store.list(), StaticForecastStore.list());
    }

    #[test]
    fn json_store_rejects_bad_percentages() {
        let mut forecast = fixed_forecast().clone();
        forecast.forecast[4]
            .population_makeup
            .ethnicity
            .shift_remove("White");
        let json = serde_json::to_string(&forecast).unwrap();

        let result = JsonForecastStore::from_json(&json);
        assert!(matches!(
            result,
            Err(DataIntegrityError::PercentageSum {
                year: 2029,
                field: "ethnicity",
                ..
            })
        ));
    }

    #[test]
    fn json_store_reports_malformed_json() {
        let result = JsonForecastStore::from_json("{\"region\": \"x\"");
        assert!(matches!(result, Err(DataIntegrityError::Json(_))));
    }

    #[test]
    fn open_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(fixed_forecast()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let store = JsonForecastStore::open(file.path()).unwrap();
        assert_eq!(store.region(), "Cirencester");
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let result = JsonForecastStore::open("/nonexistent/forecast.json");
        assert!(matches!(result, Err(DataIntegrityError::Io(_))));
    }
}
