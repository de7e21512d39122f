use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataIntegrityError {
    #[error("{field} percentages for {year} sum to {total}, expected 100")]
    PercentageSum {
        year: u32,
        field: &'static str,
        total: Decimal,
    },

    #[error("Forecast contains no records")]
    Empty,

    #[error("Forecast years out of order: {previous} followed by {next}")]
    YearOrder { previous: u32, next: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
