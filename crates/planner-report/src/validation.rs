use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use planner_models::{Forecast, ForecastRecord};

use crate::error::DataIntegrityError;

/// How far a percentage breakdown may drift from 100 through rounding.
const PERCENTAGE_TOLERANCE: Decimal = dec!(0.5);

/// Check a forecast loaded from outside the binary before it reaches the
/// report builder.
///
/// The built-in dataset is trusted; anything read at runtime goes through
/// here first.
pub fn validate_forecast(forecast: &Forecast) -> Result<(), DataIntegrityError> {
    if forecast.forecast.is_empty() {
        return Err(DataIntegrityError::Empty);
    }

    for pair in forecast.forecast.windows(2) {
        if pair[1].year <= pair[0].year {
            return Err(DataIntegrityError::YearOrder {
                previous: pair[0].year,
                next: pair[1].year,
            });
        }
    }

    for record in &forecast.forecast {
        validate_record(record)?;
    }

    debug!(
        region = %forecast.region,
        years = forecast.forecast.len(),
        "Forecast passed integrity checks"
    );
    Ok(())
}

fn validate_record(record: &ForecastRecord) -> Result<(), DataIntegrityError> {
    let makeup = &record.population_makeup;
    check_percentages(record.year, "tenure", makeup.tenure_total())?;
    check_percentages(record.year, "ethnicity", makeup.ethnicity_total())
}

fn check_percentages(
    year: u32,
    field: &'static str,
    total: Decimal,
) -> Result<(), DataIntegrityError> {
    if (total - dec!(100)).abs() > PERCENTAGE_TOLERANCE {
        return Err(DataIntegrityError::PercentageSum { year, field, total });
    }
    Ok(())
}
