//! The fixed five-year forecast the assistant reports on.

use std::sync::OnceLock;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::forecast::{Forecast, ForecastRecord, PopulationMakeup};

pub const FORECAST_REGION: &str = "Cirencester";

pub const AGE_BANDS: [&str; 5] = ["0-14", "15-24", "25-44", "45-64", "65+"];

const HOUSEHOLD_TYPES: [&str; 5] = [
    "single_person",
    "couple_no_children",
    "couple_with_children",
    "single_parent",
    "other",
];

const TENURE_CATEGORIES: [&str; 3] = ["owner_occupied", "private_rented", "social_rented"];

const ETHNIC_GROUPS: [&str; 5] = ["White", "Asian", "Black", "Mixed", "Other"];

/// The Cirencester forecast for 2025-2029, built once and shared read-only.
pub fn fixed_forecast() -> &'static Forecast {
    static FORECAST: OnceLock<Forecast> = OnceLock::new();
    FORECAST.get_or_init(|| Forecast {
        region: FORECAST_REGION.to_string(),
        forecast: vec![
            YearFigures {
                year: 2025,
                demand: 5200,
                supply: 3900,
                gap: 1300,
                population: 552_000,
                stock: 243_000,
                migration: 2200,
                bungalow_demand: 850,
                bungalow_supply: 400,
                ages: [82_000, 62_000, 138_000, 142_000, 128_000],
                households: [72_000, 58_000, 87_000, 39_000, 24_000],
                tenure: [dec!(64), dec!(20), dec!(16)],
                ethnicity: [dec!(91), dec!(5), dec!(2), dec!(1), dec!(1)],
            }
            .into_record(),
            YearFigures {
                year: 2026,
                demand: 5400,
                supply: 4050,
                gap: 1350,
                population: 558_500,
                stock: 247_200,
                migration: 2300,
                bungalow_demand: 900,
                bungalow_supply: 420,
                ages: [82_500, 63_000, 139_500, 143_000, 130_500],
                households: [73_000, 58_500, 88_000, 39_500, 24_500],
                tenure: [dec!(63.5), dec!(20.5), dec!(16)],
                ethnicity: [dec!(90.8), dec!(5.1), dec!(2.1), dec!(1), dec!(1)],
            }
            .into_record(),
            YearFigures {
                year: 2027,
                demand: 5600,
                supply: 4200,
                gap: 1400,
                population: 565_200,
                stock: 251_500,
                migration: 2400,
                bungalow_demand: 950,
                bungalow_supply: 450,
                ages: [83_000, 64_000, 141_000, 144_000, 133_200],
                households: [74_000, 59_000, 89_000, 40_000, 25_000],
                tenure: [dec!(63), dec!(21), dec!(16)],
                ethnicity: [dec!(90.6), dec!(5.2), dec!(2.2), dec!(1), dec!(1)],
            }
            .into_record(),
            YearFigures {
                year: 2028,
                demand: 5800,
                supply: 4350,
                gap: 1450,
                population: 572_000,
                stock: 255_900,
                migration: 2500,
                bungalow_demand: 1000,
                bungalow_supply: 470,
                ages: [83_500, 65_000, 142_000, 145_000, 135_500],
                households: [75_000, 59_500, 90_000, 40_500, 25_500],
                tenure: [dec!(62.5), dec!(21.5), dec!(16)],
                ethnicity: [dec!(90.4), dec!(5.3), dec!(2.3), dec!(1), dec!(1)],
            }
            .into_record(),
            YearFigures {
                year: 2029,
                demand: 6000,
                supply: 4500,
                gap: 1500,
                population: 579_000,
                stock: 260_400,
                migration: 2600,
                bungalow_demand: 1050,
                bungalow_supply: 500,
                ages: [84_000, 66_000, 143_000, 146_000, 137_000],
                households: [76_000, 60_000, 91_000, 41_000, 26_000],
                tenure: [dec!(62), dec!(22), dec!(16)],
                ethnicity: [dec!(90.2), dec!(5.4), dec!(2.4), dec!(1), dec!(1)],
            }
            .into_record(),
        ],
    })
}

struct YearFigures {
    year: u32,
    demand: u64,
    supply: u64,
    gap: i64,
    population: u64,
    stock: u64,
    migration: i64,
    bungalow_demand: u64,
    bungalow_supply: u64,
    ages: [u64; 5],
    households: [u64; 5],
    tenure: [Decimal; 3],
    ethnicity: [Decimal; 5],
}

impl YearFigures {
    fn into_record(self) -> ForecastRecord {
        ForecastRecord {
            year: self.year,
            predicted_demand: self.demand,
            predicted_supply: self.supply,
            demand_supply_gap: self.gap,
            population: self.population,
            housing_stock: self.stock,
            net_migration: self.migration,
            bungalow_demand: self.bungalow_demand,
            bungalow_supply: self.bungalow_supply,
            population_makeup: PopulationMakeup {
                age_distribution: zip_labels(&AGE_BANDS, self.ages),
                household_types: zip_labels(&HOUSEHOLD_TYPES, self.households),
                tenure: zip_labels(&TENURE_CATEGORIES, self.tenure),
                ethnicity: zip_labels(&ETHNIC_GROUPS, self.ethnicity),
            },
        }
    }
}

fn zip_labels<V, const N: usize>(labels: &[&str; N], values: [V; N]) -> IndexMap<String, V> {
    labels
        .iter()
        .map(|label| label.to_string())
        .zip(values)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_consecutive_years() {
        let years: Vec<u32> = fixed_forecast().forecast.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2025, 2026, 2027, 2028, 2029]);
        assert_eq!(fixed_forecast().region, "Cirencester");
    }

    #[test]
    fn tenure_and_ethnicity_sum_to_one_hundred() {
        for record in &fixed_forecast().forecast {
            let makeup = &record.population_makeup;
            assert_eq!(makeup.tenure_total(), dec!(100), "tenure in {}", record.year);
            assert_eq!(
                makeup.ethnicity_total(),
                dec!(100),
                "ethnicity in {}",
                record.year
            );
        }
    }

    #[test]
    fn stored_gap_matches_overall_figures() {
        for record in &fixed_forecast().forecast {
            assert_eq!(record.demand_supply_gap, record.overall_gap());
        }
    }

    #[test]
    fn age_bands_in_dataset_order() {
        let first = &fixed_forecast().forecast[0];
        let bands: Vec<&str> = first
            .population_makeup
            .age_distribution
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(bands, AGE_BANDS);
    }
}
