use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A regional housing forecast: one record per year, in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub region: String,
    pub forecast: Vec<ForecastRecord>,
}

/// One year's housing demand, supply and demographic snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastRecord {
    pub year: u32,
    pub predicted_demand: u64,
    pub predicted_supply: u64,
    /// Overall demand minus overall supply, as published with the dataset.
    /// The report's bungalow gap is a different quantity, see `SummaryRow`.
    pub demand_supply_gap: i64,
    pub population: u64,
    pub housing_stock: u64,
    pub net_migration: i64,
    pub bungalow_demand: u64,
    pub bungalow_supply: u64,
    pub population_makeup: PopulationMakeup,
}

impl ForecastRecord {
    /// Bungalow demand minus bungalow supply.
    pub fn bungalow_gap(&self) -> i64 {
        self.bungalow_demand as i64 - self.bungalow_supply as i64
    }

    /// Overall predicted demand minus predicted supply, computed from the
    /// record's own figures rather than the stored attribute.
    pub fn overall_gap(&self) -> i64 {
        self.predicted_demand as i64 - self.predicted_supply as i64
    }
}

/// Demographic breakdown for a forecast year.
///
/// Maps keep their insertion order so age bands and categories render in the
/// order the dataset lists them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PopulationMakeup {
    /// Age band (e.g. "0-14") to head count.
    pub age_distribution: IndexMap<String, u64>,
    /// Household type (e.g. "single_person") to household count.
    pub household_types: IndexMap<String, u64>,
    /// Tenure category to percentage of households. Sums to 100.
    pub tenure: IndexMap<String, Decimal>,
    /// Ethnic group to percentage of population. Sums to 100.
    pub ethnicity: IndexMap<String, Decimal>,
}

impl PopulationMakeup {
    pub fn tenure_total(&self) -> Decimal {
        self.tenure.values().copied().sum()
    }

    pub fn ethnicity_total(&self) -> Decimal {
        self.ethnicity.values().copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(demand: u64, supply: u64, bd: u64, bs: u64) -> ForecastRecord {
        ForecastRecord {
            year: 2030,
            predicted_demand: demand,
            predicted_supply: supply,
            demand_supply_gap: demand as i64 - supply as i64,
            population: 1000,
            housing_stock: 400,
            net_migration: -20,
            bungalow_demand: bd,
            bungalow_supply: bs,
            population_makeup: PopulationMakeup::default(),
        }
    }

    #[test]
    fn gaps_are_signed() {
        let r = record(100, 150, 10, 30);
        assert_eq!(r.overall_gap(), -50);
        assert_eq!(r.bungalow_gap(), -20);
    }

    #[test]
    fn percentage_totals() {
        let mut makeup = PopulationMakeup::default();
        makeup.tenure.insert("owner_occupied".into(), dec!(63.5));
        makeup.tenure.insert("private_rented".into(), dec!(20.5));
        makeup.tenure.insert("social_rented".into(), dec!(16));
        assert_eq!(makeup.tenure_total(), dec!(100));
        assert_eq!(makeup.ethnicity_total(), Decimal::ZERO);
    }

    #[test]
    fn deserialize_record_keeps_band_order() {
        let json = r#"{
            "year": 2025,
            "predicted_demand": 5200,
            "predicted_supply": 3900,
            "demand_supply_gap": 1300,
            "population": 552000,
            "housing_stock": 243000,
            "net_migration": 2200,
            "bungalow_demand": 850,
            "bungalow_supply": 400,
            "population_makeup": {
                "age_distribution": {"65+": 1, "0-14": 2},
                "household_types": {},
                "tenure": {"owner_occupied": 64, "private_rented": 20, "social_rented": 16},
                "ethnicity": {"White": "90.8", "Asian": "9.2"}
            }
        }"#;

        let record: ForecastRecord = serde_json::from_str(json).unwrap();
        let bands: Vec<&str> = record
            .population_makeup
            .age_distribution
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(bands, vec!["65+", "0-14"]);
        assert_eq!(record.population_makeup.tenure_total(), dec!(100));
        assert_eq!(record.population_makeup.ethnicity_total(), dec!(100));
    }
}
