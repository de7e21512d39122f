//! Turns forecast records into the summary table, chart descriptions and
//! workbook layout shown alongside each chat turn.

use planner_models::{
    CellRange, CellRef, CellValue, ChartKind, ChartPlacement, ChartSpec, ChartSpecs,
    DerivedMetrics, ForecastRecord, SeriesRange, Sheet, SummaryRow, Workbook, SUMMARY_COLUMNS,
};
use tracing::debug;

pub const SUMMARY_SHEET: &str = "Forecast Summary";

const BUNGALOW_DEMAND: &str = SUMMARY_COLUMNS[3];
const BUNGALOW_SUPPLY: &str = SUMMARY_COLUMNS[4];
const GAP_COLUMN: &str = SUMMARY_COLUMNS[5];

/// Flatten records into summary rows, one per record, in input order.
pub fn build_summary(records: &[ForecastRecord]) -> Vec<SummaryRow> {
    records
        .iter()
        .map(|r| SummaryRow {
            year: r.year,
            predicted_demand: r.predicted_demand,
            predicted_supply: r.predicted_supply,
            bungalow_demand: r.bungalow_demand,
            bungalow_supply: r.bungalow_supply,
            demand_supply_gap: r.bungalow_gap(),
            overall_gap: r.overall_gap(),
            population: r.population,
            housing_stock: r.housing_stock,
            net_migration: r.net_migration,
        })
        .collect()
}

/// Describe the three report charts.
///
/// The age chart only looks at the first record; later years are not
/// aggregated into it.
pub fn chart_specs(records: &[ForecastRecord]) -> ChartSpecs {
    let years: Vec<String> = records.iter().map(|r| r.year.to_string()).collect();

    let line_series = ChartSpec {
        title: "Bungalow Demand vs Supply".to_string(),
        kind: ChartKind::Line,
        series: vec![BUNGALOW_DEMAND.to_string(), BUNGALOW_SUPPLY.to_string()],
        categories: years.clone(),
        x_axis_title: "Year".to_string(),
        y_axis_title: "Units".to_string(),
    };

    let gap_series = ChartSpec {
        title: "Bungalow Demand-Supply Gap".to_string(),
        kind: ChartKind::Bar,
        series: vec![GAP_COLUMN.to_string()],
        categories: years,
        x_axis_title: "Year".to_string(),
        y_axis_title: "Gap (Units)".to_string(),
    };

    let first = records.first();
    let age_title = match first {
        Some(r) => format!("Population Age Distribution ({})", r.year),
        None => "Population Age Distribution".to_string(),
    };
    let age_distribution_series = ChartSpec {
        title: age_title,
        kind: ChartKind::Bar,
        series: vec!["Population".to_string()],
        categories: first
            .map(|r| {
                r.population_makeup
                    .age_distribution
                    .keys()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default(),
        x_axis_title: "Age Group".to_string(),
        y_axis_title: "Population".to_string(),
    };

    ChartSpecs {
        line_series,
        gap_series,
        age_distribution_series,
    }
}

/// Per-year ratios and year-on-year changes.
pub fn derive_metrics(records: &[ForecastRecord]) -> Vec<DerivedMetrics> {
    let mut previous: Option<&ForecastRecord> = None;
    let mut metrics = Vec::with_capacity(records.len());

    for r in records {
        metrics.push(DerivedMetrics {
            year: r.year,
            overall_gap: r.overall_gap(),
            bungalow_gap: r.bungalow_gap(),
            bungalow_share_of_demand: percentage(r.bungalow_demand, r.predicted_demand),
            bungalow_coverage: ratio(r.bungalow_supply, r.bungalow_demand),
            population_change: previous.map(|p| r.population as i64 - p.population as i64),
            housing_stock_change: previous.map(|p| r.housing_stock as i64 - p.housing_stock as i64),
            persons_per_dwelling: ratio(r.population, r.housing_stock),
        });
        previous = Some(r);
    }

    metrics
}

/// Column of the age-band labels beside the summary table. One blank
/// column separates them from the table's last column.
const AGE_LABEL_COL: u16 = SUMMARY_COLUMNS.len() as u16 + 1;
const AGE_COUNT_COL: u16 = AGE_LABEL_COL + 1;
/// Charts are stacked in a column to the right of both tables.
const CHART_COL: u16 = AGE_COUNT_COL + 2;
const CHART_ROW_STEP: u32 = 17;

/// Lay out the summary sheet: the table from A1, the first year's age
/// distribution in columns K/L, and the three charts stacked from N2.
pub fn build_workbook(records: &[ForecastRecord]) -> Workbook {
    let summary = build_summary(records);
    let charts = chart_specs(records);

    let mut rows = Vec::with_capacity(summary.len() + 1);
    rows.push(
        SUMMARY_COLUMNS
            .iter()
            .map(|c| CellValue::Text(c.to_string()))
            .collect(),
    );
    rows.extend(summary.iter().map(summary_cells));

    let ages: Vec<(String, u64)> = records
        .first()
        .map(|r| {
            r.population_makeup
                .age_distribution
                .iter()
                .map(|(band, count)| (band.clone(), *count))
                .collect()
        })
        .unwrap_or_default();

    let mut side_cells = Vec::with_capacity(2 * (ages.len() + 1));
    if !ages.is_empty() {
        side_cells.push((
            CellRef::new(0, AGE_LABEL_COL),
            CellValue::Text(charts.age_distribution_series.x_axis_title.clone()),
        ));
        side_cells.push((
            CellRef::new(0, AGE_COUNT_COL),
            CellValue::Text(charts.age_distribution_series.y_axis_title.clone()),
        ));
    }
    for (i, (band, count)) in ages.iter().enumerate() {
        let row = i as u32 + 1;
        side_cells.push((CellRef::new(row, AGE_LABEL_COL), CellValue::Text(band.clone())));
        side_cells.push((CellRef::new(row, AGE_COUNT_COL), CellValue::Integer(*count as i64)));
    }

    let mut placements = Vec::with_capacity(3);
    if !summary.is_empty() {
        let last_row = summary.len() as u32;
        let years = CellRange::column(0, 1, last_row);
        let column_series = |names: &[String]| -> Vec<SeriesRange> {
            names
                .iter()
                .filter_map(|name| {
                    let col = SUMMARY_COLUMNS.iter().position(|c| *c == name.as_str())?;
                    Some(SeriesRange {
                        name: name.clone(),
                        values: CellRange::column(col as u16, 1, last_row),
                    })
                })
                .collect()
        };

        placements.push(ChartPlacement {
            anchor: CellRef::new(1, CHART_COL),
            series: column_series(charts.line_series.series.as_slice()),
            categories: years,
            chart: charts.line_series,
        });
        placements.push(ChartPlacement {
            anchor: CellRef::new(1 + CHART_ROW_STEP, CHART_COL),
            series: column_series(charts.gap_series.series.as_slice()),
            categories: years,
            chart: charts.gap_series,
        });
    }
    if !ages.is_empty() {
        let last_row = ages.len() as u32;
        placements.push(ChartPlacement {
            anchor: CellRef::new(1 + 2 * CHART_ROW_STEP, CHART_COL),
            categories: CellRange::column(AGE_LABEL_COL, 1, last_row),
            series: vec![SeriesRange {
                name: charts.age_distribution_series.y_axis_title.clone(),
                values: CellRange::column(AGE_COUNT_COL, 1, last_row),
            }],
            chart: charts.age_distribution_series,
        });
    }

    let sheet = Sheet {
        title: SUMMARY_SHEET.to_string(),
        rows,
        side_cells,
        charts: placements,
    };

    debug!(rows = summary.len(), "Built forecast workbook");

    Workbook {
        sheets: vec![sheet],
    }
}

fn summary_cells(row: &SummaryRow) -> Vec<CellValue> {
    vec![
        CellValue::Integer(row.year as i64),
        CellValue::Integer(row.predicted_demand as i64),
        CellValue::Integer(row.predicted_supply as i64),
        CellValue::Integer(row.bungalow_demand as i64),
        CellValue::Integer(row.bungalow_supply as i64),
        CellValue::Integer(row.demand_supply_gap),
        CellValue::Integer(row.population as i64),
        CellValue::Integer(row.housing_stock as i64),
        CellValue::Integer(row.net_migration),
    ]
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    ratio(part, whole) * 100.0
}
