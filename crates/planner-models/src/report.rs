use serde::{Deserialize, Serialize};

/// Column labels of the summary table, in sheet order.
pub const SUMMARY_COLUMNS: [&str; 9] = [
    "Year",
    "Predicted Demand",
    "Predicted Supply",
    "Bungalow Demand",
    "Bungalow Supply",
    "Demand-Supply Gap",
    "Population",
    "Housing Stock",
    "Net Migration",
];

/// One year of the flat forecast summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryRow {
    pub year: u32,
    pub predicted_demand: u64,
    pub predicted_supply: u64,
    pub bungalow_demand: u64,
    pub bungalow_supply: u64,
    /// Bungalow demand minus bungalow supply. Reported under the
    /// "Demand-Supply Gap" column.
    pub demand_supply_gap: i64,
    /// Predicted demand minus predicted supply across all dwelling types.
    pub overall_gap: i64,
    pub population: u64,
    pub housing_stock: u64,
    pub net_migration: i64,
}

/// Figures derived from a forecast year and its predecessor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedMetrics {
    pub year: u32,
    pub overall_gap: i64,
    pub bungalow_gap: i64,
    /// Bungalow demand as a percentage of all predicted demand.
    pub bungalow_share_of_demand: f64,
    /// Bungalow supply divided by bungalow demand; 0 when there is no demand.
    pub bungalow_coverage: f64,
    /// None for the first year in the sequence.
    pub population_change: Option<i64>,
    pub housing_stock_change: Option<i64>,
    pub persons_per_dwelling: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
}

/// Description of one chart: what it plots and how its axes are labelled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    /// Series names, matching summary column labels where the data comes
    /// from the summary table.
    pub series: Vec<String>,
    pub categories: Vec<String>,
    pub x_axis_title: String,
    pub y_axis_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartSpecs {
    pub line_series: ChartSpec,
    pub gap_series: ChartSpec,
    pub age_distribution_series: ChartSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Text(String),
}

/// Zero-based cell position within a sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Spreadsheet address, e.g. `CellRef::new(1, 10)` is "K2".
    pub fn a1(&self) -> String {
        format!("{}{}", column_name(self.col), self.row + 1)
    }
}

/// Column letters for a zero-based column index: 0 is "A", 26 is "AA".
pub fn column_name(col: u16) -> String {
    let mut n = u32::from(col) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Inclusive rectangular block of cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl CellRange {
    /// Rows `first_row..=last_row` of a single column.
    pub const fn column(col: u16, first_row: u32, last_row: u32) -> Self {
        Self {
            first: CellRef::new(first_row, col),
            last: CellRef::new(last_row, col),
        }
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.first.row..=self.last.row).contains(&cell.row)
            && (self.first.col..=self.last.col).contains(&cell.col)
    }

    pub fn a1(&self) -> String {
        format!("{}:{}", self.first.a1(), self.last.a1())
    }
}

/// One plotted series and the cells holding its values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesRange {
    pub name: String,
    pub values: CellRange,
}

/// A chart anchored at a cell of a sheet, with the ranges it reads from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPlacement {
    /// Top-left cell the chart is drawn over.
    pub anchor: CellRef,
    pub chart: ChartSpec,
    pub categories: CellRange,
    pub series: Vec<SeriesRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sheet {
    pub title: String,
    /// Header followed by data rows, starting at A1.
    pub rows: Vec<Vec<CellValue>>,
    /// Cells written outside the main table.
    pub side_cells: Vec<(CellRef, CellValue)>,
    pub charts: Vec<ChartPlacement>,
}

impl Sheet {
    /// Block covered by `rows`, or None when the sheet has no rows.
    pub fn table_range(&self) -> Option<CellRange> {
        let width = self.rows.iter().map(Vec::len).max()?;
        if width == 0 {
            return None;
        }
        Some(CellRange {
            first: CellRef::new(0, 0),
            last: CellRef::new(self.rows.len() as u32 - 1, width as u16 - 1),
        })
    }
}

/// In-memory workbook layout. Writing it to disk is left to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, title: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(8), "I");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn cell_and_range_addresses() {
        assert_eq!(CellRef::new(1, 10).a1(), "K2");
        let range = CellRange::column(3, 1, 5);
        assert_eq!(range.a1(), "D2:D6");
        assert!(range.contains(CellRef::new(5, 3)));
        assert!(!range.contains(CellRef::new(6, 3)));
        assert!(!range.contains(CellRef::new(2, 4)));
    }

    #[test]
    fn table_range_spans_rows() {
        let sheet = Sheet {
            title: "s".to_string(),
            rows: vec![
                vec![CellValue::Text("a".to_string()), CellValue::Text("b".to_string())],
                vec![CellValue::Integer(1), CellValue::Integer(2)],
            ],
            side_cells: Vec::new(),
            charts: Vec::new(),
        };
        assert_eq!(sheet.table_range().unwrap().a1(), "A1:B2");

        let empty = Sheet {
            rows: Vec::new(),
            ..sheet
        };
        assert_eq!(empty.table_range(), None);
    }
}
