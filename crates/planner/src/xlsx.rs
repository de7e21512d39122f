//! Writes a workbook layout out as an .xlsx file with native charts.

use std::path::Path;

use planner_models::{CellRange, CellValue, ChartKind, ChartPlacement, Sheet, Workbook};
use rust_xlsxwriter::{Chart, ChartType, Workbook as XlsxWorkbook, Worksheet, XlsxError};
use tracing::debug;

use crate::error::ReportError;

pub fn write_xlsx(layout: &Workbook, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let mut workbook = XlsxWorkbook::new();
    for sheet in &layout.sheets {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet)?;
    }
    workbook.save(path.as_ref())?;
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), XlsxError> {
    worksheet.set_name(sheet.title.as_str())?;

    for (r, row) in sheet.rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            write_cell(worksheet, r as u32, c as u16, value)?;
        }
    }
    for (cell, value) in &sheet.side_cells {
        write_cell(worksheet, cell.row, cell.col, value)?;
    }

    for placement in &sheet.charts {
        let chart = build_chart(&sheet.title, placement);
        worksheet.insert_chart(placement.anchor.row, placement.anchor.col, &chart)?;
    }

    debug!(
        sheet = %sheet.title,
        rows = sheet.rows.len(),
        charts = sheet.charts.len(),
        "Wrote worksheet"
    );
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
) -> Result<(), XlsxError> {
    match value {
        CellValue::Integer(n) => worksheet.write_number(row, col, *n as f64)?,
        CellValue::Text(text) => worksheet.write_string(row, col, text.as_str())?,
    };
    Ok(())
}

fn build_chart(sheet_title: &str, placement: &ChartPlacement) -> Chart {
    let spec = &placement.chart;
    let mut chart = Chart::new(match spec.kind {
        ChartKind::Line => ChartType::Line,
        ChartKind::Bar => ChartType::Column,
    });
    chart.title().set_name(spec.title.as_str());
    chart.x_axis().set_name(spec.x_axis_title.as_str());
    chart.y_axis().set_name(spec.y_axis_title.as_str());

    for series in &placement.series {
        chart
            .add_series()
            .set_name(series.name.as_str())
            .set_categories(range(sheet_title, &placement.categories))
            .set_values(range(sheet_title, &series.values));
    }
    chart
}

fn range<'a>(sheet_title: &'a str, cells: &CellRange) -> (&'a str, u32, u16, u32, u16) {
    (
        sheet_title,
        cells.first.row,
        cells.first.col,
        cells.last.row,
        cells.last.col,
    )
}
