//! Decide how an assistant message should be displayed: as a table when it
//! is a structured literal, as plain text otherwise.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("content is not a structured literal: {0}")]
    NotStructured(String),

    #[error("content has no tabular shape: {0}")]
    NotTabular(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Column-aligned plain text rendering.
    pub fn to_text(&self) -> String {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in std::iter::once(&self.header).chain(&self.rows) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let format_row = |row: &Vec<String>| -> String {
            row.iter()
                .enumerate()
                .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        if !self.header.is_empty() {
            lines.push(format_row(&self.header));
            lines.push(
                widths
                    .iter()
                    .map(|w| "-".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("-+-"),
            );
        }
        lines.extend(self.rows.iter().map(format_row));
        lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Table(Table),
    Text(String),
}

/// Render assistant content, falling back to text when it is not a table.
pub fn render_content(content: &str) -> Rendered {
    match parse_table(content) {
        Ok(table) => Rendered::Table(table),
        Err(e) => {
            debug!(error = %e, "Rendering content as text");
            Rendered::Text(content.to_string())
        }
    }
}

/// Interpret `content` as a JSON array or object and lay it out as a table.
///
/// - array of objects: one column per key of the first object
/// - array of arrays: rows as given, no header
/// - object: key/value rows
pub fn parse_table(content: &str) -> Result<Table, RenderError> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|e| RenderError::NotStructured(e.to_string()))?;

    match value {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => {
                let header: Vec<String> = first.keys().cloned().collect();
                let rows = items
                    .iter()
                    .map(|item| {
                        header
                            .iter()
                            .map(|key| item.get(key).map(cell_text).unwrap_or_default())
                            .collect()
                    })
                    .collect();
                Ok(Table { header, rows })
            }
            Some(Value::Array(_)) => {
                let rows = items
                    .iter()
                    .map(|item| match item {
                        Value::Array(cells) => cells.iter().map(cell_text).collect(),
                        other => vec![cell_text(other)],
                    })
                    .collect();
                Ok(Table {
                    header: Vec::new(),
                    rows,
                })
            }
            Some(_) => Err(RenderError::NotTabular("array of scalars")),
            None => Err(RenderError::NotTabular("empty array")),
        },
        Value::Object(map) => Ok(Table {
            header: vec!["key".to_string(), "value".to_string()],
            rows: map
                .iter()
                .map(|(k, v)| vec![k.clone(), cell_text(v)])
                .collect(),
        }),
        _ => Err(RenderError::NotTabular("scalar")),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_stays_text() {
        let content = "Build more bungalows near the town centre.";
        assert_eq!(render_content(content), Rendered::Text(content.to_string()));
    }

    #[test]
    fn numbers_are_not_tables() {
        assert!(matches!(
            parse_table("42"),
            Err(RenderError::NotTabular("scalar"))
        ));
        assert_eq!(render_content("42"), Rendered::Text("42".to_string()));
    }

    #[test]
    fn array_of_objects_becomes_table() {
        let content = r#"[{"year": 2025, "gap": 450}, {"year": 2026, "gap": 480}]"#;
        let Rendered::Table(table) = render_content(content) else {
            panic!("expected table");
        };
        assert_eq!(table.header, vec!["year", "gap"]);
        assert_eq!(table.rows[1], vec!["2026", "480"]);
    }

    #[test]
    fn object_becomes_key_value_table() {
        let table = parse_table(r#"{"region": "Cirencester", "years": 5}"#).unwrap();
        assert_eq!(table.rows[0], vec!["region", "Cirencester"]);
        assert_eq!(table.rows[1], vec!["years", "5"]);
    }

    #[test]
    fn array_of_arrays_has_no_header() {
        let table = parse_table("[[1, 2], [3, null]]").unwrap();
        assert!(table.header.is_empty());
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", ""]]);
    }

    #[test]
    fn table_text_is_aligned() {
        let table = Table {
            header: vec!["year".to_string(), "gap".to_string()],
            rows: vec![vec!["2025".to_string(), "450".to_string()]],
        };
        assert_eq!(table.to_text(), "year | gap\n-----+----\n2025 | 450");
    }
}
