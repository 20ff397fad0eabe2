//! Rendering result tables for the command line.

use crate::error::{AthenaError, Result};
use crate::table::ResultTable;

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned plain-text table.
    #[default]
    Text,
    /// CSV with a header row.
    Csv,
    /// JSON array with one object per row.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Invalid output format: {s}. Expected: text, csv, or json"
            )),
        }
    }
}

/// Renders a table in the given format.
pub fn render(table: &ResultTable, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(table)),
        OutputFormat::Csv => render_csv(table),
        OutputFormat::Json => render_json(table),
    }
}

fn render_text(table: &ResultTable) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_display_string()).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(col.name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<&str> = table.column_names();
    push_line(&mut out, header.iter().copied(), &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);

    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }

    let noun = if table.row_count == 1 { "row" } else { "rows" };
    out.push_str(&format!("({} {noun})\n", table.row_count));
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}

fn render_csv(table: &ResultTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.column_names())
        .map_err(|e| AthenaError::parse(format!("Failed to write CSV: {e}")))?;

    for row in &table.rows {
        let record = row.iter().map(|v| {
            if v.is_null() {
                String::new()
            } else {
                v.to_display_string()
            }
        });
        writer
            .write_record(record)
            .map_err(|e| AthenaError::parse(format!("Failed to write CSV: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AthenaError::parse(format!("Failed to write CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AthenaError::parse(format!("Failed to write CSV: {e}")))
}

fn render_json(table: &ResultTable) -> Result<String> {
    let rows: Vec<serde_json::Value> = table
        .rows
        .iter()
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = table
                .columns
                .iter()
                .zip(row)
                .map(|(col, value)| (col.name.clone(), value.to_json()))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();

    serde_json::to_string_pretty(&rows)
        .map_err(|e| AthenaError::parse(format!("Failed to write JSON: {e}")))
}
