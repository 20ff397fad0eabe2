//! Result table types.
//!
//! Defines the in-memory table produced from an Athena CSV result, and the
//! CSV loader that builds it.

use crate::error::{AthenaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The result of a query, loaded from the CSV object Athena wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    /// Column metadata, taken from the CSV header row.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data.
    pub rows: Vec<Row>,

    /// Number of rows in the table.
    pub row_count: usize,

    /// Wall time from submission until the result was loaded.
    pub execution_time: Duration,
}

impl ResultTable {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
            execution_time: Duration::ZERO,
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the index of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the cell at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Parses CSV bytes into a table, using the first row as column headers.
    ///
    /// Column types are inferred from the data: a column is `bigint` when
    /// every non-empty cell is an integer, `double` when every one is a number,
    /// `boolean` when every one is `true`/`false`, and `varchar` otherwise.
    /// Empty cells become [`Value::Null`].
    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| AthenaError::parse(format!("Invalid CSV header: {e}")))?
            .clone();

        if headers.is_empty() {
            return Err(AthenaError::parse("No columns to parse from result"));
        }

        let mut cells: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AthenaError::parse(format!("Invalid CSV row: {e}")))?;
            cells.push(record.iter().map(str::to_string).collect());
        }

        let types: Vec<ColumnType> = (0..headers.len())
            .map(|idx| ColumnType::infer(cells.iter().map(|row| row[idx].as_str())))
            .collect();

        let columns = headers
            .iter()
            .zip(&types)
            .map(|(name, ty)| ColumnInfo::new(name, ty.as_str()))
            .collect();

        let rows = cells
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&types)
                    .map(|(cell, ty)| ty.convert(cell))
                    .collect()
            })
            .collect();

        Ok(Self::with_data(columns, rows))
    }
}

/// Metadata about a column in a result table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Inferred column type.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A row of data from a result table.
pub type Row = Vec<Value>;

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Empty cell.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer.
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text value.
    String(String),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts the value to its display string. NULL displays as `NULL`.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
        }
    }

    /// Converts the value to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            // Non-finite floats have no JSON representation and become null.
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Type inferred for a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnType {
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut int = true;
        let mut float = true;
        let mut boolean = true;
        let mut seen = false;

        for cell in cells.filter(|c| !c.is_empty()) {
            seen = true;
            int = int && cell.parse::<i64>().is_ok();
            float = float && cell.parse::<f64>().is_ok();
            boolean = boolean && parse_bool(cell).is_some();
            if !int && !float && !boolean {
                return Self::Text;
            }
        }

        match (seen, int, float, boolean) {
            (false, ..) => Self::Text,
            (true, true, ..) => Self::Int,
            (true, false, true, _) => Self::Float,
            (true, false, false, true) => Self::Bool,
            _ => Self::Text,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "bigint",
            Self::Float => "double",
            Self::Bool => "boolean",
            Self::Text => "varchar",
        }
    }

    fn convert(&self, cell: String) -> Value {
        if cell.is_empty() {
            return Value::Null;
        }
        match self {
            Self::Int => cell.parse().map(Value::Int).unwrap_or(Value::String(cell)),
            Self::Float => cell.parse().map(Value::Float).unwrap_or(Value::String(cell)),
            Self::Bool => parse_bool(&cell).map(Value::Bool).unwrap_or(Value::String(cell)),
            Self::Text => Value::String(cell),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
