//! Table, Row, and Cell data structures

use std::borrow::Cow;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schema::{CellType, Column};
use crate::error::{EtlError, Result};

/// A cell value with type information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            // NaN equals NaN so that duplicate detection and hashing agree
            (CellValue::Float(a), CellValue::Float(b)) => a.to_bits() == b.to_bits() || a == b,
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Null => {}
            CellValue::Bool(b) => b.hash(state),
            CellValue::Int(i) => i.hash(state),
            CellValue::Float(f) => {
                // +0.0 and -0.0 compare equal, so they must hash equal
                let normalized = if *f == 0.0 { 0.0f64 } else { *f };
                normalized.to_bits().hash(state)
            }
            CellValue::String(s) => s.hash(state),
            CellValue::Date(d) => d.hash(state),
        }
    }
}

impl CellValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Storage type of this single value
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Null => CellType::Null,
            CellValue::Bool(_) => CellType::Bool,
            CellValue::Int(_) => CellType::Int,
            CellValue::Float(_) => CellType::Float,
            CellValue::String(_) => CellType::String,
            CellValue::Date(_) => CellType::Date,
        }
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(format_float(*f)),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Total order used to break ties deterministically.
    ///
    /// Values of different types order by type first.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
            (CellValue::String(a), CellValue::String(b)) => a.cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::Date(_) => 4,
            CellValue::String(_) => 5,
        }
    }
}

/// Render a float the way a dataframe prints it: integral values keep `.0`
pub fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line/row number in source file (1-indexed)
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<CellValue>, source_line: usize) -> Self {
        Self { cells, source_line }
    }
}

/// A table containing columns and rows
#[derive(Debug, Clone)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from column names and row cells, typing each column
    /// from the cells it holds
    pub fn from_rows(names: &[&str], rows: Vec<Vec<CellValue>>) -> Self {
        let columns = names
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(*name, i))
            .collect();
        let mut table = Table::new(columns);
        for (i, cells) in rows.into_iter().enumerate() {
            table.add_row(cells, i + 2);
        }
        for idx in 0..table.column_count() {
            table.refresh_dtype(idx);
        }
        table
    }

    /// Add a row to the table
    pub fn add_row(&mut self, cells: Vec<CellValue>, source_line: usize) {
        self.rows.push(Row::new(cells, source_line));
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check that every row has exactly one cell per column
    pub fn validate(&self) -> Result<()> {
        let width = self.column_count();
        match self.rows.iter().find(|r| r.cells.len() != width) {
            Some(row) => Err(EtlError::transformation(format!(
                "row at line {} has {} cells, expected {}",
                row.source_line,
                row.cells.len(),
                width
            ))),
            None => Ok(()),
        }
    }

    /// Iterate the cells of one column
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |r| r.cells.get(index))
    }

    /// Number of null cells in a column
    pub fn null_count(&self, index: usize) -> usize {
        self.column_values(index).filter(|c| c.is_null()).count()
    }

    /// Recompute a column's storage type from its cells
    pub fn refresh_dtype(&mut self, index: usize) {
        let dtype = self
            .column_values(index)
            .fold(CellType::Null, |acc, c| acc.widen(c.cell_type()));
        if let Some(col) = self.columns.get_mut(index) {
            col.dtype = dtype;
        }
    }

    /// Clone out one column of the table
    pub fn column_cells(&self, index: usize) -> Vec<CellValue> {
        self.column_values(index).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_display_keeps_decimal() {
        assert_eq!(CellValue::Float(20.0).display(), "20.0");
        assert_eq!(CellValue::Float(2.5).display(), "2.5");
    }

    #[test]
    fn test_nan_equality_matches_hash() {
        use rustc_hash::FxHasher;

        let a = CellValue::Float(f64::NAN);
        let b = CellValue::Float(f64::NAN);
        assert_eq!(a, b);

        let hash = |v: &CellValue| {
            let mut h = FxHasher::default();
            v.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&CellValue::Float(0.0)), hash(&CellValue::Float(-0.0)));
    }

    #[test]
    fn test_validate_rejects_ragged_rows() {
        let mut table = Table::from_rows(&["a", "b"], vec![vec![1i64.into(), "x".into()]]);
        assert!(table.validate().is_ok());
        table.add_row(vec![CellValue::Null], 9);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_from_rows_types_columns() {
        let table = Table::from_rows(
            &["n", "s"],
            vec![
                vec![1i64.into(), "x".into()],
                vec![2.5f64.into(), CellValue::Null],
            ],
        );
        assert_eq!(table.columns[0].dtype, CellType::Float);
        assert_eq!(table.columns[1].dtype, CellType::String);
    }
}
