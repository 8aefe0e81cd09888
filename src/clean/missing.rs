//! Missing-value imputation

use std::borrow::Cow;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::dates::format_date;
use crate::model::{CellType, CellValue, Table};

/// Literal used when a text column has nothing to take a mode from
pub const UNKNOWN: &str = "Unknown";

/// How the nulls of a column were filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    Median,
    Today,
    Mode,
}

impl std::fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillStrategy::Median => write!(f, "median"),
            FillStrategy::Today => write!(f, "today"),
            FillStrategy::Mode => write!(f, "mode"),
        }
    }
}

/// Pick the fill strategy and value for a column with nulls.
///
/// Returns `None` for a numeric column without any value to take a median of.
pub(crate) fn choose_fill(
    table: &Table,
    index: usize,
    today: NaiveDate,
) -> Option<(FillStrategy, CellValue)> {
    let column = &table.columns[index];

    if column.dtype.is_numeric() {
        let values: Vec<f64> = table.column_values(index).filter_map(|c| c.as_f64()).collect();
        return median(values).map(|m| (FillStrategy::Median, CellValue::Float(m)));
    }

    if column.is_date_named() {
        let value = if column.dtype == CellType::Date {
            CellValue::Date(today)
        } else {
            CellValue::String(Cow::Owned(format_date(today)))
        };
        return Some((FillStrategy::Today, value));
    }

    let value = mode(table.column_values(index))
        .unwrap_or_else(|| CellValue::String(Cow::Borrowed(UNKNOWN)));
    Some((FillStrategy::Mode, value))
}

/// Replace every null of a column with `value`; returns the count replaced.
///
/// Filling a numeric column with a float widens its integer cells.
pub(crate) fn fill_column(table: &mut Table, index: usize, value: &CellValue) -> usize {
    let widen_ints = matches!(value, CellValue::Float(_));
    let mut filled = 0;

    for row in &mut table.rows {
        let Some(cell) = row.cells.get_mut(index) else {
            continue;
        };
        match cell {
            CellValue::Null => {
                *cell = value.clone();
                filled += 1;
            }
            CellValue::Int(i) if widen_ints => *cell = CellValue::Float(*i as f64),
            _ => {}
        }
    }

    table.refresh_dtype(index);
    filled
}

/// Median of the values; mean of the middle pair for even counts
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    values.retain(|v| !v.is_nan());
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Most frequent non-null value; ties go to the smallest value
pub fn mode<'a>(cells: impl Iterator<Item = &'a CellValue>) -> Option<CellValue> {
    let mut counts: IndexMap<&CellValue, usize> = IndexMap::new();
    for cell in cells.filter(|c| !c.is_null()) {
        *counts.entry(cell).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.total_cmp(a)))
        .map(|(value, _)| value.clone())
}
