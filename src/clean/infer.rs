//! Majority-vote column type inference and coercion

use std::borrow::Cow;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::dates::cell_to_date;
use crate::error::{EtlError, Result};
use crate::model::{CellType, CellValue, Table};

const TRUE_TOKENS: &[&str] = &["true", "yes", "y", "1"];
const FALSE_TOKENS: &[&str] = &["false", "no", "n", "0"];

/// Share of the sample a candidate type must exceed to win
const MAJORITY: f64 = 0.5;

/// Semantic type chosen for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Float,
    Date,
    Boolean,
    String,
}

impl InferredType {
    /// Coerce a single value; values that do not fit become null
    pub fn coerce(self, cell: &CellValue) -> CellValue {
        if cell.is_null() {
            return CellValue::Null;
        }
        match self {
            InferredType::Float => to_float(cell).into(),
            InferredType::Date => cell_to_date(cell).into(),
            InferredType::Boolean => to_bool(cell).into(),
            InferredType::String => CellValue::String(Cow::Owned(cell.display().into_owned())),
        }
    }
}

impl From<InferredType> for CellType {
    fn from(t: InferredType) -> Self {
        match t {
            InferredType::Float => CellType::Float,
            InferredType::Date => CellType::Date,
            InferredType::Boolean => CellType::Bool,
            InferredType::String => CellType::String,
        }
    }
}

impl std::fmt::Display for InferredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferredType::Float => write!(f, "float"),
            InferredType::Date => write!(f, "date"),
            InferredType::Boolean => write!(f, "boolean"),
            InferredType::String => write!(f, "string"),
        }
    }
}

fn to_float(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Int(i) => *i as f64,
        CellValue::Float(f) => *f,
        CellValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        CellValue::String(s) => s.trim().parse().ok()?,
        CellValue::Null | CellValue::Date(_) => return None,
    };
    // "NaN" in any spelling is a missing value
    (!value.is_nan()).then_some(value)
}

fn to_bool(cell: &CellValue) -> Option<bool> {
    match cell {
        CellValue::Bool(b) => return Some(*b),
        CellValue::Int(0) => return Some(false),
        CellValue::Int(1) => return Some(true),
        CellValue::Float(f) if *f == 0.0 => return Some(false),
        CellValue::Float(f) if *f == 1.0 => return Some(true),
        _ => {}
    }
    let token = cell.display().trim().to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn is_float_like(cell: &CellValue) -> bool {
    match cell {
        CellValue::Int(_) | CellValue::Float(_) | CellValue::String(_) => to_float(cell).is_some(),
        _ => false,
    }
}

fn is_bool_like(cell: &CellValue) -> bool {
    to_bool(cell).is_some()
}

fn majority(sample: &[&CellValue], test: impl Fn(&CellValue) -> bool) -> bool {
    let hits = sample.iter().filter(|c| test(**c)).count();
    hits as f64 / sample.len() as f64 > MAJORITY
}

/// Classify a sample of non-null values.
///
/// Candidates are tried float, date, boolean; the first one matched by more
/// than half of the sample wins, otherwise the column is text.
pub fn classify(sample: &[&CellValue]) -> InferredType {
    if sample.is_empty() {
        return InferredType::String;
    }
    if majority(sample, is_float_like) {
        InferredType::Float
    } else if majority(sample, |c| cell_to_date(c).is_some()) {
        InferredType::Date
    } else if majority(sample, is_bool_like) {
        InferredType::Boolean
    } else {
        InferredType::String
    }
}

/// Draw up to `size` non-null values of a column.
///
/// The generator is reseeded per column so a column's sample only depends on
/// its own contents.
pub fn sample_column(table: &Table, index: usize, size: usize, seed: u64) -> Vec<&CellValue> {
    let present: Vec<&CellValue> = table.column_values(index).filter(|c| !c.is_null()).collect();
    let amount = size.max(1).min(present.len());
    let mut rng = StdRng::seed_from_u64(seed);

    let mut picked = rand::seq::index::sample(&mut rng, present.len(), amount).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| present[i]).collect()
}

/// Coerce every value of a column to `target`.
///
/// Returns the number of non-null values that failed to convert.
pub(crate) fn convert_column(table: &mut Table, index: usize, target: InferredType) -> Result<usize> {
    let name = table.columns[index].name.clone();
    let mut failed = 0;

    for row in &mut table.rows {
        let cell = row.cells.get_mut(index).ok_or_else(|| {
            EtlError::transformation(format!(
                "row at line {} has no value for column '{}'",
                row.source_line, name
            ))
        })?;
        let converted = target.coerce(cell);
        if converted.is_null() && !cell.is_null() {
            failed += 1;
        }
        *cell = converted;
    }

    table.columns[index].dtype = target.into();
    Ok(failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    fn classify_strs(values: &[&str]) -> InferredType {
        let owned = cells(values);
        let sample: Vec<&CellValue> = owned.iter().collect();
        classify(&sample)
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify_strs(&["1", "2.5", "x"]), InferredType::Float);
        assert_eq!(
            classify_strs(&["2023-01-05", "01/06/2023", "soon"]),
            InferredType::Date
        );
        assert_eq!(
            classify_strs(&["Yes", "no", "Y", "maybe"]),
            InferredType::Boolean
        );
        assert_eq!(classify_strs(&["red", "green", "1"]), InferredType::String);
    }

    #[test]
    fn test_one_and_zero_vote_float_first() {
        assert_eq!(classify_strs(&["1", "0", "1"]), InferredType::Float);
    }

    #[test]
    fn test_exact_half_is_not_a_majority() {
        assert_eq!(classify_strs(&["1", "x"]), InferredType::String);
    }

    #[test]
    fn test_boolean_conversion() {
        let mut table = Table::from_rows(
            &["active"],
            cells(&["Yes", "no", "Y", "maybe"])
                .into_iter()
                .map(|c| vec![c])
                .collect(),
        );

        let failed = convert_column(&mut table, 0, InferredType::Boolean).unwrap();

        assert_eq!(failed, 1);
        assert_eq!(
            table.column_cells(0),
            vec![
                CellValue::Bool(true),
                CellValue::Bool(false),
                CellValue::Bool(true),
                CellValue::Null
            ]
        );
        assert_eq!(table.columns[0].dtype, CellType::Bool);
    }

    #[test]
    fn test_float_conversion_nulls_only_bad_values() {
        let mut table = Table::from_rows(
            &["price"],
            vec![vec!["1.5".into()], vec!["abc".into()], vec![CellValue::Int(3)]],
        );
        convert_column(&mut table, 0, InferredType::Float).unwrap();
        assert_eq!(
            table.column_cells(0),
            vec![CellValue::Float(1.5), CellValue::Null, CellValue::Float(3.0)]
        );
    }

    #[test]
    fn test_string_conversion_keeps_nulls() {
        assert_eq!(
            InferredType::String.coerce(&CellValue::Float(2.0)),
            CellValue::from("2.0")
        );
        assert!(InferredType::String.coerce(&CellValue::Null).is_null());
    }

    #[test]
    fn test_nan_text_coerces_to_null() {
        assert!(InferredType::Float.coerce(&CellValue::from("NAN")).is_null());
        assert!(InferredType::Float.coerce(&CellValue::Float(f64::NAN)).is_null());
        assert_eq!(classify_strs(&["Nan", "nAn", "2"]), InferredType::String);
    }

    #[test]
    fn test_numeric_zero_and_one_coerce_to_booleans() {
        let sample = [CellValue::Float(1.0), CellValue::Float(0.0), CellValue::Int(1)];
        for cell in &sample {
            assert!(is_bool_like(cell));
        }
        assert_eq!(
            InferredType::Boolean.coerce(&CellValue::Float(1.0)),
            CellValue::Bool(true)
        );
        assert_eq!(
            InferredType::Boolean.coerce(&CellValue::Float(0.0)),
            CellValue::Bool(false)
        );
        assert_eq!(InferredType::Boolean.coerce(&CellValue::Int(1)), CellValue::Bool(true));
        assert!(InferredType::Boolean.coerce(&CellValue::Float(2.0)).is_null());
    }

    #[test]
    fn test_zero_sample_size_still_samples() {
        let table = Table::from_rows(
            &["n"],
            vec![vec![CellValue::Int(1)], vec![CellValue::Int(2)]],
        );
        assert_eq!(sample_column(&table, 0, 0, 42).len(), 1);
    }

    #[test]
    fn test_sample_is_reproducible_and_bounded() {
        let rows = (0..500).map(|i| vec![CellValue::Int(i)]).collect();
        let table = Table::from_rows(&["n"], rows);

        let first = sample_column(&table, 0, 100, 42);
        let second = sample_column(&table, 0, 100, 42);
        assert_eq!(first.len(), 100);
        assert_eq!(first, second);

        let small = Table::from_rows(
            &["n"],
            vec![vec![CellValue::Int(1)], vec![CellValue::Null]],
        );
        assert_eq!(sample_column(&small, 0, 100, 42).len(), 1);
    }
}
