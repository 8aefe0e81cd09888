//! Delimited text parser

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::model::{CellType, CellValue, Column, Table};

use super::Parser;

/// Tokens read as missing values
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Check whether a raw field denotes a missing value
pub fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.contains(&s.trim())
}

/// Parser for comma- or tab-separated files
pub struct CsvParser {
    delimiter: u8,
}

impl CsvParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn comma() -> Self {
        Self::new(b',')
    }

    pub fn tab() -> Self {
        Self::new(b'\t')
    }

    /// Parse delimited text from any reader
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(reader);

        // Read headers
        let headers = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();

        if headers.is_empty() {
            bail!("Input has no header row");
        }

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.trim().to_string(), i))
            .collect();
        let width = columns.len();

        // Raw fields, column-major so each column can be typed as a whole
        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
        let mut source_lines = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let record =
                result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?; // +2 for 1-indexing and header

            if record.len() > width {
                bail!(
                    "CSV row {} has {} fields, header has {}",
                    line_num + 2,
                    record.len(),
                    width
                );
            }

            for (col_idx, column) in raw.iter_mut().enumerate() {
                // Pad with nulls if row has fewer columns
                let field = record.get(col_idx).unwrap_or("");
                if is_missing_token(field) {
                    column.push(None);
                } else {
                    column.push(Some(field.trim().to_string()));
                }
            }
            source_lines.push(line_num + 2);
        }

        let mut table = Table::new(columns);
        let typed: Vec<(CellType, Vec<CellValue>)> = raw.into_iter().map(type_column).collect();

        for (col, (dtype, _)) in table.columns.iter_mut().zip(&typed) {
            col.dtype = *dtype;
            debug!("Loaded column '{}' as {}", col.name, dtype);
        }

        let mut typed_columns: Vec<std::vec::IntoIter<CellValue>> =
            typed.into_iter().map(|(_, cells)| cells.into_iter()).collect();

        for line in source_lines {
            let cells = typed_columns
                .iter_mut()
                .map(|c| c.next().unwrap_or(CellValue::Null))
                .collect();
            table.add_row(cells, line);
        }

        Ok(table)
    }
}

impl Parser for CsvParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        self.parse_reader(BufReader::new(file))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        match self.delimiter {
            b'\t' => matches!(ext.to_lowercase().as_str(), "tsv" | "tab"),
            _ => matches!(ext.to_lowercase().as_str(), "csv" | "txt"),
        }
    }
}

/// Type one raw column the way a dataframe reader would.
///
/// Whole-integer columns without gaps stay integers, numeric columns become
/// floats, anything else is kept as text.
fn type_column(values: Vec<Option<String>>) -> (CellType, Vec<CellValue>) {
    let present: Vec<&str> = values.iter().flatten().map(String::as_str).collect();

    if present.is_empty() {
        return (CellType::Null, vec![CellValue::Null; values.len()]);
    }

    let has_nulls = present.len() < values.len();

    if !has_nulls && present.iter().all(|s| s.parse::<i64>().is_ok()) {
        let cells = values
            .iter()
            .flatten()
            .map(|s| s.parse::<i64>().map(CellValue::Int).unwrap_or(CellValue::Null))
            .collect();
        return (CellType::Int, cells);
    }

    if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        let cells = values
            .iter()
            .map(|v| match v {
                Some(s) => s.parse::<f64>().map(float_cell).unwrap_or(CellValue::Null),
                None => CellValue::Null,
            })
            .collect();
        return (CellType::Float, cells);
    }

    let cells = values
        .into_iter()
        .map(|v| match v {
            Some(s) => CellValue::String(Cow::Owned(s)),
            None => CellValue::Null,
        })
        .collect();
    (CellType::String, cells)
}

/// `f64::from_str` accepts "NAN" in any case; those are gaps, not values
fn float_cell(f: f64) -> CellValue {
    if f.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(f)
    }
}
