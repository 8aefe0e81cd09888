//! Permissive calendar-date parsing and date-column standardization

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::error::{EtlError, Result};
use crate::model::{CellType, CellValue, Table};

/// Output format of standardized dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Two-digit years go first: `%Y` would otherwise accept "23" as year 23.
const DATE_FORMATS: &[&str] = &[
    "%y-%m-%d",
    "%m/%d/%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a calendar date from loosely formatted text
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_compact(s) {
        return Some(date);
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    None
}

/// `YYYYMMDD`
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Interpret a cell as a date
pub fn cell_to_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Null => None,
        CellValue::Date(d) => Some(*d),
        other => parse_date(&other.display()),
    }
}

/// Render a date in the standard output format
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Rewrite one column so every parseable value is a `YYYY-MM-DD` string.
///
/// Returns the number of nulls left in the column.
pub(crate) fn standardize_column(table: &mut Table, index: usize) -> Result<usize> {
    let name = table.columns[index].name.clone();
    let mut nulls = 0;

    for row in &mut table.rows {
        let cell = row.cells.get_mut(index).ok_or_else(|| {
            EtlError::transformation(format!(
                "row at line {} has no value for column '{}'",
                row.source_line, name
            ))
        })?;

        *cell = match cell_to_date(cell) {
            Some(date) => CellValue::String(Cow::Owned(format_date(date))),
            None => {
                nulls += 1;
                CellValue::Null
            }
        };
    }

    table.refresh_dtype(index);
    if table.columns[index].dtype == CellType::Null && !table.rows.is_empty() {
        warn!("Column '{}' holds no parseable dates", name);
    }

    Ok(nulls)
}
