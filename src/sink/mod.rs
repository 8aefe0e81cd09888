//! Destinations for cleaned tables

mod sqlite;

use crate::error::Result;
use crate::model::{CellType, Table};

pub use self::sqlite::SqliteSink;

/// A relational store that receives a cleaned table
pub trait Sink {
    /// Replace `table_name` with the contents of `table`.
    ///
    /// Returns the number of rows written.
    fn write(&mut self, table: &Table, table_name: &str) -> Result<usize>;
}

/// Storage column type for a column's storage type
pub fn sql_type(dtype: CellType) -> &'static str {
    match dtype {
        CellType::Int | CellType::Float => "NUMERIC",
        CellType::Date => "DATE",
        _ => "TEXT",
    }
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
