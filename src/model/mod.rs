//! Data model for tabular data representation

mod schema;
mod table;

pub use schema::{CellType, Column};
pub use table::{format_float, CellValue, Row, Table};
