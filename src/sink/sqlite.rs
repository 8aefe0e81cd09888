//! SQLite sink

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

use super::{quote_identifier, sql_type, Sink};
use crate::error::{EtlError, Result};
use crate::model::{CellValue, Table};

/// Writes cleaned tables into a SQLite database
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open or create a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            EtlError::sink_write(format!("Failed to open database {}: {e}", path.display()))
        })?;
        Ok(Self { conn })
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Underlying connection, for inspecting what was written
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn create_table_sql(table: &Table, table_name: &str) -> String {
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), sql_type(c.dtype)))
            .collect();
        format!(
            "CREATE TABLE {} ({})",
            quote_identifier(table_name),
            columns.join(", ")
        )
    }

    fn insert_sql(table: &Table, table_name: &str) -> String {
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(table_name),
            columns.join(", "),
            placeholders.join(", ")
        )
    }
}

/// Bind value for a cell
fn to_sql_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Null => Value::Null,
        CellValue::Int(i) => Value::Integer(*i),
        CellValue::Float(f) if f.is_nan() => Value::Null,
        CellValue::Float(f) => Value::Real(*f),
        CellValue::Bool(b) => Value::Text(b.to_string()),
        CellValue::Date(_) | CellValue::String(_) => Value::Text(cell.display().into_owned()),
    }
}

impl Sink for SqliteSink {
    fn write(&mut self, table: &Table, table_name: &str) -> Result<usize> {
        info!("Loading data to SQLite table '{}'", table_name);

        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("DROP TABLE IF EXISTS {}", quote_identifier(table_name)),
            [],
        )?;

        let create = Self::create_table_sql(table, table_name);
        debug!("{}", create);
        tx.execute(&create, [])?;

        let mut written = 0;
        {
            let mut stmt = tx.prepare(&Self::insert_sql(table, table_name))?;
            for row in &table.rows {
                stmt.execute(params_from_iter(row.cells.iter().map(to_sql_value)))
                    .map_err(|e| {
                        EtlError::sink_write(format!(
                            "Failed to insert row from line {}: {e}",
                            row.source_line
                        ))
                    })?;
                written += 1;
            }
        }
        tx.commit()?;

        info!("Successfully loaded {} records into {}", written, table_name);
        Ok(written)
    }
}
