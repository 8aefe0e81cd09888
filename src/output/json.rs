//! JSON output format

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::clean::CleanReport;
use crate::model::{CellType, Table};
use crate::sink::sql_type;

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonColumn<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    dtype: CellType,
    sql_type: &'static str,
    nulls: usize,
}

#[derive(Serialize)]
struct JsonReportOutput<'a> {
    input_file: String,
    columns: Vec<JsonColumn<'a>>,
    report: &'a CleanReport,
}

impl OutputFormatter for JsonOutput {
    fn render(
        &self,
        report: &CleanReport,
        table: &Table,
        input_path: &Path,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let columns = table
            .columns
            .iter()
            .map(|c| JsonColumn {
                name: &c.name,
                dtype: c.dtype,
                sql_type: sql_type(c.dtype),
                nulls: table.null_count(c.index),
            })
            .collect();

        let output = JsonReportOutput {
            input_file: input_path.display().to_string(),
            columns,
            report,
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
