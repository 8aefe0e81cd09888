//! Terminal summary output

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::clean::CleanReport;
use crate::model::Table;
use crate::sink::sql_type;

use super::OutputFormatter;

/// Plain-text summary of a cleaning run
pub struct TerminalOutput {
    color_choice: ColorChoice,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            color_choice: ColorChoice::Auto,
        }
    }

    fn write_header(&self, writer: &mut dyn Write, input_path: &Path) -> Result<()> {
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(writer, " csvload: {}", input_path.display())?;
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_summary(&self, report: &CleanReport, writer: &mut dyn Write) -> Result<()> {
        writeln!(
            writer,
            "Summary: {} → {} rows, {} duplicates removed, {} values filled",
            report.input_rows,
            report.output_rows,
            report.duplicates_removed,
            report.total_filled()
        )?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_columns(&self, report: &CleanReport, table: &Table, writer: &mut dyn Write) -> Result<()> {
        let mut data = vec![vec![
            "column".to_string(),
            "type".to_string(),
            "storage".to_string(),
            "filled".to_string(),
            "unconverted".to_string(),
        ]];

        for column in &table.columns {
            let filled: usize = report
                .fills
                .iter()
                .filter(|f| f.column == column.name)
                .map(|f| f.count)
                .sum();
            let failed = report
                .conversions
                .iter()
                .find(|c| c.column == column.name)
                .map(|c| c.failed)
                .unwrap_or(0);
            data.push(vec![
                column.name.clone(),
                column.dtype.to_string(),
                sql_type(column.dtype).to_string(),
                filled.to_string(),
                failed.to_string(),
            ]);
        }

        writeln!(writer, "Columns:")?;
        writeln!(writer, "{}", build_table(&data))?;
        Ok(())
    }

    fn write_warnings(&self, report: &CleanReport, writer: &mut dyn Write) -> Result<()> {
        if report.date_issues.is_empty()
            && report.skipped_columns.is_empty()
            && report.failed_columns.is_empty()
        {
            return Ok(());
        }

        writeln!(writer, "Warnings:")?;
        for issue in &report.date_issues {
            writeln!(
                writer,
                "  {}: {} values were not dates",
                issue.column, issue.unparsed
            )?;
        }
        for column in &report.skipped_columns {
            writeln!(writer, "  {}: empty, type not determined", column)?;
        }
        for column in &report.failed_columns {
            writeln!(writer, "  {}: left unchanged after an error", column)?;
        }
        writeln!(writer)?;
        Ok(())
    }

    /// Print a colored success or failure line to stderr
    pub fn write_status(&self, success: bool, rows_loaded: usize, table_name: &str) -> Result<()> {
        let mut stream = StandardStream::stderr(self.color_choice);
        let mut spec = ColorSpec::new();
        spec.set_bold(true)
            .set_fg(Some(if success { Color::Green } else { Color::Red }));
        stream.set_color(&spec)?;
        if success {
            writeln!(stream, "Loaded {} rows into '{}'", rows_loaded, table_name)?;
        } else {
            writeln!(stream, "ETL pipeline failed")?;
        }
        stream.reset()?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(
        &self,
        report: &CleanReport,
        table: &Table,
        input_path: &Path,
        writer: &mut dyn Write,
    ) -> Result<()> {
        self.write_header(writer, input_path)?;
        self.write_summary(report, writer)?;
        self.write_columns(report, table, writer)?;
        self.write_warnings(report, writer)?;
        Ok(())
    }
}

/// Build a formatted table from data
fn build_table(data: &[Vec<String>]) -> String {
    if data.is_empty() || data[0].is_empty() {
        return String::new();
    }

    let col_count = data[0].len();
    let mut col_widths: Vec<usize> = vec![0; col_count];
    for row in data {
        for (i, cell) in row.iter().enumerate() {
            if i < col_widths.len() {
                col_widths[i] = col_widths[i].max(cell.chars().count());
            }
        }
    }

    let border = |left: char, mid: char, right: char| {
        let mut line = String::new();
        line.push(left);
        for (i, width) in col_widths.iter().enumerate() {
            line.push_str(&"─".repeat(*width + 2));
            if i < col_widths.len() - 1 {
                line.push(mid);
            }
        }
        line.push(right);
        line.push('\n');
        line
    };

    let render_row = |row: &[String]| {
        let mut line = String::from("│");
        for (i, cell) in row.iter().enumerate() {
            let width = col_widths.get(i).copied().unwrap_or(0);
            line.push_str(&format!(" {:width$} │", cell, width = width));
        }
        line.push('\n');
        line
    };

    let mut output = border('┌', '┬', '┐');
    output.push_str(&render_row(&data[0]));
    output.push_str(&border('├', '┼', '┤'));
    for row in data.iter().skip(1) {
        output.push_str(&render_row(row));
    }
    output.push_str(&border('└', '┴', '┘'));
    output
}
