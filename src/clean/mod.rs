//! Type-inference cleaner
//!
//! Runs a fixed sequence over a loaded table: standardize date columns, fill
//! missing values, drop duplicate rows, infer and coerce column types, then
//! fill the nulls the coercion introduced.

pub mod dates;
mod dedup;
pub mod infer;
pub mod missing;
mod report;

use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::model::Table;

pub use dates::parse_date;
pub use infer::{classify, InferredType};
pub use missing::FillStrategy;
pub use report::{CleanReport, Conversion, DateIssue, FillRecord};

/// Tunables for a cleaning run
#[derive(Debug, Clone)]
pub struct CleanerSettings {
    /// Maximum values sampled per column for type inference
    pub sample_size: usize,
    /// Sampler seed; identical input and seed give identical types
    pub seed: u64,
    /// Date used to fill missing values in date columns
    pub today: NaiveDate,
}

impl Default for CleanerSettings {
    fn default() -> Self {
        Self {
            sample_size: crate::config::DEFAULT_SAMPLE_SIZE,
            seed: crate::config::DEFAULT_SEED,
            today: Local::now().date_naive(),
        }
    }
}

impl CleanerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sample_size: config.sample_size,
            seed: config.seed,
            ..Default::default()
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// The cleaning pipeline
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    settings: CleanerSettings,
}

impl Cleaner {
    pub fn new(settings: CleanerSettings) -> Self {
        Self { settings }
    }

    /// Run every step in order.
    ///
    /// Column-level problems are logged and skipped; anything else aborts the
    /// run with a transformation error.
    pub fn run(&self, table: &mut Table) -> Result<CleanReport> {
        info!("Starting data transformation");
        let mut report = CleanReport {
            input_rows: table.row_count(),
            ..Default::default()
        };

        let outcome = table.validate().and_then(|_| {
            self.standardize_dates(table, &mut report);
            self.fill_missing(table, &mut report)?;
            self.remove_duplicates(table, &mut report);
            self.infer_and_convert_types(table, &mut report);
            // coercion may have nulled values that failed to parse
            self.fill_missing(table, &mut report)
        });

        if let Err(e) = outcome {
            error!("{}", e);
            return Err(e);
        }

        report.output_rows = table.row_count();
        info!(
            "Transformation complete. {} clean records remaining",
            report.output_rows
        );
        Ok(report)
    }

    /// Rewrite every column named like a date to `YYYY-MM-DD` text;
    /// unparseable values become null.
    pub fn standardize_dates(&self, table: &mut Table, report: &mut CleanReport) {
        let date_columns: Vec<usize> = table
            .columns
            .iter()
            .filter(|c| c.is_date_named())
            .map(|c| c.index)
            .collect();

        for index in date_columns {
            let name = table.columns[index].name.clone();
            match dates::standardize_column(table, index) {
                Ok(0) => {}
                Ok(unparsed) => {
                    warn!(
                        "There are {} values that could not be parsed in column '{}', handling them as missing values",
                        unparsed, name
                    );
                    report.date_issues.push(DateIssue {
                        column: name,
                        unparsed,
                    });
                }
                Err(e) => {
                    warn!("Error standardizing dates in column '{}': {}", name, e);
                    report.failed_columns.push(name);
                }
            }
        }
    }

    /// Fill the nulls of every column: median for numbers, today for date
    /// columns, the mode for everything else.
    pub fn fill_missing(&self, table: &mut Table, report: &mut CleanReport) -> Result<()> {
        table.validate()?;
        report.fill_passes += 1;

        for index in 0..table.column_count() {
            let nulls = table.null_count(index);
            if nulls == 0 {
                continue;
            }

            let name = table.columns[index].name.clone();
            let Some((strategy, value)) = missing::choose_fill(table, index, self.settings.today)
            else {
                warn!(
                    "Numeric column '{}' has no values to take a median of, leaving {} missing",
                    name, nulls
                );
                continue;
            };

            let filled = missing::fill_column(table, index, &value);
            match strategy {
                FillStrategy::Median => info!(
                    "Filled {} missing values in numeric column '{}' with median: {}",
                    filled, name, value
                ),
                FillStrategy::Today => info!(
                    "Column '{}' has {} missing date values, setting them to today ({})",
                    name, filled, value
                ),
                FillStrategy::Mode => info!(
                    "Filled {} missing values in categorical column '{}' with mode: '{}'",
                    filled, name, value
                ),
            }

            report.fills.push(FillRecord {
                pass: report.fill_passes,
                column: name,
                strategy,
                count: filled,
                value: value.display().into_owned(),
            });
        }

        Ok(())
    }

    /// Drop exact duplicate rows, keeping the first of each
    pub fn remove_duplicates(&self, table: &mut Table, report: &mut CleanReport) {
        let removed = dedup::drop_duplicate_rows(table);
        if removed > 0 {
            info!("Removed {} duplicate records", removed);
        }
        report.duplicates_removed += removed;
    }

    /// Infer each column's type from a seeded sample and coerce the column
    pub fn infer_and_convert_types(&self, table: &mut Table, report: &mut CleanReport) {
        for index in 0..table.column_count() {
            let name = table.columns[index].name.clone();
            let sample = infer::sample_column(
                table,
                index,
                self.settings.sample_size,
                self.settings.seed,
            );

            if sample.is_empty() {
                warn!("Column '{}' is empty - cannot determine data type", name);
                report.skipped_columns.push(name);
                continue;
            }

            let target = infer::classify(&sample);
            let from = table.columns[index].dtype;

            match infer::convert_column(table, index, target) {
                Ok(failed) => {
                    info!("Converted column '{}' from {} to {}", name, from, target);
                    if failed > 0 {
                        warn!(
                            "{} values in column '{}' could not be converted to {}",
                            failed, name, target
                        );
                    }
                    report.conversions.push(Conversion {
                        column: name,
                        from,
                        to: target,
                        failed,
                    });
                }
                Err(e) => {
                    error!("Failed to convert column '{}' to {}: {}", name, target, e);
                    report.failed_columns.push(name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellType, CellValue};

    fn cleaner() -> Cleaner {
        Cleaner::new(
            CleanerSettings::default().with_today(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        )
    }

    #[test]
    fn test_standardize_dates_reports_unparsed() {
        let mut table = Table::from_rows(
            &["signup_date", "name"],
            vec![
                vec!["2023-01-05".into(), "a".into()],
                vec!["01/05/2023".into(), "b".into()],
                vec!["not a date".into(), "c".into()],
                vec![CellValue::Null, "d".into()],
            ],
        );
        let mut report = CleanReport::default();

        cleaner().standardize_dates(&mut table, &mut report);

        assert_eq!(
            report.date_issues,
            vec![DateIssue {
                column: "signup_date".to_string(),
                unparsed: 2
            }]
        );
        assert_eq!(table.rows[1].cells[0], CellValue::from("2023-01-05"));
        // non-date columns are untouched
        assert_eq!(table.rows[1].cells[1], CellValue::from("b"));
    }

    #[test]
    fn test_fill_missing_is_idempotent() {
        let mut table = Table::from_rows(
            &["amount", "city"],
            vec![
                vec![CellValue::Float(10.0), "Oslo".into()],
                vec![CellValue::Null, CellValue::Null],
                vec![CellValue::Float(20.0), "Oslo".into()],
                vec![CellValue::Float(30.0), "Bergen".into()],
            ],
        );
        let mut report = CleanReport::default();
        let cleaner = cleaner();

        cleaner.fill_missing(&mut table, &mut report).unwrap();
        assert_eq!(table.rows[1].cells[0], CellValue::Float(20.0));
        assert_eq!(table.rows[1].cells[1], CellValue::from("Oslo"));
        assert_eq!(report.fills.len(), 2);

        let snapshot = table.rows.clone();
        cleaner.fill_missing(&mut table, &mut report).unwrap();
        assert_eq!(table.rows, snapshot);
        assert_eq!(report.fills.len(), 2);
    }

    #[test]
    fn test_run_fills_nulls_introduced_by_coercion() {
        let mut table = Table::from_rows(
            &["price", "active"],
            vec![
                vec!["1.5".into(), "yes".into()],
                vec!["2.5".into(), "no".into()],
                vec!["oops".into(), "y".into()],
                vec!["3.5".into(), "n".into()],
            ],
        );

        let report = cleaner().run(&mut table).unwrap();

        assert_eq!(report.inferred_type("price"), Some(InferredType::Float));
        assert_eq!(report.inferred_type("active"), Some(InferredType::Boolean));
        assert_eq!(table.rows[2].cells[0], CellValue::Float(2.5));
        assert_eq!(table.columns[0].dtype, CellType::Float);

        let second_pass: Vec<_> = report.fills.iter().filter(|f| f.pass == 2).collect();
        assert_eq!(second_pass.len(), 1);
        assert_eq!(second_pass[0].column, "price");
        assert_eq!(second_pass[0].strategy, FillStrategy::Median);
    }

    #[test]
    fn test_run_leaves_one_type_per_column() {
        let mut table = Table::from_rows(
            &["order_date", "qty", "note"],
            vec![
                vec!["2023-01-05".into(), CellValue::Int(1), "x".into()],
                vec!["garbage".into(), CellValue::Int(2), CellValue::Null],
                vec!["2023-01-05".into(), CellValue::Int(1), "x".into()],
                vec!["Feb 3, 2023".into(), CellValue::Int(3), "y".into()],
            ],
        );

        let report = cleaner().run(&mut table).unwrap();

        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.output_rows, 3);
        for (index, column) in table.columns.iter().enumerate() {
            for cell in table.column_values(index) {
                assert!(
                    cell.is_null() || cell.cell_type() == column.dtype,
                    "{} holds {:?} but is {}",
                    column.name,
                    cell,
                    column.dtype
                );
            }
        }
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(table.rows[1].cells[0], CellValue::Date(today));
    }

    #[test]
    fn test_run_rejects_ragged_table() {
        let mut table = Table::from_rows(&["a"], vec![vec![CellValue::Int(1)]]);
        table.add_row(vec![], 3);
        assert!(cleaner().run(&mut table).is_err());
    }
}
