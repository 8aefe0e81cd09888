//! Extract, transform and load in one run

use tracing::{error, info};

use crate::clean::{CleanReport, Cleaner, CleanerSettings};
use crate::config::Config;
use crate::error::{EtlError, Result};
use crate::model::Table;
use crate::parser::ParserFactory;
use crate::sink::Sink;

/// Result of a full run
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub success: bool,
    /// Cleaning summary, when the transform step finished
    pub report: Option<CleanReport>,
    /// Rows written to the sink
    pub rows_loaded: usize,
    /// The cleaned table, when the transform step finished
    pub table: Option<Table>,
}

/// Batch loader for one input file
pub struct Pipeline {
    config: Config,
    cleaner: Cleaner,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let cleaner = Cleaner::new(CleanerSettings::from_config(&config));
        Self { config, cleaner }
    }

    /// Use a cleaner with explicit settings
    pub fn with_cleaner(mut self, cleaner: Cleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the configured input file
    pub fn extract(&self) -> Result<Table> {
        let path = &self.config.input_file;
        info!("Extracting data from {}", path.display());

        let table = ParserFactory::new()
            .parse(path, &self.config)
            .map_err(|e| {
                let err = EtlError::source_read(format!("{:#}", e));
                error!("{}", err);
                err
            })?;

        info!("Successfully extracted {} records", table.row_count());
        Ok(table)
    }

    /// Clean the table in place
    pub fn transform(&self, table: &mut Table) -> Result<CleanReport> {
        self.cleaner.run(table)
    }

    /// Write the cleaned table to the sink
    pub fn load(&self, table: &Table, sink: &mut dyn Sink) -> Result<usize> {
        sink.write(table, &self.config.table_name).map_err(|e| {
            error!("{}", e);
            e
        })
    }

    /// Run every stage, reporting failure through the outcome instead of an
    /// error. A dry run stops after the transform.
    pub fn run(&self, sink: &mut dyn Sink) -> RunOutcome {
        let mut outcome = RunOutcome::default();

        let result = self.extract().and_then(|mut table| {
            let report = self.transform(&mut table)?;
            outcome.report = Some(report);
            let table = outcome.table.insert(table);
            if !self.config.dry_run {
                outcome.rows_loaded = self.load(table, sink)?;
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                info!("ETL pipeline completed successfully");
                outcome.success = true;
            }
            Err(e) => error!("ETL pipeline failed: {}", e),
        }
        outcome
    }
}
