//! Configuration handling for csvload

use std::path::PathBuf;

/// Output format for the cleaning report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

pub const DEFAULT_TABLE_NAME: &str = "clean_data";
pub const DEFAULT_DATABASE: &str = "etl.db";
pub const DEFAULT_SAMPLE_SIZE: usize = 100;
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for a load run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the delimited input file
    pub input_file: PathBuf,
    /// Destination table name
    pub table_name: String,
    /// Path to the SQLite database receiving the table
    pub database: PathBuf,
    /// Field delimiter; chosen from the file extension when unset
    pub delimiter: Option<u8>,
    /// Maximum number of values sampled per column for type inference
    pub sample_size: usize,
    /// Seed for the type-inference sampler
    pub seed: u64,
    /// Report format
    pub output_format: OutputFormat,
    /// Clean only, skip writing to the database
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            database: PathBuf::from(DEFAULT_DATABASE),
            delimiter: None,
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: DEFAULT_SEED,
            output_format: OutputFormat::default(),
            dry_run: false,
        }
    }
}

impl Config {
    /// Create a new Config for an input file
    pub fn new(input_file: PathBuf) -> Self {
        Self {
            input_file,
            ..Default::default()
        }
    }

    /// Set the destination table name
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Set the database path
    pub fn with_database(mut self, path: PathBuf) -> Self {
        self.database = path;
        self
    }

    /// Override the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the per-column sample size
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Set the sampler seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Skip the load step
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new(PathBuf::from("data/sample_data.csv"));
        assert_eq!(config.table_name, "clean_data");
        assert_eq!(config.sample_size, 100);
        assert_eq!(config.seed, 42);
        assert!(config.delimiter.is_none());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
