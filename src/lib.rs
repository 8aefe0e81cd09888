//! csvload - Batch CSV loader with type inference
//!
//! Reads a delimited file into memory, cleans it (date standardization,
//! missing-value imputation, deduplication, majority-vote type inference)
//! and bulk-writes the typed result into a relational table.

pub mod clean;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod sink;

pub use clean::{CleanReport, Cleaner, InferredType};
pub use config::Config;
pub use error::EtlError;
pub use model::Table;
pub use pipeline::{Pipeline, RunOutcome};
