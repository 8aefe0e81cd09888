//! Summary of what a cleaning run changed

use serde::{Deserialize, Serialize};

use super::infer::InferredType;
use super::missing::FillStrategy;
use crate::model::CellType;

/// Nulls left in a date column after standardization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateIssue {
    pub column: String,
    pub unparsed: usize,
}

/// One column's missing-value fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRecord {
    /// 1 before type conversion, 2 after
    pub pass: u8,
    pub column: String,
    pub strategy: FillStrategy,
    pub count: usize,
    pub value: String,
}

/// One column's type conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub column: String,
    pub from: CellType,
    pub to: InferredType,
    /// Values that could not be coerced and became null
    pub failed: usize,
}

/// Outcome of the cleaning pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub date_issues: Vec<DateIssue>,
    pub fills: Vec<FillRecord>,
    pub duplicates_removed: usize,
    pub conversions: Vec<Conversion>,
    /// Columns whose type could not be determined
    pub skipped_columns: Vec<String>,
    /// Columns a step failed on and left as they were
    pub failed_columns: Vec<String>,
    #[serde(skip)]
    pub(crate) fill_passes: u8,
}

impl CleanReport {
    /// Inferred type of a column, if it was converted
    pub fn inferred_type(&self, column: &str) -> Option<InferredType> {
        self.conversions
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.to)
    }

    /// Total values filled across both passes
    pub fn total_filled(&self) -> usize {
        self.fills.iter().map(|f| f.count).sum()
    }
}
