//! Exact duplicate row removal

use rustc_hash::FxHashSet;

use crate::model::Table;

/// Drop rows equal to an earlier row, keeping first occurrences in order.
///
/// Returns the number of rows removed.
pub(crate) fn drop_duplicate_rows(table: &mut Table) -> usize {
    let before = table.row_count();
    let mut seen = FxHashSet::default();
    table.rows.retain(|row| seen.insert(row.cells.clone()));
    before - table.row_count()
}
