//! Empty-row pruning.
//!
//! Rows whose every cell is blank are removed, but the grid never drops to
//! zero rows: if every row is empty the last one scanned survives.

use super::GridSession;
use crate::error::GridResult;

/// Remove every empty row, keeping at least one.
///
/// Returns the indices that were removed, as they were before pruning,
/// in ascending order. Pruning an already-pruned grid returns nothing.
pub fn prune_empty_rows(session: &mut GridSession) -> GridResult<Vec<usize>> {
    let total = session.row_count();
    let mut doomed = Vec::new();
    for row in 0..total {
        if session.grid().is_row_empty(row)? {
            doomed.push(row);
        }
    }

    if doomed.len() == total {
        doomed.pop();
    }

    // Back to front so pending indices stay valid.
    for &row in doomed.iter().rev() {
        session.remove_row(row)?;
    }
    Ok(doomed)
}

/// Remove `row` if it is empty and not the sole row. Returns whether it was
/// removed.
pub fn prune_row_if_empty(session: &mut GridSession, row: usize) -> GridResult<bool> {
    if session.row_count() > 1 && session.grid().is_row_empty(row)? {
        session.remove_row(row)?;
        Ok(true)
    } else {
        Ok(false)
    }
}
