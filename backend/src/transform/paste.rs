//! Paste merge: lay a spreadsheet block onto the grid.
//!
//! ```text
//!  anchor (r, c)
//!      │
//!      ▼
//!  row r     │ .. │ v00 │ v01 │ v02 │ ..   first line, from the anchor column
//!  new row   │ v10 │ v11 │ v12 │ ..        later lines, appended, from column 0
//!  new row   │ v20 │ v21 │ ..
//! ```
//!
//! Values that would land past column 7 are dropped; they never wrap into the
//! next row. Every written cell is revalidated immediately, and the grid is
//! pruned once when the whole block has been merged.

use serde::Serialize;

use crate::error::GridResult;
use crate::grid::{prune_empty_rows, GridSession};
use crate::models::{CellKey, Column};
use crate::parser::{split_lines, split_values};

/// What a merge did to the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Written cells, addressed as they are after pruning.
    pub affected: Vec<CellKey>,
    /// Rows appended for lines after the first.
    pub rows_appended: usize,
    /// Row indices removed by the final prune (pre-prune numbering).
    pub rows_pruned: Vec<usize>,
}

/// Merge `pasted` into the grid starting at `(anchor_row, anchor_col)`.
///
/// An empty payload is a no-op. An anchor column past the row width writes
/// nothing on the first line; only an anchor row that does not exist is an
/// error, and then nothing is written.
pub fn merge(
    session: &mut GridSession,
    pasted: &str,
    anchor_row: usize,
    anchor_col: usize,
) -> GridResult<MergeOutcome> {
    let lines = split_lines(pasted);
    if lines.is_empty() {
        return Ok(MergeOutcome::default());
    }
    session.grid().check_row(anchor_row)?;

    let mut written = Vec::new();
    let mut rows_appended = 0;

    for (k, line) in lines.iter().enumerate() {
        let (row, start) = if k == 0 {
            (anchor_row, anchor_col)
        } else {
            rows_appended += 1;
            (session.add_row(), 0)
        };

        for (i, value) in split_values(line).enumerate() {
            let Some(column) = start.checked_add(i).and_then(Column::from_index) else {
                break;
            };
            session.set_cell(row, column, value)?;
            session.revalidate(row, column)?;
            written.push(CellKey::new(row, column));
        }
    }

    let rows_pruned = prune_empty_rows(session)?;
    let affected = written
        .into_iter()
        .filter_map(|key| shift_after_prune(key, &rows_pruned))
        .collect();

    Ok(MergeOutcome { affected, rows_appended, rows_pruned })
}

/// Re-address a key after the rows in `pruned` (ascending) were removed.
fn shift_after_prune(key: CellKey, pruned: &[usize]) -> Option<CellKey> {
    if pruned.binary_search(&key.row).is_ok() {
        return None;
    }
    let shift = pruned.partition_point(|&row| row < key.row);
    Some(CellKey::new(key.row - shift, key.column))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(session: &GridSession, row: usize) -> Vec<String> {
        session.grid().row(row).unwrap().to_vec()
    }

    #[test]
    fn test_two_line_block_at_origin() {
        let mut session = GridSession::new();
        let outcome = merge(&mut session, "A\tB\tC\nD\tE\tF\n", 0, 0).unwrap();

        assert_eq!(session.row_count(), 2);
        assert_eq!(outcome.rows_appended, 1);
        assert_eq!(&row_text(&session, 0)[..3], ["A", "B", "C"]);
        assert_eq!(&row_text(&session, 1)[..3], ["D", "E", "F"]);
        assert!(row_text(&session, 1)[3..].iter().all(String::is_empty));
        assert_eq!(outcome.affected.len(), 6);
    }

    #[test]
    fn test_block_rows_and_columns_placement() {
        let mut session = GridSession::new();
        session.add_row();
        let block = "a\tb\tc\td\ne\tf\tg\th\ni\tj\tk\tl";
        let outcome = merge(&mut session, block, 1, 2).unwrap();

        // Anchor row plus two appended rows; row 0 was empty and is pruned.
        assert_eq!(outcome.rows_appended, 2);
        assert_eq!(outcome.rows_pruned, vec![0]);
        assert_eq!(session.row_count(), 3);
        assert_eq!(&row_text(&session, 0)[2..6], ["a", "b", "c", "d"]);
        assert_eq!(&row_text(&session, 1)[..4], ["e", "f", "g", "h"]);
        assert_eq!(outcome.affected[0], CellKey::new(0, Column::PaymentMethod));
    }

    #[test]
    fn test_values_past_last_column_dropped() {
        let mut session = GridSession::new();
        merge(&mut session, "1\t2\t3\t4", 0, 6).unwrap();

        assert_eq!(session.row_count(), 1);
        assert_eq!(session.cell(0, Column::Email).unwrap(), "1");
        assert_eq!(session.cell(0, Column::Phone).unwrap(), "2");
    }

    #[test]
    fn test_anchor_column_beyond_width() {
        let mut session = GridSession::new();
        session.set_cell(0, Column::Code, "KEEP").unwrap();
        let outcome = merge(&mut session, "x\ty\nAB12", 0, 12).unwrap();

        assert_eq!(session.cell(0, Column::Code).unwrap(), "KEEP");
        assert_eq!(session.row_count(), 2);
        assert_eq!(session.cell(1, Column::Code).unwrap(), "AB12");
        assert_eq!(outcome.affected, vec![CellKey::new(1, Column::Code)]);
    }

    #[test]
    fn test_empty_payload_is_noop() {
        let mut session = GridSession::new();
        session.add_row();
        let outcome = merge(&mut session, "", 0, 0).unwrap();

        assert_eq!(outcome, MergeOutcome::default());
        assert_eq!(session.row_count(), 2);
    }

    #[test]
    fn test_unknown_anchor_row() {
        let mut session = GridSession::new();
        assert!(merge(&mut session, "A", 3, 0).is_err());
        assert_eq!(session.row_count(), 1);
    }

    #[test]
    fn test_written_cells_are_revalidated() {
        let mut session = GridSession::new();
        merge(&mut session, "AB-12\tDesc uno\tcta\tcte\t123\tx\t\t12a", 0, 0).unwrap();

        assert_eq!(session.cell(0, Column::PaymentMethod).unwrap(), "CTA");
        assert_eq!(session.cell(0, Column::AccountType).unwrap(), "CTE");
        let invalid: Vec<Column> = session.ledger().keys().map(|k| k.column).collect();
        assert_eq!(invalid, vec![Column::Code, Column::MaxAmount, Column::Phone]);
    }

    #[test]
    fn test_type_pasted_before_method_is_resolved() {
        // Column 3 is written (and flagged) before column 2 exists when the
        // anchor is column 3; the following paste of column 2 clears it.
        let mut session = GridSession::new();
        merge(&mut session, "AHO", 0, 3).unwrap();
        assert!(!session.is_cell_valid(0, Column::AccountType));

        merge(&mut session, "CTA", 0, 2).unwrap();
        assert!(session.is_cell_valid(0, Column::AccountType));
        assert!(session.is_clean());
    }

    #[test]
    fn test_blank_lines_pruned_and_keys_shifted() {
        let mut session = GridSession::new();
        session.set_cell(0, Column::Code, "X").unwrap();
        let outcome = merge(&mut session, "A\n\t\nB", 0, 1).unwrap();

        assert_eq!(outcome.rows_pruned, vec![1]);
        assert_eq!(session.row_count(), 2);
        assert_eq!(session.cell(1, Column::Code).unwrap(), "B");
        assert_eq!(
            outcome.affected,
            vec![CellKey::new(0, Column::Description), CellKey::new(1, Column::Code)]
        );
    }

    #[test]
    fn test_shift_after_prune() {
        let key = CellKey::new(5, Column::Code);
        assert_eq!(shift_after_prune(key, &[1, 3]), Some(CellKey::new(3, Column::Code)));
        assert_eq!(shift_after_prune(key, &[5]), None);
        assert_eq!(shift_after_prune(key, &[]), Some(key));
    }
}
