//! Grid model and the state that tracks it.
//!
//! - [`Grid`] - Ordered rows of exactly 8 text cells
//! - [`ErrorLedger`] - Current validation message per invalid cell
//! - [`prune`] - Empty-row removal policy
//! - [`GridSession`] - Owns a grid and its ledger; every mutation goes through it
//!
//! Cell access on [`Grid`] has no validation side effect. Validation is an
//! explicit step performed by [`GridSession::revalidate`].

pub mod ledger;
pub mod prune;
pub mod session;

pub use ledger::ErrorLedger;
pub use prune::{prune_empty_rows, prune_row_if_empty};
pub use session::GridSession;

use crate::error::{GridError, GridResult};
use crate::models::{Column, COLUMN_COUNT};

/// One row: exactly 8 raw cell texts, in column order.
pub type Row = [String; COLUMN_COUNT];

/// Ordered sequence of fixed-width rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    /// A grid with a single empty row.
    pub fn new() -> Self {
        Self::with_rows(1)
    }

    /// A grid with `count` empty rows (at least one).
    pub fn with_rows(count: usize) -> Self {
        Self {
            rows: (0..count.max(1)).map(|_| Row::default()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false: a grid keeps at least one row.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> GridResult<&Row> {
        self.check_row(row)?;
        Ok(&self.rows[row])
    }

    /// Append a row of 8 empty cells and return its index.
    pub fn append_row(&mut self) -> usize {
        self.rows.push(Row::default());
        self.rows.len() - 1
    }

    /// Delete a row. Later rows shift up by one.
    ///
    /// Refuses to remove the sole remaining row.
    pub fn remove_row(&mut self, row: usize) -> GridResult<Row> {
        self.check_row(row)?;
        if self.rows.len() == 1 {
            return Err(GridError::LastRow);
        }
        Ok(self.rows.remove(row))
    }

    /// True iff every cell's trimmed text is empty.
    pub fn is_row_empty(&self, row: usize) -> GridResult<bool> {
        Ok(self.row(row)?.iter().all(|cell| cell.trim().is_empty()))
    }

    pub fn cell(&self, row: usize, column: Column) -> GridResult<&str> {
        Ok(&self.row(row)?[column.index()])
    }

    pub fn set_cell(&mut self, row: usize, column: Column, text: impl Into<String>) -> GridResult<()> {
        self.check_row(row)?;
        self.rows[row][column.index()] = text.into();
        Ok(())
    }

    pub fn check_row(&self, row: usize) -> GridResult<()> {
        if row < self.rows.len() {
            Ok(())
        } else {
            Err(GridError::RowOutOfBounds { row, len: self.rows.len() })
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_has_one_empty_row() {
        let grid = Grid::new();
        assert_eq!(grid.len(), 1);
        assert!(grid.is_row_empty(0).unwrap());
        assert_eq!(Grid::with_rows(0).len(), 1);
    }

    #[test]
    fn test_append_and_access() {
        let mut grid = Grid::new();
        let row = grid.append_row();
        assert_eq!(row, 1);

        grid.set_cell(row, Column::Code, "AB12").unwrap();
        assert_eq!(grid.cell(row, Column::Code).unwrap(), "AB12");
        assert!(!grid.is_row_empty(row).unwrap());
    }

    #[test]
    fn test_whitespace_only_row_is_empty() {
        let mut grid = Grid::new();
        grid.set_cell(0, Column::Email, "   ").unwrap();
        grid.set_cell(0, Column::Phone, "\t").unwrap();
        assert!(grid.is_row_empty(0).unwrap());
    }

    #[test]
    fn test_remove_row_keeps_last() {
        let mut grid = Grid::with_rows(2);
        grid.set_cell(1, Column::Code, "X").unwrap();

        grid.remove_row(0).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.cell(0, Column::Code).unwrap(), "X");

        assert_eq!(grid.remove_row(0), Err(GridError::LastRow));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new();
        assert_eq!(
            grid.cell(3, Column::Code),
            Err(GridError::RowOutOfBounds { row: 3, len: 1 })
        );
        assert!(grid.set_cell(1, Column::Code, "A").is_err());
        assert!(grid.remove_row(1).is_err());
    }
}
