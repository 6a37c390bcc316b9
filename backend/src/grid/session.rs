//! A grid together with its error ledger.
//!
//! `GridSession` is the only owner of both pieces of state. Operations take it
//! by exclusive reference and run to completion, so there is never concurrent
//! mutation to coordinate.

use uuid::Uuid;

use super::{prune, ErrorLedger, Grid};
use crate::error::{ExportResult, GridResult};
use crate::models::{CellKey, Column, ColumnRule};
use crate::transform::export::{self, ExportOutput};
use crate::transform::paste;
use crate::validation::validate;

#[derive(Debug, Clone)]
pub struct GridSession {
    id: Uuid,
    grid: Grid,
    ledger: ErrorLedger,
}

impl GridSession {
    /// A new session with a single empty row and a clean ledger.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            grid: Grid::new(),
            ledger: ErrorLedger::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ledger(&self) -> &ErrorLedger {
        &self.ledger
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    // -------------------------------------------------------------------------
    // Row lifecycle
    // -------------------------------------------------------------------------

    pub fn add_row(&mut self) -> usize {
        self.grid.append_row()
    }

    /// Remove a row and every ledger entry that belonged to it.
    pub fn remove_row(&mut self, row: usize) -> GridResult<()> {
        self.grid.remove_row(row)?;
        self.ledger.remove_row(row);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cell access
    // -------------------------------------------------------------------------

    pub fn cell(&self, row: usize, column: Column) -> GridResult<&str> {
        self.grid.cell(row, column)
    }

    /// Write raw text. Does not validate.
    pub fn set_cell(&mut self, row: usize, column: Column, text: impl Into<String>) -> GridResult<()> {
        self.grid.set_cell(row, column, text)
    }

    /// Validity for styling: a cell is valid unless the ledger holds it.
    pub fn is_cell_valid(&self, row: usize, column: Column) -> bool {
        !self.ledger.contains(&CellKey::new(row, column))
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Validate one cell, store its canonical casing if accepted, and update
    /// the ledger. Revalidating a column others depend on also revalidates
    /// those dependents.
    pub fn revalidate(&mut self, row: usize, column: Column) -> GridResult<bool> {
        let sibling = match column.spec().rule {
            ColumnRule::Conditional { sibling } => Some(self.grid.cell(row, sibling)?.to_string()),
            _ => None,
        };

        let result = validate(column, self.grid.cell(row, column)?, sibling.as_deref());
        if let Some(normalized) = &result.normalized {
            self.grid.set_cell(row, column, normalized.clone())?;
        }
        self.ledger.record(CellKey::new(row, column), &result);

        for dependent in dependents_of(column) {
            // Untouched empty dependents stay unreported until edited.
            let touched = !self.grid.cell(row, dependent)?.trim().is_empty()
                || self.ledger.contains(&CellKey::new(row, dependent));
            if touched {
                self.revalidate(row, dependent)?;
            }
        }

        Ok(result.is_valid)
    }

    /// Revalidate every cell of every non-empty row. Returns the number of
    /// invalid cells afterwards.
    pub fn revalidate_all(&mut self) -> GridResult<usize> {
        for row in 0..self.grid.len() {
            if self.grid.is_row_empty(row)? {
                continue;
            }
            for column in Column::ALL {
                self.revalidate(row, column)?;
            }
        }
        Ok(self.ledger.len())
    }

    /// Cell-edit-completed event: revalidate the cell, then drop its row if
    /// the edit left it empty (never the sole row).
    pub fn edit_completed(&mut self, row: usize, column: Column) -> GridResult<bool> {
        let valid = self.revalidate(row, column)?;
        prune::prune_row_if_empty(self, row)?;
        Ok(valid)
    }

    pub fn is_clean(&self) -> bool {
        self.ledger.is_clean()
    }

    /// Aggregated messages for the error panel.
    pub fn messages(&self) -> Vec<String> {
        self.ledger.messages()
    }

    // -------------------------------------------------------------------------
    // Engines
    // -------------------------------------------------------------------------

    /// Merge a pasted block anchored at `(row, col)`. See [`paste::merge`].
    pub fn paste(&mut self, text: &str, row: usize, col: usize) -> GridResult<paste::MergeOutcome> {
        paste::merge(self, text, row, col)
    }

    /// Build the export file. See [`export::export`].
    pub fn export(&mut self, filename: &str) -> ExportResult<ExportOutput> {
        export::export(self, filename)
    }
}

impl Default for GridSession {
    fn default() -> Self {
        Self::new()
    }
}

fn dependents_of(column: Column) -> impl Iterator<Item = Column> {
    Column::ALL.into_iter().filter(move |candidate| {
        matches!(candidate.spec().rule, ColumnRule::Conditional { sibling } if sibling == column)
    })
}
