//! Error ledger: the current message for every cell that fails validation.
//!
//! A key is present iff its cell was last validated as invalid. Entries keep
//! insertion order so the reported message list is stable; updating an
//! existing entry keeps its position.

use indexmap::IndexMap;

use crate::models::CellKey;
use crate::validation::{format_message, ValidationResult};

#[derive(Debug, Clone, Default)]
pub struct ErrorLedger {
    entries: IndexMap<CellKey, String>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert on invalid, delete on valid. Idempotent.
    pub fn record(&mut self, key: CellKey, result: &ValidationResult) {
        if result.is_valid {
            self.entries.shift_remove(&key);
        } else {
            self.entries.insert(key, result.message.clone());
        }
    }

    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CellKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Unaddressed detail for a cell, if it is invalid.
    pub fn get(&self, key: &CellKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CellKey> {
        self.entries.keys()
    }

    /// All messages in insertion order, addressed by their current row.
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, detail)| format_message(key.row, key.column, detail))
            .collect()
    }

    /// Drop every entry of `row` and shift later rows up by one, mirroring
    /// [`crate::grid::Grid::remove_row`].
    pub fn remove_row(&mut self, row: usize) {
        self.entries = std::mem::take(&mut self.entries)
            .into_iter()
            .filter(|(key, _)| key.row != row)
            .map(|(key, detail)| {
                if key.row > row {
                    (CellKey::new(key.row - 1, key.column), detail)
                } else {
                    (key, detail)
                }
            })
            .collect();
    }
}
