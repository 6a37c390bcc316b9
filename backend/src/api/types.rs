//! REST API types for the grid front end.
//!
//! Every mutating endpoint answers with a fresh [`GridSnapshot`] so the
//! client can re-render cells, invalid markers and the error panel at once.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::grid::GridSession;
use crate::models::CellKey;
use crate::transform::MergeOutcome;

/// Full view of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSnapshot {
    /// Changes when the server restarts
    pub session_id: String,

    /// Raw cell text, 8 per row
    pub rows: Vec<Vec<String>>,

    /// Cells currently failing validation, for styling
    pub invalid_cells: Vec<InvalidCell>,

    /// Aggregated messages for the error panel
    pub messages: Vec<String>,

    /// True when nothing blocks an export on validation grounds
    pub clean: bool,
}

/// A cell that fails validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidCell {
    pub row: usize,
    pub column: usize,
    pub message: String,
}

impl From<&GridSession> for GridSnapshot {
    fn from(session: &GridSession) -> Self {
        let ledger = session.ledger();
        GridSnapshot {
            session_id: session.id().to_string(),
            rows: session.grid().rows().iter().map(|row| row.to_vec()).collect(),
            invalid_cells: ledger
                .keys()
                .map(|key: &CellKey| InvalidCell {
                    row: key.row,
                    column: key.column.index(),
                    message: ledger.get(key).unwrap_or_default().to_string(),
                })
                .collect(),
            messages: ledger.messages(),
            clean: ledger.is_clean(),
        }
    }
}

/// Body of `PUT /api/cells/{row}/{col}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellUpdate {
    pub text: String,
}

/// Body of `POST /api/paste`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteRequest {
    pub text: String,
    pub row: usize,
    pub col: usize,
}

/// Response of `POST /api/paste`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteResponse {
    pub outcome: MergeOutcome,
    pub grid: GridSnapshot,
}

/// Response of `POST /api/rows`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowResponse {
    pub row: usize,
    pub grid: GridSnapshot,
}

/// Body of `POST /api/export`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub filename: String,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
        "messages": [],
    })
}

/// Create an error response listing per-cell validation messages
pub fn validation_error_response(messages: &[String]) -> Value {
    json!({
        "status": "error",
        "error": format!("{} celda(s) con errores", messages.len()),
        "messages": messages,
    })
}
