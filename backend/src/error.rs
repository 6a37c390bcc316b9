//! Error types for the paygrid engine.
//!
//! This module defines one error type per boundary:
//!
//! - [`GridError`] - Addressing and row lifecycle errors
//! - [`ExportError`] - Export refused (validation or missing filename)
//! - [`SinkError`] - Failures while saving a fully formed export
//! - [`PipelineError`] - Top-level orchestration errors (CLI, server)
//! - [`ServerError`] - HTTP surface errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Cell-level validation failures are not errors: they live in the
//! [`crate::grid::ErrorLedger`] and only surface here when an export is refused.

use thiserror::Error;

// =============================================================================
// Grid Errors
// =============================================================================

/// Errors addressing the grid or changing its shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Row index past the end of the grid.
    #[error("Row {row} out of bounds (grid has {len} rows)")]
    RowOutOfBounds { row: usize, len: usize },

    /// Column index past column 7.
    #[error("Column {0} out of bounds (rows have 8 columns)")]
    ColumnOutOfBounds(usize),

    /// The grid must always keep at least one row.
    #[error("Cannot remove the last remaining row")]
    LastRow,
}

// =============================================================================
// Export Errors
// =============================================================================

/// Reasons an export is refused. No output is produced in either case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// One or more cells fail validation.
    #[error("Validation failed: {}", messages.join("; "))]
    Validation { messages: Vec<String> },

    /// Blank filename after trimming and dropping control characters.
    #[error("A filename is required to export")]
    FilenameRequired,

    /// A cell addressed while checking the grid does not exist.
    #[error(transparent)]
    Grid(#[from] GridError),
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors from the file sink collaborator.
#[derive(Debug, Error)]
pub enum SinkError {
    /// IO error.
    #[error("Failed to save export: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline`].
/// It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Grid addressing error.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// Export refused.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Saving the export failed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Input could not be decoded as text.
    #[error("Decode error: {0}")]
    Decode(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
///
/// Handlers return these; the server maps each one to a status code and a
/// JSON error body.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request (malformed JSON body, wrong content type).
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<GridError> for ServerError {
    fn from(e: GridError) -> Self {
        ServerError::Pipeline(e.into())
    }
}

impl From<ExportError> for ServerError {
    fn from(e: ExportError) -> Self {
        ServerError::Pipeline(e.into())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // GridError -> PipelineError
        let pipeline_err: PipelineError = GridError::LastRow.into();
        assert!(pipeline_err.to_string().contains("last remaining row"));

        // ExportError -> PipelineError -> ServerError
        let pipeline_err: PipelineError = ExportError::FilenameRequired.into();
        let server_err: ServerError = pipeline_err.into();
        assert!(server_err.to_string().contains("filename"));
    }

    #[test]
    fn test_validation_error_lists_messages() {
        let err = ExportError::Validation {
            messages: vec!["Fila 1 - Código: Campo requerido".into(), "Fila 2 - Teléfono: Solo se permiten dígitos".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Fila 1 - Código"));
        assert!(msg.contains("Fila 2 - Teléfono"));
    }

    #[test]
    fn test_grid_errors_reach_server_error() {
        let server_err: ServerError = GridError::LastRow.into();
        assert!(matches!(
            server_err,
            ServerError::Pipeline(PipelineError::Grid(GridError::LastRow))
        ));

        let export_err: ExportError = GridError::ColumnOutOfBounds(9).into();
        assert_eq!(export_err.to_string(), "Column 9 out of bounds (rows have 8 columns)");
    }

    #[test]
    fn test_row_out_of_bounds_format() {
        let err = GridError::RowOutOfBounds { row: 5, len: 2 };
        assert_eq!(err.to_string(), "Row 5 out of bounds (grid has 2 rows)");
    }
}
