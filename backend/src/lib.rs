//! # Paygrid - payment-account grid validation and export
//!
//! Paygrid holds an editable 8-column grid of payment accounts, validates
//! every cell against a fixed rule table, merges spreadsheet pastes into it
//! and serializes a fully valid grid into a `;`-delimited load file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  TSV paste  │────▶│ Paste merge │────▶│ Grid + errs │────▶│ Export .txt │
//! │  (ISO/UTF8) │     │ (validate)  │     │  (ledger)   │     │ (;-joined)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paygrid::{GridSession, DirectorySink};
//! use paygrid::pipeline::{load_payload, export_to_sink};
//!
//! let mut session = GridSession::new();
//! load_payload(&mut session, "AB12\tDesc uno\tCTA\tCTE\t1234567890\n")?;
//! export_to_sink(&mut session, "pagos", &mut DirectorySink::new("out"))?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Column table, payment methods, cell keys
//! - [`validation`] - Per-cell validation
//! - [`grid`] - Grid model, error ledger, row pruning, session
//! - [`parser`] - Tab-separated payload splitting with auto-decoding
//! - [`transform`] - Paste merge, export, pipeline
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Validation
pub mod validation;

// Grid state
pub mod grid;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ExportError,
    ExportResult,
    GridError,
    GridResult,
    PipelineError,
    PipelineResult,
    ServerError,
    ServerResult,
    SinkError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CellKey,
    Column,
    ColumnRule,
    ColumnSpec,
    PaymentMethod,
    COLUMN_COUNT,
    COLUMN_SPECS,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate, ValidationResult};

// =============================================================================
// Re-exports - Grid
// =============================================================================

pub use grid::{prune_empty_rows, ErrorLedger, Grid, GridSession, Row};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_payload, detect_encoding, split_lines, DecodedPayload};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    export,
    merge,
    normalize_filename,
    DirectorySink,
    ExportOutput,
    FileSink,
    MergeOutcome,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline;
pub use transform::pipeline::{export_to_sink, load_file, load_payload, LoadSummary};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::AppConfig;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
