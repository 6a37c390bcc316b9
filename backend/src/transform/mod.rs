//! Transformation module.
//!
//! This module handles everything that turns text into grid state and back:
//! - Paste: merge a pasted block into the grid, growing it as needed
//! - Export: serialize a validated grid into the `;`-delimited load file
//! - Pipeline: file-level helpers used by the CLI and the HTTP server

pub mod export;
pub mod paste;
pub mod pipeline;

pub use export::{export, normalize_filename, serialize_rows, DirectorySink, ExportOutput, FileSink};
pub use paste::{merge, MergeOutcome};
pub use pipeline::*;
