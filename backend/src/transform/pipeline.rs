//! High-level pipeline API for loading tab-separated files and exporting them.
//!
//! This module combines the steps the CLI and the server need:
//! decoding, pasting into a fresh session, revalidating, and exporting to a sink.
//!
//! # Example
//!
//! ```rust,ignore
//! use paygrid::pipeline::{load_file, export_to_sink};
//! use paygrid::DirectorySink;
//!
//! let (mut session, summary) = load_file("pagos.tsv")?;
//! println!("Loaded {} rows, {} invalid cells", summary.rows, summary.invalid_cells);
//!
//! let mut sink = DirectorySink::new("out");
//! export_to_sink(&mut session, "pagos", &mut sink)?;
//! ```

use serde::Serialize;
use std::path::Path;

use super::export::{ExportOutput, FileSink};
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::{GridResult, PipelineResult};
use crate::grid::GridSession;
use crate::parser::{block_dimensions, read_payload_file};

/// Summary of a load.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    /// Encoding the input was decoded with.
    pub encoding: String,
    /// Rows in the grid after the load.
    pub rows: usize,
    /// Cells written by the paste.
    pub cells_written: usize,
    /// Invalid cells after revalidating every non-empty row.
    pub invalid_cells: usize,
}

/// Paste a whole payload at (0, 0) of a session and revalidate every
/// non-empty row.
pub fn load_payload(session: &mut GridSession, payload: &str) -> GridResult<LoadSummary> {
    let (lines, width) = block_dimensions(payload);
    log_info(format!("📋 Payload: {} line(s), up to {} column(s)", lines, width));
    if width > crate::models::COLUMN_COUNT {
        log_warning(format!(
            "Values past column {} are ignored",
            crate::models::COLUMN_COUNT
        ));
    }

    let outcome = session.paste(payload, 0, 0)?;
    if !outcome.rows_pruned.is_empty() {
        log_info(format!("Removed {} empty row(s)", outcome.rows_pruned.len()));
    }

    let invalid_cells = session.revalidate_all()?;
    if invalid_cells == 0 {
        log_success(format!("All {} row(s) valid", session.row_count()));
    } else {
        log_warning(format!("{} invalid cell(s)", invalid_cells));
    }

    Ok(LoadSummary {
        encoding: "utf-8".to_string(),
        rows: session.row_count(),
        cells_written: outcome.affected.len(),
        invalid_cells,
    })
}

/// Read a tab-separated file into a fresh session.
pub fn load_file<P: AsRef<Path>>(path: P) -> PipelineResult<(GridSession, LoadSummary)> {
    let path = path.as_ref();
    log_info(format!("📖 Reading {}", path.display()));

    let decoded = read_payload_file(path)?;
    log_success(format!("Detected encoding: {}", decoded.encoding));

    let mut session = GridSession::new();
    let mut summary = load_payload(&mut session, &decoded.text)?;
    summary.encoding = decoded.encoding;
    Ok((session, summary))
}

/// Export a session and hand the result to `sink`. Nothing reaches the sink
/// unless the export succeeds.
pub fn export_to_sink<S: FileSink + ?Sized>(
    session: &mut GridSession,
    filename: &str,
    sink: &mut S,
) -> PipelineResult<ExportOutput> {
    let output = match session.export(filename) {
        Ok(output) => output,
        Err(e) => {
            log_error(e.to_string());
            return Err(e.into());
        }
    };
    sink.save(&output.filename, &output.content, output.media_type)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExportError, PipelineError, SinkError};
    use crate::models::Column;
    use crate::transform::export::DirectorySink;
    use tempfile::tempdir;

    #[derive(Default)]
    struct MemorySink {
        saved: Vec<(String, Vec<u8>, String)>,
    }

    impl FileSink for MemorySink {
        fn save(&mut self, filename: &str, content: &[u8], media_type: &str) -> Result<(), SinkError> {
            self.saved.push((filename.to_string(), content.to_vec(), media_type.to_string()));
            Ok(())
        }
    }

    const VALID: &str = "AB12\tDesc uno\tcta\tcte\t1234567890\t\t\t\n\
                         CD34\tDesc dos\tTAR\ta\t4111\t12.5\tana@banco.pe\t987654321\n";

    #[test]
    fn test_load_payload_fills_rows() {
        let mut session = GridSession::new();
        let summary = load_payload(&mut session, VALID).unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.cells_written, 16);
        assert_eq!(summary.invalid_cells, 0);
        assert_eq!(session.cell(1, Column::AccountType).unwrap(), "A");
    }

    #[test]
    fn test_load_payload_reports_incomplete_rows() {
        let mut session = GridSession::new();
        let summary = load_payload(&mut session, "AB12\tDesc uno\n").unwrap();

        // Columns 2-4 are required but were never pasted.
        assert_eq!(summary.invalid_cells, 3);
    }

    #[test]
    fn test_export_to_sink() {
        let mut session = GridSession::new();
        load_payload(&mut session, VALID).unwrap();

        let mut sink = MemorySink::default();
        let output = export_to_sink(&mut session, "lote", &mut sink).unwrap();

        assert_eq!(output.rows, 2);
        assert_eq!(sink.saved.len(), 1);
        let (name, content, media) = &sink.saved[0];
        assert_eq!(name, "lote.txt");
        assert_eq!(media, "text/plain");
        assert_eq!(
            String::from_utf8(content.clone()).unwrap(),
            "AB12;Desc uno;CTA;CTE;1234567890;999999;;\n\
             CD34;Desc dos;TAR;A;4111;1250;ana@banco.pe;987654321\n"
        );
    }

    #[test]
    fn test_refused_export_never_reaches_sink() {
        let mut session = GridSession::new();
        load_payload(&mut session, "AB12\tDesc uno\tEFE\n").unwrap();

        let mut sink = MemorySink::default();
        let err = export_to_sink(&mut session, "lote", &mut sink).unwrap_err();

        assert!(matches!(err, PipelineError::Export(ExportError::Validation { .. })));
        assert!(sink.saved.is_empty());
    }

    #[test]
    fn test_load_file_and_export_to_directory() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pagos.tsv");
        std::fs::write(&input, VALID.replace('\n', "\r\n")).unwrap();

        let (mut session, summary) = load_file(&input).unwrap();
        assert_eq!(summary.encoding, "utf-8");
        assert_eq!(summary.rows, 2);

        let mut sink = DirectorySink::new(dir.path());
        export_to_sink(&mut session, "pagos", &mut sink).unwrap();
        let written = std::fs::read_to_string(dir.path().join("pagos.txt")).unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_file("/nonexistent/pagos.tsv");
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }
}
