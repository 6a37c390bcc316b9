//! Clipboard and tab-separated payload parsing.
//!
//! A payload is spreadsheet-style text: tab-separated columns, newline-separated
//! rows. This module only splits and decodes; it knows nothing about columns.

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Decoded payload with the encoding it was read in.
#[derive(Debug, Clone)]
pub struct DecodedPayload {
    pub text: String,
    pub encoding: String,
}

/// Split a payload into lines.
///
/// An empty payload has zero lines. A single trailing `\r` is stripped from
/// every line, and when there is more than one line a final empty line (the
/// trailing-newline artifact) is discarded.
///
/// # Example
/// ```
/// use paygrid::parser::split_lines;
///
/// assert_eq!(split_lines("A\tB\nC\tD\n"), vec!["A\tB", "C\tD"]);
/// assert!(split_lines("").is_empty());
/// ```
pub fn split_lines(payload: &str) -> Vec<&str> {
    if payload.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<&str> = payload
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    if lines.len() > 1 && lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Split one line into its tab-separated values. Values are not trimmed.
pub fn split_values(line: &str) -> impl Iterator<Item = &str> {
    line.split('\t')
}

/// Rows and widest row of a payload, for reporting.
pub fn block_dimensions(payload: &str) -> (usize, usize) {
    let lines = split_lines(payload);
    let width = lines.iter().map(|line| split_values(line).count()).max().unwrap_or(0);
    (lines.len(), width)
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unrecognised
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Decode raw bytes with encoding auto-detection.
pub fn decode_payload(bytes: &[u8]) -> DecodedPayload {
    // Valid UTF-8 wins outright; detection only arbitrates legacy encodings.
    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedPayload {
            text: text.strip_prefix('\u{feff}').unwrap_or(text).to_string(),
            encoding: "utf-8".to_string(),
        };
    }

    let encoding = detect_encoding(bytes);
    let text = decode_content(bytes, &encoding);
    DecodedPayload { text, encoding }
}

/// Read and decode a tab-separated file.
pub fn read_payload_file<P: AsRef<Path>>(path: P) -> PipelineResult<DecodedPayload> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| PipelineError::Decode(format!("Cannot read file '{}': {}", path.display(), e)))?;
    Ok(decode_payload(&bytes))
}
