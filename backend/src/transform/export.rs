//! Export transform: validated grid → `;`-delimited load file.
//!
//! # Record Format
//!
//! ```text
//! AB12;Desc uno;CTA;CTE;1234567890;999999;;\n
//! ```
//!
//! - 8 fields per line, joined with `;`, UTF-8
//! - every line, including the last, ends with `\n`
//! - fields are the trimmed cell text, except field 5 (maximum amount): a
//!   finite number is rescaled ×100 and rendered as an integer, anything else
//!   becomes the sentinel `999999`
//!
//! The export is all-or-nothing: it is refused while any mandatory cell is
//! empty or the ledger holds errors, and the content is fully built before it
//! is handed to a [`FileSink`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{ExportError, ExportResult, SinkError};
use crate::grid::{GridSession, Row};
use crate::models::{CellKey, Column};
use crate::validation::parse_amount;

/// Canonical extension appended to export filenames.
pub const EXPORT_EXTENSION: &str = ".txt";

/// Field delimiter of the load file.
pub const FIELD_DELIMITER: &str = ";";

/// Field-5 value when the amount is empty or not a number.
pub const AMOUNT_SENTINEL: &str = "999999";

/// Declared media type of the export.
pub const MEDIA_TYPE: &str = "text/plain";

/// Sign, integer digits, fraction digits. No exponent.
static PLAIN_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-]?)([0-9]*)(?:\.([0-9]*))?$").expect("valid regex"));

/// A fully formed export, ready for a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutput {
    pub filename: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub media_type: &'static str,
    pub rows: usize,
}

impl ExportOutput {
    /// Content as text. Always valid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

// =============================================================================
// Transform
// =============================================================================

/// Validate the whole grid and build the export.
///
/// 1. Every mandatory cell of every row must be non-empty; empty ones are
///    marked in the ledger.
/// 2. The ledger must be clean.
/// 3. The filename must be non-blank.
pub fn export(session: &mut GridSession, filename: &str) -> ExportResult<ExportOutput> {
    let missing: Vec<CellKey> = session
        .grid()
        .rows()
        .iter()
        .enumerate()
        .flat_map(|(row, cells)| {
            Column::MANDATORY
                .into_iter()
                .filter(move |column| cells[column.index()].trim().is_empty())
                .map(move |column| CellKey::new(row, column))
        })
        .collect();

    for key in &missing {
        session.revalidate(key.row, key.column)?;
    }

    if !missing.is_empty() || !session.is_clean() {
        let messages = session.messages();
        log_warning(format!("Export refused: {} invalid cell(s)", messages.len()));
        return Err(ExportError::Validation { messages });
    }

    let Some(filename) = normalize_filename(filename) else {
        log_warning("Export refused: no filename");
        return Err(ExportError::FilenameRequired);
    };

    let text = serialize_rows(session.grid().rows());
    let rows = session.row_count();
    log_success(format!("Exported {} row(s) to {}", rows, filename));

    Ok(ExportOutput {
        filename,
        content: text.into_bytes(),
        media_type: MEDIA_TYPE,
        rows,
    })
}

/// Drop control characters, trim, and append [`EXPORT_EXTENSION`] unless the
/// name already ends with it (ignoring case). `None` when nothing is left.
pub fn normalize_filename(filename: &str) -> Option<String> {
    let cleaned: String = filename.chars().filter(|c| !c.is_control()).collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }

    let has_extension = trimmed
        .to_lowercase()
        .ends_with(EXPORT_EXTENSION);
    if has_extension {
        Some(trimmed.to_string())
    } else {
        Some(format!("{}{}", trimmed, EXPORT_EXTENSION))
    }
}

/// Serialize rows into the load-file format.
pub fn serialize_rows(rows: &[Row]) -> String {
    let mut out = String::new();
    for cells in rows {
        let fields: Vec<String> = Column::ALL
            .iter()
            .map(|&column| export_field(column, &cells[column.index()]))
            .collect();
        out.push_str(&fields.join(FIELD_DELIMITER));
        out.push('\n');
    }
    out
}

fn export_field(column: Column, raw: &str) -> String {
    let text = raw.trim();
    match column {
        Column::MaxAmount => rescale_amount(text),
        _ => text.to_string(),
    }
}

/// Amount ×100 as an integer string, or the sentinel.
///
/// Plain decimals are rescaled on their digits, rounding half away from zero
/// on the third decimal, so `1.005` gives `101`. Exponent forms go through
/// `f64`.
pub fn rescale_amount(text: &str) -> String {
    let text = text.trim();
    let Some(amount) = parse_amount(text) else {
        return AMOUNT_SENTINEL.to_string();
    };

    match rescale_decimal_text(text) {
        Some(cents) => cents,
        None => rescale_float(amount),
    }
}

fn rescale_decimal_text(text: &str) -> Option<String> {
    let caps = PLAIN_DECIMAL.captures(text)?;
    let negative = &caps[1] == "-";
    let integer = caps.get(2).map_or("", |m| m.as_str());
    let fraction = caps.get(3).map_or("", |m| m.as_str());
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut fraction_digits = fraction.bytes().chain(std::iter::repeat(b'0'));
    let mut digits: Vec<u8> = integer.bytes().map(|b| b - b'0').collect();
    digits.extend(fraction_digits.by_ref().take(2).map(|b| b - b'0'));
    if fraction_digits.next().is_some_and(|b| b >= b'5') {
        increment(&mut digits);
    }

    let Some(first) = digits.iter().position(|&d| d != 0) else {
        return Some("0".to_string());
    };
    let magnitude: String = digits[first..].iter().map(|&d| char::from(b'0' + d)).collect();
    Some(if negative { format!("-{}", magnitude) } else { magnitude })
}

/// Add one to a big-endian digit string.
fn increment(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == 9 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, 1);
}

fn rescale_float(amount: f64) -> String {
    let cents = (amount * 100.0).round();
    if !cents.is_finite() {
        AMOUNT_SENTINEL.to_string()
    } else if cents == 0.0 {
        "0".to_string()
    } else {
        format!("{:.0}", cents)
    }
}

// =============================================================================
// File Sink
// =============================================================================

/// Receives a fully formed export and saves it somewhere.
pub trait FileSink {
    fn save(&mut self, filename: &str, content: &[u8], media_type: &str) -> Result<(), SinkError>;
}

/// Writes exports into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// Destination for `filename`; any directory part of the name is ignored.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| filename.into());
        self.dir.join(name)
    }
}

impl FileSink for DirectorySink {
    fn save(&mut self, filename: &str, content: &[u8], media_type: &str) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(filename);
        fs::write(&path, content)?;
        log_info(format!("💾 Saved {} ({}, {} bytes)", path.display(), media_type, content.len()));
        Ok(())
    }
}
