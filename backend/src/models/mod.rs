//! Domain models for the payment-account grid.
//!
//! This module contains the fixed schema every row follows:
//!
//! - [`Column`] - The 8 column roles, in wire order
//! - [`ColumnRule`] - Per-column validation kind (pattern, options, numeric, conditional)
//! - [`ColumnSpec`] - Immutable descriptor combining rule, length limit and required flag
//! - [`PaymentMethod`] - Payment methods accepted in column 2
//! - [`CellKey`] - Composite (row, column) identity used by the error ledger

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GridError;

/// Number of cells in every row.
pub const COLUMN_COUNT: usize = 8;

// =============================================================================
// Columns
// =============================================================================

/// Semantic role of each of the 8 columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "usize", try_from = "usize")]
pub enum Column {
    Code,
    Description,
    PaymentMethod,
    AccountType,
    AccountNumber,
    MaxAmount,
    Email,
    Phone,
}

impl Column {
    /// All columns in wire order.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Code,
        Column::Description,
        Column::PaymentMethod,
        Column::AccountType,
        Column::AccountNumber,
        Column::MaxAmount,
        Column::Email,
        Column::Phone,
    ];

    /// Columns that must be non-empty for a row to be exported.
    pub const MANDATORY: [Column; 5] = [
        Column::Code,
        Column::Description,
        Column::PaymentMethod,
        Column::AccountType,
        Column::AccountNumber,
    ];

    /// Column for a zero-based index, `None` past column 7.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Descriptor from the static rule table.
    pub fn spec(self) -> &'static ColumnSpec {
        &COLUMN_SPECS[self.index()]
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn is_mandatory(self) -> bool {
        Self::MANDATORY.contains(&self)
    }
}

impl From<Column> for usize {
    fn from(column: Column) -> Self {
        column.index()
    }
}

impl TryFrom<usize> for Column {
    type Error = GridError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Column::from_index(index).ok_or(GridError::ColumnOutOfBounds(index))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Column Rules
// =============================================================================

/// Structural text patterns used by [`ColumnRule::Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPattern {
    /// ASCII letters and digits only.
    Alphanumeric,
    /// ASCII letters, digits and spaces.
    AlphanumericSpaces,
    /// `local@domain.tld`
    Email,
    /// Decimal digits only.
    Digits,
}

/// Secondary character allow-lists checked before the structural pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSet {
    /// Letters, digits, `@`, `.`, `_`, `-`.
    EmailChars,
}

impl CharSet {
    pub fn allows(self, c: char) -> bool {
        match self {
            CharSet::EmailChars => c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-'),
        }
    }
}

/// Validation kind of a column. Each variant only carries what it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnRule {
    Pattern {
        pattern: TextPattern,
        allowed_chars: Option<CharSet>,
    },
    Enumerated {
        options: &'static [&'static str],
    },
    Numeric,
    /// Legal values depend on the current value of `sibling` in the same row.
    Conditional {
        sibling: Column,
    },
}

/// Immutable validation descriptor for a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub column: Column,
    /// Label used in error messages.
    pub label: &'static str,
    pub rule: ColumnRule,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    pub required: bool,
}

/// The authoritative rule table, indexed by column.
pub static COLUMN_SPECS: [ColumnSpec; COLUMN_COUNT] = [
    ColumnSpec {
        column: Column::Code,
        label: "Código",
        rule: ColumnRule::Pattern { pattern: TextPattern::Alphanumeric, allowed_chars: None },
        max_length: Some(50),
        required: true,
    },
    ColumnSpec {
        column: Column::Description,
        label: "Descripción",
        rule: ColumnRule::Pattern { pattern: TextPattern::AlphanumericSpaces, allowed_chars: None },
        max_length: Some(100),
        required: true,
    },
    ColumnSpec {
        column: Column::PaymentMethod,
        label: "Medio de pago",
        rule: ColumnRule::Enumerated { options: PaymentMethod::CODES },
        max_length: None,
        required: true,
    },
    ColumnSpec {
        column: Column::AccountType,
        label: "Tipo de cuenta/tarjeta",
        rule: ColumnRule::Conditional { sibling: Column::PaymentMethod },
        max_length: None,
        required: true,
    },
    ColumnSpec {
        column: Column::AccountNumber,
        label: "Número de cuenta/tarjeta",
        rule: ColumnRule::Pattern { pattern: TextPattern::Alphanumeric, allowed_chars: None },
        max_length: Some(20),
        required: true,
    },
    ColumnSpec {
        column: Column::MaxAmount,
        label: "Monto máximo",
        rule: ColumnRule::Numeric,
        max_length: None,
        required: false,
    },
    ColumnSpec {
        column: Column::Email,
        label: "Correo electrónico",
        rule: ColumnRule::Pattern {
            pattern: TextPattern::Email,
            allowed_chars: Some(CharSet::EmailChars),
        },
        max_length: Some(100),
        required: false,
    },
    ColumnSpec {
        column: Column::Phone,
        label: "Teléfono",
        rule: ColumnRule::Pattern { pattern: TextPattern::Digits, allowed_chars: None },
        max_length: Some(10),
        required: false,
    },
];

// =============================================================================
// Payment Method
// =============================================================================

/// Payment method selected in column 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Bank account (CTA).
    Cta,
    /// Card (TAR).
    Tar,
}

impl PaymentMethod {
    pub const CODES: &'static [&'static str] = &["CTA", "TAR"];

    /// Parse a method code, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "CTA" => Some(PaymentMethod::Cta),
            "TAR" => Some(PaymentMethod::Tar),
            _ => None,
        }
    }

    /// Account/card types this method licenses in column 3.
    pub fn allowed_types(self) -> &'static [&'static str] {
        match self {
            // Checking (CTE) and savings (AHO) accounts
            PaymentMethod::Cta => &["CTE", "AHO"],
            // Amex, Visa, Mastercard
            PaymentMethod::Tar => &["A", "V", "M"],
        }
    }
}

/// Allowed column-3 values for whatever text column 2 currently holds.
/// Empty when the sibling is not a recognised method.
pub fn allowed_types_for(sibling: &str) -> &'static [&'static str] {
    PaymentMethod::parse(sibling)
        .map(PaymentMethod::allowed_types)
        .unwrap_or(&[])
}

// =============================================================================
// Cell Identity
// =============================================================================

/// Composite (row, column) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub row: usize,
    pub column: Column,
}

impl CellKey {
    pub fn new(row: usize, column: Column) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_matches_columns() {
        for (i, spec) in COLUMN_SPECS.iter().enumerate() {
            assert_eq!(spec.column.index(), i);
            assert_eq!(Column::from_index(i), Some(spec.column));
        }
        assert_eq!(Column::from_index(8), None);
    }

    #[test]
    fn test_mandatory_set() {
        let mandatory: Vec<usize> = Column::ALL
            .iter()
            .filter(|c| c.is_mandatory())
            .map(|c| c.index())
            .collect();
        assert_eq!(mandatory, vec![0, 1, 2, 3, 4]);
        for column in Column::MANDATORY {
            assert!(column.spec().required);
        }
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("cta"), Some(PaymentMethod::Cta));
        assert_eq!(PaymentMethod::parse(" Tar "), Some(PaymentMethod::Tar));
        assert_eq!(PaymentMethod::parse("EFE"), None);
        assert_eq!(PaymentMethod::parse(""), None);
    }

    #[test]
    fn test_allowed_types_for_sibling() {
        assert_eq!(allowed_types_for("CTA"), &["CTE", "AHO"]);
        assert_eq!(allowed_types_for("tar"), &["A", "V", "M"]);
        assert!(allowed_types_for("XYZ").is_empty());
    }

    #[test]
    fn test_column_serializes_as_index() {
        let key = CellKey::new(3, Column::Email);
        let json = serde_json::to_value(key).unwrap();
        assert_eq!(json["row"], 3);
        assert_eq!(json["column"], 6);

        let back: CellKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<Column>("9").is_err());
    }
}
