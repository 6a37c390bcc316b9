//! Per-cell validation for the payment-account grid.
//!
//! [`validate`] is a pure function of the column, the cell text and (for the
//! conditional column) the sibling value. It holds no state; the
//! [`crate::grid::ErrorLedger`] keeps whatever it reports as invalid.
//!
//! # Check Order
//!
//! The first failing check wins, so messages are deterministic:
//!
//! 1. required / empty
//! 2. maximum length
//! 3. allowed character set
//! 4. structural pattern
//! 5. enumerated options (including the conditional column-3 set)
//! 6. numeric parse
//!
//! # Example
//!
//! ```rust
//! use paygrid::models::Column;
//! use paygrid::validation::validate;
//!
//! let result = validate(Column::AccountType, "aho", Some("CTA"));
//! assert!(result.is_valid);
//! assert_eq!(result.normalized.as_deref(), Some("AHO"));
//!
//! let result = validate(Column::AccountType, "V", Some("CTA"));
//! assert!(!result.is_valid);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{allowed_types_for, CharSet, Column, ColumnRule, TextPattern};

/// Message for an empty required cell.
pub const REQUIRED_MESSAGE: &str = "Campo requerido";

static ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid regex"));
static ALPHANUMERIC_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9 ]+$").expect("valid regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").expect("valid regex")
});
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

impl TextPattern {
    fn regex(self) -> &'static Regex {
        match self {
            TextPattern::Alphanumeric => &ALPHANUMERIC,
            TextPattern::AlphanumericSpaces => &ALPHANUMERIC_SPACES,
            TextPattern::Email => &EMAIL,
            TextPattern::Digits => &DIGITS,
        }
    }

    fn hint(self) -> &'static str {
        match self {
            TextPattern::Alphanumeric => "Solo se permiten letras y números",
            TextPattern::AlphanumericSpaces => "Solo se permiten letras, números y espacios",
            TextPattern::Email => "Formato de correo inválido (usuario@dominio.ext)",
            TextPattern::Digits => "Solo se permiten dígitos",
        }
    }
}

/// Outcome of validating one cell. Never stored; only the invalid case
/// reaches the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Human-readable reason, empty when valid.
    pub message: String,
    /// Canonical text to store back into the cell once accepted
    /// (upper-cased codes for columns 2 and 3).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, message: String::new(), normalized: None }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self { is_valid: false, message: message.into(), normalized: None }
    }

    fn with_normalized(mut self, value: impl Into<String>) -> Self {
        self.normalized = Some(value.into());
        self
    }

    /// Row/column-addressed message for reporting.
    pub fn addressed(&self, row: usize, column: Column) -> String {
        format_message(row, column, &self.message)
    }
}

/// Render a row/column-addressed message. Rows are shown one-based.
pub fn format_message(row: usize, column: Column, detail: &str) -> String {
    format!("Fila {} - {}: {}", row + 1, column.label(), detail)
}

/// Parse a column-5 amount. Only finite decimals are accepted.
pub fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validate a cell's text against its column descriptor.
///
/// `sibling` is the current text of the column the rule depends on; it is
/// only read by [`ColumnRule::Conditional`] columns.
pub fn validate(column: Column, raw: &str, sibling: Option<&str>) -> ValidationResult {
    let spec = column.spec();
    let text = raw.trim();

    if text.is_empty() {
        return if spec.required {
            ValidationResult::invalid(REQUIRED_MESSAGE)
        } else {
            ValidationResult::valid()
        };
    }

    if let Some(max) = spec.max_length {
        if text.chars().count() > max {
            return ValidationResult::invalid(format!("Máximo {} caracteres", max));
        }
    }

    match spec.rule {
        ColumnRule::Pattern { pattern, allowed_chars } => {
            validate_pattern(text, pattern, allowed_chars)
        }
        ColumnRule::Enumerated { options } => validate_option(text, options),
        ColumnRule::Conditional { .. } => validate_conditional(text, sibling.unwrap_or("")),
        ColumnRule::Numeric => match parse_amount(text) {
            Some(_) => ValidationResult::valid(),
            None => ValidationResult::invalid("Debe ser un número válido"),
        },
    }
}

fn validate_pattern(text: &str, pattern: TextPattern, allowed: Option<CharSet>) -> ValidationResult {
    if let Some(set) = allowed {
        if !text.chars().all(|c| set.allows(c)) {
            return ValidationResult::invalid("Contiene caracteres no permitidos");
        }
    }

    if pattern.regex().is_match(text) {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(pattern.hint())
    }
}

fn validate_option(text: &str, options: &[&str]) -> ValidationResult {
    let upper = text.to_uppercase();
    if options.contains(&upper.as_str()) {
        ValidationResult::valid().with_normalized(upper)
    } else {
        ValidationResult::invalid(format!("Valor no válido. Opciones: {}", options.join(", ")))
    }
}

fn validate_conditional(text: &str, sibling: &str) -> ValidationResult {
    let allowed = allowed_types_for(sibling);
    if allowed.is_empty() {
        return ValidationResult::invalid("Seleccione primero un medio de pago válido (CTA o TAR)");
    }

    let upper = text.to_uppercase();
    if allowed.contains(&upper.as_str()) {
        ValidationResult::valid().with_normalized(upper)
    } else {
        ValidationResult::invalid(format!(
            "Tipo no válido para {}. Opciones: {}",
            sibling.trim().to_uppercase(),
            allowed.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns_reject_empty() {
        for column in Column::ALL {
            let result = validate(column, "   ", Some("CTA"));
            if column.spec().required {
                assert!(!result.is_valid, "{:?} should be required", column);
                assert_eq!(result.message, REQUIRED_MESSAGE);
            } else {
                assert!(result.is_valid, "{:?} should accept empty", column);
            }
        }
    }

    #[test]
    fn test_code_column() {
        assert!(validate(Column::Code, "AB12", None).is_valid);
        assert!(validate(Column::Code, "  AB12  ", None).is_valid);
        assert!(!validate(Column::Code, "AB-12", None).is_valid);
        assert!(!validate(Column::Code, "AB 12", None).is_valid);
        assert!(validate(Column::Code, &"A".repeat(50), None).is_valid);
    }

    #[test]
    fn test_max_length_checked_before_pattern() {
        let long = format!("{}-", "A".repeat(50));
        let result = validate(Column::Code, &long, None);
        assert!(!result.is_valid);
        assert_eq!(result.message, "Máximo 50 caracteres");
    }

    #[test]
    fn test_description_allows_spaces() {
        assert!(validate(Column::Description, "Desc uno", None).is_valid);
        assert!(!validate(Column::Description, "Desc, uno", None).is_valid);
        assert!(!validate(Column::Description, &"a".repeat(101), None).is_valid);
    }

    #[test]
    fn test_payment_method_normalized() {
        let result = validate(Column::PaymentMethod, " cta ", None);
        assert!(result.is_valid);
        assert_eq!(result.normalized.as_deref(), Some("CTA"));

        let result = validate(Column::PaymentMethod, "EFE", None);
        assert!(!result.is_valid);
        assert!(result.message.contains("CTA, TAR"));
    }

    #[test]
    fn test_account_type_conditional_on_method() {
        for ty in ["CTE", "AHO", "cte", "Aho"] {
            assert!(validate(Column::AccountType, ty, Some("CTA")).is_valid, "{}", ty);
        }
        for ty in ["A", "V", "M", "X"] {
            assert!(!validate(Column::AccountType, ty, Some("CTA")).is_valid, "{}", ty);
        }
        for ty in ["A", "v", "M"] {
            assert!(validate(Column::AccountType, ty, Some("tar")).is_valid, "{}", ty);
        }
        for ty in ["CTE", "AHO", "Z"] {
            assert!(!validate(Column::AccountType, ty, Some("TAR")).is_valid, "{}", ty);
        }
    }

    #[test]
    fn test_account_type_without_valid_method() {
        for method in ["", "EFE", "CT", "cash"] {
            for ty in ["CTE", "AHO", "A", "V", "M", "anything"] {
                let result = validate(Column::AccountType, ty, Some(method));
                assert!(!result.is_valid, "{} under {:?}", ty, method);
            }
        }
        assert!(!validate(Column::AccountType, "CTE", None).is_valid);
        // Still required regardless of the sibling.
        assert_eq!(validate(Column::AccountType, "", Some("EFE")).message, REQUIRED_MESSAGE);
    }

    #[test]
    fn test_numeric_amount() {
        for ok in ["12.5", "0", "1000", "-3", ".5", "1e3"] {
            assert!(validate(Column::MaxAmount, ok, None).is_valid, "{}", ok);
        }
        for bad in ["12,5", "12.5abc", "NaN", "Infinity", "inf", "abc", "1.2.3"] {
            assert!(!validate(Column::MaxAmount, bad, None).is_valid, "{}", bad);
        }
    }

    #[test]
    fn test_email() {
        assert!(validate(Column::Email, "ana.perez@banco.com.pe", None).is_valid);
        assert!(validate(Column::Email, "a_b-c@d-e.io", None).is_valid);
        assert!(!validate(Column::Email, "ana perez@banco.com", None).is_valid);
        assert!(!validate(Column::Email, "ana@banco", None).is_valid);
        assert!(!validate(Column::Email, "@banco.com", None).is_valid);

        let result = validate(Column::Email, "ana+1@banco.com", None);
        assert_eq!(result.message, "Contiene caracteres no permitidos");
    }

    #[test]
    fn test_phone_max_ten_digits() {
        assert!(validate(Column::Phone, "987654321", None).is_valid);
        assert!(validate(Column::Phone, "9876543210", None).is_valid);
        assert!(!validate(Column::Phone, "98765432101", None).is_valid);
        assert!(!validate(Column::Phone, "98-765", None).is_valid);
    }

    #[test]
    fn test_addressed_message() {
        let result = validate(Column::Code, "", None);
        assert_eq!(result.addressed(0, Column::Code), "Fila 1 - Código: Campo requerido");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("NaN"), None);
    }
}
