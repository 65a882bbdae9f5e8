//! Validation of caller-supplied values
//!
//! Everything here runs before a statement is issued, so bad input surfaces
//! as [`StorageError::Validation`] instead of an opaque engine error.

use crate::error::{StorageError, Result};

/// Trim a theme or type name and reject it if empty
pub fn validate_name(kind: &str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StorageError::Validation(format!("{} name must not be empty", kind)));
    }
    Ok(trimmed.to_string())
}

/// Case-folded form of a name, used for uniqueness and lookups
///
/// Folds the full Unicode range, not just ASCII, so "Ärmel" and "ÄRMEL"
/// share one key.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Reject values that cannot be stored as a meaningful REAL
pub fn validate_value(val: Option<f64>) -> Result<Option<f64>> {
    match val {
        Some(v) if !v.is_finite() => {
            Err(StorageError::Validation(format!("value must be finite, got {}", v)))
        }
        other => Ok(other),
    }
}

/// Parse a value typed into an entry box
///
/// Blank input means "no value". Otherwise only digits with at most one
/// decimal point are accepted.
pub fn parse_value(input: &str) -> Result<Option<f64>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut dots = 0;
    let mut digits = 0;
    for c in trimmed.chars() {
        match c {
            '.' => dots += 1,
            c if c.is_ascii_digit() => digits += 1,
            _ => return Err(not_a_number(input)),
        }
    }
    if dots > 1 || digits == 0 {
        return Err(not_a_number(input));
    }

    let value: f64 = trimmed.parse().map_err(|_| not_a_number(input))?;
    validate_value(Some(value))
}

fn not_a_number(input: &str) -> StorageError {
    StorageError::Validation(format!("'{}' is not a number", input))
}
