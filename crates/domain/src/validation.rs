// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Maximum accepted length for name and reference fields.
pub const MAX_TEXT_LEN: usize = 100;

/// Validates that a required text field is non-empty and reasonably sized.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the value is blank or too long.
pub fn validate_required_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_field(field, "must not be empty"));
    }
    validate_optional_text(field, Some(value))
}

/// Validates the length of an optional text field.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the value exceeds the maximum length.
pub fn validate_optional_text(field: &str, value: Option<&str>) -> Result<(), DomainError> {
    match value {
        Some(v) if v.chars().count() > MAX_TEXT_LEN => Err(DomainError::invalid_field(
            field,
            format!("must be at most {MAX_TEXT_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

/// Validates an identification number.
///
/// Only ASCII letters, digits and dashes are accepted.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the value is blank or contains other characters.
pub fn validate_identification_number(value: &str) -> Result<(), DomainError> {
    validate_required_text("numeroIdentificacion", value)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(DomainError::invalid_field(
            "numeroIdentificacion",
            "may only contain letters, digits and dashes",
        ));
    }
    Ok(())
}

/// Performs a plausibility check on an email address.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the address has no local part,
/// no domain, or no dot in the domain.
pub fn validate_email(value: &str) -> Result<(), DomainError> {
    let trimmed = value.trim();
    let plausible = trimmed.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });

    if plausible && !trimmed.contains(char::is_whitespace) {
        Ok(())
    } else {
        Err(DomainError::invalid_field("email", "is not a valid address"))
    }
}

/// Validates a payment amount in minor units.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the amount is not strictly positive.
pub fn validate_amount(amount_cents: i64) -> Result<(), DomainError> {
    if amount_cents <= 0 {
        return Err(DomainError::invalid_field("valor", "must be greater than zero"));
    }
    Ok(())
}
