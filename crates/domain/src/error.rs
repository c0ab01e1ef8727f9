// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::PaymentStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field value is missing, empty, or malformed.
    InvalidField {
        /// The offending field.
        field: String,
        /// A human-readable description of the problem.
        message: String,
    },
    /// The record is already inactive and cannot be deactivated again.
    AlreadyInactive {
        /// The kind of record (e.g. "patient").
        entity: String,
        /// The record identifier.
        id: i64,
    },
    /// The payment transaction is in a terminal status and cannot change.
    TerminalStatus {
        /// The transaction identifier.
        transaction_id: i64,
        /// The terminal status it is in.
        status: PaymentStatus,
    },
    /// A payment status string is not one of the known statuses.
    InvalidPaymentStatus(String),
    /// A record state string is not one of the known states.
    InvalidRecordState(String),
    /// A timestamp could not be parsed or formatted.
    InvalidTimestamp {
        /// The input value.
        value: String,
        /// The underlying reason.
        reason: String,
    },
    /// A timezone name is not a known IANA zone.
    InvalidTimezone(String),
}

impl DomainError {
    /// Shorthand for an `InvalidField` error.
    #[must_use]
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::AlreadyInactive { entity, id } => {
                write!(f, "The {entity} {id} is already inactive")
            }
            Self::TerminalStatus {
                transaction_id,
                status,
            } => {
                write!(
                    f,
                    "Transaction {transaction_id} is already {}",
                    status.as_str().to_lowercase()
                )
            }
            Self::InvalidPaymentStatus(value) => {
                write!(
                    f,
                    "Invalid payment status '{value}'. Must be PENDING, SETTLED or CANCELLED"
                )
            }
            Self::InvalidRecordState(value) => {
                write!(f, "Invalid state '{value}'. Must be ACTIVE or INACTIVE")
            }
            Self::InvalidTimestamp { value, reason } => {
                write!(f, "Invalid timestamp '{value}': {reason}")
            }
            Self::InvalidTimezone(name) => write!(f, "Unknown timezone: {name}"),
        }
    }
}

impl std::error::Error for DomainError {}
