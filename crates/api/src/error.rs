// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use clinica_domain::DomainError;
use clinica_persistence::PersistenceError;
use thiserror::Error;
use tracing::error;

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract. The server maps each variant to exactly one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Missing or invalid credentials or session token.
    #[error("{reason}")]
    Unauthorized {
        /// Why authentication failed.
        reason: String,
    },
    /// The actor is authenticated but its role may not perform the action.
    #[error("Role '{role}' may not {action}")]
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// The actor's role.
        role: String,
    },
    /// A requested resource does not exist.
    #[error("{message}")]
    NotFound {
        /// The kind of resource.
        resource: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Input failed validation.
    #[error("Invalid value for '{field}': {message}")]
    ValidationError {
        /// The offending field, using its wire name.
        field: String,
        /// A human-readable description of the problem.
        message: String,
    },
    /// The record's current state forbids the requested change.
    #[error("{0}")]
    InvalidState(String),
    /// The record changed since the caller last read it.
    #[error("{0}")]
    Conflict(String),
    /// An unclassified failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Shorthand for a `ValidationError`.
    #[must_use]
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Translates a domain rejection into the API taxonomy.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidField { field, message } => ApiError::ValidationError { field, message },
        DomainError::AlreadyInactive { .. } | DomainError::TerminalStatus { .. } => {
            ApiError::InvalidState(err.to_string())
        }
        DomainError::InvalidPaymentStatus(_) | DomainError::InvalidRecordState(_) => {
            ApiError::validation("estado", err.to_string())
        }
        DomainError::InvalidTimestamp { .. } => ApiError::validation("fecha", err.to_string()),
        DomainError::InvalidTimezone(_) => {
            error!(error = %err, "Timezone misconfigured");
            ApiError::Internal(err.to_string())
        }
    }
}

/// Translates a persistence failure into the API taxonomy.
///
/// Database-level failures are logged here and surface as `Internal`.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::NotFound {
            resource: resource_from_message(&message),
            message,
        },
        PersistenceError::Conflict(message) => ApiError::Conflict(message),
        PersistenceError::Domain(domain) => translate_domain_error(domain),
        other => {
            error!(error = %other, "Persistence failure");
            ApiError::Internal(other.to_string())
        }
    }
}

/// The leading word of a not-found message names the resource.
fn resource_from_message(message: &str) -> String {
    message
        .split_whitespace()
        .next()
        .unwrap_or("Resource")
        .to_string()
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}
