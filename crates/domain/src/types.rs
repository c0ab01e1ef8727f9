// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Core enums and lookup entities shared across the clinic domain.

use crate::audit::AuditFields;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle flag carried by every soft-deletable entity.
///
/// Stored as a single character (`A` / `I`), exposed on the wire as
/// `ACTIVE` / `INACTIVE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordState {
    /// The record is live.
    #[default]
    Active,
    /// The record has been soft-deleted.
    Inactive,
}

impl RecordState {
    /// Returns the single-character storage code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Active => "A",
            Self::Inactive => "I",
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    /// Decodes a storage code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRecordState` for anything other than `A` or `I`.
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code {
            "A" => Ok(Self::Active),
            "I" => Ok(Self::Inactive),
            other => Err(DomainError::InvalidRecordState(other.to_string())),
        }
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl FromStr for RecordState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" | "A" => Ok(Self::Active),
            "INACTIVE" | "I" => Ok(Self::Inactive),
            _ => Err(DomainError::InvalidRecordState(s.to_string())),
        }
    }
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an e-payment transaction.
///
/// `Settled` and `Cancelled` are terminal: once a transaction reaches either,
/// it can never be modified again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Requested but not yet completed.
    #[default]
    Pending,
    /// Funds were received.
    Settled,
    /// The transaction was voided.
    Cancelled,
}

impl PaymentStatus {
    /// Returns the single-character storage code.
    #[must_use]
    pub const fn as_code(self) -> &'static str {
        match self {
            Self::Pending => "P",
            Self::Settled => "S",
            Self::Cancelled => "C",
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Settled => "SETTLED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Decodes a storage code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPaymentStatus` for an unknown code.
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code {
            "P" => Ok(Self::Pending),
            "S" => Ok(Self::Settled),
            "C" => Ok(Self::Cancelled),
            other => Err(DomainError::InvalidPaymentStatus(other.to_string())),
        }
    }

    /// Returns true if no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::Cancelled)
    }

    /// Checks that a transaction in this status may still change.
    ///
    /// A pending transaction may move to any status, itself included.
    /// Nothing leaves a terminal status.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TerminalStatus` if this status is terminal.
    pub const fn ensure_mutable(self, transaction_id: i64) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::TerminalStatus {
                transaction_id,
                status: self,
            });
        }
        Ok(())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" | "P" => Ok(Self::Pending),
            "SETTLED" | "S" => Ok(Self::Settled),
            "CANCELLED" | "C" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidPaymentStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference data describing a kind of identity document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentificationType {
    /// Short lookup code (e.g. `CED`).
    pub code: String,
    /// Human-readable name.
    pub name: String,
    pub state: RecordState,
}

/// A cashier allowed to register payment transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cashier {
    pub cashier_id: i64,
    /// The user account operating this cashier.
    pub user_id: i64,
    /// Display name shown on receipts.
    pub name: String,
    pub state: RecordState,
    pub audit: AuditFields,
}
