// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! E-payment transactions and their status lifecycle.
//!
//! A transaction starts `Pending`. From there a client may change any
//! allow-listed field, including moving it to `Settled` or `Cancelled`.
//! Once terminal, the transaction is frozen.

use crate::audit::{AuditFields, AuditStamp};
use crate::error::DomainError;
use crate::types::{Cashier, PaymentStatus};
use crate::validation::{validate_amount, validate_optional_text, validate_required_text};

/// A stored payment transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransaction {
    pub transaction_id: i64,
    pub cashier_id: i64,
    /// Eager-loaded cashier, present when the record was read with its join.
    pub cashier: Option<Cashier>,
    pub patient_id: Option<i64>,
    /// Amount in minor currency units.
    pub amount_cents: i64,
    pub payment_method: String,
    pub reference: Option<String>,
    pub requested_at: String,
    pub status: PaymentStatus,
    /// Optimistic concurrency counter, starts at 1.
    pub version: i64,
    pub audit: AuditFields,
}

impl PaymentTransaction {
    /// Soft-deletes the transaction by moving it to `Cancelled`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TerminalStatus` if it is already settled or cancelled.
    pub fn cancel(&mut self, stamp: &AuditStamp) -> Result<(), DomainError> {
        self.status.ensure_mutable(self.transaction_id)?;
        self.status = PaymentStatus::Cancelled;
        self.audit.stamp_modification(stamp);
        Ok(())
    }
}

/// Input for registering a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub cashier_id: i64,
    pub patient_id: Option<i64>,
    pub amount_cents: i64,
    pub payment_method: String,
    pub reference: Option<String>,
}

impl NewTransaction {
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` if the amount is not positive or
    /// the payment method is blank.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_amount(self.amount_cents)?;
        validate_required_text("tipoPago", &self.payment_method)?;
        validate_optional_text("referencia", self.reference.as_deref())
    }
}

/// The fields a client may change on an existing transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub reference: Option<String>,
    pub amount_cents: Option<i64>,
}

/// Applies a patch to a transaction and stamps the modification.
///
/// The terminal-state guard runs before anything else: a settled or
/// cancelled transaction rejects every patch, even an empty one.
///
/// # Errors
///
/// Returns `DomainError::TerminalStatus` if the transaction is terminal, or
/// `DomainError::InvalidField` if a supplied value is invalid.
pub fn apply_transaction_patch(
    transaction: &mut PaymentTransaction,
    patch: TransactionPatch,
    stamp: &AuditStamp,
) -> Result<(), DomainError> {
    transaction
        .status
        .ensure_mutable(transaction.transaction_id)?;
    let next = patch.status.unwrap_or(transaction.status);

    if let Some(v) = patch.payment_method.as_deref() {
        validate_required_text("tipoPago", v)?;
    }
    validate_optional_text("referencia", patch.reference.as_deref())?;
    if let Some(v) = patch.amount_cents {
        validate_amount(v)?;
    }

    transaction.status = next;
    if let Some(v) = patch.payment_method {
        transaction.payment_method = v;
    }
    if let Some(v) = patch.reference {
        transaction.reference = Some(v);
    }
    if let Some(v) = patch.amount_cents {
        transaction.amount_cents = v;
    }

    transaction.audit.stamp_modification(stamp);
    Ok(())
}

/// Optional predicates for listing transactions.
///
/// `from` and `to` are storage-format timestamps and are both inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub status: Option<PaymentStatus>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub cashier_id: Option<i64>,
    pub patient_id: Option<i64>,
}
