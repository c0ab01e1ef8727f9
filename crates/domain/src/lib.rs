// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod audit;
mod error;
mod pagination;
mod patient;
mod transaction;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use audit::{
    AuditFields, AuditStamp, DEFAULT_TIMEZONE, DISPLAY_FORMAT, format_for_display,
    format_timestamp, now_timestamp, parse_filter_bound, parse_timestamp, parse_timezone,
};
pub use chrono_tz::Tz;
pub use error::DomainError;
pub use pagination::{Page, PageRequest};
pub use patient::{
    NewPatient, Patient, PatientFilter, PatientPatch, apply_patient_patch, compose_full_name,
};
pub use transaction::{
    NewTransaction, PaymentTransaction, TransactionFilter, TransactionPatch,
    apply_transaction_patch,
};
pub use types::{Cashier, IdentificationType, PaymentStatus, RecordState};
pub use validation::{
    MAX_TEXT_LEN, validate_amount, validate_email, validate_identification_number,
    validate_optional_text, validate_required_text,
};
