// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, PaymentStatus};

#[test]
fn test_invalid_field_display() {
    let err = DomainError::invalid_field("email", "is not a valid address");
    assert_eq!(
        err.to_string(),
        "Invalid value for 'email': is not a valid address"
    );
}

#[test]
fn test_already_inactive_display() {
    let err = DomainError::AlreadyInactive {
        entity: String::from("patient"),
        id: 7,
    };
    assert_eq!(err.to_string(), "The patient 7 is already inactive");
}

#[test]
fn test_terminal_status_display_names_the_status() {
    let settled = DomainError::TerminalStatus {
        transaction_id: 3,
        status: PaymentStatus::Settled,
    };
    let cancelled = DomainError::TerminalStatus {
        transaction_id: 3,
        status: PaymentStatus::Cancelled,
    };

    assert_eq!(settled.to_string(), "Transaction 3 is already settled");
    assert_eq!(cancelled.to_string(), "Transaction 3 is already cancelled");
}

#[test]
fn test_domain_error_is_std_error() {
    fn assert_error<E: std::error::Error>(_: &E) {}
    assert_error(&DomainError::InvalidTimezone(String::from("Mars/Olympus")));
}
