// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AuditFields, AuditStamp, DomainError, NewTransaction, PaymentStatus, PaymentTransaction,
    TransactionPatch, apply_transaction_patch,
};

fn create_test_stamp() -> AuditStamp {
    AuditStamp {
        timestamp: String::from("2026-03-05T14:00:00Z"),
        actor: String::from("caja1"),
    }
}

fn create_test_transaction(status: PaymentStatus) -> PaymentTransaction {
    PaymentTransaction {
        transaction_id: 11,
        cashier_id: 2,
        cashier: None,
        patient_id: Some(1),
        amount_cents: 2_500,
        payment_method: String::from("TARJETA"),
        reference: None,
        requested_at: String::from("2026-03-05T13:00:00Z"),
        status,
        version: 1,
        audit: AuditFields::created(&AuditStamp {
            timestamp: String::from("2026-03-05T13:00:00Z"),
            actor: String::from("caja1"),
        }),
    }
}

#[test]
fn test_new_transaction_validation() {
    let mut new = NewTransaction {
        cashier_id: 2,
        patient_id: None,
        amount_cents: 1_000,
        payment_method: String::from("EFECTIVO"),
        reference: Some(String::from("REF-1")),
    };
    assert!(new.validate().is_ok());

    new.amount_cents = 0;
    assert!(new.validate().is_err());

    new.amount_cents = 1_000;
    new.payment_method = String::new();
    assert!(new.validate().is_err());
}

#[test]
fn test_patch_pending_to_settled() {
    let mut transaction = create_test_transaction(PaymentStatus::Pending);
    let patch = TransactionPatch {
        status: Some(PaymentStatus::Settled),
        reference: Some(String::from("AUTH-778")),
        ..TransactionPatch::default()
    };

    apply_transaction_patch(&mut transaction, patch, &create_test_stamp()).unwrap();

    assert_eq!(transaction.status, PaymentStatus::Settled);
    assert_eq!(transaction.reference.as_deref(), Some("AUTH-778"));
    assert_eq!(transaction.amount_cents, 2_500);
    assert_eq!(transaction.audit.modified_by.as_deref(), Some("caja1"));
}

#[test]
fn test_patch_without_status_keeps_pending() {
    let mut transaction = create_test_transaction(PaymentStatus::Pending);
    let patch = TransactionPatch {
        amount_cents: Some(3_000),
        ..TransactionPatch::default()
    };

    apply_transaction_patch(&mut transaction, patch, &create_test_stamp()).unwrap();

    assert_eq!(transaction.status, PaymentStatus::Pending);
    assert_eq!(transaction.amount_cents, 3_000);
}

#[test]
fn test_terminal_transaction_rejects_every_patch() {
    for status in [PaymentStatus::Settled, PaymentStatus::Cancelled] {
        let mut transaction = create_test_transaction(status);
        let before = transaction.clone();

        let err = apply_transaction_patch(
            &mut transaction,
            TransactionPatch {
                payment_method: Some(String::from("EFECTIVO")),
                ..TransactionPatch::default()
            },
            &create_test_stamp(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            DomainError::TerminalStatus {
                transaction_id: 11,
                status,
            }
        );
        assert_eq!(transaction, before);
    }
}

#[test]
fn test_invalid_amount_in_patch_leaves_transaction_untouched() {
    let mut transaction = create_test_transaction(PaymentStatus::Pending);
    let before = transaction.clone();
    let patch = TransactionPatch {
        status: Some(PaymentStatus::Settled),
        amount_cents: Some(-1),
        ..TransactionPatch::default()
    };

    assert!(apply_transaction_patch(&mut transaction, patch, &create_test_stamp()).is_err());
    assert_eq!(transaction, before);
}

#[test]
fn test_cancel_pending() {
    let mut transaction = create_test_transaction(PaymentStatus::Pending);
    transaction.cancel(&create_test_stamp()).unwrap();
    assert_eq!(transaction.status, PaymentStatus::Cancelled);
}

#[test]
fn test_cancel_terminal_fails() {
    let mut transaction = create_test_transaction(PaymentStatus::Settled);
    assert!(matches!(
        transaction.cancel(&create_test_stamp()),
        Err(DomainError::TerminalStatus { .. })
    ));
    assert_eq!(transaction.status, PaymentStatus::Settled);
}
