// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment transaction mutations.

use clinica_domain::{AuditStamp, NewTransaction, PaymentStatus, PaymentTransaction};
use diesel::prelude::*;
#[cfg(feature = "mysql")]
use diesel::MysqlConnection;
use diesel::SqliteConnection;
use tracing::{debug, info, warn};

use crate::backend::PersistenceBackend;
use crate::data_models::TransactionChangeset;
use crate::diesel_schema::payment_transactions;
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a new `Pending` transaction at version 1 and returns its ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_transaction(
    conn: &mut _,
    transaction: &NewTransaction,
    stamp: &AuditStamp,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(payment_transactions::table)
        .values((
            payment_transactions::cashier_id.eq(transaction.cashier_id),
            payment_transactions::patient_id.eq(transaction.patient_id),
            payment_transactions::amount_cents.eq(transaction.amount_cents),
            payment_transactions::payment_method.eq(&transaction.payment_method),
            payment_transactions::reference.eq(transaction.reference.as_deref()),
            payment_transactions::requested_at.eq(&stamp.timestamp),
            payment_transactions::status.eq(PaymentStatus::Pending.as_code()),
            payment_transactions::version.eq(1_i64),
            payment_transactions::created_at.eq(&stamp.timestamp),
            payment_transactions::created_by.eq(&stamp.actor),
        ))
        .execute(conn)?;

    let transaction_id: i64 = conn.get_last_insert_rowid()?;

    info!(
        transaction_id,
        cashier_id = transaction.cashier_id,
        amount_cents = transaction.amount_cents,
        "Transaction created"
    );
    Ok(transaction_id)
}
}

backend_fn! {
/// Writes a transaction back only if its row is still at the version that
/// was read, bumping the version in the same statement.
///
/// On success `transaction.version` is advanced to match the row.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if no row matched, meaning another
/// writer got there first.
pub fn persist_transaction(
    conn: &mut _,
    transaction: &mut PaymentTransaction,
) -> Result<(), PersistenceError> {
    let read_version: i64 = transaction.version;

    let rows_affected: usize = diesel::update(
        payment_transactions::table
            .filter(payment_transactions::transaction_id.eq(transaction.transaction_id))
            .filter(payment_transactions::version.eq(read_version)),
    )
    .set((
        TransactionChangeset::from(&*transaction),
        payment_transactions::version.eq(read_version + 1),
    ))
    .execute(conn)?;

    if rows_affected == 0 {
        warn!(
            transaction_id = transaction.transaction_id,
            read_version, "Optimistic version check failed"
        );
        return Err(PersistenceError::Conflict(format!(
            "Transaction {} was modified concurrently",
            transaction.transaction_id
        )));
    }

    transaction.version = read_version + 1;
    debug!(
        transaction_id = transaction.transaction_id,
        version = transaction.version,
        "Transaction persisted"
    );
    Ok(())
}
}
