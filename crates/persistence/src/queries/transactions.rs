// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment transaction queries.
//!
//! Reads join the owning cashier. Date bounds compare the stored
//! `requested_at` text directly, which is safe because timestamps share one
//! fixed-width UTC format.

use clinica_domain::{Page, PageRequest, PaymentTransaction, TransactionFilter};
use diesel::prelude::*;
#[cfg(feature = "mysql")]
use diesel::MysqlConnection;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::{CashierRow, TransactionRow};
use crate::diesel_schema::{cashiers, payment_transactions};
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves a transaction by ID with its cashier.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no transaction has this ID.
pub fn get_transaction(
    conn: &mut _,
    transaction_id: i64,
) -> Result<PaymentTransaction, PersistenceError> {
    debug!(transaction_id, "Loading transaction");

    let (transaction, cashier) = payment_transactions::table
        .inner_join(cashiers::table)
        .filter(payment_transactions::transaction_id.eq(transaction_id))
        .select((TransactionRow::as_select(), CashierRow::as_select()))
        .first::<(TransactionRow, CashierRow)>(conn)
        .optional()?
        .ok_or_else(|| {
            PersistenceError::NotFound(format!("Transaction {transaction_id} not found"))
        })?;

    transaction.into_domain(Some(cashier))
}
}

backend_fn! {
/// Loads a transaction for a read-modify-write unit.
///
/// When the caller supplies the version it last saw, a mismatch fails
/// immediately instead of overwriting a newer change.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the transaction does not exist,
/// or `PersistenceError::Conflict` if `expected_version` is stale.
pub fn load_transaction_for_update(
    conn: &mut _,
    transaction_id: i64,
    expected_version: Option<i64>,
) -> Result<PaymentTransaction, PersistenceError> {
    let transaction = payment_transactions::table
        .inner_join(cashiers::table)
        .filter(payment_transactions::transaction_id.eq(transaction_id))
        .select((TransactionRow::as_select(), CashierRow::as_select()))
        .first::<(TransactionRow, CashierRow)>(conn)
        .optional()?
        .ok_or_else(|| {
            PersistenceError::NotFound(format!("Transaction {transaction_id} not found"))
        })
        .and_then(|(transaction, cashier)| transaction.into_domain(Some(cashier)))?;

    if let Some(expected) = expected_version.filter(|v| *v != transaction.version) {
        return Err(PersistenceError::Conflict(format!(
            "Transaction {transaction_id} is at version {}, not {expected}",
            transaction.version
        )));
    }

    Ok(transaction)
}
}

backend_fn! {
/// Lists transactions matching every supplied predicate, one page at a time.
///
/// `from` and `to` are both inclusive and independent of each other.
///
/// # Errors
///
/// Returns an error if either pass fails.
pub fn list_transactions(
    conn: &mut _,
    filter: &TransactionFilter,
    page: PageRequest,
) -> Result<Page<PaymentTransaction>, PersistenceError> {
    let filtered = || {
        let mut query = payment_transactions::table
            .inner_join(cashiers::table)
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(payment_transactions::status.eq(status.as_code()));
        }
        if let Some(from) = filter.from.as_deref() {
            query = query.filter(payment_transactions::requested_at.ge(from.to_string()));
        }
        if let Some(to) = filter.to.as_deref() {
            query = query.filter(payment_transactions::requested_at.le(to.to_string()));
        }
        if let Some(cashier_id) = filter.cashier_id {
            query = query.filter(payment_transactions::cashier_id.eq(cashier_id));
        }
        if let Some(patient_id) = filter.patient_id {
            query = query.filter(payment_transactions::patient_id.eq(patient_id));
        }
        query
    };

    let total_rows: i64 = filtered().count().get_result(conn)?;

    let rows: Vec<(TransactionRow, CashierRow)> = filtered()
        .select((TransactionRow::as_select(), CashierRow::as_select()))
        .order(payment_transactions::transaction_id.asc())
        .limit(page.limit())
        .offset(page.offset())
        .load(conn)?;

    debug!(
        total_rows,
        returned = rows.len(),
        page = page.page(),
        "Listed transactions"
    );

    Ok(Page {
        rows: rows
            .into_iter()
            .map(|(transaction, cashier)| transaction.into_domain(Some(cashier)))
            .collect::<Result<Vec<_>, _>>()?,
        total_rows,
    })
}
}
