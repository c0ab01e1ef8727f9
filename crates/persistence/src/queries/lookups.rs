// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reference data queries: identification types and cashiers.

use clinica_domain::{Cashier, IdentificationType};
use diesel::prelude::*;
#[cfg(feature = "mysql")]
use diesel::MysqlConnection;
use diesel::SqliteConnection;

use crate::data_models::{CashierRow, IdentificationTypeRow};
use crate::diesel_schema::{cashiers, identification_types};
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves an identification type by code.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the code is unknown.
pub fn get_identification_type(
    conn: &mut _,
    code: &str,
) -> Result<Option<IdentificationType>, PersistenceError> {
    identification_types::table
        .find(code)
        .select(IdentificationTypeRow::as_select())
        .first::<IdentificationTypeRow>(conn)
        .optional()?
        .map(IdentificationType::try_from)
        .transpose()
}
}

backend_fn! {
/// Retrieves a cashier by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the cashier is not found.
pub fn get_cashier(conn: &mut _, cashier_id: i64) -> Result<Option<Cashier>, PersistenceError> {
    cashiers::table
        .find(cashier_id)
        .select(CashierRow::as_select())
        .first::<CashierRow>(conn)
        .optional()?
        .map(Cashier::try_from)
        .transpose()
}
}
