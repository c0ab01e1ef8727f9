// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clinica_domain::{AuditStamp, RecordState};
use diesel::prelude::*;
#[cfg(feature = "mysql")]
use diesel::MysqlConnection;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::cashiers;
use crate::error::PersistenceError;

backend_fn! {
/// Registers a cashier operated by an existing user.
///
/// # Errors
///
/// Returns an error if the user does not exist or the insert fails.
pub fn create_cashier(
    conn: &mut _,
    user_id: i64,
    name: &str,
    stamp: &AuditStamp,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(cashiers::table)
        .values((
            cashiers::user_id.eq(user_id),
            cashiers::name.eq(name),
            cashiers::state.eq(RecordState::Active.code()),
            cashiers::created_at.eq(&stamp.timestamp),
            cashiers::created_by.eq(&stamp.actor),
        ))
        .execute(conn)?;

    let cashier_id: i64 = conn.get_last_insert_rowid()?;

    info!(cashier_id, user_id, "Cashier created");
    Ok(cashier_id)
}
}
