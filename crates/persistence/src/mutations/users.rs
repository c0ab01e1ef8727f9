// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account mutations.

use clinica_domain::{AuditStamp, RecordState};
use diesel::prelude::*;
#[cfg(feature = "mysql")]
use diesel::MysqlConnection;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::users;
use crate::error::PersistenceError;

backend_fn! {
/// Creates a new user account.
///
/// The password is hashed with bcrypt before it is stored.
///
/// # Errors
///
/// Returns an error if hashing fails, if the login code already exists,
/// or if the role is rejected by the schema.
pub fn create_user(
    conn: &mut _,
    login_code: &str,
    email: Option<&str>,
    password: &str,
    role: &str,
    stamp: &AuditStamp,
) -> Result<i64, PersistenceError> {
    info!(login_code, role, "Creating user");

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(users::table)
        .values((
            users::login_code.eq(login_code),
            users::email.eq(email),
            users::password_hash.eq(&password_hash),
            users::role.eq(role),
            users::state.eq(RecordState::Active.code()),
            users::created_at.eq(&stamp.timestamp),
            users::created_by.eq(&stamp.actor),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;

    info!(user_id, "User created");
    Ok(user_id)
}
}
