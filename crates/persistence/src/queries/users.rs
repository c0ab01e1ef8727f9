// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User queries.

use diesel::prelude::*;
#[cfg(feature = "mysql")]
use diesel::MysqlConnection;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::{UserData, UserRow};
use crate::diesel_schema::users;
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves a user by login code.
///
/// Login codes are matched exactly.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no user has this login code.
pub fn get_user_by_login(
    conn: &mut _,
    login_code: &str,
) -> Result<Option<UserData>, PersistenceError> {
    debug!(login_code, "Looking up user by login code");

    users::table
        .filter(users::login_code.eq(login_code))
        .select(UserRow::as_select())
        .first::<UserRow>(conn)
        .optional()?
        .map(UserData::try_from)
        .transpose()
}
}

/// Checks a plain-text secret against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
