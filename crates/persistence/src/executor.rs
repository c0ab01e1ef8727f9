// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transactional read-modify-write.
//!
//! Every update and soft-delete goes through [`run_mutation`]: the row is
//! fetched, the domain change is applied, and the result is written back,
//! all inside one database transaction. Any error from any step rolls the
//! transaction back before it is returned, and Diesel's transaction
//! manager releases the transaction on both paths.
//!
//! Callers differ only in which entity they fetch, which domain function
//! they apply, and which columns they persist.

use clinica_domain::DomainError;
use diesel::Connection;
use tracing::{debug, warn};

use crate::error::PersistenceError;

/// Runs `fetch`, `apply`, `persist` as one atomic unit and returns the
/// record as written.
///
/// `persist` may update store-assigned fields on the record, such as a
/// version counter.
///
/// # Errors
///
/// Returns the first error raised by any step. Domain rejections from
/// `apply` surface as `PersistenceError::Domain`. In every error case the
/// database is left exactly as it was before the call.
pub fn run_mutation<C, T, F, A, P>(
    conn: &mut C,
    fetch: F,
    apply: A,
    persist: P,
) -> Result<T, PersistenceError>
where
    C: Connection,
    F: FnOnce(&mut C) -> Result<T, PersistenceError>,
    A: FnOnce(&mut T) -> Result<(), DomainError>,
    P: FnOnce(&mut C, &mut T) -> Result<(), PersistenceError>,
{
    let result = conn.transaction::<T, PersistenceError, _>(|conn| {
        let mut record: T = fetch(conn)?;
        apply(&mut record)?;
        persist(conn, &mut record)?;
        Ok(record)
    });

    match &result {
        Ok(_) => debug!("Mutation committed"),
        Err(e) => warn!(error = %e, "Mutation rolled back"),
    }

    result
}
