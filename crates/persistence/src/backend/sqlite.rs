// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` connection setup.
//!
//! Opening a connection applies the per-connection PRAGMAs and runs the
//! embedded migrations. The only query helper here is the row ID lookup
//! used after inserts.

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Schema migrations for the `SQLite` backend.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Settings applied to every new connection, in order.
///
/// `busy_timeout` is in milliseconds.
const CONNECTION_PRAGMAS: &[&str] = &["PRAGMA foreign_keys = ON", "PRAGMA busy_timeout = 5000"];

#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Row ID of the latest insert on `conn`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}

/// Fails unless `PRAGMA foreign_keys` reports enforcement on this connection.
///
/// # Errors
///
/// Returns `PersistenceError::ForeignKeyEnforcementNotEnabled` if it is off.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let pragma: ForeignKeysPragma = diesel::sql_query("PRAGMA foreign_keys").get_result(conn)?;
    if pragma.foreign_keys == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    debug!("Foreign key enforcement confirmed");
    Ok(())
}

fn apply_pragmas(conn: &mut SqliteConnection, pragmas: &[&str]) -> Result<(), PersistenceError> {
    for pragma in pragmas {
        diesel::sql_query(*pragma)
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("{pragma}: {e}")))?;
    }
    Ok(())
}

/// Connects to `database_url`, applies the connection PRAGMAs, and brings
/// the schema up to date.
///
/// # Errors
///
/// Returns `DatabaseConnectionFailed`, `QueryFailed` or `MigrationFailed`
/// depending on the step that failed.
pub fn initialize_database(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    info!(database_url, "Opening SQLite database");

    let mut conn = SqliteConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;
    apply_pragmas(&mut conn, CONNECTION_PRAGMAS)?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    info!(count = applied.len(), "Applied pending migrations");

    Ok(conn)
}

/// Switches a file database to write-ahead logging.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    apply_pragmas(conn, &["PRAGMA journal_mode = WAL"])
}
