// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Clinica backend.
//!
//! This crate stores users, patients, cashiers and payment transactions. It
//! is built on Diesel and supports multiple database backends.
//!
//! ## Database Backend Support
//!
//! - **`SQLite`** (default): development, tests, and single-node deployments
//! - **`MariaDB`/`MySQL`**: enabled with the `mysql` cargo feature
//!
//! ## Migration Strategy
//!
//! Due to `SQL` syntax differences between backends, there are separate
//! migration directories:
//!
//! - `migrations/`: `SQLite`
//! - `migrations_mysql/`: `MySQL`/`MariaDB`
//!
//! Both produce identical schema semantics.
//!
//! ## Mutations
//!
//! Updates and soft-deletes run through [`executor::run_mutation`], which
//! wraps fetch, domain change, and write in one database transaction.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use clinica_domain::{
    AuditStamp, Cashier, DomainError, IdentificationType, NewPatient, NewTransaction, Page,
    PageRequest, Patient, PatientFilter, PatientPatch, PaymentTransaction, TransactionFilter,
    TransactionPatch, apply_patient_patch, apply_transaction_patch,
};
#[cfg(feature = "mysql")]
use diesel::MysqlConnection;
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID, so
/// concurrently running tests never share a database.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Macro to generate monomorphic backend-specific query/mutation functions.
///
/// This macro generates two separate functions from a single function body:
/// - One suffixed with `_sqlite` taking `&mut SqliteConnection`
/// - One suffixed with `_mysql` taking `&mut MysqlConnection`, compiled only
///   with the `mysql` feature
///
/// Diesel needs concrete backend types at compile time, so the body is
/// duplicated rather than made generic. Backend dispatch happens exclusively
/// in the `Persistence` adapter.
///
/// # Usage
///
/// ```ignore
/// backend_fn! {
///     pub fn my_query(conn: &mut _, param: i64) -> Result<String, PersistenceError> {
///         diesel_schema::table::table
///             .filter(diesel_schema::table::id.eq(param))
///             .first::<String>(conn)
///             .map_err(Into::into)
///     }
/// }
/// ```
macro_rules! backend_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $conn:ident : &mut _
            $(, $param:ident : $param_ty:ty)* $(,)?
        ) -> $ret:ty
        $body:block
    ) => {
        pastey::paste! {
            $(#[$meta])*
            $vis fn [<$name _sqlite>] (
                $conn: &mut SqliteConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body

            $(#[$meta])*
            #[cfg(feature = "mysql")]
            $vis fn [<$name _mysql>] (
                $conn: &mut MysqlConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body
        }
    };
}

mod backend;
mod data_models;
mod diesel_schema;
mod error;
pub mod executor;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::UserData;
pub use error::PersistenceError;
pub use queries::verify_password;

use backend::PersistenceBackend;

/// Type alias used by tests and the server for the default backend.
pub type SqlitePersistence = Persistence;

/// Backend-specific database connection.
pub enum BackendConnection {
    Sqlite(SqliteConnection),
    #[cfg(feature = "mysql")]
    Mysql(MysqlConnection),
}

/// Persistence adapter for the clinic records.
///
/// Backend selection happens once at construction time and is transparent
/// to callers.
pub struct Persistence {
    pub(crate) conn: BackendConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_clinica_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Creates a new persistence adapter with a `MySQL`/`MariaDB` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    #[cfg(feature = "mysql")]
    pub fn new_with_mysql(database_url: &str) -> Result<Self, PersistenceError> {
        let mut conn: MysqlConnection = backend::mysql::initialize_database(database_url)?;
        backend::mysql::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Mysql(conn),
        })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => conn.verify_foreign_key_enforcement(),
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => conn.verify_foreign_key_enforcement(),
        }
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Creates a user account. The password is stored as a bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the login code is taken or the insert fails.
    pub fn create_user(
        &mut self,
        login_code: &str,
        email: Option<&str>,
        password: &str,
        role: &str,
        stamp: &AuditStamp,
    ) -> Result<i64, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::users::create_user_sqlite(
                conn, login_code, email, password, role, stamp,
            ),
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => mutations::users::create_user_mysql(
                conn, login_code, email, password, role, stamp,
            ),
        }
    }

    /// Retrieves a user by login code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_login(
        &mut self,
        login_code: &str,
    ) -> Result<Option<UserData>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::users::get_user_by_login_sqlite(conn, login_code)
            }
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => {
                queries::users::get_user_by_login_mysql(conn, login_code)
            }
        }
    }

    // ========================================================================
    // Reference data
    // ========================================================================

    /// Retrieves an identification type by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_identification_type(
        &mut self,
        code: &str,
    ) -> Result<Option<IdentificationType>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::lookups::get_identification_type_sqlite(conn, code)
            }
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => {
                queries::lookups::get_identification_type_mysql(conn, code)
            }
        }
    }

    /// Registers a cashier for an existing user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the insert fails.
    pub fn create_cashier(
        &mut self,
        user_id: i64,
        name: &str,
        stamp: &AuditStamp,
    ) -> Result<i64, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::cashiers::create_cashier_sqlite(conn, user_id, name, stamp)
            }
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => {
                mutations::cashiers::create_cashier_mysql(conn, user_id, name, stamp)
            }
        }
    }

    /// Retrieves a cashier by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_cashier(&mut self, cashier_id: i64) -> Result<Option<Cashier>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::lookups::get_cashier_sqlite(conn, cashier_id),
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => queries::lookups::get_cashier_mysql(conn, cashier_id),
        }
    }

    // ========================================================================
    // Patients
    // ========================================================================

    /// Creates a patient and returns it with its identification type.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Domain` if a field is invalid or the
    /// identification type is unknown or inactive.
    pub fn create_patient(
        &mut self,
        patient: &NewPatient,
        stamp: &AuditStamp,
    ) -> Result<Patient, PersistenceError> {
        patient.validate()?;

        let type_is_usable = self
            .get_identification_type(&patient.identification_type_code)?
            .is_some_and(|t| t.state.is_active());
        if !type_is_usable {
            return Err(DomainError::invalid_field(
                "codigoTipoIdentificacion",
                format!(
                    "unknown or inactive identification type '{}'",
                    patient.identification_type_code
                ),
            )
            .into());
        }

        let patient_id: i64 = match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::patients::insert_patient_sqlite(conn, patient, stamp)?
            }
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => {
                mutations::patients::insert_patient_mysql(conn, patient, stamp)?
            }
        };

        self.get_patient(patient_id)
    }

    /// Retrieves a patient by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the patient does not exist.
    pub fn get_patient(&mut self, patient_id: i64) -> Result<Patient, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::patients::get_patient_sqlite(conn, patient_id),
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => queries::patients::get_patient_mysql(conn, patient_id),
        }
    }

    /// Lists one page of patients matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_patients(
        &mut self,
        filter: &PatientFilter,
        page: PageRequest,
    ) -> Result<Page<Patient>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::patients::list_patients_sqlite(conn, filter, page)
            }
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => {
                queries::patients::list_patients_mysql(conn, filter, page)
            }
        }
    }

    /// Applies an allow-listed patch to a patient in one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the patient does not exist, or
    /// `PersistenceError::Domain` if the patch is invalid. Nothing is
    /// written on error.
    pub fn update_patient(
        &mut self,
        patient_id: i64,
        patch: PatientPatch,
        stamp: &AuditStamp,
    ) -> Result<Patient, PersistenceError> {
        info!(patient_id, actor = %stamp.actor, "Updating patient");
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => executor::run_mutation(
                conn,
                |c| queries::patients::get_patient_sqlite(c, patient_id),
                |p| apply_patient_patch(p, patch, stamp),
                |c, p| mutations::patients::persist_patient_sqlite(c, p),
            ),
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => executor::run_mutation(
                conn,
                |c| queries::patients::get_patient_mysql(c, patient_id),
                |p| apply_patient_patch(p, patch, stamp),
                |c, p| mutations::patients::persist_patient_mysql(c, p),
            ),
        }
    }

    /// Soft-deletes a patient.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Domain(DomainError::AlreadyInactive)` if the
    /// patient is already inactive, or `PersistenceError::NotFound`.
    pub fn deactivate_patient(
        &mut self,
        patient_id: i64,
        stamp: &AuditStamp,
    ) -> Result<Patient, PersistenceError> {
        info!(patient_id, actor = %stamp.actor, "Deactivating patient");
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => executor::run_mutation(
                conn,
                |c| queries::patients::get_patient_sqlite(c, patient_id),
                |p| p.deactivate(stamp),
                |c, p| mutations::patients::persist_patient_sqlite(c, p),
            ),
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => executor::run_mutation(
                conn,
                |c| queries::patients::get_patient_mysql(c, patient_id),
                |p| p.deactivate(stamp),
                |c, p| mutations::patients::persist_patient_mysql(c, p),
            ),
        }
    }

    /// Points a patient at a stored photo.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the patient does not exist.
    pub fn attach_patient_photo(
        &mut self,
        patient_id: i64,
        public_path: &str,
        stamp: &AuditStamp,
    ) -> Result<Patient, PersistenceError> {
        info!(patient_id, public_path, "Attaching patient photo");
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => executor::run_mutation(
                conn,
                |c| queries::patients::get_patient_sqlite(c, patient_id),
                |p| {
                    p.attach_photo(public_path.to_string(), stamp);
                    Ok(())
                },
                |c, p| mutations::patients::persist_patient_sqlite(c, p),
            ),
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => executor::run_mutation(
                conn,
                |c| queries::patients::get_patient_mysql(c, patient_id),
                |p| {
                    p.attach_photo(public_path.to_string(), stamp);
                    Ok(())
                },
                |c, p| mutations::patients::persist_patient_mysql(c, p),
            ),
        }
    }

    // ========================================================================
    // Payment transactions
    // ========================================================================

    /// Registers a `Pending` transaction and returns it with its cashier.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Domain` for invalid input, or
    /// `PersistenceError::NotFound` if the cashier is missing or inactive or
    /// the referenced patient does not exist.
    pub fn create_transaction(
        &mut self,
        transaction: &NewTransaction,
        stamp: &AuditStamp,
    ) -> Result<PaymentTransaction, PersistenceError> {
        transaction.validate()?;

        let cashier_is_usable = self
            .get_cashier(transaction.cashier_id)?
            .is_some_and(|c| c.state.is_active());
        if !cashier_is_usable {
            return Err(PersistenceError::NotFound(format!(
                "Cashier {} not found",
                transaction.cashier_id
            )));
        }

        if let Some(patient_id) = transaction.patient_id {
            self.get_patient(patient_id)?;
        }

        let transaction_id: i64 = match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::transactions::insert_transaction_sqlite(conn, transaction, stamp)?
            }
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => {
                mutations::transactions::insert_transaction_mysql(conn, transaction, stamp)?
            }
        };

        self.get_transaction(transaction_id)
    }

    /// Retrieves a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the transaction does not exist.
    pub fn get_transaction(
        &mut self,
        transaction_id: i64,
    ) -> Result<PaymentTransaction, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::transactions::get_transaction_sqlite(conn, transaction_id)
            }
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => {
                queries::transactions::get_transaction_mysql(conn, transaction_id)
            }
        }
    }

    /// Lists one page of transactions matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_transactions(
        &mut self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<PaymentTransaction>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::transactions::list_transactions_sqlite(conn, filter, page)
            }
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => {
                queries::transactions::list_transactions_mysql(conn, filter, page)
            }
        }
    }

    /// Applies an allow-listed patch to a transaction in one atomic unit.
    ///
    /// `expected_version`, when given, must match the stored version.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Domain(DomainError::TerminalStatus)` if the
    /// transaction is settled or cancelled, `PersistenceError::Conflict` on
    /// a version mismatch, or `PersistenceError::NotFound`.
    pub fn update_transaction(
        &mut self,
        transaction_id: i64,
        patch: TransactionPatch,
        expected_version: Option<i64>,
        stamp: &AuditStamp,
    ) -> Result<PaymentTransaction, PersistenceError> {
        info!(transaction_id, actor = %stamp.actor, "Updating transaction");
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => executor::run_mutation(
                conn,
                |c| {
                    queries::transactions::load_transaction_for_update_sqlite(
                        c,
                        transaction_id,
                        expected_version,
                    )
                },
                |t| apply_transaction_patch(t, patch, stamp),
                mutations::transactions::persist_transaction_sqlite,
            ),
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => executor::run_mutation(
                conn,
                |c| {
                    queries::transactions::load_transaction_for_update_mysql(
                        c,
                        transaction_id,
                        expected_version,
                    )
                },
                |t| apply_transaction_patch(t, patch, stamp),
                mutations::transactions::persist_transaction_mysql,
            ),
        }
    }

    /// Soft-deletes a transaction by moving it to `Cancelled`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Domain(DomainError::TerminalStatus)` if the
    /// transaction is already settled or cancelled, or
    /// `PersistenceError::NotFound`.
    pub fn cancel_transaction(
        &mut self,
        transaction_id: i64,
        stamp: &AuditStamp,
    ) -> Result<PaymentTransaction, PersistenceError> {
        info!(transaction_id, actor = %stamp.actor, "Cancelling transaction");
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => executor::run_mutation(
                conn,
                |c| {
                    queries::transactions::load_transaction_for_update_sqlite(
                        c,
                        transaction_id,
                        None,
                    )
                },
                |t| t.cancel(stamp),
                mutations::transactions::persist_transaction_sqlite,
            ),
            #[cfg(feature = "mysql")]
            BackendConnection::Mysql(conn) => executor::run_mutation(
                conn,
                |c| {
                    queries::transactions::load_transaction_for_update_mysql(
                        c,
                        transaction_id,
                        None,
                    )
                },
                |t| t.cancel(stamp),
                mutations::transactions::persist_transaction_mysql,
            ),
        }
    }
}
