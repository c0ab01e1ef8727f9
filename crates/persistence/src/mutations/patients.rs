// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Patient mutations.

use clinica_domain::{AuditStamp, NewPatient, Patient, RecordState};
use diesel::prelude::*;
#[cfg(feature = "mysql")]
use diesel::MysqlConnection;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::PatientChangeset;
use crate::diesel_schema::patients;
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a validated patient and returns its ID.
///
/// The full name is derived from the name parts when not supplied.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_patient(
    conn: &mut _,
    patient: &NewPatient,
    stamp: &AuditStamp,
) -> Result<i64, PersistenceError> {
    let full_name: String = patient.resolved_full_name();

    diesel::insert_into(patients::table)
        .values((
            patients::identification_type_code.eq(&patient.identification_type_code),
            patients::identification_number.eq(&patient.identification_number),
            patients::first_name.eq(&patient.first_name),
            patients::middle_name.eq(patient.middle_name.as_deref()),
            patients::last_name.eq(&patient.last_name),
            patients::second_last_name.eq(patient.second_last_name.as_deref()),
            patients::full_name.eq(&full_name),
            patients::email.eq(patient.email.as_deref()),
            patients::state.eq(RecordState::Active.code()),
            patients::created_at.eq(&stamp.timestamp),
            patients::created_by.eq(&stamp.actor),
        ))
        .execute(conn)?;

    let patient_id: i64 = conn.get_last_insert_rowid()?;

    info!(patient_id, created_by = %stamp.actor, "Patient created");
    Ok(patient_id)
}
}

backend_fn! {
/// Writes every mutable column of `patient` back to its row.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the row no longer exists.
pub fn persist_patient(conn: &mut _, patient: &Patient) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(patients::table.find(patient.patient_id))
        .set(PatientChangeset::from(patient))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Patient {} not found",
            patient.patient_id
        )));
    }

    debug!(patient_id = patient.patient_id, "Patient persisted");
    Ok(())
}
}
