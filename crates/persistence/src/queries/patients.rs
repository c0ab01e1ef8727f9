// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Patient queries.
//!
//! Every read joins the patient's identification type so callers always
//! receive the eager-loaded lookup.

use clinica_domain::{Page, PageRequest, Patient, PatientFilter};
use diesel::prelude::*;
#[cfg(feature = "mysql")]
use diesel::MysqlConnection;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::{IdentificationTypeRow, PatientRow};
use crate::diesel_schema::{identification_types, patients};
use crate::error::PersistenceError;

/// Builds a `LIKE` pattern matching `needle` literally anywhere in a value.
///
/// `\`, `%` and `_` are escaped with `\`.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

backend_fn! {
/// Retrieves a patient by ID with its identification type.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no patient has this ID.
pub fn get_patient(conn: &mut _, patient_id: i64) -> Result<Patient, PersistenceError> {
    debug!(patient_id, "Loading patient");

    let (patient, identification_type) = patients::table
        .inner_join(identification_types::table)
        .filter(patients::patient_id.eq(patient_id))
        .select((PatientRow::as_select(), IdentificationTypeRow::as_select()))
        .first::<(PatientRow, IdentificationTypeRow)>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Patient {patient_id} not found")))?;

    patient.into_domain(Some(identification_type))
}
}

backend_fn! {
/// Lists patients matching every supplied predicate, one page at a time.
///
/// Runs two passes over the same filtered set: a count, then the page
/// itself ordered by patient ID.
///
/// # Errors
///
/// Returns an error if either pass fails.
pub fn list_patients(
    conn: &mut _,
    filter: &PatientFilter,
    page: PageRequest,
) -> Result<Page<Patient>, PersistenceError> {
    let filtered = || {
        let mut query = patients::table
            .inner_join(identification_types::table)
            .filter(patients::state.eq(filter.state.code()))
            .into_boxed();

        if let Some(name) = filter.name_contains.as_deref() {
            query = query.filter(
                patients::full_name
                    .like(contains_pattern(name))
                    .escape('\\'),
            );
        }
        if let Some(number) = filter.identification_number.as_deref() {
            query = query.filter(patients::identification_number.eq(number.to_string()));
        }
        if let Some(email) = filter.email.as_deref() {
            query = query.filter(patients::email.eq(email.to_string()));
        }
        query
    };

    let total_rows: i64 = filtered().count().get_result(conn)?;

    let rows: Vec<(PatientRow, IdentificationTypeRow)> = filtered()
        .select((PatientRow::as_select(), IdentificationTypeRow::as_select()))
        .order(patients::patient_id.asc())
        .limit(page.limit())
        .offset(page.offset())
        .load(conn)?;

    debug!(
        total_rows,
        returned = rows.len(),
        page = page.page(),
        "Listed patients"
    );

    Ok(Page {
        rows: rows
            .into_iter()
            .map(|(patient, identification_type)| patient.into_domain(Some(identification_type)))
            .collect::<Result<Vec<_>, _>>()?,
        total_rows,
    })
}
}
