// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Patient records and the rules for creating and changing them.

use crate::audit::{AuditFields, AuditStamp};
use crate::error::DomainError;
use crate::types::{IdentificationType, RecordState};
use crate::validation::{
    validate_email, validate_identification_number, validate_optional_text,
    validate_required_text,
};

/// A stored patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub patient_id: i64,
    pub identification_type_code: String,
    /// Eager-loaded lookup, present when the record was read with its join.
    pub identification_type: Option<IdentificationType>,
    pub identification_number: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    /// Public path of the patient's photo (`/fotos/<file>`).
    pub photo_path: Option<String>,
    pub state: RecordState,
    pub audit: AuditFields,
}

impl Patient {
    /// Soft-deletes the patient.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyInactive` if the patient is already inactive.
    pub fn deactivate(&mut self, stamp: &AuditStamp) -> Result<(), DomainError> {
        if !self.state.is_active() {
            return Err(DomainError::AlreadyInactive {
                entity: "patient".to_string(),
                id: self.patient_id,
            });
        }
        self.state = RecordState::Inactive;
        self.audit.stamp_modification(stamp);
        Ok(())
    }

    /// Points the patient at a newly stored photo.
    pub fn attach_photo(&mut self, public_path: String, stamp: &AuditStamp) {
        self.photo_path = Some(public_path);
        self.audit.stamp_modification(stamp);
    }
}

/// Input for creating a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub identification_type_code: String,
    pub identification_number: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl NewPatient {
    /// Validates the field-level rules for a new patient.
    ///
    /// Whether the identification type exists is checked by the store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` for the first field that fails.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_required_text("codigoTipoIdentificacion", &self.identification_type_code)?;
        validate_identification_number(&self.identification_number)?;
        validate_required_text("primerNombre", &self.first_name)?;
        validate_optional_text("segundoNombre", self.middle_name.as_deref())?;
        validate_required_text("primerApellido", &self.last_name)?;
        validate_optional_text("segundoApellido", self.second_last_name.as_deref())?;
        validate_optional_text("nombreCompleto", self.full_name.as_deref())?;
        if let Some(email) = self.email.as_deref() {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Returns the supplied full name, or one assembled from the name parts.
    #[must_use]
    pub fn resolved_full_name(&self) -> String {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => compose_full_name(
                &self.first_name,
                self.middle_name.as_deref(),
                &self.last_name,
                self.second_last_name.as_deref(),
            ),
        }
    }
}

/// Joins name parts with single spaces, skipping blank optional parts.
#[must_use]
pub fn compose_full_name(
    first_name: &str,
    middle_name: Option<&str>,
    last_name: &str,
    second_last_name: Option<&str>,
) -> String {
    [Some(first_name), middle_name, Some(last_name), second_last_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The fields a client may change on an existing patient.
///
/// Anything not listed here (state, photo, identification type, audit
/// columns) cannot be changed through an update.
///
/// Nullable columns take `Some(None)` to clear the stored value; `None`
/// leaves it as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientPatch {
    pub first_name: Option<String>,
    pub middle_name: Option<Option<String>>,
    pub last_name: Option<String>,
    pub second_last_name: Option<Option<String>>,
    pub full_name: Option<String>,
    pub identification_number: Option<String>,
    pub email: Option<Option<String>>,
}

impl PatientPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.middle_name.is_none()
            && self.last_name.is_none()
            && self.second_last_name.is_none()
            && self.full_name.is_none()
            && self.identification_number.is_none()
            && self.email.is_none()
    }
}

/// Applies a patch to a patient and stamps the modification.
///
/// All fields are validated before any is written, so a rejected patch
/// leaves `patient` untouched.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if a supplied value is invalid.
pub fn apply_patient_patch(
    patient: &mut Patient,
    patch: PatientPatch,
    stamp: &AuditStamp,
) -> Result<(), DomainError> {
    if let Some(v) = patch.first_name.as_deref() {
        validate_required_text("primerNombre", v)?;
    }
    validate_optional_text(
        "segundoNombre",
        patch.middle_name.as_ref().and_then(Option::as_deref),
    )?;
    if let Some(v) = patch.last_name.as_deref() {
        validate_required_text("primerApellido", v)?;
    }
    validate_optional_text(
        "segundoApellido",
        patch.second_last_name.as_ref().and_then(Option::as_deref),
    )?;
    if let Some(v) = patch.full_name.as_deref() {
        validate_required_text("nombreCompleto", v)?;
    }
    if let Some(v) = patch.identification_number.as_deref() {
        validate_identification_number(v)?;
    }
    if let Some(v) = patch.email.as_ref().and_then(Option::as_deref) {
        validate_email(v)?;
    }

    if let Some(v) = patch.first_name {
        patient.first_name = v;
    }
    if let Some(v) = patch.middle_name {
        patient.middle_name = v;
    }
    if let Some(v) = patch.last_name {
        patient.last_name = v;
    }
    if let Some(v) = patch.second_last_name {
        patient.second_last_name = v;
    }
    if let Some(v) = patch.full_name {
        patient.full_name = v;
    }
    if let Some(v) = patch.identification_number {
        patient.identification_number = v;
    }
    if let Some(v) = patch.email {
        patient.email = v;
    }

    patient.audit.stamp_modification(stamp);
    Ok(())
}

/// Optional predicates for listing patients. All supplied predicates must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientFilter {
    /// Substring match on the full name.
    pub name_contains: Option<String>,
    pub identification_number: Option<String>,
    pub email: Option<String>,
    /// Defaults to `Active` when not supplied.
    pub state: RecordState,
}
