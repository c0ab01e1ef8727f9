// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions.
//!
//! Each handler checks the actor's role before touching persistence, then
//! converts between wire DTOs and domain types. Handlers are synchronous;
//! the server serializes access to the persistence adapter.

use clinica_domain::{
    NewTransaction, PageRequest, PatientFilter, PaymentStatus, RecordState, TransactionFilter,
    TransactionPatch, Tz, format_timestamp, parse_filter_bound,
};
use clinica_persistence::SqlitePersistence;
use tracing::{info, warn};

use crate::auth::{
    ANY_ROLE, AuthenticatedActor, AuthenticationService, AuthorizationService, PATIENT_BROWSERS,
    PATIENT_CREATORS, PATIENT_EDITORS,
};
use crate::error::ApiError;
use crate::photos::{PhotoContent, PhotoStore, PhotoUpload};
use crate::request_response::{
    CreatePatientRequest, CreateTransactionRequest, ListResponse, LoginRequest, LoginResponse,
    PatientQuery, PatientResponse, PhotoUploadResponse, TransactionQuery, TransactionResponse,
    UpdatePatientRequest, UpdateTransactionRequest, amount_to_cents,
};

/// Treats an empty or whitespace-only filter value as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ========================================================================
// Authentication
// ========================================================================

/// Logs a user in.
///
/// # Errors
///
/// Returns `ApiError::ValidationError` for empty inputs and
/// `ApiError::Unauthorized` for bad credentials.
pub fn login(
    persistence: &mut SqlitePersistence,
    auth: &AuthenticationService,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let issued = auth.login(persistence, &request.codigo_usuario, &request.clave)?;
    Ok(LoginResponse {
        token: issued.token,
        expires_at: format_timestamp(issued.expires_at),
    })
}

// ========================================================================
// Patients
// ========================================================================

/// Registers a patient.
///
/// # Errors
///
/// Returns `ApiError::Forbidden` for roles other than admin or
/// receptionist, and `ApiError::ValidationError` for invalid fields or an
/// unknown identification type.
pub fn create_patient(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: CreatePatientRequest,
    tz: Tz,
) -> Result<PatientResponse, ApiError> {
    AuthorizationService::require_role(actor, PATIENT_CREATORS, "create patients")?;

    let patient = persistence.create_patient(&request.into(), &actor.audit_stamp())?;
    info!(
        patient_id = patient.patient_id,
        actor = %actor.login_code,
        "Patient created"
    );
    PatientResponse::build(patient, tz)
}

/// Lists patients, one page at a time.
///
/// # Errors
///
/// Returns `ApiError::ValidationError` for a bad page, limit, or state.
pub fn list_patients(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    query: PatientQuery,
    tz: Tz,
) -> Result<ListResponse<PatientResponse>, ApiError> {
    AuthorizationService::require_role(actor, PATIENT_BROWSERS, "list patients")?;

    let page = PageRequest::new(query.page, query.limit)?;
    let state = non_blank(query.estado)
        .as_deref()
        .map(str::parse::<RecordState>)
        .transpose()?
        .unwrap_or_default();
    let filter = PatientFilter {
        name_contains: non_blank(query.nombre_completo),
        identification_number: non_blank(query.numero_identificacion),
        email: non_blank(query.email),
        state,
    };

    let rows = persistence.list_patients(&filter, page)?;
    ListResponse::try_from_page(rows, |p| PatientResponse::build(p, tz))
}

/// Retrieves one patient.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if the patient does not exist.
pub fn get_patient(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    patient_id: i64,
    tz: Tz,
) -> Result<PatientResponse, ApiError> {
    AuthorizationService::require_role(actor, ANY_ROLE, "view patients")?;
    PatientResponse::build(persistence.get_patient(patient_id)?, tz)
}

/// Updates the allow-listed fields of a patient.
///
/// # Errors
///
/// Returns `ApiError::Forbidden` for non-admins, `ApiError::NotFound`, or
/// `ApiError::ValidationError` for an invalid value.
pub fn update_patient(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    patient_id: i64,
    request: UpdatePatientRequest,
    tz: Tz,
) -> Result<PatientResponse, ApiError> {
    AuthorizationService::require_role(actor, PATIENT_EDITORS, "update patients")?;

    let patient = persistence.update_patient(patient_id, request.into(), &actor.audit_stamp())?;
    info!(patient_id, actor = %actor.login_code, "Patient updated");
    PatientResponse::build(patient, tz)
}

/// Soft-deletes a patient.
///
/// # Errors
///
/// Returns `ApiError::InvalidState` if the patient is already inactive.
pub fn deactivate_patient(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    patient_id: i64,
    tz: Tz,
) -> Result<PatientResponse, ApiError> {
    AuthorizationService::require_role(actor, PATIENT_EDITORS, "deactivate patients")?;

    let patient = persistence.deactivate_patient(patient_id, &actor.audit_stamp())?;
    info!(patient_id, actor = %actor.login_code, "Patient deactivated");
    PatientResponse::build(patient, tz)
}

/// Stores a patient photo and points the patient at it.
///
/// The file is removed again if the database update fails.
///
/// # Errors
///
/// Returns `ApiError::NotFound` for an unknown patient and
/// `ApiError::ValidationError` for an unacceptable file.
pub fn upload_patient_photo(
    persistence: &mut SqlitePersistence,
    photos: &PhotoStore,
    actor: &AuthenticatedActor,
    patient_id: i64,
    upload: &PhotoUpload,
) -> Result<PhotoUploadResponse, ApiError> {
    AuthorizationService::require_role(actor, ANY_ROLE, "upload patient photos")?;

    persistence.get_patient(patient_id)?;
    let stored = photos.save(upload)?;

    match persistence.attach_patient_photo(patient_id, &stored.public_path, &actor.audit_stamp())
    {
        Ok(patient) => {
            info!(patient_id, path = %stored.public_path, "Patient photo updated");
            Ok(PhotoUploadResponse {
                message: String::from("Foto actualizada"),
                ruta_foto: patient.photo_path.unwrap_or(stored.public_path),
            })
        }
        Err(e) => {
            warn!(patient_id, error = %e, "Photo not attached, removing file");
            photos.discard(&stored);
            Err(e.into())
        }
    }
}

/// Reads a patient's photo.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if the patient has no photo or the file is
/// missing.
pub fn get_patient_photo(
    persistence: &mut SqlitePersistence,
    photos: &PhotoStore,
    actor: &AuthenticatedActor,
    patient_id: i64,
) -> Result<PhotoContent, ApiError> {
    AuthorizationService::require_role(actor, ANY_ROLE, "view patient photos")?;

    let patient = persistence.get_patient(patient_id)?;
    let path = patient.photo_path.ok_or_else(|| ApiError::NotFound {
        resource: String::from("Photo"),
        message: format!("Patient {patient_id} has no photo"),
    })?;
    photos.read(&path)
}

// ========================================================================
// Payment transactions
// ========================================================================

/// Registers a pending payment.
///
/// # Errors
///
/// Returns `ApiError::ValidationError` for missing or invalid fields and
/// `ApiError::NotFound` for an unknown cashier or patient.
pub fn create_transaction(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: CreateTransactionRequest,
    tz: Tz,
) -> Result<TransactionResponse, ApiError> {
    AuthorizationService::require_role(actor, ANY_ROLE, "create transactions")?;

    let cashier_id = request
        .secuencia_cajero
        .ok_or_else(|| ApiError::validation("secuenciaCajero", "is required"))?;
    let valor = request
        .valor
        .ok_or_else(|| ApiError::validation("valor", "is required"))?;

    let new_transaction = NewTransaction {
        cashier_id,
        patient_id: request.id_paciente,
        amount_cents: amount_to_cents(valor)?,
        payment_method: request.tipo_pago,
        reference: request.referencia,
    };

    let transaction = persistence.create_transaction(&new_transaction, &actor.audit_stamp())?;
    info!(
        transaction_id = transaction.transaction_id,
        cashier_id,
        amount_cents = transaction.amount_cents,
        actor = %actor.login_code,
        "Transaction created"
    );
    TransactionResponse::build(transaction, tz)
}

/// Lists transactions, one page at a time.
///
/// # Errors
///
/// Returns `ApiError::ValidationError` for a bad page, limit, status, or
/// date bound.
pub fn list_transactions(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    query: TransactionQuery,
    tz: Tz,
) -> Result<ListResponse<TransactionResponse>, ApiError> {
    AuthorizationService::require_role(actor, ANY_ROLE, "list transactions")?;

    let page = PageRequest::new(query.page, query.limit)?;
    let status = non_blank(query.estado)
        .as_deref()
        .map(str::parse::<PaymentStatus>)
        .transpose()?;
    let from = non_blank(query.fecha_inicio)
        .map(|v| parse_filter_bound(&v, false))
        .transpose()
        .map_err(|e| ApiError::validation("fechaInicio", e.to_string()))?;
    let to = non_blank(query.fecha_fin)
        .map(|v| parse_filter_bound(&v, true))
        .transpose()
        .map_err(|e| ApiError::validation("fechaFin", e.to_string()))?;

    let filter = TransactionFilter {
        status,
        from,
        to,
        cashier_id: query.secuencia_cajero,
        patient_id: query.id_paciente,
    };

    let rows = persistence.list_transactions(&filter, page)?;
    ListResponse::try_from_page(rows, |t| TransactionResponse::build(t, tz))
}

/// Retrieves one transaction.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if the transaction does not exist.
pub fn get_transaction(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    transaction_id: i64,
    tz: Tz,
) -> Result<TransactionResponse, ApiError> {
    AuthorizationService::require_role(actor, ANY_ROLE, "view transactions")?;
    TransactionResponse::build(persistence.get_transaction(transaction_id)?, tz)
}

/// Updates the allow-listed fields of a transaction.
///
/// # Errors
///
/// Returns `ApiError::InvalidState` if the transaction is settled or
/// cancelled, `ApiError::Conflict` if `version` is stale, or
/// `ApiError::ValidationError` for an invalid value.
pub fn update_transaction(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    transaction_id: i64,
    request: UpdateTransactionRequest,
    tz: Tz,
) -> Result<TransactionResponse, ApiError> {
    AuthorizationService::require_role(actor, ANY_ROLE, "update transactions")?;

    let patch = TransactionPatch {
        status: non_blank(request.estado)
            .as_deref()
            .map(str::parse::<PaymentStatus>)
            .transpose()?,
        payment_method: request.tipo_pago,
        reference: request.referencia,
        amount_cents: request.valor.map(amount_to_cents).transpose()?,
    };

    let transaction = persistence.update_transaction(
        transaction_id,
        patch,
        request.version,
        &actor.audit_stamp(),
    )?;
    info!(
        transaction_id,
        status = %transaction.status,
        version = transaction.version,
        actor = %actor.login_code,
        "Transaction updated"
    );
    TransactionResponse::build(transaction, tz)
}

/// Soft-deletes a transaction by cancelling it.
///
/// # Errors
///
/// Returns `ApiError::InvalidState` if the transaction is already settled
/// or cancelled.
pub fn cancel_transaction(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    transaction_id: i64,
    tz: Tz,
) -> Result<TransactionResponse, ApiError> {
    AuthorizationService::require_role(actor, ANY_ROLE, "cancel transactions")?;

    let transaction = persistence.cancel_transaction(transaction_id, &actor.audit_stamp())?;
    info!(transaction_id, actor = %actor.login_code, "Transaction cancelled");
    TransactionResponse::build(transaction, tz)
}
