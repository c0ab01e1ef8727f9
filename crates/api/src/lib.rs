// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the Clinica backend.
//!
//! This crate sits between the HTTP server and persistence. It owns
//! authentication and role checks, translates lower-layer errors into the
//! API taxonomy, converts wire DTOs to domain types, and stores patient
//! photos. It knows nothing about HTTP itself.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod auth;
mod error;
mod handlers;
mod photos;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{
    ANY_ROLE, AuthenticatedActor, AuthenticationService, AuthorizationService, Claims,
    IssuedToken, PATIENT_BROWSERS, PATIENT_CREATORS, PATIENT_EDITORS, Role,
};
pub use error::{ApiError, translate_domain_error, translate_persistence_error};
pub use handlers::{
    cancel_transaction, create_patient, create_transaction, deactivate_patient, get_patient,
    get_patient_photo, get_transaction, list_patients, list_transactions, login,
    update_patient, update_transaction, upload_patient_photo,
};
pub use photos::{
    ALLOWED_CONTENT_TYPES, MAX_PHOTO_BYTES, PUBLIC_PREFIX, PhotoContent, PhotoStore, PhotoUpload,
    StoredPhoto, content_type_for_extension,
};
pub use request_response::{
    AuditInfo, CashierResponse, CreatePatientRequest, CreateTransactionRequest,
    IdentificationTypeResponse, ListResponse, LoginRequest, LoginResponse, PatientQuery,
    PatientResponse, PhotoUploadResponse, TransactionQuery, TransactionResponse,
    UpdatePatientRequest, UpdateTransactionRequest, amount_to_cents, cents_to_amount,
};
