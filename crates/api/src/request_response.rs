// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Wire names are Spanish camelCase. Request bodies default every field so
//! that a missing value reaches validation and is reported as a field error
//! instead of a decoding failure. Unknown fields are ignored.

use clinica_domain::{
    AuditFields, Cashier, IdentificationType, NewPatient, Page, Patient, PatientPatch,
    PaymentStatus, PaymentTransaction, RecordState, Tz, format_for_display,
};
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Credentials submitted to log in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    /// The user's login code.
    pub codigo_usuario: String,
    /// The user's secret.
    pub clave: String,
}

/// A successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The bearer token.
    pub token: String,
    /// When the token expires, in storage format.
    pub expires_at: String,
}

/// Wraps one page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    /// The rows on this page.
    pub rows: Vec<T>,
    /// Rows matching the filter across all pages.
    pub total_rows: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePatientRequest {
    pub codigo_tipo_identificacion: String,
    pub numero_identificacion: String,
    pub primer_nombre: String,
    pub segundo_nombre: Option<String>,
    pub primer_apellido: String,
    pub segundo_apellido: Option<String>,
    pub nombre_completo: Option<String>,
    pub email: Option<String>,
}

impl From<CreatePatientRequest> for NewPatient {
    fn from(request: CreatePatientRequest) -> Self {
        Self {
            identification_type_code: request.codigo_tipo_identificacion,
            identification_number: request.numero_identificacion,
            first_name: request.primer_nombre,
            middle_name: request.segundo_nombre,
            last_name: request.primer_apellido,
            second_last_name: request.segundo_apellido,
            full_name: request.nombre_completo,
            email: request.email,
        }
    }
}

/// Patient fields a client may change. Anything else in the body is ignored.
///
/// `segundoNombre`, `segundoApellido` and `email` accept `null` to clear the
/// stored value. Leaving them out keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePatientRequest {
    pub primer_nombre: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub segundo_nombre: Option<Option<String>>,
    pub primer_apellido: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub segundo_apellido: Option<Option<String>>,
    pub nombre_completo: Option<String>,
    pub numero_identificacion: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
}

/// Decodes a present field, `null` included, as `Some`.
///
/// Paired with `#[serde(default)]`, an absent field stays `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdatePatientRequest> for PatientPatch {
    fn from(request: UpdatePatientRequest) -> Self {
        Self {
            first_name: request.primer_nombre,
            middle_name: request.segundo_nombre,
            last_name: request.primer_apellido,
            second_last_name: request.segundo_apellido,
            full_name: request.nombre_completo,
            identification_number: request.numero_identificacion,
            email: request.email,
        }
    }
}

/// Query string for the patient listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientQuery {
    /// Substring of the full name.
    pub nombre_completo: Option<String>,
    pub numero_identificacion: Option<String>,
    pub email: Option<String>,
    /// `ACTIVE` or `INACTIVE`; active when omitted.
    pub estado: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationTypeResponse {
    pub codigo_tipo_identificacion: String,
    pub nombre_tipo_identificacion: String,
    pub estado: RecordState,
}

impl From<IdentificationType> for IdentificationTypeResponse {
    fn from(value: IdentificationType) -> Self {
        Self {
            codigo_tipo_identificacion: value.code,
            nombre_tipo_identificacion: value.name,
            estado: value.state,
        }
    }
}

/// Audit columns as sent to clients, with display-formatted companions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditInfo {
    pub fecha_ingreso: String,
    pub fecha_ingreso_formateada: String,
    pub usuario_ingreso: String,
    pub fecha_modificacion: Option<String>,
    pub fecha_modificacion_formateada: Option<String>,
    pub usuario_modificacion: Option<String>,
}

impl AuditInfo {
    fn build(audit: AuditFields, tz: Tz) -> Result<Self, ApiError> {
        Ok(Self {
            fecha_ingreso_formateada: display(&audit.created_at, tz)?,
            fecha_ingreso: audit.created_at,
            usuario_ingreso: audit.created_by,
            fecha_modificacion_formateada: audit
                .modified_at
                .as_deref()
                .map(|v| display(v, tz))
                .transpose()?,
            fecha_modificacion: audit.modified_at,
            usuario_modificacion: audit.modified_by,
        })
    }
}

fn display(value: &str, tz: Tz) -> Result<String, ApiError> {
    format_for_display(value, tz).map_err(|e| ApiError::Internal(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id_paciente: i64,
    pub codigo_tipo_identificacion: String,
    pub tipo_identificacion: Option<IdentificationTypeResponse>,
    pub numero_identificacion: String,
    pub primer_nombre: String,
    pub segundo_nombre: Option<String>,
    pub primer_apellido: String,
    pub segundo_apellido: Option<String>,
    pub nombre_completo: String,
    pub email: Option<String>,
    pub ruta_foto: Option<String>,
    pub estado: RecordState,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl PatientResponse {
    /// Builds the wire form of `patient`, formatting dates in `tz`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if a stored timestamp is malformed.
    pub fn build(patient: Patient, tz: Tz) -> Result<Self, ApiError> {
        Ok(Self {
            id_paciente: patient.patient_id,
            codigo_tipo_identificacion: patient.identification_type_code,
            tipo_identificacion: patient.identification_type.map(Into::into),
            numero_identificacion: patient.identification_number,
            primer_nombre: patient.first_name,
            segundo_nombre: patient.middle_name,
            primer_apellido: patient.last_name,
            segundo_apellido: patient.second_last_name,
            nombre_completo: patient.full_name,
            email: patient.email,
            ruta_foto: patient.photo_path,
            estado: patient.state,
            audit: AuditInfo::build(patient.audit, tz)?,
        })
    }
}

/// Result of a photo upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadResponse {
    pub message: String,
    pub ruta_foto: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTransactionRequest {
    pub secuencia_cajero: Option<i64>,
    pub id_paciente: Option<i64>,
    /// Amount in currency units, at most two decimals.
    pub valor: Option<f64>,
    pub tipo_pago: String,
    pub referencia: Option<String>,
}

/// Transaction fields a client may change. Anything else in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTransactionRequest {
    /// `PENDING`, `SETTLED` or `CANCELLED`.
    pub estado: Option<String>,
    pub tipo_pago: Option<String>,
    pub referencia: Option<String>,
    pub valor: Option<f64>,
    /// The version the client last read; checked when present.
    pub version: Option<i64>,
}

/// Query string for the transaction listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionQuery {
    pub estado: Option<String>,
    /// Inclusive lower bound: a date or an RFC 3339 instant.
    pub fecha_inicio: Option<String>,
    /// Inclusive upper bound: a date or an RFC 3339 instant.
    pub fecha_fin: Option<String>,
    pub secuencia_cajero: Option<i64>,
    pub id_paciente: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashierResponse {
    pub secuencia_cajero: i64,
    pub secuencia_usuario: i64,
    pub nombre: String,
    pub estado: RecordState,
}

impl From<Cashier> for CashierResponse {
    fn from(value: Cashier) -> Self {
        Self {
            secuencia_cajero: value.cashier_id,
            secuencia_usuario: value.user_id,
            nombre: value.name,
            estado: value.state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub codigo_epago: i64,
    pub secuencia_cajero: i64,
    pub cajero: Option<CashierResponse>,
    pub id_paciente: Option<i64>,
    pub valor: f64,
    pub valor_centavos: i64,
    pub tipo_pago: String,
    pub referencia: Option<String>,
    pub fecha_solicitud: String,
    pub fecha_solicitud_formateada: String,
    pub estado: PaymentStatus,
    pub version: i64,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl TransactionResponse {
    /// Builds the wire form of `transaction`, formatting dates in `tz`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if a stored timestamp is malformed.
    pub fn build(transaction: PaymentTransaction, tz: Tz) -> Result<Self, ApiError> {
        Ok(Self {
            codigo_epago: transaction.transaction_id,
            secuencia_cajero: transaction.cashier_id,
            cajero: transaction.cashier.map(Into::into),
            id_paciente: transaction.patient_id,
            valor: cents_to_amount(transaction.amount_cents),
            valor_centavos: transaction.amount_cents,
            tipo_pago: transaction.payment_method,
            referencia: transaction.reference,
            fecha_solicitud_formateada: display(&transaction.requested_at, tz)?,
            fecha_solicitud: transaction.requested_at,
            estado: transaction.status,
            version: transaction.version,
            audit: AuditInfo::build(transaction.audit, tz)?,
        })
    }
}

/// Converts a decimal amount to integer cents.
///
/// # Errors
///
/// Returns `ApiError::ValidationError` for non-finite values, values with
/// more than two decimals, or values out of range.
pub fn amount_to_cents(valor: f64) -> Result<i64, ApiError> {
    let scaled = valor * 100.0;
    let rounded = scaled.round();
    if (scaled - rounded).abs() > 1e-6 {
        return Err(ApiError::validation(
            "valor",
            "must have at most two decimals",
        ));
    }
    rounded
        .to_i64()
        .ok_or_else(|| ApiError::validation("valor", "must be a finite amount"))
}

/// Converts integer cents to a decimal amount.
#[must_use]
pub fn cents_to_amount(cents: i64) -> f64 {
    cents.to_f64().unwrap_or_default() / 100.0
}

impl<T> ListResponse<T> {
    /// Converts a domain page, building each row with `build`.
    ///
    /// # Errors
    ///
    /// Returns the first error `build` reports.
    pub fn try_from_page<U>(
        page: Page<U>,
        build: impl FnMut(U) -> Result<T, ApiError>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            rows: page
                .rows
                .into_iter()
                .map(build)
                .collect::<Result<Vec<_>, _>>()?,
            total_rows: page.total_rows,
        })
    }
}
