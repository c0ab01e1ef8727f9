// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types shared by queries and mutations, and their mapping to domain types.

use clinica_domain::{
    AuditFields, Cashier, IdentificationType, PaymentStatus, PaymentTransaction, Patient,
    RecordState,
};
use diesel::prelude::*;

use crate::diesel_schema::{cashiers, identification_types, patients, payment_transactions, users};
use crate::error::PersistenceError;

/// A stored user account, as needed for authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub user_id: i64,
    pub login_code: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub state: RecordState,
    pub audit: AuditFields,
}

fn decode_state(code: &str) -> Result<RecordState, PersistenceError> {
    RecordState::from_code(code).map_err(|e| PersistenceError::CorruptRow(e.to_string()))
}

const fn audit_fields(
    created_at: String,
    created_by: String,
    modified_at: Option<String>,
    modified_by: Option<String>,
) -> AuditFields {
    AuditFields {
        created_at,
        created_by,
        modified_at,
        modified_by,
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct UserRow {
    pub user_id: i64,
    pub login_code: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub state: String,
    pub created_at: String,
    pub created_by: String,
    pub modified_at: Option<String>,
    pub modified_by: Option<String>,
}

impl TryFrom<UserRow> for UserData {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.user_id,
            login_code: row.login_code,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role,
            state: decode_state(&row.state)?,
            audit: audit_fields(
                row.created_at,
                row.created_by,
                row.modified_at,
                row.modified_by,
            ),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = identification_types)]
pub struct IdentificationTypeRow {
    pub code: String,
    pub name: String,
    pub state: String,
}

impl TryFrom<IdentificationTypeRow> for IdentificationType {
    type Error = PersistenceError;

    fn try_from(row: IdentificationTypeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            code: row.code,
            name: row.name,
            state: decode_state(&row.state)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = patients)]
pub struct PatientRow {
    pub patient_id: i64,
    pub identification_type_code: String,
    pub identification_number: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub photo_path: Option<String>,
    pub state: String,
    pub created_at: String,
    pub created_by: String,
    pub modified_at: Option<String>,
    pub modified_by: Option<String>,
}

impl PatientRow {
    /// Builds the domain patient, attaching the joined identification type if any.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRow` if a stored code cannot be decoded.
    pub fn into_domain(
        self,
        identification_type: Option<IdentificationTypeRow>,
    ) -> Result<Patient, PersistenceError> {
        Ok(Patient {
            patient_id: self.patient_id,
            identification_type_code: self.identification_type_code,
            identification_type: identification_type
                .map(IdentificationType::try_from)
                .transpose()?,
            identification_number: self.identification_number,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            second_last_name: self.second_last_name,
            full_name: self.full_name,
            email: self.email,
            photo_path: self.photo_path,
            state: decode_state(&self.state)?,
            audit: audit_fields(
                self.created_at,
                self.created_by,
                self.modified_at,
                self.modified_by,
            ),
        })
    }
}

/// Every column a patient mutation may write.
///
/// `None` writes `NULL`, so the changeset always mirrors the full record.
#[derive(AsChangeset)]
#[diesel(table_name = patients)]
#[diesel(treat_none_as_null = true)]
pub struct PatientChangeset<'a> {
    pub identification_number: &'a str,
    pub first_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub last_name: &'a str,
    pub second_last_name: Option<&'a str>,
    pub full_name: &'a str,
    pub email: Option<&'a str>,
    pub photo_path: Option<&'a str>,
    pub state: &'a str,
    pub modified_at: Option<&'a str>,
    pub modified_by: Option<&'a str>,
}

impl<'a> From<&'a Patient> for PatientChangeset<'a> {
    fn from(patient: &'a Patient) -> Self {
        Self {
            identification_number: &patient.identification_number,
            first_name: &patient.first_name,
            middle_name: patient.middle_name.as_deref(),
            last_name: &patient.last_name,
            second_last_name: patient.second_last_name.as_deref(),
            full_name: &patient.full_name,
            email: patient.email.as_deref(),
            photo_path: patient.photo_path.as_deref(),
            state: patient.state.code(),
            modified_at: patient.audit.modified_at.as_deref(),
            modified_by: patient.audit.modified_by.as_deref(),
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = cashiers)]
pub struct CashierRow {
    pub cashier_id: i64,
    pub user_id: i64,
    pub name: String,
    pub state: String,
    pub created_at: String,
    pub created_by: String,
    pub modified_at: Option<String>,
    pub modified_by: Option<String>,
}

impl TryFrom<CashierRow> for Cashier {
    type Error = PersistenceError;

    fn try_from(row: CashierRow) -> Result<Self, Self::Error> {
        Ok(Self {
            cashier_id: row.cashier_id,
            user_id: row.user_id,
            name: row.name,
            state: decode_state(&row.state)?,
            audit: audit_fields(
                row.created_at,
                row.created_by,
                row.modified_at,
                row.modified_by,
            ),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = payment_transactions)]
pub struct TransactionRow {
    pub transaction_id: i64,
    pub cashier_id: i64,
    pub patient_id: Option<i64>,
    pub amount_cents: i64,
    pub payment_method: String,
    pub reference: Option<String>,
    pub requested_at: String,
    pub status: String,
    pub version: i64,
    pub created_at: String,
    pub created_by: String,
    pub modified_at: Option<String>,
    pub modified_by: Option<String>,
}

impl TransactionRow {
    /// Builds the domain transaction, attaching the joined cashier if any.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRow` if a stored code cannot be decoded.
    pub fn into_domain(
        self,
        cashier: Option<CashierRow>,
    ) -> Result<PaymentTransaction, PersistenceError> {
        Ok(PaymentTransaction {
            transaction_id: self.transaction_id,
            cashier_id: self.cashier_id,
            cashier: cashier.map(Cashier::try_from).transpose()?,
            patient_id: self.patient_id,
            amount_cents: self.amount_cents,
            payment_method: self.payment_method,
            reference: self.reference,
            requested_at: self.requested_at,
            status: PaymentStatus::from_code(&self.status)
                .map_err(|e| PersistenceError::CorruptRow(e.to_string()))?,
            version: self.version,
            audit: audit_fields(
                self.created_at,
                self.created_by,
                self.modified_at,
                self.modified_by,
            ),
        })
    }
}

/// Every column a transaction mutation may write, except `version`.
#[derive(AsChangeset)]
#[diesel(table_name = payment_transactions)]
#[diesel(treat_none_as_null = true)]
pub struct TransactionChangeset<'a> {
    pub amount_cents: i64,
    pub payment_method: &'a str,
    pub reference: Option<&'a str>,
    pub status: &'a str,
    pub modified_at: Option<&'a str>,
    pub modified_by: Option<&'a str>,
}

impl<'a> From<&'a PaymentTransaction> for TransactionChangeset<'a> {
    fn from(transaction: &'a PaymentTransaction) -> Self {
        Self {
            amount_cents: transaction.amount_cents,
            payment_method: &transaction.payment_method,
            reference: transaction.reference.as_deref(),
            status: transaction.status.as_code(),
            modified_at: transaction.audit.modified_at.as_deref(),
            modified_by: transaction.audit.modified_by.as_deref(),
        }
    }
}
