// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod patient_tests;

use clinica_domain::{
    AuditStamp, NewPatient, NewTransaction, Patient, PaymentTransaction, RecordState,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::diesel_schema::{cashiers, users};
use crate::{BackendConnection, Persistence, SqlitePersistence};

static NEXT_ID_NUMBER: AtomicU64 = AtomicU64::new(1);

pub fn create_test_stamp(actor: &str) -> AuditStamp {
    AuditStamp {
        timestamp: String::from("2026-02-01T10:00:00Z"),
        actor: actor.to_string(),
    }
}

pub fn create_stamp_at(timestamp: &str, actor: &str) -> AuditStamp {
    AuditStamp {
        timestamp: timestamp.to_string(),
        actor: actor.to_string(),
    }
}

pub fn create_test_new_patient(first_name: &str, identification_number: &str) -> NewPatient {
    NewPatient {
        identification_type_code: String::from("CED"),
        identification_number: identification_number.to_string(),
        first_name: first_name.to_string(),
        middle_name: None,
        last_name: String::from("Perez"),
        second_last_name: None,
        full_name: None,
        email: None,
    }
}

pub fn create_test_patient(persistence: &mut Persistence, first_name: &str) -> Patient {
    let number = format!("09{:08}", NEXT_ID_NUMBER.fetch_add(1, Ordering::SeqCst));
    persistence
        .create_patient(
            &create_test_new_patient(first_name, &number),
            &create_test_stamp("recep1"),
        )
        .unwrap()
}

/// Creates a persistence instance with one active cashier and returns its ID.
pub fn setup_with_cashier() -> (SqlitePersistence, i64) {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let stamp = create_test_stamp("system");
    let user_id = persistence
        .create_user("caja1", None, "secreto", "cajero", &stamp)
        .unwrap();
    let cashier_id = persistence.create_cashier(user_id, "Caja 1", &stamp).unwrap();
    (persistence, cashier_id)
}

pub fn create_test_transaction(
    persistence: &mut Persistence,
    cashier_id: i64,
    amount_cents: i64,
) -> PaymentTransaction {
    persistence
        .create_transaction(
            &NewTransaction {
                cashier_id,
                patient_id: None,
                amount_cents,
                payment_method: String::from("TARJETA"),
                reference: None,
            },
            &create_test_stamp("caja1"),
        )
        .unwrap()
}

pub fn sqlite_conn(persistence: &mut Persistence) -> &mut SqliteConnection {
    match &mut persistence.conn {
        BackendConnection::Sqlite(conn) => conn,
        #[cfg(feature = "mysql")]
        BackendConnection::Mysql(_) => panic!("expected a SQLite connection"),
    }
}

pub fn count_users(persistence: &mut Persistence) -> i64 {
    users::table
        .count()
        .get_result(sqlite_conn(persistence))
        .unwrap()
}

/// Marks a cashier inactive directly in storage.
pub fn deactivate_cashier(persistence: &mut Persistence, cashier_id: i64) {
    diesel::update(cashiers::table.find(cashier_id))
        .set(cashiers::state.eq(RecordState::Inactive.code()))
        .execute(sqlite_conn(persistence))
        .unwrap();
}
