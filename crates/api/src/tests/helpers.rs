// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use clinica_domain::{AuditStamp, Tz, parse_timezone};
use clinica_persistence::SqlitePersistence;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    AuthenticatedActor, CreatePatientRequest, CreateTransactionRequest, PhotoStore, Role,
};

pub const TEST_SECRET: &str = "test-signing-secret";

static NEXT_DIR: AtomicU64 = AtomicU64::new(0);

/// Persistence seeded with one user per role and one cashier.
pub struct Fixture {
    pub persistence: SqlitePersistence,
    pub cashier_id: i64,
}

pub fn setup_fixture() -> Fixture {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let stamp = AuditStamp {
        timestamp: String::from("2026-01-01T00:00:00Z"),
        actor: String::from("system"),
    };
    for (login, role) in [
        ("admin", "admin"),
        ("recep1", "recepcionista"),
        ("medico1", "medico"),
        ("caja1", "cajero"),
    ] {
        persistence
            .create_user(login, None, "secreto", role, &stamp)
            .unwrap();
    }
    let caja = persistence.get_user_by_login("caja1").unwrap().unwrap();
    let cashier_id = persistence
        .create_cashier(caja.user_id, "Caja 1", &stamp)
        .unwrap();
    Fixture {
        persistence,
        cashier_id,
    }
}

pub fn create_test_actor(role: Role) -> AuthenticatedActor {
    let (user_id, login) = match role {
        Role::Admin => (1, "admin"),
        Role::Recepcionista => (2, "recep1"),
        Role::Medico => (3, "medico1"),
        Role::Cajero => (4, "caja1"),
    };
    AuthenticatedActor::new(user_id, login.to_string(), role)
}

pub fn test_tz() -> Tz {
    parse_timezone("America/Chicago").unwrap()
}

pub fn create_patient_request(first_name: &str, number: &str) -> CreatePatientRequest {
    CreatePatientRequest {
        codigo_tipo_identificacion: String::from("CED"),
        numero_identificacion: number.to_string(),
        primer_nombre: first_name.to_string(),
        primer_apellido: String::from("Mora"),
        ..CreatePatientRequest::default()
    }
}

pub fn create_transaction_request(cashier_id: i64, valor: f64) -> CreateTransactionRequest {
    CreateTransactionRequest {
        secuencia_cajero: Some(cashier_id),
        valor: Some(valor),
        tipo_pago: String::from("TARJETA"),
        ..CreateTransactionRequest::default()
    }
}

/// A photo store in a fresh directory, removed when dropped.
pub struct TempPhotoStore {
    pub store: PhotoStore,
    dir: PathBuf,
}

impl TempPhotoStore {
    pub fn new() -> Self {
        let dir = std::env::temp_dir().join(format!(
            "clinica-api-photos-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::SeqCst)
        ));
        let store = PhotoStore::new(&dir).unwrap();
        Self { store, dir }
    }

    pub fn file_count(&self) -> usize {
        std::fs::read_dir(&self.dir).unwrap().count()
    }
}

impl Drop for TempPhotoStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}
