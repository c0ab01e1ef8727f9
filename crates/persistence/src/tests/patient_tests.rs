// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clinica_domain::{DomainError, PageRequest, PatientFilter, PatientPatch, RecordState};

use super::{create_stamp_at, create_test_new_patient, create_test_patient, create_test_stamp};
use crate::{PersistenceError, SqlitePersistence};

#[test]
fn test_create_patient_derives_full_name() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let mut new_patient = create_test_new_patient("Ana", "0912345678");
    new_patient.middle_name = Some(String::from("Lucia"));
    new_patient.second_last_name = Some(String::from("Gomez"));
    new_patient.email = Some(String::from("ana@correo.com"));

    let patient = persistence
        .create_patient(&new_patient, &create_test_stamp("recep1"))
        .unwrap();

    assert_eq!(patient.full_name, "Ana Lucia Perez Gomez");
    assert_eq!(patient.state, RecordState::Active);
    assert_eq!(patient.photo_path, None);
    assert_eq!(patient.audit.created_by, "recep1");
    assert_eq!(patient.audit.created_at, "2026-02-01T10:00:00Z");
    assert_eq!(patient.audit.modified_by, None);

    let identification_type = patient.identification_type.unwrap();
    assert_eq!(identification_type.code, "CED");
}

#[test]
fn test_create_patient_keeps_explicit_full_name() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let mut new_patient = create_test_new_patient("Ana", "0912345678");
    new_patient.full_name = Some(String::from("Ana P."));

    let patient = persistence
        .create_patient(&new_patient, &create_test_stamp("recep1"))
        .unwrap();

    assert_eq!(patient.full_name, "Ana P.");
}

#[test]
fn test_create_patient_rejects_unknown_identification_type() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let mut new_patient = create_test_new_patient("Ana", "0912345678");
    new_patient.identification_type_code = String::from("XYZ");

    let err = persistence
        .create_patient(&new_patient, &create_test_stamp("recep1"))
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Domain(DomainError::InvalidField { ref field, .. })
            if field == "codigoTipoIdentificacion"
    ));
    let page = persistence
        .list_patients(&PatientFilter::default(), PageRequest::default())
        .unwrap();
    assert_eq!(page.total_rows, 0);
}

#[test]
fn test_create_patient_rejects_invalid_fields() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let mut new_patient = create_test_new_patient("  ", "0912345678");
    new_patient.email = Some(String::from("bad"));

    let err = persistence
        .create_patient(&new_patient, &create_test_stamp("recep1"))
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Domain(DomainError::InvalidField { ref field, .. })
            if field == "primerNombre"
    ));
}

#[test]
fn test_get_missing_patient() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let err = persistence.get_patient(42).unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));
    assert_eq!(err.to_string(), "Patient 42 not found");
}

#[test]
fn test_list_patients_pagination() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    for i in 0..25 {
        create_test_patient(&mut persistence, &format!("Paciente{i:02}"));
    }

    let second = persistence
        .list_patients(
            &PatientFilter::default(),
            PageRequest::new(Some(2), Some(10)).unwrap(),
        )
        .unwrap();
    assert_eq!(second.total_rows, 25);
    assert_eq!(second.rows.len(), 10);
    assert_eq!(second.rows[0].first_name, "Paciente10");

    let third = persistence
        .list_patients(
            &PatientFilter::default(),
            PageRequest::new(Some(3), Some(10)).unwrap(),
        )
        .unwrap();
    assert_eq!(third.total_rows, 25);
    assert_eq!(third.rows.len(), 5);

    let beyond = persistence
        .list_patients(
            &PatientFilter::default(),
            PageRequest::new(Some(9), Some(10)).unwrap(),
        )
        .unwrap();
    assert_eq!(beyond.total_rows, 25);
    assert!(beyond.rows.is_empty());
}

#[test]
fn test_list_patients_filters() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let maria = create_test_patient(&mut persistence, "Maria");
    create_test_patient(&mut persistence, "Mariana");
    create_test_patient(&mut persistence, "Jose");

    let by_name = persistence
        .list_patients(
            &PatientFilter {
                name_contains: Some(String::from("Mari")),
                ..PatientFilter::default()
            },
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(by_name.total_rows, 2);

    let by_number = persistence
        .list_patients(
            &PatientFilter {
                identification_number: Some(maria.identification_number.clone()),
                ..PatientFilter::default()
            },
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(by_number.total_rows, 1);
    assert_eq!(by_number.rows[0].patient_id, maria.patient_id);
}

#[test]
fn test_name_filter_treats_wildcards_literally() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    create_test_patient(&mut persistence, "Ana");
    create_test_patient(&mut persistence, "Luis");
    let mut literal = create_test_new_patient("Rosa", "0999999991");
    literal.full_name = Some(String::from("Rosa_Perez 100%"));
    let literal = persistence
        .create_patient(&literal, &create_test_stamp("recep1"))
        .unwrap();

    let count = |persistence: &mut SqlitePersistence, needle: &str| {
        persistence
            .list_patients(
                &PatientFilter {
                    name_contains: Some(needle.to_string()),
                    ..PatientFilter::default()
                },
                PageRequest::default(),
            )
            .unwrap()
    };

    for needle in ["_", "%", "a_P", "0%"] {
        let page = count(&mut persistence, needle);
        assert_eq!(page.total_rows, 1, "filter {needle:?}");
        assert_eq!(page.rows[0].patient_id, literal.patient_id);
    }
    assert_eq!(count(&mut persistence, "\\").total_rows, 0);
    assert_eq!(count(&mut persistence, "Perez").total_rows, 3);
}

#[test]
fn test_list_patients_defaults_to_active() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let gone = create_test_patient(&mut persistence, "Pedro");
    create_test_patient(&mut persistence, "Lucia");
    persistence
        .deactivate_patient(gone.patient_id, &create_test_stamp("admin"))
        .unwrap();

    let active = persistence
        .list_patients(&PatientFilter::default(), PageRequest::default())
        .unwrap();
    assert_eq!(active.total_rows, 1);
    assert_eq!(active.rows[0].first_name, "Lucia");

    let inactive = persistence
        .list_patients(
            &PatientFilter {
                state: RecordState::Inactive,
                ..PatientFilter::default()
            },
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(inactive.total_rows, 1);
    assert_eq!(inactive.rows[0].patient_id, gone.patient_id);
}

#[test]
fn test_update_patient_applies_patch() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let patient = create_test_patient(&mut persistence, "Ana");

    let updated = persistence
        .update_patient(
            patient.patient_id,
            PatientPatch {
                email: Some(Some(String::from("ana@nuevo.com"))),
                second_last_name: Some(Some(String::from("Ruiz"))),
                ..PatientPatch::default()
            },
            &create_stamp_at("2026-02-02T08:30:00Z", "recep2"),
        )
        .unwrap();

    assert_eq!(updated.email.as_deref(), Some("ana@nuevo.com"));
    assert_eq!(updated.second_last_name.as_deref(), Some("Ruiz"));
    assert_eq!(updated.first_name, "Ana");
    assert_eq!(updated.audit.modified_by.as_deref(), Some("recep2"));
    assert_eq!(
        updated.audit.modified_at.as_deref(),
        Some("2026-02-02T08:30:00Z")
    );
    assert_eq!(updated.audit.created_by, "recep1");

    let reloaded = persistence.get_patient(patient.patient_id).unwrap();
    assert_eq!(reloaded, updated);

    let cleared = persistence
        .update_patient(
            patient.patient_id,
            PatientPatch {
                email: Some(None),
                ..PatientPatch::default()
            },
            &create_test_stamp("admin"),
        )
        .unwrap();
    assert_eq!(cleared.email, None);
    assert_eq!(cleared.second_last_name.as_deref(), Some("Ruiz"));
    assert_eq!(persistence.get_patient(patient.patient_id).unwrap().email, None);
}

#[test]
fn test_update_patient_invalid_patch_leaves_row_unchanged() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let patient = create_test_patient(&mut persistence, "Ana");

    let err = persistence
        .update_patient(
            patient.patient_id,
            PatientPatch {
                first_name: Some(String::from("Anita")),
                email: Some(Some(String::from("sin-arroba"))),
                ..PatientPatch::default()
            },
            &create_test_stamp("recep2"),
        )
        .unwrap_err();

    assert!(matches!(err, PersistenceError::Domain(_)));
    assert_eq!(persistence.get_patient(patient.patient_id).unwrap(), patient);
}

#[test]
fn test_update_missing_patient() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let err = persistence
        .update_patient(7, PatientPatch::default(), &create_test_stamp("recep1"))
        .unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));
}

#[test]
fn test_deactivate_patient_twice() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let patient = create_test_patient(&mut persistence, "Ana");

    let deactivated = persistence
        .deactivate_patient(patient.patient_id, &create_test_stamp("admin"))
        .unwrap();
    assert_eq!(deactivated.state, RecordState::Inactive);
    assert_eq!(deactivated.audit.modified_by.as_deref(), Some("admin"));

    let err = persistence
        .deactivate_patient(
            patient.patient_id,
            &create_stamp_at("2026-03-01T00:00:00Z", "other"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Domain(DomainError::AlreadyInactive { .. })
    ));

    let reloaded = persistence.get_patient(patient.patient_id).unwrap();
    assert_eq!(reloaded, deactivated);
}

#[test]
fn test_attach_patient_photo() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let patient = create_test_patient(&mut persistence, "Ana");

    let updated = persistence
        .attach_patient_photo(
            patient.patient_id,
            "/fotos/abc.png",
            &create_test_stamp("recep1"),
        )
        .unwrap();
    assert_eq!(updated.photo_path.as_deref(), Some("/fotos/abc.png"));

    let err = persistence
        .attach_patient_photo(999, "/fotos/x.png", &create_test_stamp("recep1"))
        .unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));
}
