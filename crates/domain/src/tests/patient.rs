// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AuditFields, AuditStamp, DomainError, NewPatient, Patient, PatientPatch, RecordState,
    apply_patient_patch, compose_full_name,
};

fn create_test_stamp(actor: &str) -> AuditStamp {
    AuditStamp {
        timestamp: String::from("2026-02-10T09:00:00Z"),
        actor: actor.to_string(),
    }
}

fn create_test_new_patient() -> NewPatient {
    NewPatient {
        identification_type_code: String::from("CED"),
        identification_number: String::from("0912345678"),
        first_name: String::from("Ana"),
        middle_name: Some(String::from("Lucia")),
        last_name: String::from("Perez"),
        second_last_name: None,
        full_name: None,
        email: Some(String::from("ana@example.com")),
    }
}

fn create_test_patient() -> Patient {
    Patient {
        patient_id: 1,
        identification_type_code: String::from("CED"),
        identification_type: None,
        identification_number: String::from("0912345678"),
        first_name: String::from("Ana"),
        middle_name: None,
        last_name: String::from("Perez"),
        second_last_name: None,
        full_name: String::from("Ana Perez"),
        email: None,
        photo_path: None,
        state: RecordState::Active,
        audit: AuditFields::created(&AuditStamp {
            timestamp: String::from("2026-01-01T00:00:00Z"),
            actor: String::from("admin"),
        }),
    }
}

#[test]
fn test_new_patient_validates() {
    assert!(create_test_new_patient().validate().is_ok());
}

#[test]
fn test_new_patient_requires_names() {
    let mut patient = create_test_new_patient();
    patient.last_name = String::from(" ");
    let err = patient.validate().unwrap_err();
    assert!(
        matches!(err, DomainError::InvalidField { ref field, .. } if field == "primerApellido")
    );
}

#[test]
fn test_new_patient_rejects_bad_email() {
    let mut patient = create_test_new_patient();
    patient.email = Some(String::from("not-an-email"));
    assert!(patient.validate().is_err());
}

#[test]
fn test_full_name_derived_when_missing() {
    assert_eq!(
        create_test_new_patient().resolved_full_name(),
        "Ana Lucia Perez"
    );
}

#[test]
fn test_full_name_kept_when_supplied() {
    let mut patient = create_test_new_patient();
    patient.full_name = Some(String::from("Ana L. Perez"));
    assert_eq!(patient.resolved_full_name(), "Ana L. Perez");

    patient.full_name = Some(String::from("   "));
    assert_eq!(patient.resolved_full_name(), "Ana Lucia Perez");
}

#[test]
fn test_compose_full_name_skips_blank_parts() {
    assert_eq!(
        compose_full_name("Ana", Some(" "), "Perez", Some("Mora")),
        "Ana Perez Mora"
    );
}

#[test]
fn test_deactivate_active_patient() {
    let mut patient = create_test_patient();
    patient.deactivate(&create_test_stamp("admin")).unwrap();
    assert_eq!(patient.state, RecordState::Inactive);
    assert_eq!(patient.audit.modified_by.as_deref(), Some("admin"));
}

#[test]
fn test_deactivate_inactive_patient_fails_without_change() {
    let mut patient = create_test_patient();
    patient.state = RecordState::Inactive;
    let before = patient.clone();

    let err = patient.deactivate(&create_test_stamp("admin")).unwrap_err();

    assert_eq!(
        err,
        DomainError::AlreadyInactive {
            entity: String::from("patient"),
            id: 1,
        }
    );
    assert_eq!(patient, before);
}

#[test]
fn test_patch_applies_only_supplied_fields() {
    let mut patient = create_test_patient();
    let patch = PatientPatch {
        first_name: Some(String::from("Maria")),
        email: Some(Some(String::from("maria@example.com"))),
        ..PatientPatch::default()
    };

    apply_patient_patch(&mut patient, patch, &create_test_stamp("admin")).unwrap();

    assert_eq!(patient.first_name, "Maria");
    assert_eq!(patient.email.as_deref(), Some("maria@example.com"));
    assert_eq!(patient.last_name, "Perez");
    assert_eq!(patient.full_name, "Ana Perez");
    assert_eq!(patient.state, RecordState::Active);
    assert_eq!(patient.audit.created_by, "admin");
    assert_eq!(
        patient.audit.modified_at.as_deref(),
        Some("2026-02-10T09:00:00Z")
    );
}

#[test]
fn test_rejected_patch_leaves_patient_untouched() {
    let mut patient = create_test_patient();
    let before = patient.clone();
    let patch = PatientPatch {
        first_name: Some(String::from("Maria")),
        email: Some(Some(String::from("broken"))),
        ..PatientPatch::default()
    };

    assert!(apply_patient_patch(&mut patient, patch, &create_test_stamp("admin")).is_err());
    assert_eq!(patient, before);
}

#[test]
fn test_empty_patch_detection() {
    assert!(PatientPatch::default().is_empty());
    assert!(
        !PatientPatch {
            middle_name: Some(Some(String::from("Lucia"))),
            ..PatientPatch::default()
        }
        .is_empty()
    );
    assert!(
        !PatientPatch {
            email: Some(None),
            ..PatientPatch::default()
        }
        .is_empty()
    );
}

#[test]
fn test_patch_clears_nullable_fields() {
    let mut patient = create_test_patient();
    patient.middle_name = Some(String::from("Lucia"));
    patient.email = Some(String::from("ana@example.com"));

    let patch = PatientPatch {
        email: Some(None),
        ..PatientPatch::default()
    };
    apply_patient_patch(&mut patient, patch, &create_test_stamp("admin")).unwrap();

    assert_eq!(patient.email, None);
    assert_eq!(patient.middle_name.as_deref(), Some("Lucia"));
}

#[test]
fn test_attach_photo_sets_path_and_stamp() {
    let mut patient = create_test_patient();
    patient.attach_photo(String::from("/fotos/a.png"), &create_test_stamp("recep1"));
    assert_eq!(patient.photo_path.as_deref(), Some("/fotos/a.png"));
    assert_eq!(patient.audit.modified_by.as_deref(), Some("recep1"));
}
