// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Patient handler tests.

use clinica_domain::RecordState;

use crate::{
    ApiError, PatientQuery, Role, UpdatePatientRequest, create_patient, deactivate_patient,
    get_patient, list_patients, update_patient,
};

use super::helpers::{create_patient_request, create_test_actor, setup_fixture, test_tz};

#[test]
fn test_create_patient_as_receptionist() {
    let mut fixture = setup_fixture();
    let response = create_patient(
        &mut fixture.persistence,
        &create_test_actor(Role::Recepcionista),
        create_patient_request("Lucia", "0911111111"),
        test_tz(),
    )
    .unwrap();

    assert_eq!(response.nombre_completo, "Lucia Mora");
    assert_eq!(response.estado, RecordState::Active);
    assert_eq!(response.audit.usuario_ingreso, "recep1");
    assert_eq!(response.audit.fecha_modificacion, None);
    assert_eq!(
        response
            .tipo_identificacion
            .as_ref()
            .map(|t| t.codigo_tipo_identificacion.as_str()),
        Some("CED")
    );
    assert_eq!(response.audit.fecha_ingreso_formateada.len(), 19);
}

#[test]
fn test_create_patient_forbidden_for_doctor() {
    let mut fixture = setup_fixture();
    let err = create_patient(
        &mut fixture.persistence,
        &create_test_actor(Role::Medico),
        create_patient_request("Lucia", "0911111111"),
        test_tz(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));
}

#[test]
fn test_create_patient_missing_fields() {
    let mut fixture = setup_fixture();
    let mut request = create_patient_request("Lucia", "0911111111");
    request.primer_apellido = String::new();

    let err = create_patient(
        &mut fixture.persistence,
        &create_test_actor(Role::Admin),
        request,
        test_tz(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError { ref field, .. } if field == "primerApellido"));
}

#[test]
fn test_list_patients_paginates() {
    let mut fixture = setup_fixture();
    let admin = create_test_actor(Role::Admin);
    for i in 0..25 {
        create_patient(
            &mut fixture.persistence,
            &admin,
            create_patient_request(&format!("Paciente{i:02}"), &format!("09{i:08}")),
            test_tz(),
        )
        .unwrap();
    }

    let query = |page| PatientQuery {
        page: Some(page),
        limit: Some(10),
        ..PatientQuery::default()
    };
    let doctor = create_test_actor(Role::Medico);

    let second = list_patients(&mut fixture.persistence, &doctor, query(2), test_tz()).unwrap();
    assert_eq!(second.total_rows, 25);
    assert_eq!(second.rows.len(), 10);

    let third = list_patients(&mut fixture.persistence, &doctor, query(3), test_tz()).unwrap();
    assert_eq!(third.total_rows, 25);
    assert_eq!(third.rows.len(), 5);
}

#[test]
fn test_list_patients_rejects_bad_paging_and_state() {
    let mut fixture = setup_fixture();
    let admin = create_test_actor(Role::Admin);

    for query in [
        PatientQuery {
            page: Some(0),
            ..PatientQuery::default()
        },
        PatientQuery {
            limit: Some(101),
            ..PatientQuery::default()
        },
        PatientQuery {
            estado: Some(String::from("X")),
            ..PatientQuery::default()
        },
    ] {
        let err = list_patients(&mut fixture.persistence, &admin, query, test_tz()).unwrap_err();
        assert!(matches!(err, ApiError::ValidationError { .. }));
    }
}

#[test]
fn test_list_patients_by_name_and_state() {
    let mut fixture = setup_fixture();
    let admin = create_test_actor(Role::Admin);
    let carlos = create_patient(
        &mut fixture.persistence,
        &admin,
        create_patient_request("Carlos", "0922222222"),
        test_tz(),
    )
    .unwrap();
    create_patient(
        &mut fixture.persistence,
        &admin,
        create_patient_request("Carla", "0933333333"),
        test_tz(),
    )
    .unwrap();
    deactivate_patient(
        &mut fixture.persistence,
        &admin,
        carlos.id_paciente,
        test_tz(),
    )
    .unwrap();

    let active = list_patients(
        &mut fixture.persistence,
        &admin,
        PatientQuery {
            nombre_completo: Some(String::from("Carl")),
            ..PatientQuery::default()
        },
        test_tz(),
    )
    .unwrap();
    assert_eq!(active.total_rows, 1);
    assert_eq!(active.rows[0].primer_nombre, "Carla");

    let inactive = list_patients(
        &mut fixture.persistence,
        &admin,
        PatientQuery {
            estado: Some(String::from("INACTIVE")),
            ..PatientQuery::default()
        },
        test_tz(),
    )
    .unwrap();
    assert_eq!(inactive.total_rows, 1);
    assert_eq!(inactive.rows[0].id_paciente, carlos.id_paciente);
}

#[test]
fn test_update_ignores_fields_outside_allow_list() {
    let mut fixture = setup_fixture();
    let admin = create_test_actor(Role::Admin);
    let created = create_patient(
        &mut fixture.persistence,
        &admin,
        create_patient_request("Lucia", "0911111111"),
        test_tz(),
    )
    .unwrap();

    let body = serde_json::json!({
        "email": "lucia@correo.com",
        "estado": "INACTIVE",
        "rutaFoto": "/fotos/forged.png",
        "codigoTipoIdentificacion": "PAS",
        "usuarioIngreso": "intruder"
    });
    let request: UpdatePatientRequest = serde_json::from_value(body).unwrap();

    let updated = update_patient(
        &mut fixture.persistence,
        &admin,
        created.id_paciente,
        request,
        test_tz(),
    )
    .unwrap();

    assert_eq!(updated.email.as_deref(), Some("lucia@correo.com"));
    assert_eq!(updated.estado, RecordState::Active);
    assert_eq!(updated.ruta_foto, None);
    assert_eq!(updated.codigo_tipo_identificacion, "CED");
    assert_eq!(updated.audit.usuario_ingreso, "admin");
    assert_eq!(updated.audit.usuario_modificacion.as_deref(), Some("admin"));
    assert!(updated.audit.fecha_modificacion_formateada.is_some());
}

#[test]
fn test_update_null_clears_and_absent_keeps() {
    let mut fixture = setup_fixture();
    let admin = create_test_actor(Role::Admin);
    let mut request = create_patient_request("Lucia", "0911111111");
    request.segundo_nombre = Some(String::from("Maria"));
    request.email = Some(String::from("lucia@correo.com"));
    let created = create_patient(&mut fixture.persistence, &admin, request, test_tz()).unwrap();

    let request: UpdatePatientRequest =
        serde_json::from_value(serde_json::json!({ "email": null })).unwrap();
    assert_eq!(request.email, Some(None));
    assert_eq!(request.segundo_nombre, None);

    let updated = update_patient(
        &mut fixture.persistence,
        &admin,
        created.id_paciente,
        request,
        test_tz(),
    )
    .unwrap();

    assert_eq!(updated.email, None);
    assert_eq!(updated.segundo_nombre.as_deref(), Some("Maria"));
}

#[test]
fn test_update_forbidden_for_receptionist() {
    let mut fixture = setup_fixture();
    let err = update_patient(
        &mut fixture.persistence,
        &create_test_actor(Role::Recepcionista),
        1,
        UpdatePatientRequest::default(),
        test_tz(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));
}

#[test]
fn test_deactivate_twice_is_invalid_state() {
    let mut fixture = setup_fixture();
    let admin = create_test_actor(Role::Admin);
    let created = create_patient(
        &mut fixture.persistence,
        &admin,
        create_patient_request("Lucia", "0911111111"),
        test_tz(),
    )
    .unwrap();

    let first = deactivate_patient(
        &mut fixture.persistence,
        &admin,
        created.id_paciente,
        test_tz(),
    )
    .unwrap();
    assert_eq!(first.estado, RecordState::Inactive);

    let err = deactivate_patient(
        &mut fixture.persistence,
        &admin,
        created.id_paciente,
        test_tz(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidState(_)));

    let current = get_patient(
        &mut fixture.persistence,
        &admin,
        created.id_paciente,
        test_tz(),
    )
    .unwrap();
    assert_eq!(current, first);
}

#[test]
fn test_get_missing_patient_is_not_found() {
    let mut fixture = setup_fixture();
    let err = get_patient(
        &mut fixture.persistence,
        &create_test_actor(Role::Cajero),
        77,
        test_tz(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { ref resource, .. } if resource == "Patient"));
}
