// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    MAX_TEXT_LEN, validate_amount, validate_email, validate_identification_number,
    validate_optional_text, validate_required_text,
};

#[test]
fn test_required_text_rejects_blank() {
    assert!(validate_required_text("primerNombre", "").is_err());
    assert!(validate_required_text("primerNombre", "   ").is_err());
    assert!(validate_required_text("primerNombre", "Ana").is_ok());
}

#[test]
fn test_text_length_limit() {
    let long = "x".repeat(MAX_TEXT_LEN + 1);
    assert!(validate_optional_text("referencia", Some(&long)).is_err());
    assert!(validate_optional_text("referencia", Some(&long[1..])).is_ok());
    assert!(validate_optional_text("referencia", None).is_ok());
}

#[test]
fn test_identification_number_characters() {
    assert!(validate_identification_number("0912345678").is_ok());
    assert!(validate_identification_number("AB-1234").is_ok());
    assert!(validate_identification_number("12 34").is_err());
    assert!(validate_identification_number("").is_err());
}

#[test]
fn test_email_plausibility() {
    assert!(validate_email("ana@example.com").is_ok());
    assert!(validate_email("ana.perez@clinica.org.ec").is_ok());
    assert!(validate_email("ana").is_err());
    assert!(validate_email("@example.com").is_err());
    assert!(validate_email("ana@localhost").is_err());
    assert!(validate_email("ana@@example.com").is_err());
    assert!(validate_email("ana maria@example.com").is_err());
}

#[test]
fn test_amount_must_be_positive() {
    assert!(validate_amount(1).is_ok());
    assert!(validate_amount(0).is_err());
    assert!(validate_amount(-100).is_err());
}
