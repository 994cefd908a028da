//! Offline checks of saved documents.

use nofhir_cli::check::{CheckError, check_document};
use nofhir_model::{ResourceKind, Severity};
use nofhir_report::{Section, SectionStatus};
use nofhir_validate::ValidationContext;

const PATIENT: &str = include_str!("../../nofhir-validate/tests/fixtures/patient.json");
const CONDITIONS: &str = include_str!("../../nofhir-validate/tests/fixtures/conditions.json");
const TOKEN_RESPONSE: &str =
    include_str!("../../nofhir-validate/tests/fixtures/token_response.json");

fn ctx() -> ValidationContext {
    ValidationContext::new().with_client_id("nofhir-app")
}

#[test]
fn infers_patient_and_finds_no_problems() {
    let run = check_document(None, PATIENT, &ctx()).unwrap();
    let report = run.get(Section::Patient).unwrap();
    assert_eq!(report.status(), SectionStatus::Validated);
    assert!(!run.has_errors());
    assert_eq!(report.ranked()[0].severity(), Severity::Ok);
    assert!(report.payload().is_some());
}

#[test]
fn condition_bundle_goes_to_condition_section() {
    let run = check_document(None, CONDITIONS, &ctx()).unwrap();
    assert!(run.get(Section::Condition).is_some());
    assert_eq!(run.sections().len(), 1);
}

#[test]
fn explicit_kind_overrides_inference() {
    let run = check_document(Some(ResourceKind::TokenResponse), TOKEN_RESPONSE, &ctx()).unwrap();
    assert!(!run.get(Section::TokenResponse).unwrap().has_errors());

    let err = check_document(None, TOKEN_RESPONSE, &ctx()).unwrap_err();
    assert!(matches!(err, CheckError::UnknownKind(_)));
}

#[test]
fn broken_patient_reports_errors() {
    let run = check_document(None, r#"{"resourceType":"Patient"}"#, &ctx()).unwrap();
    assert!(run.has_errors());
    assert!(run.error_count() >= 3);
}

#[test]
fn non_json_input_is_rejected() {
    let err = check_document(None, "<Patient/>", &ctx()).unwrap_err();
    assert!(matches!(err, CheckError::NotJson(_)));
}
