//! Section pipelines against an in-memory FHIR handle.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use nofhir_fetch::{FetchError, FhirHandle, Result, SessionValues, run_section, run_sections};
use nofhir_model::{IdTokenClaims, ResourceKind, Severity, TokenResponse};
use nofhir_report::{Section, SectionStatus};
use nofhir_validate::ValidationContext;

const SERVER: &str = "https://fhir.example.no/r4";

fn fixture(name: &str) -> Value {
    let raw = match name {
        "patient" => include_str!("../../nofhir-validate/tests/fixtures/patient.json"),
        "practitioner" => include_str!("../../nofhir-validate/tests/fixtures/practitioner.json"),
        "organizations" => include_str!("../../nofhir-validate/tests/fixtures/organizations.json"),
        "encounter" => include_str!("../../nofhir-validate/tests/fixtures/encounter.json"),
        "conditions" => include_str!("../../nofhir-validate/tests/fixtures/conditions.json"),
        "document_reference" => {
            include_str!("../../nofhir-validate/tests/fixtures/document_reference.json")
        }
        "id_token" => include_str!("../../nofhir-validate/tests/fixtures/id_token.json"),
        "token_response" => include_str!("../../nofhir-validate/tests/fixtures/token_response.json"),
        "smart_configuration" => {
            include_str!("../../nofhir-validate/tests/fixtures/smart_configuration.json")
        }
        other => panic!("no fixture {other}"),
    };
    serde_json::from_str(raw).unwrap()
}

fn document_search() -> String {
    "DocumentReference?patient=pasient-1&type=urn:oid:2.16.578.1.12.4.1.1.9602|J01-2".to_string()
}

struct FakeHandle {
    session: SessionValues,
    responses: HashMap<String, Value>,
    stored: Mutex<HashMap<String, Value>>,
    next_id: AtomicUsize,
    create_returns_id: bool,
}

impl FakeHandle {
    fn new() -> Self {
        let token_response: TokenResponse =
            serde_json::from_value(fixture("token_response")).unwrap();
        let claims: IdTokenClaims = serde_json::from_value(fixture("id_token")).unwrap();
        let session = SessionValues {
            server_url: SERVER.to_string(),
            patient_id: token_response.patient.clone(),
            encounter_id: token_response.encounter.clone(),
            token_response: Some(token_response),
            id_token_claims: Some(claims),
        };

        let responses = HashMap::from([
            (
                format!("{SERVER}/.well-known/smart-configuration"),
                fixture("smart_configuration"),
            ),
            ("Patient/pasient-1".to_string(), fixture("patient")),
            ("Practitioner/lege-1".to_string(), fixture("practitioner")),
            ("Encounter/konsultasjon-1".to_string(), fixture("encounter")),
            ("Organization".to_string(), fixture("organizations")),
            (
                "Condition?encounter=konsultasjon-1".to_string(),
                fixture("conditions"),
            ),
            (
                document_search(),
                json!({
                    "resourceType": "Bundle",
                    "entry": [{ "resource": fixture("document_reference") }]
                }),
            ),
        ]);

        Self {
            session,
            responses,
            stored: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            create_returns_id: true,
        }
    }

    fn respond(mut self, path: &str, value: Value) -> Self {
        self.responses.insert(path.to_string(), value);
        self
    }

    fn without(mut self, path: &str) -> Self {
        self.responses.remove(path);
        self
    }

    fn with_fhir_user(mut self, fhir_user: Option<&str>) -> Self {
        let claims = self.session.id_token_claims.get_or_insert_with(IdTokenClaims::default);
        match fhir_user {
            Some(user) => claims.0.insert("fhirUser".to_string(), json!(user)),
            None => claims.0.remove("fhirUser"),
        };
        self
    }
}

#[async_trait]
impl FhirHandle for FakeHandle {
    async fn request(&self, path: &str) -> Result<Value> {
        if let Some(value) = self.stored.lock().unwrap().get(path) {
            return Ok(value.clone());
        }
        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                message: "Not Found".to_string(),
            })
    }

    async fn create(&self, mut resource: Value) -> Result<Value> {
        if !self.create_returns_id {
            return Ok(json!({ "resourceType": "OperationOutcome" }));
        }
        let resource_type = resource["resourceType"].as_str().unwrap().to_string();
        let id = format!("{}-{}", resource_type.to_lowercase(), self.next_id.fetch_add(1, Ordering::SeqCst));
        resource["id"] = json!(id);
        self.stored
            .lock()
            .unwrap()
            .insert(format!("{resource_type}/{id}"), resource.clone());
        Ok(resource)
    }

    async fn update(&self, path: &str, resource: Value) -> Result<Value> {
        self.stored
            .lock()
            .unwrap()
            .insert(path.to_string(), resource.clone());
        Ok(resource)
    }

    fn server_url(&self) -> &str {
        &self.session.server_url
    }

    fn patient_id(&self) -> Option<&str> {
        self.session.patient_id.as_deref()
    }

    fn encounter_id(&self) -> Option<&str> {
        self.session.encounter_id.as_deref()
    }

    fn fhir_user(&self) -> Option<&str> {
        self.session.fhir_user()
    }

    fn id_token_claims(&self) -> Option<&IdTokenClaims> {
        self.session.id_token_claims.as_ref()
    }

    fn token_response(&self) -> Option<&TokenResponse> {
        self.session.token_response.as_ref()
    }
}

fn ctx() -> ValidationContext {
    ValidationContext::new()
        .with_client_id("nofhir-app")
        .with_fhir_base_url(SERVER)
}

#[tokio::test]
async fn compliant_server_has_no_errors() {
    let handle = FakeHandle::new();
    let mut completed = Vec::new();
    let run = run_sections(&handle, &Section::ALL, &ctx(), |report| {
        completed.push(report.section());
    })
    .await;

    assert_eq!(completed.len(), Section::ALL.len());
    let order: Vec<_> = run.sections().iter().map(|r| r.section()).collect();
    assert_eq!(order, Section::ALL.to_vec());
    for report in run.sections() {
        assert_eq!(report.status(), SectionStatus::Validated, "{:?}", report.section());
        assert!(!report.has_errors(), "{:?}: {:?}", report.section(), report.findings());
        assert_eq!(report.warning_count(), 0, "{:?}", report.section());
    }
    assert_eq!(run.server.as_deref(), Some(SERVER));
}

#[tokio::test]
async fn fetch_failure_replaces_validation() {
    let handle = FakeHandle::new().without("Patient/pasient-1");
    let report = run_section(&handle, Section::Patient, &ctx()).await;

    assert_eq!(report.status(), SectionStatus::Failed);
    assert_eq!(report.findings().len(), 1);
    assert_eq!(
        report.findings()[0].message(),
        "Unable to fetch Patient: HTTP 404: Not Found"
    );
    assert!(report.payload().is_none());
}

#[tokio::test]
async fn search_must_return_a_bundle() {
    let handle = FakeHandle::new().respond("Organization", fixture("patient"));
    let report = run_section(&handle, Section::Organization, &ctx()).await;

    assert_eq!(report.status(), SectionStatus::Failed);
    assert_eq!(
        report.findings()[0].message(),
        "Unable to fetch Organization: Resource is not of type Bundle (was: Patient)"
    );
}

#[tokio::test]
async fn practitioner_section_requires_practitioner_user() {
    let handle = FakeHandle::new().with_fhir_user(Some("Patient/pasient-1"));
    let report = run_section(&handle, Section::Practitioner, &ctx()).await;
    assert_eq!(
        report.findings()[0].message(),
        "Unable to fetch Practitioner: ID-token fhirUser must be Practitioner, but was \"Patient\""
    );

    let handle = FakeHandle::new().with_fhir_user(None);
    let report = run_section(&handle, Section::Practitioner, &ctx()).await;
    assert_eq!(
        report.findings()[0].message(),
        "Unable to fetch Practitioner: ID-token missing the fhirUser claim."
    );
}

#[tokio::test]
async fn absolute_fhir_user_is_requested_as_is() {
    let absolute = format!("{SERVER}/Practitioner/lege-1");
    let handle = FakeHandle::new()
        .with_fhir_user(Some(absolute.as_str()))
        .respond(&absolute, fixture("practitioner"));
    let report = run_section(&handle, Section::Practitioner, &ctx()).await;
    assert_eq!(report.status(), SectionStatus::Validated);
    assert!(!report.has_errors());
}

#[tokio::test]
async fn empty_document_search_reports_missing_document() {
    let handle = FakeHandle::new().respond(
        &document_search(),
        json!({ "resourceType": "Bundle", "entry": [] }),
    );
    let report = run_section(&handle, Section::DocumentReference, &ctx()).await;

    assert_eq!(report.status(), SectionStatus::Validated);
    assert_eq!(report.findings().len(), 1);
    assert_eq!(report.findings()[0].message(), "No document reference found");
    assert_eq!(report.findings()[0].severity(), Severity::Error);
}

#[tokio::test]
async fn document_search_skips_other_resource_types() {
    let handle = FakeHandle::new().respond(
        &document_search(),
        json!({
            "resourceType": "Bundle",
            "entry": [
                { "resource": { "resourceType": "OperationOutcome" } },
                { "resource": null },
                { "resource": fixture("document_reference") }
            ]
        }),
    );
    let report = run_section(&handle, Section::DocumentReference, &ctx()).await;
    assert!(!report.has_errors(), "{:?}", report.findings());
    assert_eq!(
        report.payload().and_then(|p| p["id"].as_str()),
        Some("foo-bar-baz")
    );
}

#[tokio::test]
async fn create_without_id_is_a_single_error() {
    let mut handle = FakeHandle::new();
    handle.create_returns_id = false;
    let report = run_section(&handle, Section::WritableB64DocumentReference, &ctx()).await;

    assert_eq!(report.status(), SectionStatus::Failed);
    assert_eq!(report.findings().len(), 1);
    assert!(
        report.findings()[0]
            .message()
            .contains("Failed to create DocumentReference"),
        "{}",
        report.findings()[0]
    );
}

#[tokio::test]
async fn binary_write_reads_back_document_by_generated_id() {
    let handle = FakeHandle::new();
    let report = run_section(&handle, Section::WritableBinaryDocumentReference, &ctx()).await;
    assert!(!report.has_errors(), "{:?}", report.findings());

    let payload = report.payload().unwrap();
    let url = payload["content"][0]["attachment"]["url"].as_str().unwrap();
    assert!(url.starts_with("Binary/binary-"));
    let id = payload["id"].as_str().unwrap();
    assert!(handle.stored.lock().unwrap().contains_key(&format!("DocumentReference/{id}")));
}

#[tokio::test]
async fn missing_id_token_is_reported_without_fetching() {
    let mut handle = FakeHandle::new();
    handle.session.id_token_claims = None;
    let report = run_section(&handle, Section::IdToken, &ctx()).await;
    assert_eq!(report.status(), SectionStatus::Validated);
    assert_eq!(
        report.findings()[0].message(),
        "Missing ID token which was requested by the openid scope."
    );
    assert_eq!(Section::IdToken.kind(), ResourceKind::IdToken);
}

#[tokio::test]
async fn malformed_elements_are_validated_not_failed() {
    let handle = FakeHandle::new().respond(
        "Patient/pasient-1",
        json!({
            "resourceType": "Patient",
            "id": "pasient-1",
            "name": [{ "family": "Nordmann", "given": "Ola" }]
        }),
    );
    let report = run_section(&handle, Section::Patient, &ctx()).await;

    assert_eq!(report.status(), SectionStatus::Validated);
    let messages: Vec<_> = report.findings().iter().map(|f| f.message()).collect();
    assert!(messages.contains(&"The Patient must be of type no-basis-Patient"));
    assert!(messages.contains(&"The Patient does not have given name(s)"));
    assert!(report.payload().is_some());
}
