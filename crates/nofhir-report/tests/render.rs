use nofhir_model::{DocRefs, Finding, Severity};
use nofhir_report::{
    RunReport, Section, SectionReport, SectionStatus, render_json, render_table, render_text,
};
use serde_json::{Value, json};

fn sample_run() -> RunReport {
    let mut run = RunReport::new(Some("https://fhir.example.no/r4".to_string()));
    run.set(SectionReport::validated(
        Section::SmartConfiguration,
        vec![
            Finding::new(
                "token_endpoint_auth_methods_supported (OPTIONAL) not found",
                Severity::Info,
            ),
            Finding::new("issuer is REQUIRED", Severity::Error),
            Finding::new("revocation_endpoint is RECOMMENDED", Severity::Warning),
        ],
        Some(json!({ "jwks_uri": "https://fhir.example.no/jwks" })),
    ));
    run.set(SectionReport::validated(
        Section::Patient,
        Vec::new(),
        Some(json!({ "resourceType": "Patient" })),
    ));
    run.set(SectionReport::failed(
        Section::Condition,
        "Unable to fetch Conditions: HTTP 500 Internal Server Error",
    ));
    run
}

#[test]
fn text_report_layout() {
    insta::assert_snapshot!("text_report", render_text(&sample_run(), false));
}

#[test]
fn table_report_mentions_every_section() {
    let rendered = render_table(&sample_run(), true);
    assert!(rendered.contains("1. SMART configuration validation"));
    assert!(rendered.contains("4. Patient validation"));
    assert!(rendered.contains("8. Condition validation"));
    assert!(rendered.contains("No issues to report"));
    assert!(rendered.contains("\"jwks_uri\""));
}

#[test]
fn json_report_ranks_findings() {
    let rendered = render_json(&sample_run()).unwrap();
    let doc: Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(doc["errors"], 2);
    assert_eq!(doc["warnings"], 1);
    assert_eq!(doc["server"], "https://fhir.example.no/r4");

    let first = &doc["sections"][0];
    assert_eq!(first["key"], "smart-configuration");
    assert_eq!(first["status"], "validated");
    let severities: Vec<_> = first["findings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["severity"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(severities, vec!["ERROR", "WARNING", "INFO"]);

    let patient = &doc["sections"][1];
    assert_eq!(patient["findings"][0]["severity"], "OK");
    assert_eq!(patient["payload"]["resourceType"], "Patient");

    let condition = &doc["sections"][2];
    assert_eq!(condition["status"], "failed");
    assert!(condition.get("payload").is_none());
}

#[test]
fn finding_references_survive_export() {
    let mut run = RunReport::new(None);
    run.set(SectionReport::validated(
        Section::Practitioner,
        vec![Finding::with_refs(
            "The Practitioner does not have a telecom property",
            Severity::Error,
            DocRefs::new().local("https://example.no/practitioner.md"),
        )],
        None,
    ));
    let doc: Value = serde_json::from_str(&render_json(&run).unwrap()).unwrap();
    assert_eq!(
        doc["sections"][0]["findings"][0]["references"]["localDocRef"],
        "https://example.no/practitioner.md"
    );
    assert_eq!(run.get(Section::Practitioner).map(SectionReport::status), Some(SectionStatus::Validated));
}
