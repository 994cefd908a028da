//! Property tests over arbitrarily degraded fixtures.

use nofhir_model::{ResourceKind, Severity};
use nofhir_validate::{ValidationContext, validate_resource};
use proptest::prelude::*;
use serde_json::Value;

fn fixture(kind: ResourceKind) -> Value {
    let raw = match kind {
        ResourceKind::Patient => include_str!("fixtures/patient.json"),
        ResourceKind::Practitioner => include_str!("fixtures/practitioner.json"),
        ResourceKind::Organization => include_str!("fixtures/organizations.json"),
        ResourceKind::Encounter => include_str!("fixtures/encounter.json"),
        ResourceKind::Condition => include_str!("fixtures/conditions.json"),
        ResourceKind::DocumentReference => include_str!("fixtures/document_reference.json"),
        ResourceKind::IdToken => include_str!("fixtures/id_token.json"),
        ResourceKind::TokenResponse => include_str!("fixtures/token_response.json"),
        ResourceKind::SmartConfiguration => include_str!("fixtures/smart_configuration.json"),
    };
    serde_json::from_str(raw).unwrap()
}

/// The fixture with a subset of its top-level members removed.
fn degraded() -> impl Strategy<Value = (ResourceKind, Value)> {
    proptest::sample::select(ResourceKind::ALL.to_vec()).prop_flat_map(|kind| {
        let value = fixture(kind);
        let keys: Vec<String> = value
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();
        let len = keys.len();
        proptest::sample::subsequence(keys, 0..=len).prop_map(move |dropped| {
            let mut value = value.clone();
            if let Some(object) = value.as_object_mut() {
                for key in &dropped {
                    object.remove(key);
                }
            }
            (kind, value)
        })
    })
}

proptest! {
    #[test]
    fn validation_is_idempotent((kind, value) in degraded()) {
        let ctx = ValidationContext::new()
            .with_client_id("nofhir-app")
            .with_expected_document_id("foo-bar-baz");
        let first = validate_resource(kind, &value, &ctx).unwrap();
        let second = validate_resource(kind, &value, &ctx).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn validators_never_emit_ok((kind, value) in degraded()) {
        let findings = validate_resource(kind, &value, &ValidationContext::new()).unwrap();
        prop_assert!(findings.iter().all(|f| f.severity() != Severity::Ok));
    }
}
