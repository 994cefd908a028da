pub mod error;
pub mod finding;
pub mod kind;
pub mod lenient;
pub mod resources;
pub mod smart;

pub use error::{ModelError, Result};
pub use finding::{DocRefs, Finding, Severity};
pub use kind::ResourceKind;
pub use resources::{
    Attachment, Binary, Bundle, BundleEntry, CodeableConcept, Coding, Condition, ContactPoint,
    DocumentReference, DocumentReferenceContent, DocumentReferenceContext, Encounter,
    EncounterDiagnosis, EncounterParticipant, HumanName, Identifier, Meta, Organization, Patient,
    Practitioner, Reference, resource_type_of,
};
pub use smart::{IdTokenClaims, SmartConfiguration, TokenResponse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ranks_follow_declaration_order() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Info > Severity::Ok);
        assert_eq!(Severity::Error.rank(), 3);
        assert_eq!(Severity::Ok.rank(), 0);
    }

    #[test]
    fn finding_serializes_with_uppercase_severity() {
        let finding = Finding::with_refs(
            "The Patient must be of type no-basis-Patient",
            Severity::Error,
            DocRefs::new().local("https://example.org/patient.md"),
        );
        let json = serde_json::to_value(&finding).expect("serialize finding");
        assert_eq!(json["severity"], "ERROR");
        assert_eq!(
            json["references"]["localDocRef"],
            "https://example.org/patient.md"
        );
        let round: Finding = serde_json::from_value(json).expect("deserialize finding");
        assert_eq!(round, finding);
    }

    #[test]
    fn empty_refs_are_omitted() {
        let json = serde_json::to_value(Finding::error("x")).expect("serialize");
        assert!(json.get("references").is_none());
    }

    #[test]
    fn bundle_drops_null_entries() {
        let bundle: Bundle = serde_json::from_str(
            r#"{"resourceType":"Bundle","entry":[{"resource":{"resourceType":"Condition"}},{"resource":null},{}]}"#,
        )
        .expect("parse bundle");
        assert_eq!(bundle.resources().count(), 1);
    }

    #[test]
    fn resource_kind_parses_loose_names() {
        assert_eq!(
            "document-reference".parse::<ResourceKind>().ok(),
            Some(ResourceKind::DocumentReference)
        );
        assert_eq!(
            "SMART_configuration".parse::<ResourceKind>().ok(),
            Some(ResourceKind::SmartConfiguration)
        );
        assert!("Observation".parse::<ResourceKind>().is_err());
        assert_eq!(
            ResourceKind::from_resource_type("Encounter"),
            Some(ResourceKind::Encounter)
        );
    }
}
