//! National identifier systems, profiles and documentation links.
//!
//! Systems are compared by exact string equality, never normalized.
//!
//! See <https://www.ehelse.no/teknisk-dokumentasjon/oid-identifikatorserier-i-helse-og-omsorgstjenesten>.

/// Norwegian national identity number (FNR).
pub const FNR_SYSTEM: &str = "urn:oid:2.16.578.1.12.4.1.4.1";
/// D-number, accepted in place of an FNR.
pub const DNR_SYSTEM: &str = "urn:oid:2.16.578.1.12.4.1.4.2";
/// Health Personnel Register number.
pub const HPR_SYSTEM: &str = "urn:oid:2.16.578.1.12.4.1.4.4";
/// Address register (HER) id.
pub const HER_SYSTEM: &str = "urn:oid:2.16.578.1.12.4.1.2";
/// Central Coordinating Register for Legal Entities (ENH).
pub const ENH_SYSTEM: &str = "urn:oid:2.16.578.1.12.4.1.4.101";

pub const ICD10_SYSTEM: &str = "urn:oid:2.16.578.1.12.4.1.1.7110";
pub const ICPC2_SYSTEM: &str = "urn:oid:2.16.578.1.12.4.1.1.7170";

/// Document type code system.
pub const DOCUMENT_TYPE_SYSTEM: &str = "urn:oid:2.16.578.1.12.4.1.1.9602";
/// "Sykmeldinger og trygdesaker".
pub const SYKMELDING_DOCUMENT_CODE: &str = "J01-2";

pub const NO_BASIS_PATIENT: &str = "http://hl7.no/fhir/StructureDefinition/no-basis-Patient";
pub const NO_BASIS_PRACTITIONER: &str =
    "http://hl7.no/fhir/StructureDefinition/no-basis-Practitioner";
pub const NO_BASIS_ORGANIZATION: &str =
    "http://hl7.no/fhir/StructureDefinition/no-basis-Organization";

pub const TELECOM_SYSTEMS: &[&str] = &["phone", "fax", "email", "pager", "url", "sms", "other"];
pub const TELECOM_USES: &[&str] = &["home", "work", "temp", "old", "mobile"];

/// Resource types a `fhirUser` claim may point at.
pub const FHIR_USER_TYPES: &[&str] = &["Practitioner", "Patient", "RelatedPerson"];

pub mod hl7 {
    pub const PATIENT: &str = "https://hl7.org/fhir/R4/patient.html";
    pub const PRACTITIONER: &str = "https://hl7.org/fhir/R4/practitioner.html";
    pub const ORGANIZATION: &str = "https://hl7.org/fhir/R4/organization.html";
    pub const CONDITION: &str = "https://hl7.org/fhir/R4/condition.html";
    pub const ENCOUNTER: &str = "https://hl7.org/fhir/R4/encounter.html";
    pub const DOCUMENT_REFERENCE: &str = "https://hl7.org/fhir/R4/documentreference.html";
    pub const CONTACT_POINT: &str = "https://hl7.org/fhir/R4/datatypes.html#ContactPoint";
    pub const SMART_METADATA: &str =
        "https://hl7.org/fhir/smart-app-launch/conformance.html#metadata";
    pub const SMART_LAUNCH_CONTEXT: &str =
        "https://hl7.org/fhir/smart-app-launch/scopes-and-launch-context.html";
}

pub mod simplifier {
    pub const NO_BASIS_PATIENT: &str = "https://simplifier.net/HL7Norwayno-basis/NoBasisPatient";
    pub const NO_BASIS_PRACTITIONER: &str =
        "https://simplifier.net/hl7norwayno-basis/nobasispractitioner";
}

pub mod nav {
    pub const PATIENT: &str = "https://github.com/navikt/syk-inn/blob/main/docs/fhir/pasient.md";
    pub const PRACTITIONER: &str =
        "https://github.com/navikt/syk-inn/blob/main/docs/fhir/practitioner.md";
    pub const CONDITION: &str =
        "https://github.com/navikt/syk-inn/blob/main/docs/fhir/condition.md";
    pub const ENCOUNTER: &str =
        "https://github.com/navikt/syk-inn/blob/main/docs/fhir/encounter.md";
    pub const DOCUMENT_REFERENCE: &str =
        "https://github.com/navikt/syk-inn/blob/main/docs/fhir/document-reference.md";
}
