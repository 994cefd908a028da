//! The fixed catalogue of validation sections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use nofhir_model::{DocRefs, ResourceKind};

const HL7_SMART_CONFIGURATION: &str =
    "https://hl7.org/fhir/smart-app-launch/conformance.html#using-well-known";
const HL7_ID_TOKEN: &str =
    "https://hl7.org/fhir/smart-app-launch/scopes-and-launch-context.html#scopes-for-requesting-identity-data";
const HL7_TOKEN_RESPONSE: &str =
    "https://hl7.org/fhir/smart-app-launch/app-launch.html#response-5";
const NAV_DOCS: &str = "https://github.com/navikt/syk-inn/blob/main/docs/fhir";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionGroup {
    General,
    NySykmelding,
}

impl SectionGroup {
    pub const fn title(self) -> &'static str {
        match self {
            Self::General => "General FHIR Resource Validation",
            Self::NySykmelding => "\"Ny sykmelding\" Resource Validation",
        }
    }
}

/// One fetch-then-validate unit of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    SmartConfiguration,
    IdToken,
    TokenResponse,
    Patient,
    Practitioner,
    Encounter,
    Organization,
    Condition,
    DocumentReference,
    WritableBinaryDocumentReference,
    WritableB64DocumentReference,
}

impl Section {
    pub const ALL: [Section; 11] = [
        Self::SmartConfiguration,
        Self::IdToken,
        Self::TokenResponse,
        Self::Patient,
        Self::Practitioner,
        Self::Encounter,
        Self::Organization,
        Self::Condition,
        Self::DocumentReference,
        Self::WritableBinaryDocumentReference,
        Self::WritableB64DocumentReference,
    ];

    /// 1-based position in the catalogue.
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|section| *section == self)
            .map_or(0, |position| position + 1)
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::SmartConfiguration => "smart-configuration",
            Self::IdToken => "id-token",
            Self::TokenResponse => "token-response",
            Self::Patient => "patient",
            Self::Practitioner => "practitioner",
            Self::Encounter => "encounter",
            Self::Organization => "organization",
            Self::Condition => "condition",
            Self::DocumentReference => "document-reference",
            Self::WritableBinaryDocumentReference => "writable-binary-document-reference",
            Self::WritableB64DocumentReference => "writable-b64-document-reference",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::SmartConfiguration => "SMART configuration validation",
            Self::IdToken => "ID token validation",
            Self::TokenResponse => "Token response validation",
            Self::Patient => "Patient validation",
            Self::Practitioner => "Practitioner validation",
            Self::Encounter => "Encounter validation",
            Self::Organization => "Organization validation",
            Self::Condition => "Condition validation",
            Self::DocumentReference => "DocumentReference validation",
            Self::WritableBinaryDocumentReference => {
                "Writable (binary) DocumentReference validation"
            }
            Self::WritableB64DocumentReference => "Writable (b64) DocumentReference validation",
        }
    }

    pub const fn description(self) -> Option<&'static str> {
        match self {
            Self::DocumentReference => Some(
                "Searches document references by the token \"urn:oid:2.16.578.1.12.4.1.1.9602|J01-2\", then validates the first element in the list.",
            ),
            Self::WritableBinaryDocumentReference => Some(
                "Uploads a Binary, then creates a DocumentReference pointing at it and validates what the server returns.",
            ),
            Self::WritableB64DocumentReference => Some(
                "Creates a DocumentReference with a base64 encoded payload and validates what the server returns.",
            ),
            _ => None,
        }
    }

    pub fn references(self) -> DocRefs {
        match self {
            Self::SmartConfiguration => DocRefs::new().standard(HL7_SMART_CONFIGURATION),
            Self::IdToken => DocRefs::new().standard(HL7_ID_TOKEN),
            Self::TokenResponse => DocRefs::new().standard(HL7_TOKEN_RESPONSE),
            Self::Patient => DocRefs::new().local(format!("{NAV_DOCS}/pasient.md")),
            Self::Practitioner => DocRefs::new().local(format!("{NAV_DOCS}/practitioner.md")),
            Self::Encounter => DocRefs::new().local(format!("{NAV_DOCS}/encounter.md")),
            Self::Condition => DocRefs::new().local(format!("{NAV_DOCS}/condition.md")),
            Self::DocumentReference
            | Self::WritableBinaryDocumentReference
            | Self::WritableB64DocumentReference => {
                DocRefs::new().local(format!("{NAV_DOCS}/document-reference.md"))
            }
            Self::Organization => DocRefs::new(),
        }
    }

    pub const fn group(self) -> SectionGroup {
        match self {
            Self::Condition
            | Self::DocumentReference
            | Self::WritableBinaryDocumentReference
            | Self::WritableB64DocumentReference => SectionGroup::NySykmelding,
            _ => SectionGroup::General,
        }
    }

    /// The rule set the section's payload goes through.
    pub const fn kind(self) -> ResourceKind {
        match self {
            Self::SmartConfiguration => ResourceKind::SmartConfiguration,
            Self::IdToken => ResourceKind::IdToken,
            Self::TokenResponse => ResourceKind::TokenResponse,
            Self::Patient => ResourceKind::Patient,
            Self::Practitioner => ResourceKind::Practitioner,
            Self::Encounter => ResourceKind::Encounter,
            Self::Organization => ResourceKind::Organization,
            Self::Condition => ResourceKind::Condition,
            Self::DocumentReference
            | Self::WritableBinaryDocumentReference
            | Self::WritableB64DocumentReference => ResourceKind::DocumentReference,
        }
    }

    /// The read section whose rule set handles `kind`.
    pub const fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::SmartConfiguration => Self::SmartConfiguration,
            ResourceKind::IdToken => Self::IdToken,
            ResourceKind::TokenResponse => Self::TokenResponse,
            ResourceKind::Patient => Self::Patient,
            ResourceKind::Practitioner => Self::Practitioner,
            ResourceKind::Encounter => Self::Encounter,
            ResourceKind::Organization => Self::Organization,
            ResourceKind::Condition => Self::Condition,
            ResourceKind::DocumentReference => Self::DocumentReference,
        }
    }

    /// Sections that create resources on the server.
    pub const fn is_write(self) -> bool {
        matches!(
            self,
            Self::WritableBinaryDocumentReference | Self::WritableB64DocumentReference
        )
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.index(), self.title())
    }
}

/// Accepts the section key (`document-reference`) or its index (`9`).
impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or_else(|| format!("no section with index {index}"));
        }
        Self::ALL
            .into_iter()
            .find(|section| section.key().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown section: {s}"))
    }
}
