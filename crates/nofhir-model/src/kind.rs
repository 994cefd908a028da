use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The kinds of document the checker has a rule set for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Patient,
    Practitioner,
    Organization,
    Encounter,
    Condition,
    DocumentReference,
    IdToken,
    TokenResponse,
    SmartConfiguration,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 9] = [
        Self::Patient,
        Self::Practitioner,
        Self::Organization,
        Self::Encounter,
        Self::Condition,
        Self::DocumentReference,
        Self::IdToken,
        Self::TokenResponse,
        Self::SmartConfiguration,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Practitioner => "Practitioner",
            Self::Organization => "Organization",
            Self::Encounter => "Encounter",
            Self::Condition => "Condition",
            Self::DocumentReference => "DocumentReference",
            Self::IdToken => "ID token",
            Self::TokenResponse => "Token response",
            Self::SmartConfiguration => "SMART configuration",
        }
    }

    /// The FHIR `resourceType`, for kinds that are FHIR resources.
    #[must_use]
    pub const fn resource_type(self) -> Option<&'static str> {
        match self {
            Self::Patient => Some("Patient"),
            Self::Practitioner => Some("Practitioner"),
            Self::Organization => Some("Organization"),
            Self::Encounter => Some("Encounter"),
            Self::Condition => Some("Condition"),
            Self::DocumentReference => Some("DocumentReference"),
            Self::IdToken | Self::TokenResponse | Self::SmartConfiguration => None,
        }
    }

    /// Kinds validated as a list (bundle results), with `[i]` message prefixes.
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::Organization | Self::Condition)
    }

    /// Guess the kind from a `resourceType` value.
    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.resource_type() == Some(resource_type))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ResourceKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let kind = match normalized.as_str() {
            "patient" => Self::Patient,
            "practitioner" => Self::Practitioner,
            "organization" => Self::Organization,
            "encounter" => Self::Encounter,
            "condition" => Self::Condition,
            "documentreference" | "docref" => Self::DocumentReference,
            "idtoken" => Self::IdToken,
            "tokenresponse" => Self::TokenResponse,
            "smartconfiguration" | "smartconfig" | "wellknown" => Self::SmartConfiguration,
            _ => return Err(ModelError::UnknownKind(s.to_string())),
        };
        Ok(kind)
    }
}
