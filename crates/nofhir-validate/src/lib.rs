//! Conformance rule sets for no-basis FHIR resources and the SMART launch
//! documents around them.

mod accumulator;
pub mod checks;
pub mod constants;
pub mod util;

pub use accumulator::Accumulator;
pub use checks::{
    parse_fhir_user, validate_conditions, validate_document_reference, validate_encounter,
    validate_id_token, validate_organizations, validate_patient, validate_practitioner,
    validate_smart_configuration, validate_token_response,
};

use serde::de::DeserializeOwned;
use serde_json::Value;

use nofhir_model::{
    Bundle, Finding, IdTokenClaims, ModelError, ResourceKind, Severity, SmartConfiguration,
    TokenResponse, resource_type_of,
};

/// Caller-supplied values some rule sets compare against.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub client_id: String,
    pub fhir_base_url: Option<String>,
    pub expected_document_id: Option<String>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_fhir_base_url(mut self, url: impl Into<String>) -> Self {
        self.fhir_base_url = Some(url.into());
        self
    }

    pub fn with_expected_document_id(mut self, id: impl Into<String>) -> Self {
        self.expected_document_id = Some(id.into());
        self
    }
}

/// Run the rule set for `kind` against a raw JSON document.
///
/// List kinds accept a search Bundle, a JSON array or a single resource. An
/// ID token may be given as its claim object or as the compact JWT string.
pub fn validate_resource(
    kind: ResourceKind,
    value: &Value,
    ctx: &ValidationContext,
) -> Result<Vec<Finding>, ModelError> {
    let findings = match kind {
        ResourceKind::Patient => validate_patient(&decode(value)?),
        ResourceKind::Practitioner => validate_practitioner(&decode(value)?),
        ResourceKind::Organization => validate_organizations(&decode_list(value)?),
        ResourceKind::Encounter => validate_encounter(&decode(value)?),
        ResourceKind::Condition => validate_conditions(&decode_list(value)?),
        ResourceKind::DocumentReference => validate_document_reference(
            &decode(value)?,
            ctx.expected_document_id.as_deref(),
        ),
        ResourceKind::IdToken => {
            let claims = match value {
                Value::Null => None,
                Value::String(jwt) => Some(IdTokenClaims::from_jwt(jwt)?),
                other => Some(decode::<IdTokenClaims>(other)?),
            };
            validate_id_token(
                claims.as_ref(),
                &ctx.client_id,
                ctx.fhir_base_url.as_deref(),
            )
        }
        ResourceKind::TokenResponse => {
            let response = match value {
                Value::Null => None,
                other => Some(decode::<TokenResponse>(other)?),
            };
            validate_token_response(response.as_ref())
        }
        ResourceKind::SmartConfiguration => {
            validate_smart_configuration(&decode::<SmartConfiguration>(value)?)
        }
    };

    tracing::debug!(
        kind = %kind,
        findings = findings.len(),
        errors = count(&findings, Severity::Error),
        warnings = count(&findings, Severity::Warning),
        "validated resource"
    );
    Ok(findings)
}

fn count(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity() == severity).count()
}

/// Elements of the wrong type already decode as absent; a document that is
/// not an object at all decodes as an empty one, so the rule set reports
/// everything as missing.
fn decode<T: DeserializeOwned + Default>(value: &Value) -> Result<T, ModelError> {
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "document does not have the expected shape");
        T::default()
    }))
}

/// Decode a Bundle, an array, or a lone resource into a list.
pub fn decode_list<T: DeserializeOwned + Default>(value: &Value) -> Result<Vec<T>, ModelError> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(decode::<T>)
            .collect(),
        _ if resource_type_of(value) == Some("Bundle") => {
            let bundle: Bundle = decode(value)?;
            bundle.resources().map(decode::<T>).collect()
        }
        other => Ok(vec![decode(other)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_list_accepts_bundle_array_and_single() {
        let single = json!({"resourceType": "Condition"});
        let array = json!([{"resourceType": "Condition"}, null]);
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [{"resource": {"resourceType": "Condition"}}, {"resource": null}]
        });
        for value in [single, array, bundle] {
            let list: Vec<nofhir_model::Condition> = decode_list(&value).expect("decode");
            assert_eq!(list.len(), 1);
        }
    }

    #[test]
    fn null_id_token_reports_missing() {
        let findings = validate_resource(
            ResourceKind::IdToken,
            &Value::Null,
            &ValidationContext::new().with_client_id("app"),
        )
        .expect("validate");
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message(),
            "Missing ID token which was requested by the openid scope."
        );
    }

    #[test]
    fn wrong_typed_elements_still_get_findings() {
        let findings = validate_resource(
            ResourceKind::Patient,
            &json!({
                "resourceType": "Patient",
                "name": [{"family": "Nordmann", "given": "Ola"}]
            }),
            &ValidationContext::new(),
        )
        .expect("validate");
        let messages: Vec<_> = findings.iter().map(Finding::message).collect();
        assert!(messages.contains(&"The Patient must be of type no-basis-Patient"));
        assert!(messages.contains(&"The Patient does not have given name(s)"));
    }

    #[test]
    fn non_object_document_reports_missing_resource_type() {
        let findings = validate_resource(
            ResourceKind::Encounter,
            &json!("not-a-resource"),
            &ValidationContext::new(),
        )
        .expect("validate");
        assert!(findings.iter().any(|f| f.severity() == Severity::Error));
    }
}
