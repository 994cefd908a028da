//! Offline checks of saved documents.

use serde_json::Value;
use thiserror::Error;

use nofhir_model::{Bundle, ModelError, ResourceKind, resource_type_of};
use nofhir_report::{RunReport, Section, SectionReport};
use nofhir_validate::{ValidationContext, validate_resource};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("input is not JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("cannot tell the document kind ({0}); pass --kind")]
    UnknownKind(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Validate one saved document and wrap the findings as a single-section run.
///
/// Without `kind`, the kind is taken from `resourceType`, or from the entries
/// of a search Bundle. An ID token may be given as the bare compact JWT.
pub fn check_document(
    kind: Option<ResourceKind>,
    raw: &str,
    ctx: &ValidationContext,
) -> Result<RunReport, CheckError> {
    let value = parse_input(kind, raw)?;
    let kind = match kind {
        Some(kind) => kind,
        None => infer_kind(&value)?,
    };
    let findings = validate_resource(kind, &value, ctx)?;
    tracing::info!(kind = %kind, findings = findings.len(), "checked document");

    let section = Section::for_kind(kind);
    let mut run = RunReport::new(None);
    run.set(SectionReport::validated(section, findings, Some(value)));
    Ok(run)
}

fn parse_input(kind: Option<ResourceKind>, raw: &str) -> Result<Value, CheckError> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(_) if kind == Some(ResourceKind::IdToken) && looks_like_jwt(raw) => {
            Ok(Value::String(raw.trim().to_string()))
        }
        Err(e) => Err(CheckError::NotJson(e)),
    }
}

fn looks_like_jwt(raw: &str) -> bool {
    raw.trim().split('.').count() == 3
}

/// Kind from `resourceType`; bundles use their first typed entry.
pub fn infer_kind(value: &Value) -> Result<ResourceKind, CheckError> {
    let resource_type = match resource_type_of(value) {
        Some("Bundle") => {
            let bundle: Bundle = serde_json::from_value(value.clone())?;
            bundle
                .resources()
                .find_map(resource_type_of)
                .ok_or_else(|| CheckError::UnknownKind("empty Bundle".to_string()))?
                .to_string()
        }
        Some(other) => other.to_string(),
        None if value.is_array() => {
            return value
                .as_array()
                .and_then(|items| items.iter().find_map(resource_type_of))
                .and_then(ResourceKind::from_resource_type)
                .ok_or_else(|| CheckError::UnknownKind("untyped array".to_string()));
        }
        None => return Err(CheckError::UnknownKind("no resourceType".to_string())),
    };
    ResourceKind::from_resource_type(&resource_type)
        .ok_or_else(|| CheckError::UnknownKind(format!("resourceType {resource_type}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn infers_kind_from_bundle_entries() {
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [{ "resource": { "resourceType": "Condition" } }]
        });
        assert_eq!(infer_kind(&bundle).unwrap(), ResourceKind::Condition);
    }

    #[test]
    fn launch_documents_need_explicit_kind() {
        let err = infer_kind(&json!({ "access_token": "x" })).unwrap_err();
        assert!(err.to_string().contains("pass --kind"));
    }

    #[test]
    fn bare_jwt_is_accepted_for_id_tokens() {
        // {"alg":"none"} . {"iss":"x"}
        let jwt = "eyJhbGciOiJub25lIn0.eyJpc3MiOiJ4In0.";
        let value = parse_input(Some(ResourceKind::IdToken), jwt).unwrap();
        assert_eq!(value, Value::String(jwt.to_string()));
        assert!(parse_input(Some(ResourceKind::Patient), jwt).is_err());
    }
}
