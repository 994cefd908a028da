//! Small presence helpers shared by the checks.

use nofhir_model::{HumanName, Identifier};
use serde_json::Value;

/// True when the string is present and not empty.
pub fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Renders an optional value for messages.
pub fn shown(value: Option<&str>) -> &str {
    value.unwrap_or("undefined")
}

pub fn has_identifier(identifiers: Option<&[Identifier]>, system: &str) -> bool {
    identifiers
        .unwrap_or_default()
        .iter()
        .any(|id| id.system.as_deref() == Some(system))
}

/// True when a JSON member counts as present: not null and not an empty string.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Reference of the given type, relative (`Practitioner/1`) or absolute
/// (`https://server/fhir/Practitioner/1`).
pub fn references_type(reference: &str, resource_type: &str) -> bool {
    let relative = format!("{resource_type}/");
    reference.starts_with(&relative) || reference.contains(&format!("/{relative}"))
}

/// The shared name rule: a first name entry with family and given names.
pub fn check_human_name(
    acc: &mut crate::Accumulator,
    resource: &str,
    names: Option<&[HumanName]>,
) {
    let Some(name) = names.and_then(<[HumanName]>::first) else {
        acc.error(format!("The {resource} does not have a name property"));
        return;
    };
    if !has_text(name.family.as_deref()) {
        acc.error(format!("The {resource} does not have a family name"));
    }
    if name.given.as_deref().unwrap_or_default().is_empty() {
        acc.error(format!("The {resource} does not have given name(s)"));
    }
}
