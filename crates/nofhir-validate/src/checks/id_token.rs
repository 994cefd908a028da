//! Claims of the OpenID Connect ID token issued at launch.

use nofhir_model::{DocRefs, Finding, IdTokenClaims};

use crate::Accumulator;
use crate::constants::{FHIR_USER_TYPES, hl7};

pub fn validate_id_token(
    claims: Option<&IdTokenClaims>,
    client_id: &str,
    fhir_base_url: Option<&str>,
) -> Vec<Finding> {
    let mut acc = Accumulator::new();
    let refs = || DocRefs::new().standard(hl7::SMART_LAUNCH_CONTEXT);

    let Some(claims) = claims else {
        acc.error_with(
            "Missing ID token which was requested by the openid scope.",
            refs(),
        );
        return acc.build();
    };

    match claims.fhir_user() {
        None => acc.error_with("ID token is missing the fhirUser claim", refs()),
        Some(fhir_user) => check_fhir_user(&mut acc, fhir_user),
    }

    match claims.issuer() {
        None => acc.error_with("ID token is missing the iss claim", refs()),
        Some(issuer) => {
            if let Some(base) = fhir_base_url
                && issuer.trim_end_matches('/') != base.trim_end_matches('/')
            {
                acc.warn(format!(
                    "ID token iss \"{issuer}\" does not match the FHIR server base URL \"{base}\""
                ));
            }
        }
    }

    // The audience must be exactly the client: a single value, or a
    // one-element array holding it.
    let audience = claims.audience();
    if audience.is_empty() {
        acc.error_with("ID token is missing the aud claim", refs());
    } else if audience != [client_id] {
        acc.error(format!(
            "ID token aud \"{}\" does not equal the client id \"{client_id}\"",
            audience.join(", ")
        ));
    }

    acc.build()
}

/// `fhirUser` may be absolute; only the last two segments are significant.
fn check_fhir_user(acc: &mut Accumulator, fhir_user: &str) {
    let Some((resource_type, resource_id)) = parse_fhir_user(fhir_user) else {
        acc.error(format!(
            "ID token fhirUser \"{fhir_user}\" is not of the form ResourceType/ResourceID"
        ));
        return;
    };

    if !FHIR_USER_TYPES.contains(&resource_type) {
        acc.error(format!(
            "ID token fhirUser resource type must be one of {}, but was \"{resource_type}\"",
            FHIR_USER_TYPES.join(", ")
        ));
    }
    if resource_id.trim().is_empty() {
        acc.error(format!(
            "ID token fhirUser \"{fhir_user}\" does not contain a resource id"
        ));
    }
}

/// Splits a `fhirUser` value into resource type and id.
pub fn parse_fhir_user(fhir_user: &str) -> Option<(&str, &str)> {
    let mut segments = fhir_user.rsplit('/');
    let id = segments.next()?;
    let resource_type = segments.next()?;
    Some((resource_type, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_relative_and_absolute_fhir_user() {
        assert_eq!(parse_fhir_user("Practitioner/abc"), Some(("Practitioner", "abc")));
        assert_eq!(
            parse_fhir_user("https://fhir.example.com/r4/Practitioner/abc"),
            Some(("Practitioner", "abc"))
        );
        assert_eq!(parse_fhir_user("abc"), None);
    }
}
