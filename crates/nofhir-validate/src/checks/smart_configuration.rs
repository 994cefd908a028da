//! SMART App Launch discovery document (`.well-known/smart-configuration`).

use nofhir_model::{DocRefs, Finding, SmartConfiguration};
use serde_json::Value;

use crate::Accumulator;
use crate::constants::hl7;
use crate::util::is_present;

pub fn validate_smart_configuration(config: &SmartConfiguration) -> Vec<Finding> {
    let mut acc = Accumulator::new();
    let refs = || DocRefs::new().standard(hl7::SMART_METADATA);

    let required: [(&str, Option<&Value>); 7] = [
        ("issuer", config.issuer.as_ref()),
        ("jwks_uri", config.jwks_uri.as_ref()),
        ("authorization_endpoint", config.authorization_endpoint.as_ref()),
        ("grant_types_supported", config.grant_types_supported.as_ref()),
        ("token_endpoint", config.token_endpoint.as_ref()),
        ("capabilities", config.capabilities.as_ref()),
        (
            "code_challenge_methods_supported",
            config.code_challenge_methods_supported.as_ref(),
        ),
    ];
    for (field, value) in required {
        if !is_present(value) {
            acc.error_with(format!("{field} is REQUIRED"), refs());
        }
    }

    let recommended: [(&str, Option<&Value>); 4] = [
        ("scopes_supported", config.scopes_supported.as_ref()),
        ("response_types_supported", config.response_types_supported.as_ref()),
        ("introspection_endpoint", config.introspection_endpoint.as_ref()),
        ("revocation_endpoint", config.revocation_endpoint.as_ref()),
    ];
    for (field, value) in recommended {
        if !is_present(value) {
            acc.warn_with(format!("{field} is RECOMMENDED"), refs());
        }
    }

    if !is_present(config.token_endpoint_auth_methods_supported.as_ref()) {
        acc.info_with(
            "token_endpoint_auth_methods_supported (OPTIONAL) not found",
            refs(),
        );
    }

    acc.build()
}
