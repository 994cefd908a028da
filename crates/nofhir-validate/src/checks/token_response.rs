//! OAuth2 token response of the SMART launch exchange.

use nofhir_model::{DocRefs, Finding, TokenResponse};

use crate::Accumulator;
use crate::constants::hl7;

pub fn validate_token_response(response: Option<&TokenResponse>) -> Vec<Finding> {
    let mut acc = Accumulator::new();
    let refs = || DocRefs::new().standard(hl7::SMART_LAUNCH_CONTEXT);

    let Some(response) = response else {
        acc.error("Token response is missing");
        return acc.build();
    };

    let required = [
        ("encounter", response.encounter.as_deref()),
        ("patient", response.patient.as_deref()),
        ("id_token", response.id_token.as_deref()),
        ("access_token", response.access_token.as_deref()),
        ("scope", response.scope.as_deref()),
    ];
    for (field, value) in required {
        if value.is_none_or(str::is_empty) {
            acc.error_with(format!("Token response is missing {field}"), refs());
        }
    }

    match response.token_type.as_deref() {
        Some("Bearer") => {}
        other => acc.error(format!(
            "Token response token_type must be \"Bearer\", but was \"{}\"",
            other.unwrap_or("undefined")
        )),
    }

    if response.has_field("practitioner") {
        acc.warn_with(
            "Token response contains a practitioner field, which is not part of the SMART launch context",
            refs(),
        );
    }

    acc.build()
}
