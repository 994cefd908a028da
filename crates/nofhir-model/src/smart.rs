//! OAuth2 / OIDC / SMART App Launch documents.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::lenient::lenient;

/// Claims carried by the OpenID Connect ID token.
///
/// Kept as the raw claim map; accessors read the few claims the checks need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdTokenClaims(pub Map<String, Value>);

impl IdTokenClaims {
    /// Decode the payload segment of a compact JWT. The signature is not
    /// verified; the launch layer already did that.
    pub fn from_jwt(token: &str) -> Result<Self> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
            return Err(ModelError::MalformedJwt(
                "expected header.payload.signature".to_string(),
            ));
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ModelError::MalformedJwt(e.to_string()))?;
        let claims: Map<String, Value> = serde_json::from_slice(&bytes)?;
        Ok(Self(claims))
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn fhir_user(&self) -> Option<&str> {
        self.str_claim("fhirUser")
    }

    pub fn issuer(&self) -> Option<&str> {
        self.str_claim("iss")
    }

    /// `aud` may be a single string or an array of strings.
    pub fn audience(&self) -> Vec<&str> {
        match self.0.get("aud") {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// The token endpoint response of the SMART launch exchange.
///
/// Launch context parameters sit next to the standard OAuth2 fields; anything
/// else lands in `extra` so non-standard fields can be detected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub encounter: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TokenResponse {
    pub fn has_field(&self, name: &str) -> bool {
        self.extra.contains_key(name)
    }
}

/// `.well-known/smart-configuration` discovery document.
///
/// Values are kept as raw JSON; the checks only care about presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_types_supported: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_methods_supported: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_endpoint: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes_supported: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_types_supported: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_endpoint: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introspection_endpoint: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_endpoint: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_methods_supported: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_jwt_payload() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"fhirUser":"Practitioner/1","aud":"app"}"#);
        let token = format!("eyJhbGciOiJub25lIn0.{payload}.sig");
        let claims = IdTokenClaims::from_jwt(&token).expect("decode");
        assert_eq!(claims.fhir_user(), Some("Practitioner/1"));
        assert_eq!(claims.audience(), vec!["app"]);
        assert_eq!(claims.issuer(), None);
    }

    #[test]
    fn rejects_token_without_payload() {
        assert!(IdTokenClaims::from_jwt("only-one-segment").is_err());
    }

    #[test]
    fn token_response_keeps_unknown_fields() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"a","token_type":"Bearer","practitioner":"Practitioner/1"}"#,
        )
        .expect("parse");
        assert!(response.has_field("practitioner"));
        assert_eq!(response.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn token_response_tolerates_unexpected_types() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"a","expires_in":"3600","patient":42,"token_type":"Bearer"}"#,
        )
        .expect("parse");
        assert_eq!(response.expires_in, Some(Value::from("3600")));
        assert_eq!(response.patient, None);
        assert_eq!(response.access_token.as_deref(), Some("a"));
    }
}
