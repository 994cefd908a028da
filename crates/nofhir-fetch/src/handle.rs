//! The FHIR handle: the one seam between the sections and the server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use url::Url;

use nofhir_model::{IdTokenClaims, TokenResponse};
use nofhir_validate::parse_fhir_user;

use crate::error::{FetchError, Result};
use crate::session::SessionValues;

const FHIR_JSON: &str = "application/fhir+json";

const USER_AGENT_VALUE: &str = concat!("nofhir/", env!("CARGO_PKG_VERSION"));

/// What the sections need from a launched SMART client.
#[async_trait]
pub trait FhirHandle: Send + Sync {
    /// GET a resource or a search. `path` is relative to the server base or absolute.
    async fn request(&self, path: &str) -> Result<Value>;

    /// POST a new resource to its type endpoint; returns what the server stored.
    async fn create(&self, resource: Value) -> Result<Value>;

    /// PUT a resource at `path`.
    async fn update(&self, path: &str, resource: Value) -> Result<Value>;

    fn server_url(&self) -> &str;
    fn patient_id(&self) -> Option<&str>;
    fn encounter_id(&self) -> Option<&str>;
    /// The `fhirUser` claim as issued, e.g. `Practitioner/123`.
    fn fhir_user(&self) -> Option<&str>;
    fn id_token_claims(&self) -> Option<&IdTokenClaims>;
    fn token_response(&self) -> Option<&TokenResponse>;

    fn fhir_user_type(&self) -> Option<&str> {
        self.fhir_user()
            .and_then(parse_fhir_user)
            .map(|(resource_type, _)| resource_type)
    }
}

/// `{base}/.well-known/smart-configuration`, with no doubled slash.
pub fn well_known_url(base: &str) -> String {
    format!(
        "{}/.well-known/smart-configuration",
        base.trim_end_matches('/')
    )
}

/// Resolve `path` against the server base. Absolute URLs pass through.
pub fn resolve_url(base: &str, path: &str) -> Result<Url> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(Url::parse(path)?);
    }
    let base = Url::parse(&format!("{}/", base.trim_end_matches('/')))?;
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Handle backed by the server's REST API, authorized with the launch token.
#[derive(Debug, Clone)]
pub struct HttpFhirHandle {
    client: reqwest::Client,
    session: SessionValues,
}

impl HttpFhirHandle {
    pub fn new(session: SessionValues, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(token) = session.access_token() {
            let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FetchError::Network(format!("invalid access token: {e}")))?;
            bearer.set_sensitive(true);
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, session })
    }

    pub fn session(&self) -> &SessionValues {
        &self.session
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = status.canonical_reason().unwrap_or("Unknown");
            let message = match diagnostics(&body) {
                Some(detail) => format!("{reason} ({detail})"),
                None => reason.to_string(),
            };
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl FhirHandle for HttpFhirHandle {
    async fn request(&self, path: &str) -> Result<Value> {
        let url = resolve_url(&self.session.server_url, path)?;
        tracing::debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    async fn create(&self, resource: Value) -> Result<Value> {
        let resource_type = nofhir_model::resource_type_of(&resource)
            .ok_or_else(|| FetchError::Json("resource has no resourceType".to_string()))?
            .to_string();
        let url = resolve_url(&self.session.server_url, &resource_type)?;
        tracing::debug!(%url, "POST");
        self.send(
            self.client
                .post(url)
                .header(CONTENT_TYPE, FHIR_JSON)
                .json(&resource),
        )
        .await
    }

    async fn update(&self, path: &str, resource: Value) -> Result<Value> {
        let url = resolve_url(&self.session.server_url, path)?;
        tracing::debug!(%url, "PUT");
        self.send(
            self.client
                .put(url)
                .header(CONTENT_TYPE, FHIR_JSON)
                .json(&resource),
        )
        .await
    }

    fn server_url(&self) -> &str {
        &self.session.server_url
    }

    fn patient_id(&self) -> Option<&str> {
        self.session.patient_id.as_deref()
    }

    fn encounter_id(&self) -> Option<&str> {
        self.session.encounter_id.as_deref()
    }

    fn fhir_user(&self) -> Option<&str> {
        self.session.fhir_user()
    }

    fn id_token_claims(&self) -> Option<&IdTokenClaims> {
        self.session.id_token_claims.as_ref()
    }

    fn token_response(&self) -> Option<&TokenResponse> {
        self.session.token_response.as_ref()
    }
}

/// First `issue[].diagnostics` of an OperationOutcome body.
fn diagnostics(body: &str) -> Option<String> {
    let outcome: Value = serde_json::from_str(body).ok()?;
    outcome
        .get("issue")?
        .as_array()?
        .iter()
        .find_map(|issue| issue.get("diagnostics").and_then(Value::as_str))
        .map(str::to_string)
}
