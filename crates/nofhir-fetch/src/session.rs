//! Launch session values and the store that keeps them.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use nofhir_model::{IdTokenClaims, TokenResponse};

/// What a completed SMART launch leaves behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionValues {
    pub server_url: String,
    pub token_response: Option<TokenResponse>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
    pub id_token_claims: Option<IdTokenClaims>,
}

impl SessionValues {
    /// Derive the session from a raw token response.
    ///
    /// The `id_token` payload is decoded without verifying its signature. An
    /// undecodable token leaves the claims empty, which the ID token rules
    /// then report.
    pub fn from_token_response(server_url: impl Into<String>, response: TokenResponse) -> Self {
        let id_token_claims = response.id_token.as_deref().and_then(|jwt| {
            IdTokenClaims::from_jwt(jwt)
                .inspect_err(|e| tracing::warn!(error = %e, "could not decode id_token"))
                .ok()
        });
        Self {
            server_url: server_url.into(),
            patient_id: response.patient.clone(),
            encounter_id: response.encounter.clone(),
            id_token_claims,
            token_response: Some(response),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.token_response
            .as_ref()
            .and_then(|response| response.access_token.as_deref())
    }

    pub fn fhir_user(&self) -> Option<&str> {
        self.id_token_claims
            .as_ref()
            .and_then(IdTokenClaims::fhir_user)
    }
}

/// Keyed storage for launch sessions.
pub trait SessionStore: Send + Sync {
    fn get(&self, session_id: &str) -> Option<SessionValues>;
    fn set(&self, session_id: &str, values: SessionValues);
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, SessionValues>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Option<SessionValues> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get(session_id).cloned()
    }

    fn set(&self, session_id: &str, values: SessionValues) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(session_id.to_string(), values);
    }
}
