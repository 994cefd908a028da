//! Error types for the fetch boundary.

use thiserror::Error;

use nofhir_model::ModelError;

/// Errors that can occur while talking to the FHIR server.
///
/// Each one ends up as a single ERROR finding for the section that hit it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reason phrase, followed by the server's diagnostics when present.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid JSON: {0}")]
    Json(String),

    /// A search returned something other than a Bundle.
    #[error("Resource is not of type Bundle (was: {0})")]
    NotABundle(String),

    /// The launch did not provide a value the section needs.
    #[error("the launch context has no {0}")]
    MissingContext(&'static str),

    #[error("ID-token missing the fhirUser claim.")]
    MissingFhirUser,

    #[error("ID-token fhirUser must be Practitioner, but was \"{0}\"")]
    WrongUserType(String),

    /// A create or update answered without an `id`.
    #[error("Failed to create {resource}: {detail}")]
    CreateFailed {
        resource: &'static str,
        detail: String,
    },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether running the section again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Json(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<ModelError> for FetchError {
    fn from(err: ModelError) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_messages() {
        assert_eq!(
            FetchError::MissingFhirUser.to_string(),
            "ID-token missing the fhirUser claim."
        );
        assert_eq!(
            FetchError::WrongUserType("Patient".to_string()).to_string(),
            "ID-token fhirUser must be Practitioner, but was \"Patient\""
        );
    }

    #[test]
    fn retryable() {
        assert!(FetchError::Network("timeout".to_string()).is_retryable());
        assert!(
            FetchError::Status {
                status: 503,
                message: "Service Unavailable".to_string()
            }
            .is_retryable()
        );
        assert!(
            !FetchError::Status {
                status: 404,
                message: "Not Found".to_string()
            }
            .is_retryable()
        );
        assert!(!FetchError::NotABundle("Patient".to_string()).is_retryable());
    }
}
