use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed JWT: {0}")]
    MalformedJwt(String),
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
