//! `nofhir.toml`: server, client and session settings for a run.
//!
//! ```toml
//! [server]
//! fhir_base_url = "http://localhost:5000/fhir"
//! timeout_secs = 30
//!
//! [client]
//! client_id = "NAV_SMART_on_FHIR_example"
//!
//! [session]
//! token_response = "session/token-response.json"
//!
//! [sections]
//! include_writes = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "nofhir.toml";
pub const DEFAULT_CLIENT_ID: &str = "NAV_SMART_on_FHIR_example";
pub const DEFAULT_SCOPE: &str =
    "openid profile launch fhirUser patient/*.* user/*.* offline_access";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error("no {0} configured")]
    Missing(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub session: SessionConfig,
    pub sections: SectionsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub fhir_base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            fhir_base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub client_id: String,
    pub scope: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Raw OAuth2 token response saved from a completed launch.
    pub token_response: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionsConfig {
    pub include_writes: bool,
}

/// Command line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server: Option<String>,
    pub client_id: Option<String>,
    pub token_response: Option<PathBuf>,
    pub write: bool,
}

impl Config {
    /// Load `path`. A missing file is only an error when `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::parse(&content, path)?;
                tracing::debug!(path = %path.display(), "loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(server) = overrides.server {
            self.server.fhir_base_url = Some(server);
        }
        if let Some(client_id) = overrides.client_id {
            self.client.client_id = client_id;
        }
        if let Some(path) = overrides.token_response {
            self.session.token_response = Some(path);
        }
        if overrides.write {
            self.sections.include_writes = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(base) = &self.server.fhir_base_url {
            let url = Url::parse(base).map_err(|e| ConfigError::Invalid {
                field: "server.fhir_base_url",
                message: format!("{base:?} is not a URL ({e})"),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid {
                    field: "server.fhir_base_url",
                    message: format!("unsupported scheme {:?}", url.scheme()),
                });
            }
        }
        if self.server.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "server.timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.client.client_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "client.client_id",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<&str> {
        self.server
            .fhir_base_url
            .as_deref()
            .ok_or(ConfigError::Missing("server.fhir_base_url"))
    }

    pub fn token_response_path(&self) -> Result<&Path> {
        self.session
            .token_response
            .as_deref()
            .ok_or(ConfigError::Missing("session.token_response"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }
}
