//! Configuration file parsing, overrides and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nofhir_cli::config::{Config, ConfigError, ConfigOverrides, DEFAULT_CLIENT_ID};

const SAMPLE: &str = r#"
[server]
fhir_base_url = "http://localhost:5000/fhir"
timeout_secs = 10

[client]
client_id = "syk-inn"

[session]
token_response = "session/token-response.json"

[sections]
include_writes = true
"#;

fn sample() -> Config {
    Config::parse(SAMPLE, Path::new("nofhir.toml")).unwrap()
}

#[test]
fn parses_every_table() {
    let config = sample();
    assert_eq!(config.base_url().unwrap(), "http://localhost:5000/fhir");
    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert_eq!(config.client.client_id, "syk-inn");
    assert_eq!(
        config.token_response_path().unwrap(),
        Path::new("session/token-response.json")
    );
    assert!(config.sections.include_writes);
    config.validate().unwrap();
}

#[test]
fn missing_tables_fall_back_to_defaults() {
    let config = Config::parse("[server]\n", Path::new("nofhir.toml")).unwrap();
    assert_eq!(config.client.client_id, DEFAULT_CLIENT_ID);
    assert_eq!(config.timeout(), Duration::from_secs(30));
    assert!(!config.sections.include_writes);
    assert!(matches!(
        config.base_url(),
        Err(ConfigError::Missing("server.fhir_base_url"))
    ));
}

#[test]
fn missing_optional_file_is_default() {
    let config = Config::load(Path::new("does-not-exist/nofhir.toml"), false).unwrap();
    assert_eq!(config, Config::default());

    let err = Config::load(Path::new("does-not-exist/nofhir.toml"), true).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn malformed_toml_names_the_file() {
    let err = Config::parse("[server\n", Path::new("broken.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
    assert!(err.to_string().starts_with("failed to parse broken.toml"));
}

#[test]
fn command_line_overrides_file() {
    let mut config = sample();
    config.sections.include_writes = false;
    config.apply_overrides(ConfigOverrides {
        server: Some("https://fhir.example.no/r4".to_string()),
        client_id: None,
        token_response: Some(PathBuf::from("other.json")),
        write: true,
    });
    assert_eq!(config.base_url().unwrap(), "https://fhir.example.no/r4");
    assert_eq!(config.client.client_id, "syk-inn");
    assert_eq!(config.token_response_path().unwrap(), Path::new("other.json"));
    assert!(config.sections.include_writes);
}

#[test]
fn rejects_invalid_values() {
    let mut config = sample();
    config.server.fhir_base_url = Some("not a url".to_string());
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid {
            field: "server.fhir_base_url",
            ..
        })
    ));

    let mut config = sample();
    config.server.fhir_base_url = Some("ftp://fhir.example.no".to_string());
    assert!(config.validate().is_err());

    let mut config = sample();
    config.server.timeout_secs = 0;
    let err = config.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid server.timeout_secs: must be greater than zero"
    );
}
