//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use nofhir_model::ResourceKind;
use nofhir_report::Section;

#[derive(Parser)]
#[command(
    name = "nofhir",
    version,
    about = "Conformance checker for Norwegian no-basis FHIR servers",
    long_about = "Check a SMART on FHIR server against the Norwegian no-basis profiles \
                  and the NAV sykmelding workflow.\n\n\
                  `run` validates a live server using a saved launch token response, \
                  `check` validates a saved JSON document offline."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow tokens and national identity numbers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Report format.
    #[arg(long = "output", value_enum, default_value = "table", global = true)]
    pub output: OutputArg,

    /// Print the validated payload under each section.
    #[arg(long = "show-source", global = true)]
    pub show_source: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a live FHIR server.
    Run(RunArgs),

    /// Validate a saved JSON document.
    Check(CheckArgs),

    /// List the validation sections.
    Sections,
}

#[derive(Args)]
pub struct RunArgs {
    /// Configuration file (default: ./nofhir.toml when present).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// FHIR server base URL.
    #[arg(long = "server", value_name = "URL")]
    pub server: Option<String>,

    /// Registered SMART client id, compared with the ID token audience.
    #[arg(long = "client-id", value_name = "ID")]
    pub client_id: Option<String>,

    /// Saved OAuth2 token response from a completed launch.
    #[arg(long = "token-response", value_name = "PATH")]
    pub token_response: Option<PathBuf>,

    /// Also run the sections that create DocumentReferences on the server.
    #[arg(long = "write")]
    pub write: bool,

    /// Run only these sections (key or index, repeatable).
    #[arg(long = "section", value_name = "SECTION", value_parser = parse_section)]
    pub sections: Vec<Section>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// JSON document to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Document kind (default: inferred from resourceType).
    #[arg(long = "kind", value_name = "KIND", value_parser = parse_kind)]
    pub kind: Option<ResourceKind>,

    /// Client id the ID token audience must equal.
    #[arg(long = "client-id", value_name = "ID")]
    pub client_id: Option<String>,

    /// FHIR base URL the ID token issuer is compared with.
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Id a DocumentReference is expected to carry.
    #[arg(long = "expected-id", value_name = "ID")]
    pub expected_id: Option<String>,
}

fn parse_section(value: &str) -> Result<Section, String> {
    value.parse()
}

fn parse_kind(value: &str) -> Result<ResourceKind, String> {
    value.parse().map_err(|e: nofhir_model::ModelError| e.to_string())
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    Table,
    Text,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
