//! Library side of the `nofhir` command: configuration, logging and offline checks.

pub mod check;
pub mod config;
pub mod logging;
