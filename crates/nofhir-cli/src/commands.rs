use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span};

use nofhir_cli::check::check_document;
use nofhir_cli::config::{Config, ConfigOverrides, DEFAULT_CLIENT_ID, DEFAULT_CONFIG_FILE};
use nofhir_cli::logging::redact_value;
use nofhir_fetch::{HttpFhirHandle, SessionValues, run_sections};
use nofhir_model::TokenResponse;
use nofhir_report::{
    RunReport, Section, render_catalogue, render_json, render_table, render_text,
};
use nofhir_validate::ValidationContext;

use crate::cli::{CheckArgs, OutputArg, RunArgs};

pub fn run_sections_list() {
    println!("{}", render_catalogue());
}

pub fn run_check(args: &CheckArgs) -> Result<RunReport> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("read {}", args.file.display()))?;
    let mut ctx = ValidationContext::new().with_client_id(
        args.client_id
            .clone()
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
    );
    if let Some(base) = &args.base_url {
        ctx = ctx.with_fhir_base_url(base.clone());
    }
    if let Some(id) = &args.expected_id {
        ctx = ctx.with_expected_document_id(id.clone());
    }
    check_document(args.kind, &raw, &ctx).with_context(|| format!("check {}", args.file.display()))
}

pub fn run_live(args: &RunArgs, show_progress: bool) -> Result<RunReport> {
    let config = load_config(args)?;
    let base_url = config.base_url()?.to_string();
    let span = info_span!("run", server = %base_url);
    let _guard = span.enter();

    let session = load_session(&base_url, config.token_response_path()?)?;
    debug!(
        client_id = %config.client.client_id,
        scope = %config.client.scope,
        patient = redact_value(session.patient_id.as_deref().unwrap_or_default()),
        encounter = redact_value(session.encounter_id.as_deref().unwrap_or_default()),
        "launch context"
    );

    let sections = select_sections(&args.sections, config.sections.include_writes)?;
    let ctx = ValidationContext::new()
        .with_client_id(config.client.client_id.clone())
        .with_fhir_base_url(base_url.clone());
    let handle = HttpFhirHandle::new(session, config.timeout()).context("create FHIR client")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;

    let progress = section_progress(sections.len(), show_progress);
    let run = runtime.block_on(run_sections(&handle, &sections, &ctx, |report| {
        progress.set_message(report.section().title());
        progress.inc(1);
    }));
    progress.finish_and_clear();

    info!(
        sections = run.sections().len(),
        errors = run.error_count(),
        warnings = run.warning_count(),
        "run complete"
    );
    Ok(run)
}

pub fn print_report(run: &RunReport, output: OutputArg, show_source: bool) -> Result<()> {
    match output {
        OutputArg::Table => print!("{}", render_table(run, show_source)),
        OutputArg::Text => println!("{}", render_text(run, show_source)),
        OutputArg::Json => println!("{}", render_json(run).context("serialize report")?),
    }
    Ok(())
}

fn load_config(args: &RunArgs) -> Result<Config> {
    let (path, required) = match &args.config {
        Some(path) => (path.as_path(), true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    let mut config = Config::load(path, required)?;
    config.apply_overrides(ConfigOverrides {
        server: args.server.clone(),
        client_id: args.client_id.clone(),
        token_response: args.token_response.clone(),
        write: args.write,
    });
    config.validate()?;
    Ok(config)
}

fn load_session(base_url: &str, path: &Path) -> Result<SessionValues> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read token response {}", path.display()))?;
    let response: TokenResponse = serde_json::from_str(&raw)
        .with_context(|| format!("parse token response {}", path.display()))?;
    debug!(
        access_token = redact_value(response.access_token.as_deref().unwrap_or_default()),
        "loaded token response"
    );
    Ok(SessionValues::from_token_response(base_url, response))
}

/// Requested sections in catalogue order, or every read section (plus the
/// write sections when enabled).
fn select_sections(requested: &[Section], include_writes: bool) -> Result<Vec<Section>> {
    if requested.is_empty() {
        return Ok(Section::ALL
            .into_iter()
            .filter(|section| include_writes || !section.is_write())
            .collect());
    }
    if let Some(write) = requested.iter().find(|s| s.is_write() && !include_writes) {
        bail!(
            "section {} creates resources on the server; pass --write to run it",
            write.key()
        );
    }
    let mut sections = requested.to_vec();
    sections.sort();
    sections.dedup();
    Ok(sections)
}

fn section_progress(len: usize, visible: bool) -> ProgressBar {
    if !visible || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_skips_writes() {
        let sections = select_sections(&[], false).unwrap();
        assert_eq!(sections.len(), 9);
        assert!(sections.iter().all(|s| !s.is_write()));

        let sections = select_sections(&[], true).unwrap();
        assert_eq!(sections, Section::ALL.to_vec());
    }

    #[test]
    fn explicit_write_section_needs_write_flag() {
        let requested = [Section::WritableB64DocumentReference];
        let err = select_sections(&requested, false).unwrap_err();
        assert!(err.to_string().contains("--write"));
        assert_eq!(select_sections(&requested, true).unwrap(), requested.to_vec());
    }

    #[test]
    fn requested_sections_are_ordered_and_unique() {
        let requested = [Section::Condition, Section::Patient, Section::Condition];
        assert_eq!(
            select_sections(&requested, false).unwrap(),
            vec![Section::Patient, Section::Condition]
        );
    }
}
