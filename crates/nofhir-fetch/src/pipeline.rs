//! Fetch-then-validate pipelines, one per section.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use nofhir_model::{Bundle, Finding, ResourceKind, resource_type_of};
use nofhir_report::{RunReport, Section, SectionReport};
use nofhir_validate::constants::{DOCUMENT_TYPE_SYSTEM, SYKMELDING_DOCUMENT_CODE};
use nofhir_validate::{ValidationContext, parse_fhir_user, validate_resource};

use crate::documents::{DocumentContext, binary_document, inline_document, pdf_binary};
use crate::error::{FetchError, Result};
use crate::handle::{FhirHandle, well_known_url};

/// Validated findings plus the payload they were computed from.
type Outcome = (Vec<Finding>, Option<Value>);

/// Prefix for the single finding a failed section shows.
pub fn failure_context(section: Section) -> &'static str {
    match section {
        Section::SmartConfiguration => "Unable to fetch SMART configuration",
        Section::IdToken => "Unable to read ID token",
        Section::TokenResponse => "Unable to read token response",
        Section::Patient => "Unable to fetch Patient",
        Section::Practitioner => "Unable to fetch Practitioner",
        Section::Encounter => "Unable to fetch Encounter",
        Section::Organization => "Unable to fetch Organization",
        Section::Condition => "Unable to fetch Condition",
        Section::DocumentReference => "Unable to fetch DocumentReference",
        Section::WritableBinaryDocumentReference => {
            "Error while creating new DocumentReference with a binary file reference"
        }
        Section::WritableB64DocumentReference => {
            "Error while creating new DocumentReference with a b64 payload"
        }
    }
}

/// Run one section to completion. Never fails: fetch errors become the
/// section's single ERROR finding.
pub async fn run_section(
    handle: &dyn FhirHandle,
    section: Section,
    ctx: &ValidationContext,
) -> SectionReport {
    let report = match fetch_and_validate(handle, section, ctx).await {
        Ok((findings, payload)) => SectionReport::validated(section, findings, payload),
        Err(err) => {
            warn!(section = section.key(), error = %err, retryable = err.is_retryable(), "section fetch failed");
            SectionReport::failed(section, format!("{}: {err}", failure_context(section)))
        }
    };
    info!(
        section = section.key(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "section complete"
    );
    report
}

/// Run `sections` concurrently. `on_complete` sees each report as it lands.
pub async fn run_sections(
    handle: &dyn FhirHandle,
    sections: &[Section],
    ctx: &ValidationContext,
    mut on_complete: impl FnMut(&SectionReport),
) -> RunReport {
    let mut run = RunReport::new(Some(handle.server_url().to_string()));
    let mut pending: FuturesUnordered<_> = sections
        .iter()
        .map(|section| run_section(handle, *section, ctx))
        .collect();
    while let Some(report) = pending.next().await {
        on_complete(&report);
        run.set(report);
    }
    run
}

async fn fetch_and_validate(
    handle: &dyn FhirHandle,
    section: Section,
    ctx: &ValidationContext,
) -> Result<Outcome> {
    match section {
        Section::SmartConfiguration => {
            let url = well_known_url(handle.server_url());
            let config = handle.request(&url).await?;
            validated(section, config, ctx)
        }
        Section::IdToken => {
            let claims = handle.id_token_claims();
            let payload = claims.map(serde_json::to_value).transpose()?;
            validated(section, payload.unwrap_or(Value::Null), ctx)
        }
        Section::TokenResponse => {
            let payload = handle
                .token_response()
                .map(serde_json::to_value)
                .transpose()?;
            validated(section, payload.unwrap_or(Value::Null), ctx)
        }
        Section::Patient => {
            let id = require(handle.patient_id(), "patient")?;
            let patient = handle.request(&format!("Patient/{id}")).await?;
            validated(section, patient, ctx)
        }
        Section::Practitioner => {
            let fhir_user = practitioner_user(handle)?;
            let practitioner = handle.request(fhir_user).await?;
            validated(section, practitioner, ctx)
        }
        Section::Encounter => {
            let id = require(handle.encounter_id(), "encounter")?;
            let encounter = handle.request(&format!("Encounter/{id}")).await?;
            validated(section, encounter, ctx)
        }
        Section::Organization => {
            let bundle = expect_bundle(handle.request("Organization").await?)?;
            validated(section, bundle, ctx)
        }
        Section::Condition => {
            let id = require(handle.encounter_id(), "encounter")?;
            let bundle = expect_bundle(handle.request(&format!("Condition?encounter={id}")).await?)?;
            validated(section, bundle, ctx)
        }
        Section::DocumentReference => latest_document_reference(handle, ctx).await,
        Section::WritableB64DocumentReference => write_inline_document(handle, ctx).await,
        Section::WritableBinaryDocumentReference => write_binary_document(handle, ctx).await,
    }
}

fn validated(section: Section, payload: Value, ctx: &ValidationContext) -> Result<Outcome> {
    let findings = validate_resource(section.kind(), &payload, ctx)?;
    let payload = (!payload.is_null()).then_some(payload);
    Ok((findings, payload))
}

fn require<'a>(value: Option<&'a str>, what: &'static str) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(FetchError::MissingContext(what))
}

/// The `fhirUser` reference, provided it names a Practitioner.
fn practitioner_user(handle: &dyn FhirHandle) -> Result<&str> {
    let fhir_user = handle.fhir_user().ok_or(FetchError::MissingFhirUser)?;
    let user_type = handle.fhir_user_type().unwrap_or_default();
    if user_type != "Practitioner" {
        return Err(FetchError::WrongUserType(user_type.to_string()));
    }
    Ok(fhir_user)
}

fn practitioner_id(handle: &dyn FhirHandle) -> Result<&str> {
    let fhir_user = practitioner_user(handle)?;
    parse_fhir_user(fhir_user)
        .map(|(_, id)| id)
        .ok_or(FetchError::MissingFhirUser)
}

fn expect_bundle(value: Value) -> Result<Value> {
    match resource_type_of(&value) {
        Some("Bundle") => {
            debug!(entries = value["entry"].as_array().map_or(0, Vec::len), "search returned bundle");
            Ok(value)
        }
        other => {
            let was = other.unwrap_or("undefined").to_string();
            warn!(was = %was, "expected Bundle");
            Err(FetchError::NotABundle(was))
        }
    }
}

async fn latest_document_reference(
    handle: &dyn FhirHandle,
    ctx: &ValidationContext,
) -> Result<Outcome> {
    let patient = require(handle.patient_id(), "patient")?;
    let search = format!(
        "DocumentReference?patient={patient}&type={DOCUMENT_TYPE_SYSTEM}|{SYKMELDING_DOCUMENT_CODE}"
    );
    let bundle = expect_bundle(handle.request(&search).await?)?;
    let parsed: Bundle = serde_json::from_value(bundle.clone())?;

    let first = parsed
        .resources()
        .find(|resource| resource_type_of(resource) == Some("DocumentReference"))
        .cloned();
    match first {
        Some(document) => {
            let findings = validate_resource(ResourceKind::DocumentReference, &document, ctx)?;
            Ok((findings, Some(document)))
        }
        None => {
            debug!("no DocumentReference matched the type token");
            Ok((
                vec![Finding::error("No document reference found")],
                Some(bundle),
            ))
        }
    }
}

fn document_context(handle: &dyn FhirHandle) -> Result<DocumentContext<'_>> {
    Ok(DocumentContext {
        patient_id: require(handle.patient_id(), "patient")?,
        encounter_id: require(handle.encounter_id(), "encounter")?,
        practitioner_id: practitioner_id(handle)?,
    })
}

fn returned_id(response: &Value, resource: &'static str) -> Result<String> {
    response
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FetchError::CreateFailed {
            resource,
            detail: "the server response has no id".to_string(),
        })
}

/// Read the stored document back and check it against the id it was written under.
async fn verify_written(
    handle: &dyn FhirHandle,
    ctx: &ValidationContext,
    id: &str,
) -> Result<Outcome> {
    let stored = handle.request(&format!("DocumentReference/{id}")).await?;
    let ctx = ctx.clone().with_expected_document_id(id);
    let findings = validate_resource(ResourceKind::DocumentReference, &stored, &ctx)?;
    Ok((findings, Some(stored)))
}

async fn write_inline_document(
    handle: &dyn FhirHandle,
    ctx: &ValidationContext,
) -> Result<Outcome> {
    let document = inline_document(document_context(handle)?);
    let created = handle.create(serde_json::to_value(&document)?).await?;
    let id = returned_id(&created, "DocumentReference")?;
    info!(id = %id, "created DocumentReference with inline payload");
    verify_written(handle, ctx, &id).await
}

async fn write_binary_document(
    handle: &dyn FhirHandle,
    ctx: &ValidationContext,
) -> Result<Outcome> {
    let doc_ctx = document_context(handle)?;
    let binary = handle.create(serde_json::to_value(pdf_binary())?).await?;
    let binary_id = returned_id(&binary, "Binary")?;
    info!(id = %binary_id, "created Binary");

    let id = Uuid::new_v4().to_string();
    let document = binary_document(doc_ctx, &id, &binary_id);
    let written = handle
        .update(&format!("DocumentReference/{id}"), serde_json::to_value(&document)?)
        .await?;
    returned_id(&written, "DocumentReference")?;
    verify_written(handle, ctx, &id).await
}
