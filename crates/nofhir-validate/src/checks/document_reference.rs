//! DocumentReference checks for the sykmelding document workflow.
//!
//! Used both for reading the latest sykmelding document and for verifying
//! what the server returns after a write, in which case the caller passes
//! the id it expects back.

use nofhir_model::{
    CodeableConcept, DocRefs, DocumentReference, DocumentReferenceContent,
    DocumentReferenceContext, Finding, Reference,
};

use crate::Accumulator;
use crate::constants::{DOCUMENT_TYPE_SYSTEM, SYKMELDING_DOCUMENT_CODE, hl7, nav};
use crate::util::{has_text, shown};

pub fn validate_document_reference(
    document: &DocumentReference,
    expected_id: Option<&str>,
) -> Vec<Finding> {
    let mut acc = Accumulator::new();

    if document.resource_type.as_deref() != Some("DocumentReference") {
        acc.error_with(
            format!(
                "Resource is not of type DocumentReference, but was \"{}\"",
                shown(document.resource_type.as_deref())
            ),
            refs(),
        );
    }

    if let Some(expected) = expected_id
        && document.id.as_deref() != Some(expected)
    {
        acc.error(format!(
            "DocumentReference.id was not the same as the provided ID, was {}, expected {expected}",
            document.id.as_deref().unwrap_or("(missing)")
        ));
    }

    match document.status.as_deref() {
        None => acc.error_with("DocumentReference.status is missing", refs()),
        Some("current") => {}
        Some(other) => acc.error_with(
            format!("DocumentReference.status must be \"current\", but was \"{other}\""),
            refs(),
        ),
    }

    check_type(&mut acc, document.type_.as_ref());
    check_subject(&mut acc, document.subject.as_ref());
    check_authors(&mut acc, document.author.as_deref().unwrap_or_default());
    check_content(&mut acc, document.content.as_deref().unwrap_or_default());
    check_context(&mut acc, document.context.as_ref());

    if !has_text(document.description.as_deref()) {
        acc.warn_with(
            "DocumentReference.description is missing (expected the sykmelding period, e.g. \"01.01.2025 - 14.01.2025\")",
            refs(),
        );
    }

    acc.build()
}

fn refs() -> DocRefs {
    DocRefs::new()
        .standard(hl7::DOCUMENT_REFERENCE)
        .local(nav::DOCUMENT_REFERENCE)
}

fn check_type(acc: &mut Accumulator, type_: Option<&CodeableConcept>) {
    let Some(type_) = type_ else {
        acc.error_with("DocumentReference.type is missing", refs());
        return;
    };
    let codings = type_.coding.as_deref().unwrap_or_default();
    if codings.is_empty() {
        acc.error_with("DocumentReference.type does not contain any codings", refs());
        return;
    }

    let (matching, others): (Vec<_>, Vec<_>) = codings
        .iter()
        .partition(|coding| coding.system.as_deref() == Some(DOCUMENT_TYPE_SYSTEM));
    if matching.is_empty() {
        acc.error_with(
            format!(
                "DocumentReference.type does not contain a coding with system {DOCUMENT_TYPE_SYSTEM} (found {} other coding(s))",
                others.len()
            ),
            refs(),
        );
        return;
    }

    for coding in matching {
        if coding.code.as_deref() != Some(SYKMELDING_DOCUMENT_CODE) {
            acc.error_with(
                format!(
                    "DocumentReference.type code must be \"{SYKMELDING_DOCUMENT_CODE}\", but was \"{}\"",
                    shown(coding.code.as_deref())
                ),
                refs(),
            );
        }
        if !has_text(coding.display.as_deref()) {
            acc.error_with(
                "DocumentReference.type coding does not have a display",
                refs(),
            );
        }
    }
}

fn check_subject(acc: &mut Accumulator, subject: Option<&Reference>) {
    match subject.and_then(|s| s.reference.as_deref()) {
        None => acc.error_with("DocumentReference.subject.reference is missing", refs()),
        Some(reference) if !reference.starts_with("Patient/") => acc.error_with(
            format!(
                "DocumentReference.subject.reference does not start with \"Patient/\", but was \"{reference}\""
            ),
            refs(),
        ),
        Some(_) => {}
    }
}

fn check_authors(acc: &mut Accumulator, authors: &[Reference]) {
    if authors.is_empty() {
        acc.error_with("DocumentReference.author is missing", refs());
        return;
    }
    for (index, author) in authors.iter().enumerate() {
        match author.reference.as_deref() {
            None => acc.error_with(
                format!("DocumentReference.author[{index}].reference is missing"),
                refs(),
            ),
            Some(reference) if !reference.starts_with("Practitioner/") => acc.error_with(
                format!(
                    "DocumentReference.author[{index}].reference does not start with \"Practitioner/\", but was \"{reference}\""
                ),
                refs(),
            ),
            Some(_) => {}
        }
    }
}

fn check_content(acc: &mut Accumulator, content: &[DocumentReferenceContent]) {
    if content.is_empty() {
        acc.error_with("DocumentReference.content is missing", refs());
        return;
    }

    for (index, entry) in content.iter().enumerate() {
        let Some(attachment) = &entry.attachment else {
            acc.error_with(
                format!("DocumentReference.content[{index}].attachment is missing"),
                refs(),
            );
            continue;
        };

        if !has_text(attachment.title.as_deref()) {
            acc.error_with(
                format!("DocumentReference.content[{index}].attachment.title is missing"),
                refs(),
            );
        }

        let has_data = has_text(attachment.data.as_deref());
        let has_url = has_text(attachment.url.as_deref());
        if !has_data && !has_url {
            acc.error_with(
                format!(
                    "DocumentReference.content[{index}].attachment must contain either data or url"
                ),
                refs(),
            );
        }
        if let Some(url) = attachment.url.as_deref().filter(|u| !u.is_empty()) {
            acc.info(format!(
                "DocumentReference.content[{index}].attachment references its content by url \"{url}\""
            ));
        }

        match attachment.content_type.as_deref() {
            None if !has_url => acc.error_with(
                format!("DocumentReference.content[{index}].attachment.contentType is missing"),
                refs(),
            ),
            Some("application/pdf") if has_data => acc.info(format!(
                "DocumentReference.content[{index}].attachment contains inline application/pdf data"
            )),
            _ => {}
        }

        if !has_text(attachment.language.as_deref()) {
            acc.error_with(
                format!("DocumentReference.content[{index}].attachment.language is missing"),
                refs(),
            );
        }
    }
}

fn check_context(acc: &mut Accumulator, context: Option<&DocumentReferenceContext>) {
    let Some(context) = context else {
        acc.error_with("DocumentReference.context is missing", refs());
        return;
    };
    let Some(encounter) = context.encounter.as_deref().and_then(<[Reference]>::first) else {
        acc.error_with("DocumentReference.context.encounter is missing", refs());
        return;
    };
    match encounter.reference.as_deref() {
        None => acc.error_with(
            "DocumentReference.context.encounter[0].reference is missing",
            refs(),
        ),
        Some(reference) if !reference.starts_with("Encounter/") => acc.error_with(
            format!(
                "DocumentReference.context.encounter[0].reference does not start with \"Encounter/\", but was \"{reference}\""
            ),
            refs(),
        ),
        Some(_) => {}
    }
}
