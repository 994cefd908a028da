//! Resources the write sections create on the server.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;

use nofhir_model::{
    Attachment, Binary, CodeableConcept, Coding, DocumentReference, DocumentReferenceContent,
    DocumentReferenceContext, Meta, Reference,
};
use nofhir_validate::constants::{DOCUMENT_TYPE_SYSTEM, SYKMELDING_DOCUMENT_CODE};

/// A one-page PDF used as the uploaded sykmelding.
const SAMPLE_PDF: &[u8] = b"%PDF-1.4
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj
2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj
3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] >> endobj
trailer << /Root 1 0 R >>
%%EOF
";

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

pub fn sample_pdf_base64() -> String {
    STANDARD.encode(SAMPLE_PDF)
}

/// Launch context the documents point at.
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    pub patient_id: &'a str,
    pub encounter_id: &'a str,
    pub practitioner_id: &'a str,
}

pub fn pdf_binary() -> Binary {
    Binary {
        resource_type: "Binary".to_string(),
        id: None,
        content_type: PDF_CONTENT_TYPE.to_string(),
        data: sample_pdf_base64(),
    }
}

/// DocumentReference carrying the PDF inline.
pub fn inline_document(ctx: DocumentContext<'_>) -> DocumentReference {
    sykmelding_document(
        ctx,
        "Sykmelding with an inline base64 payload",
        Attachment {
            content_type: Some(PDF_CONTENT_TYPE.to_string()),
            language: Some("NO-nb".to_string()),
            data: Some(sample_pdf_base64()),
            url: None,
            title: Some("Sykmelding".to_string()),
        },
    )
}

/// DocumentReference pointing at an uploaded Binary, stored under `id`.
pub fn binary_document(
    ctx: DocumentContext<'_>,
    id: &str,
    binary_id: &str,
) -> DocumentReference {
    let mut document = sykmelding_document(
        ctx,
        "Sykmelding with a Binary reference",
        Attachment {
            content_type: None,
            language: Some("NO-nb".to_string()),
            data: None,
            url: Some(format!("Binary/{binary_id}")),
            title: Some("Sykmelding".to_string()),
        },
    );
    document.id = Some(id.to_string());
    document
}

fn sykmelding_document(
    ctx: DocumentContext<'_>,
    description: &str,
    attachment: Attachment,
) -> DocumentReference {
    DocumentReference {
        resource_type: Some("DocumentReference".to_string()),
        meta: Some(Meta {
            last_updated: Some(Utc::now().to_rfc3339()),
            ..Meta::default()
        }),
        status: Some("current".to_string()),
        type_: Some(CodeableConcept {
            coding: Some(vec![Coding {
                system: Some(DOCUMENT_TYPE_SYSTEM.to_string()),
                code: Some(SYKMELDING_DOCUMENT_CODE.to_string()),
                display: Some("Sykmeldinger og trygdesaker".to_string()),
            }]),
            text: None,
        }),
        subject: Some(Reference::to(format!("Patient/{}", ctx.patient_id))),
        author: Some(vec![Reference::to(format!(
            "Practitioner/{}",
            ctx.practitioner_id
        ))]),
        description: Some(description.to_string()),
        content: Some(vec![DocumentReferenceContent {
            attachment: Some(attachment),
        }]),
        context: Some(DocumentReferenceContext {
            encounter: Some(vec![Reference::to(format!(
                "Encounter/{}",
                ctx.encounter_id
            ))]),
        }),
        ..DocumentReference::default()
    }
}

#[cfg(test)]
mod tests {
    use nofhir_validate::validate_document_reference;

    use super::*;

    const CTX: DocumentContext<'static> = DocumentContext {
        patient_id: "pasient-1",
        encounter_id: "konsultasjon-1",
        practitioner_id: "lege-1",
    };

    #[test]
    fn sample_pdf_round_trips() {
        let decoded = STANDARD.decode(sample_pdf_base64()).unwrap();
        assert!(decoded.starts_with(b"%PDF-"));
    }

    #[test]
    fn generated_documents_pass_validation() {
        let inline = inline_document(CTX);
        let by_url = binary_document(CTX, "doc-1", "bin-1");

        for document in [inline, by_url] {
            let findings = validate_document_reference(&document, None);
            assert!(
                findings.iter().all(|f| !f.severity().is_problem()),
                "{findings:?}"
            );
        }
    }

    #[test]
    fn binary_document_points_at_binary() {
        let document = binary_document(CTX, "doc-1", "bin-1");
        assert_eq!(document.id.as_deref(), Some("doc-1"));
        let attachment = document.content.unwrap()[0].attachment.clone().unwrap();
        assert_eq!(attachment.url.as_deref(), Some("Binary/bin-1"));
    }
}
