//! no-basis-Patient checks.

use nofhir_model::{DocRefs, Finding, Patient};

use crate::Accumulator;
use crate::constants::{DNR_SYSTEM, FNR_SYSTEM, NO_BASIS_PATIENT, nav, simplifier};
use crate::util::{check_human_name, has_identifier};

pub fn validate_patient(patient: &Patient) -> Vec<Finding> {
    let mut acc = Accumulator::new();

    if !patient
        .meta
        .as_ref()
        .is_some_and(|meta| meta.has_profile(NO_BASIS_PATIENT))
    {
        acc.error_with(
            "The Patient must be of type no-basis-Patient",
            DocRefs::new()
                .implementation_guide(simplifier::NO_BASIS_PATIENT)
                .local(nav::PATIENT),
        );
    }

    // A D-number stands in for the FNR.
    let identifiers = patient.identifier.as_deref();
    if !has_identifier(identifiers, FNR_SYSTEM) && !has_identifier(identifiers, DNR_SYSTEM) {
        acc.error_with(
            format!(
                "The Patient does not have a Norwegian national identity number (FNR) from OID \"{FNR_SYSTEM}\""
            ),
            DocRefs::new().local(nav::PATIENT),
        );
        acc.error_with(
            format!("The Patient does not have a Norwegian D-number from OID \"{DNR_SYSTEM}\""),
            DocRefs::new().local(nav::PATIENT),
        );
    }

    check_human_name(&mut acc, "Patient", patient.name.as_deref());

    acc.build()
}
