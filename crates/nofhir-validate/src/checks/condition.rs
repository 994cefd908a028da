//! Condition checks, applied to every condition in the patient's list.

use nofhir_model::{Condition, DocRefs, Finding};

use crate::Accumulator;
use crate::constants::{ICD10_SYSTEM, ICPC2_SYSTEM, hl7, nav};
use crate::util::{has_text, shown};

/// Findings are prefixed with the element index, e.g. `[0] ...`.
pub fn validate_conditions(conditions: &[Condition]) -> Vec<Finding> {
    let mut acc = Accumulator::new();
    for (index, condition) in conditions.iter().enumerate() {
        check_condition(&mut acc, index, condition);
    }
    acc.build()
}

fn check_condition(acc: &mut Accumulator, index: usize, condition: &Condition) {
    let refs = || DocRefs::new().standard(hl7::CONDITION).local(nav::CONDITION);

    if condition.resource_type.as_deref() != Some("Condition") {
        acc.error_with(
            format!(
                "[{index}] Resource is not of type Condition, but was \"{}\"",
                shown(condition.resource_type.as_deref())
            ),
            refs(),
        );
    }

    match &condition.subject {
        None => acc.error_with(format!("[{index}] Condition.subject is missing"), refs()),
        Some(subject) => match subject.reference.as_deref() {
            None => acc.error_with(
                format!("[{index}] Condition.subject.reference is missing"),
                refs(),
            ),
            Some(reference) if !reference.contains("Patient") => acc.error_with(
                format!(
                    "[{index}] Condition.subject does not reference a Patient, but was \"{reference}\""
                ),
                refs(),
            ),
            Some(_) => {}
        },
    }

    let Some(code) = &condition.code else {
        acc.error_with(format!("[{index}] Condition.code is missing"), refs());
        return;
    };
    let Some(codings) = code.coding.as_deref().filter(|c| !c.is_empty()) else {
        acc.error_with(
            format!("[{index}] Condition.code does not contain any codings"),
            refs(),
        );
        return;
    };

    let mut matched = codings
        .iter()
        .filter(|coding| {
            matches!(coding.system.as_deref(), Some(ICD10_SYSTEM) | Some(ICPC2_SYSTEM))
        })
        .peekable();
    if matched.peek().is_none() {
        acc.error_with(
            format!(
                "[{index}] Condition.code.coding does not contain a coding with system ICD-10 ({ICD10_SYSTEM}) or ICPC-2 ({ICPC2_SYSTEM})"
            ),
            refs(),
        );
        return;
    }

    for coding in matched {
        let system = shown(coding.system.as_deref());
        if !has_text(coding.code.as_deref()) {
            acc.error_with(
                format!("[{index}] Coding with system {system} does not have a code"),
                refs(),
            );
        }
        if !has_text(coding.display.as_deref()) {
            acc.warn_with(
                format!("[{index}] Coding with system {system} does not have a display"),
                refs(),
            );
        }
    }
}
