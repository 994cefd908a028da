//! no-basis-Practitioner checks.

use nofhir_model::{ContactPoint, DocRefs, Finding, Practitioner};

use crate::Accumulator;
use crate::constants::{
    HER_SYSTEM, HPR_SYSTEM, NO_BASIS_PRACTITIONER, TELECOM_SYSTEMS, TELECOM_USES, hl7, nav,
    simplifier,
};
use crate::util::{check_human_name, has_identifier, has_text, shown};

pub fn validate_practitioner(practitioner: &Practitioner) -> Vec<Finding> {
    let mut acc = Accumulator::new();

    if !practitioner
        .meta
        .as_ref()
        .is_some_and(|meta| meta.has_profile(NO_BASIS_PRACTITIONER))
    {
        acc.error_with(
            "The Practitioner must be of type no-basis-Practitioner",
            DocRefs::new()
                .implementation_guide(simplifier::NO_BASIS_PRACTITIONER)
                .local(nav::PRACTITIONER),
        );
    }

    let identifiers = practitioner.identifier.as_deref();
    if !has_identifier(identifiers, HPR_SYSTEM) {
        acc.error_with(
            format!(
                "The Practitioner does not have a Norwegian Health Personnel Record number (HPR) from OID \"{HPR_SYSTEM}\""
            ),
            DocRefs::new().local(nav::PRACTITIONER),
        );
    }
    if !has_identifier(identifiers, HER_SYSTEM) {
        acc.warn_with(
            format!("The Practitioner does not have a Norwegian HER-ID (oid: {HER_SYSTEM})"),
            DocRefs::new().local(nav::PRACTITIONER),
        );
    }

    check_human_name(&mut acc, "Practitioner", practitioner.name.as_deref());
    check_telecom(&mut acc, practitioner.telecom.as_deref().unwrap_or_default());

    acc.build()
}

fn check_telecom(acc: &mut Accumulator, telecom: &[ContactPoint]) {
    let refs = || DocRefs::new().standard(hl7::CONTACT_POINT).local(nav::PRACTITIONER);

    if telecom.is_empty() {
        acc.error_with("The Practitioner does not have a telecom property", refs());
        return;
    }

    for (index, contact) in telecom.iter().enumerate() {
        let system = contact.system.as_deref();
        if !system.is_some_and(|s| TELECOM_SYSTEMS.contains(&s)) {
            acc.error_with(
                format!(
                    "The Practitioner telecom[{index}] has an invalid or missing system: \"{}\"",
                    shown(system)
                ),
                refs(),
            );
        }
        if !has_text(contact.value.as_deref()) {
            acc.error_with(
                format!("The Practitioner telecom[{index}] does not have a value"),
                refs(),
            );
        }
        let use_ = contact.use_.as_deref();
        if !use_.is_some_and(|u| TELECOM_USES.contains(&u)) {
            acc.warn_with(
                format!(
                    "The Practitioner telecom[{index}] has an invalid or missing use: \"{}\"",
                    shown(use_)
                ),
                refs(),
            );
        }
    }
}
