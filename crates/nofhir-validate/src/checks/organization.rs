//! no-basis-Organization checks, applied to every element of a search result.

use nofhir_model::{DocRefs, Finding, Organization};

use crate::Accumulator;
use crate::constants::{ENH_SYSTEM, HER_SYSTEM, NO_BASIS_ORGANIZATION, hl7};
use crate::util::{has_identifier, has_text};

/// Findings are prefixed with the element index, e.g. `[1] ...`.
pub fn validate_organizations(organizations: &[Organization]) -> Vec<Finding> {
    let mut acc = Accumulator::new();
    for (index, organization) in organizations.iter().enumerate() {
        check_organization(&mut acc, index, organization);
    }
    acc.build()
}

fn check_organization(acc: &mut Accumulator, index: usize, organization: &Organization) {
    let refs = || DocRefs::new().standard(hl7::ORGANIZATION);

    if organization.resource_type.as_deref() != Some("Organization") {
        acc.error(format!("[{index}] Resource is not of type Organization"));
    }

    if !organization
        .meta
        .as_ref()
        .is_some_and(|meta| meta.has_profile(NO_BASIS_ORGANIZATION))
    {
        acc.error_with(
            format!("[{index}] The Organization must be of type no-basis-Organization"),
            refs(),
        );
    }

    let identifiers = organization.identifier.as_deref();
    if !has_identifier(identifiers, ENH_SYSTEM) {
        acc.error_with(
            format!(
                "[{index}] The Organization does not have an identifier of type ENH (oid: {ENH_SYSTEM})"
            ),
            refs(),
        );
    }
    if !has_identifier(identifiers, HER_SYSTEM) {
        acc.warn_with(
            format!("[{index}] The Organization does not have a HER-ID (oid: {HER_SYSTEM})"),
            refs(),
        );
    }

    if !has_text(organization.name.as_deref()) {
        acc.error(format!("[{index}] Organization.name is required"));
    }

    let telecom = organization.telecom.as_deref().unwrap_or_default();
    for (telecom_index, contact) in telecom.iter().enumerate() {
        if !has_text(contact.system.as_deref()) {
            acc.error_with(
                format!("[{index}].telecom[{telecom_index}].system is required"),
                DocRefs::new().standard(hl7::CONTACT_POINT),
            );
        }
    }

    match telecom
        .iter()
        .find(|contact| contact.system.as_deref() == Some("phone"))
    {
        None => acc.error_with(
            format!("[{index}] The Organization does not have a telecom entry with system \"phone\""),
            DocRefs::new().standard(hl7::CONTACT_POINT),
        ),
        Some(phone) if !has_text(phone.value.as_deref()) => acc.error_with(
            format!("[{index}] The Organization phone telecom does not have a value"),
            DocRefs::new().standard(hl7::CONTACT_POINT),
        ),
        Some(_) => {}
    }
}
