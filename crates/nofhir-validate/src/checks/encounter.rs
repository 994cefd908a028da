//! Encounter checks for the sykmelding launch context.

use nofhir_model::{DocRefs, Encounter, EncounterDiagnosis, EncounterParticipant, Finding};

use crate::Accumulator;
use crate::constants::{hl7, nav};
use crate::util::{references_type, shown};

pub fn validate_encounter(encounter: &Encounter) -> Vec<Finding> {
    let mut acc = Accumulator::new();
    let refs = || DocRefs::new().standard(hl7::ENCOUNTER).local(nav::ENCOUNTER);

    if encounter.resource_type.as_deref() != Some("Encounter") {
        acc.error_with(
            format!(
                "Resource is not of type Encounter, but was \"{}\"",
                shown(encounter.resource_type.as_deref())
            ),
            refs(),
        );
    }

    match encounter
        .subject
        .as_ref()
        .and_then(|subject| subject.reference.as_deref())
    {
        None => acc.error_with(
            "Encounter.subject does not contain a reference (expected Patient/<id>)",
            refs(),
        ),
        Some(reference) if !reference.starts_with("Patient/") => acc.error_with(
            format!(
                "Encounter.subject reference does not start with \"Patient/\", but was \"{reference}\""
            ),
            refs(),
        ),
        Some(_) => {}
    }

    check_participants(&mut acc, encounter.participant.as_deref().unwrap_or_default());
    check_diagnoses(&mut acc, encounter.diagnosis.as_deref().unwrap_or_default());

    match encounter
        .service_provider
        .as_ref()
        .and_then(|provider| provider.reference.as_deref())
    {
        None => acc.error_with("Encounter does not contain a service provider", refs()),
        Some(reference) if !reference.starts_with("Organization/") => acc.error_with(
            format!(
                "Encounter.serviceProvider reference does not start with \"Organization/\", but was \"{reference}\""
            ),
            refs(),
        ),
        Some(_) => {}
    }

    acc.build()
}

fn check_participants(acc: &mut Accumulator, participants: &[EncounterParticipant]) {
    if participants.is_empty() {
        acc.error_with(
            "Encounter does not contain any participants",
            DocRefs::new().local(nav::ENCOUNTER),
        );
        return;
    }

    for (index, participant) in participants.iter().enumerate() {
        match participant
            .individual
            .as_ref()
            .and_then(|individual| individual.reference.as_deref())
        {
            None => acc.error(format!(
                "Participant[{index}] individual reference is not set"
            )),
            Some(reference) if !references_type(reference, "Practitioner") => {
                acc.error(format!(
                    "Participant[{index}] individual reference is not of type Practitioner, but was \"{reference}\""
                ));
            }
            Some(_) => {}
        }
    }
}

fn check_diagnoses(acc: &mut Accumulator, diagnoses: &[EncounterDiagnosis]) {
    if diagnoses.is_empty() {
        acc.error_with(
            "Encounter does not contain any diagnoses",
            DocRefs::new().local(nav::ENCOUNTER),
        );
        return;
    }

    for (index, diagnosis) in diagnoses.iter().enumerate() {
        match diagnosis
            .condition
            .as_ref()
            .and_then(|condition| condition.reference.as_deref())
        {
            None => acc.error(format!(
                "Diagnosis[{index}] does not contain a condition reference"
            )),
            Some(reference) if !reference.starts_with("Condition/") => acc.error(format!(
                "Diagnosis[{index}] condition reference does not start with \"Condition/\", but was \"{reference}\""
            )),
            Some(_) => {}
        }
    }
}
