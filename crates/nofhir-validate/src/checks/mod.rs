//! Rule sets, one module per resource kind.
//!
//! Every entry point is a pure function returning findings in emission order.

mod condition;
mod document_reference;
mod encounter;
mod id_token;
mod organization;
mod patient;
mod practitioner;
mod smart_configuration;
mod token_response;

pub use condition::validate_conditions;
pub use document_reference::validate_document_reference;
pub use encounter::validate_encounter;
pub use id_token::{parse_fhir_user, validate_id_token};
pub use organization::validate_organizations;
pub use patient::validate_patient;
pub use practitioner::validate_practitioner;
pub use smart_configuration::validate_smart_configuration;
pub use token_response::validate_token_response;
