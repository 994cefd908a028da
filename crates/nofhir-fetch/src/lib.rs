//! Talking to the FHIR server on behalf of the validation sections.
//!
//! Every section fetches its payload through a [`FhirHandle`], validates it
//! synchronously and turns any fetch failure into a single ERROR finding.
//! Sections run concurrently and share no mutable state.

pub mod documents;
pub mod error;
mod handle;
mod pipeline;
mod session;

pub use error::{FetchError, Result};
pub use handle::{FhirHandle, HttpFhirHandle, resolve_url, well_known_url};
pub use pipeline::{failure_context, run_section, run_sections};
pub use session::{InMemorySessionStore, SessionStore, SessionValues};
