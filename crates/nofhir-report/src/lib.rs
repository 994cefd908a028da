//! Presentation of conformance findings.
//!
//! - **Ranking**: errors first, emission order kept, "no issues" placeholder
//! - **Sections**: the fixed catalogue a run walks through
//! - **Rendering**: comfy-table, plain text and JSON

mod rank;
mod render;
mod report;
mod section;

pub use rank::rank;
pub use render::{
    pretty_source, render_catalogue, render_json, render_summary, render_table, render_text,
};
pub use report::{RunReport, SectionReport, SectionStatus};
pub use section::{Section, SectionGroup};
