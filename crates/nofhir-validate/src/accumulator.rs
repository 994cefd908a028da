//! Finding accumulator used by every rule set.

use nofhir_model::{DocRefs, Finding, Severity};

/// Collects findings for one validator run.
///
/// Create a fresh accumulator per `validate_*` call; [`Accumulator::build`]
/// consumes it, so findings of one run cannot leak into the next.
#[derive(Debug, Default)]
pub struct Accumulator {
    findings: Vec<Finding>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error, DocRefs::default());
    }

    pub fn error_with(&mut self, message: impl Into<String>, refs: DocRefs) {
        self.push(message, Severity::Error, refs);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning, DocRefs::default());
    }

    pub fn warn_with(&mut self, message: impl Into<String>, refs: DocRefs) {
        self.push(message, Severity::Warning, refs);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info, DocRefs::default());
    }

    pub fn info_with(&mut self, message: impl Into<String>, refs: DocRefs) {
        self.push(message, Severity::Info, refs);
    }

    fn push(&mut self, message: impl Into<String>, severity: Severity, refs: DocRefs) {
        self.findings.push(Finding::with_refs(message, severity, refs));
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings in emission order. Sorting is left to presentation.
    #[must_use]
    pub fn build(self) -> Vec<Finding> {
        self.findings
    }
}
