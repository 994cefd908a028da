use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use nofhir_model::{Finding, Severity};

use crate::rank::rank;
use crate::section::Section;

/// Where a section stands from the reader's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionStatus {
    Loading,
    /// The fetch failed; findings hold the single synthetic error.
    Failed,
    Validated,
}

/// Outcome of one section. Replaced wholesale on re-run.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    section: Section,
    status: SectionStatus,
    findings: Vec<Finding>,
    payload: Option<Value>,
}

impl SectionReport {
    pub fn loading(section: Section) -> Self {
        Self {
            section,
            status: SectionStatus::Loading,
            findings: Vec::new(),
            payload: None,
        }
    }

    pub fn validated(section: Section, findings: Vec<Finding>, payload: Option<Value>) -> Self {
        Self {
            section,
            status: SectionStatus::Validated,
            findings,
            payload,
        }
    }

    /// A failed fetch, shown in place of any validator output.
    pub fn failed(section: Section, message: impl Into<String>) -> Self {
        Self {
            section,
            status: SectionStatus::Failed,
            findings: vec![Finding::error(message)],
            payload: None,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn status(&self) -> SectionStatus {
        self.status
    }

    /// Findings in emission order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Findings in display order. Empty while loading.
    pub fn ranked(&self) -> Vec<Finding> {
        match self.status {
            SectionStatus::Loading => Vec::new(),
            SectionStatus::Failed | SectionStatus::Validated => rank(&self.findings),
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity() == severity)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// All sections of one run, in catalogue order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub generated_at: String,
    pub server: Option<String>,
    sections: Vec<SectionReport>,
}

impl RunReport {
    pub fn new(server: Option<String>) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            server,
            sections: Vec::new(),
        }
    }

    /// Insert or replace the report for its section.
    pub fn set(&mut self, report: SectionReport) {
        match self
            .sections
            .iter_mut()
            .find(|existing| existing.section == report.section)
        {
            Some(existing) => *existing = report,
            None => {
                self.sections.push(report);
                self.sections.sort_by_key(SectionReport::section);
            }
        }
    }

    pub fn sections(&self) -> &[SectionReport] {
        &self.sections
    }

    pub fn get(&self, section: Section) -> Option<&SectionReport> {
        self.sections.iter().find(|report| report.section == section)
    }

    pub fn error_count(&self) -> usize {
        self.sections.iter().map(SectionReport::error_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.sections.iter().map(SectionReport::warning_count).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.sections.iter().any(SectionReport::has_errors)
    }
}

impl FromIterator<SectionReport> for RunReport {
    fn from_iter<I: IntoIterator<Item = SectionReport>>(iter: I) -> Self {
        let mut report = Self::new(None);
        for section in iter {
            report.set(section);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_section_has_one_error() {
        let report = SectionReport::failed(
            Section::Patient,
            "Unable to fetch Patient: HTTP 404 Not Found",
        );
        assert_eq!(report.status(), SectionStatus::Failed);
        assert_eq!(report.findings().len(), 1);
        assert!(report.has_errors());
    }

    #[test]
    fn clean_section_ranks_to_all_clear() {
        let report = SectionReport::validated(Section::Encounter, Vec::new(), None);
        assert_eq!(report.ranked(), vec![Finding::all_clear()]);
        assert!(!report.has_errors());
    }

    #[test]
    fn loading_section_shows_nothing() {
        assert!(SectionReport::loading(Section::Condition).ranked().is_empty());
    }

    #[test]
    fn rerun_replaces_previous_report() {
        let mut run = RunReport::new(None);
        run.set(SectionReport::failed(Section::Patient, "boom"));
        run.set(SectionReport::validated(Section::IdToken, Vec::new(), None));
        run.set(SectionReport::validated(Section::Patient, Vec::new(), None));

        let order: Vec<_> = run.sections().iter().map(SectionReport::section).collect();
        assert_eq!(order, vec![Section::IdToken, Section::Patient]);
        assert!(!run.has_errors());
    }
}
