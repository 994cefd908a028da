use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious a finding is.
///
/// Variants are declared in rank order, so the derived `Ord` agrees with
/// [`Severity::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Placeholder for "no issues". Never emitted by a validator.
    Ok,
    /// Confirmation of an acceptable alternative.
    Info,
    /// A RECOMMENDED requirement is not met.
    Warning,
    /// A REQUIRED requirement is not met.
    Error,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Self::Error, Self::Warning, Self::Info, Self::Ok];

    /// Numeric rank used for ordering findings (ERROR=3 down to OK=0).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Error => 3,
            Self::Warning => 2,
            Self::Info => 1,
            Self::Ok => 0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// True for severities that indicate a defect (WARNING and ERROR).
    #[must_use]
    pub const fn is_problem(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Links to the documents backing a rule. Purely informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRefs {
    /// HL7 / FHIR standard documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_ref: Option<String>,
    /// Implementation guide profile (Simplifier).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_guide_ref: Option<String>,
    /// Local workflow documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_doc_ref: Option<String>,
}

impl DocRefs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn standard(mut self, url: impl Into<String>) -> Self {
        self.standard_ref = Some(url.into());
        self
    }

    #[must_use]
    pub fn implementation_guide(mut self, url: impl Into<String>) -> Self {
        self.implementation_guide_ref = Some(url.into());
        self
    }

    #[must_use]
    pub fn local(mut self, url: impl Into<String>) -> Self {
        self.local_doc_ref = Some(url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.standard_ref.is_none()
            && self.implementation_guide_ref.is_none()
            && self.local_doc_ref.is_none()
    }

    /// Iterate over the links that are set, labelled by origin.
    pub fn links(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("hl7", self.standard_ref.as_deref()),
            ("simplifier", self.implementation_guide_ref.as_deref()),
            ("nav", self.local_doc_ref.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.map(|url| (label, url)))
    }
}

/// A single validation result.
///
/// Fields are private so the severity cannot change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    message: String,
    severity: Severity,
    #[serde(default, skip_serializing_if = "DocRefs::is_empty")]
    references: DocRefs,
}

impl Finding {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            references: DocRefs::default(),
        }
    }

    pub fn with_refs(message: impl Into<String>, severity: Severity, references: DocRefs) -> Self {
        Self {
            message: message.into(),
            severity,
            references,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    /// The "no issues to report" placeholder shown for clean sections.
    pub fn all_clear() -> Self {
        Self::new("No issues to report", Severity::Ok)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn references(&self) -> &DocRefs {
        &self.references
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}
