//! Result types returned by an analysis run.

use serde::{Deserialize, Serialize};

/// The answer for one catalog section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionResult {
    /// Section label, equal to the catalog entry's name.
    pub name: String,
    /// Raw model answer, verbatim — Markdown and all. Sanitisation happens
    /// at render time, not here, so on-screen display keeps the original.
    pub body: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub duration_ms: u64,
}

/// Ordered mapping from section name to model answer.
///
/// Invariants: exactly one entry per catalog section, in catalog order,
/// immutable once returned. A run either produces a complete result or an
/// error — never a partially filled one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    sections: Vec<SectionResult>,
}

impl AnalysisResult {
    pub fn new(sections: Vec<SectionResult>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[SectionResult] {
        &self.sections
    }

    /// Look up a section's answer by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.body.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionResult> {
        self.sections.iter()
    }
}

/// Aggregate statistics for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Number of sections analysed.
    pub sections: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    /// Wall-clock time spent extracting text from the PDF.
    pub extract_duration_ms: u64,
    /// Wall-clock time spent in completion calls (sum when sequential).
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything produced by [`crate::analyze::analyze`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub analysis: AnalysisResult,
    pub stats: AnalysisStats,
}

/// Everything produced by [`crate::analyze::generate_report`]: the analysis
/// plus the rendered PDF buffer, fully materialised and ready to stream.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub analysis: AnalysisResult,
    pub stats: AnalysisStats,
    /// The finished PDF report.
    pub report_pdf: Vec<u8>,
}
