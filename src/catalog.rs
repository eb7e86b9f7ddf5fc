//! The analysis catalog: which sections a run produces, and in which order.
//!
//! A catalog is static configuration — built once, validated once, then
//! treated as immutable for the lifetime of the process. The standard
//! catalog covers the nine dimensions a producer-facing report needs; custom
//! catalogs let callers run a subset or add their own sections, as long as
//! names stay unique.

use crate::error::RaincheckError;
use crate::prompts;
use std::collections::HashSet;

/// A prompt template: pure function from fenced screenplay text to the full
/// prompt for one section. See [`crate::prompts::fence_screenplay`].
pub type PromptTemplate = fn(&str) -> String;

/// Output-token budget for sections with short, factual answers.
pub const SHORT_ANSWER_TOKENS: u32 = 200;

/// Output-token budget for essay-style sections.
pub const LONG_ANSWER_TOKENS: u32 = 700;

/// One analysis dimension: a named section produced by a single completion
/// call with its own output-length cap.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    /// Human-readable section label; doubles as the result key.
    pub name: String,
    pub template: PromptTemplate,
    /// Output-token cap for this section's completion call.
    pub max_tokens: u32,
}

impl SectionSpec {
    pub fn new(name: impl Into<String>, template: PromptTemplate, max_tokens: u32) -> Self {
        Self {
            name: name.into(),
            template,
            max_tokens,
        }
    }
}

/// The ordered set of sections an analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisSpec {
    sections: Vec<SectionSpec>,
}

impl AnalysisSpec {
    /// The standard nine-section producer report, in display order.
    ///
    /// Quick factual sections (Genre, Top Keywords, Location Setting) get the
    /// short budget; everything else gets room for a few paragraphs.
    pub fn standard() -> Self {
        Self {
            sections: vec![
                SectionSpec::new("Logline", prompts::logline, LONG_ANSWER_TOKENS),
                SectionSpec::new("Genre", prompts::genre, SHORT_ANSWER_TOKENS),
                SectionSpec::new("Top Keywords", prompts::top_keywords, SHORT_ANSWER_TOKENS),
                SectionSpec::new(
                    "Location Setting",
                    prompts::location_setting,
                    SHORT_ANSWER_TOKENS,
                ),
                SectionSpec::new("Synopsis", prompts::synopsis, LONG_ANSWER_TOKENS),
                SectionSpec::new("Script Score", prompts::script_score, LONG_ANSWER_TOKENS),
                SectionSpec::new(
                    "Plot Assessment",
                    prompts::plot_assessment,
                    LONG_ANSWER_TOKENS,
                ),
                SectionSpec::new(
                    "Character Profiling",
                    prompts::character_profiling,
                    LONG_ANSWER_TOKENS,
                ),
                SectionSpec::new("Box Office Collection", prompts::box_office, LONG_ANSWER_TOKENS),
            ],
        }
    }

    /// Build a custom catalog, validating it up front.
    pub fn new(sections: Vec<SectionSpec>) -> Result<Self, RaincheckError> {
        let spec = Self { sections };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the catalog invariants: at least one section, unique names,
    /// positive token budgets.
    pub fn validate(&self) -> Result<(), RaincheckError> {
        if self.sections.is_empty() {
            return Err(RaincheckError::InvalidSpec(
                "catalog has no sections".into(),
            ));
        }
        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.name.as_str()) {
                return Err(RaincheckError::InvalidSpec(format!(
                    "duplicate section name '{}'",
                    section.name
                )));
            }
            if section.max_tokens == 0 {
                return Err(RaincheckError::InvalidSpec(format!(
                    "section '{}' has a zero token budget",
                    section.name
                )));
            }
        }
        Ok(())
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section names in catalog order.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}
