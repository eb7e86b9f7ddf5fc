//! Configuration for a screenplay analysis run.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Keeping every knob in one struct means the
//! caller owns the full context of a run explicitly — the core holds no
//! state of its own across calls — and two runs can be diffed to understand
//! why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use crate::error::RaincheckError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for an analysis run.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use raincheck::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gpt-4o-mini")
///     .temperature(0.4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Chat-completion model identifier. Default: "gpt-4o-mini".
    ///
    /// The default is the cheap tier: nine calls per screenplay add up, and
    /// producer-facing summaries do not need a frontier model. Point this at
    /// a bigger model when score accuracy matters more than cost.
    pub model: String,

    /// Sampling temperature in [0, 2]. Default: 0.7.
    ///
    /// Analysis is a creative-summarisation task, not transcription —
    /// a moderate temperature keeps loglines and reviews from reading like
    /// boilerplate while staying anchored to the text.
    pub temperature: f32,

    /// Custom system instruction. If None, uses the built-in default
    /// ([`crate::prompts::SYSTEM_INSTRUCTION`]).
    pub system_instruction: Option<String>,

    /// Length cap (in chars) applied to the screenplay before it is embedded
    /// into prompts. Default: 480 000.
    ///
    /// A feature-length screenplay runs 150–250k chars; the cap only bites on
    /// pathological inputs (concatenated drafts, OCR noise) that would
    /// otherwise blow the model's context window nine times over.
    pub max_screenplay_chars: usize,

    /// Number of completion calls in flight at once. Default: 1.
    ///
    /// The default is strictly sequential, which bounds the peak request
    /// rate against the API. The nine sections are independent, so raising
    /// this cuts wall-clock time roughly linearly — at the price of burstier
    /// quota use. Result order is catalog order either way.
    pub concurrency: usize,

    /// Per-completion-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Override for the chat-completion endpoint base URL.
    /// If None, `OPENAI_BASE_URL` or the public OpenAI endpoint is used.
    pub api_base: Option<String>,

    /// Title placed at the top of the rendered report.
    /// Default: "Screenplay Analysis Report".
    pub report_title: String,

    /// Directory holding the report font files
    /// (`DejaVuSans.ttf`, `DejaVuSans-Bold.ttf`). Default: "fonts".
    pub font_dir: PathBuf,

    /// Optional per-section progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            system_instruction: None,
            max_screenplay_chars: 480_000,
            concurrency: 1,
            api_timeout_secs: 60,
            api_base: None,
            report_title: "Screenplay Analysis Report".to_string(),
            font_dir: PathBuf::from("fonts"),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("system_instruction", &self.system_instruction)
            .field("max_screenplay_chars", &self.max_screenplay_chars)
            .field("concurrency", &self.concurrency)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("api_base", &self.api_base)
            .field("report_title", &self.report_title)
            .field("font_dir", &self.font_dir)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.system_instruction = Some(instruction.into());
        self
    }

    pub fn max_screenplay_chars(mut self, n: usize) -> Self {
        self.config.max_screenplay_chars = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = Some(base.into());
        self
    }

    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.config.report_title = title.into();
        self
    }

    pub fn font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.font_dir = dir.into();
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, RaincheckError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(RaincheckError::InvalidConfig(
                "model must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(RaincheckError::InvalidConfig(format!(
                "temperature must be 0–2, got {}",
                c.temperature
            )));
        }
        if c.max_screenplay_chars == 0 {
            return Err(RaincheckError::InvalidConfig(
                "max_screenplay_chars must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(RaincheckError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
