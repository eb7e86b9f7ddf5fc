//! Error types for the raincheck library.
//!
//! A single fatal error enum covers the whole pipeline. There is deliberately
//! no per-section, non-fatal error type: an analysis run is all-or-nothing.
//! The first failing completion call aborts the run, so callers either
//! receive a complete [`crate::output::AnalysisResult`] or a
//! [`RaincheckError`] — never a partially filled result.
//!
//! Nothing is caught or translated inside the core. Each error bubbles to
//! the immediate caller carrying its original cause, and the core performs
//! no retries anywhere; any retry policy is the caller's decision.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the raincheck library.
#[derive(Debug, Error)]
pub enum RaincheckError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The PDF byte stream could not be parsed at all.
    #[error("Failed to extract text from PDF: {detail}\nThe file may be corrupt or not a PDF.")]
    Extraction { detail: String },

    /// The document parsed but yielded no text, or the caller passed an
    /// empty screenplay string.
    #[error("Screenplay text is empty.\nThe PDF may be a scan without a text layer; run OCR on it first.")]
    EmptyScreenplay,

    /// The analysis catalog failed validation (empty, duplicate names, …).
    #[error("Invalid analysis catalog: {0}")]
    InvalidSpec(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// Credential missing, or rejected by the endpoint (401/403).
    #[error("Authentication failed: {detail}\nSet OPENAI_API_KEY to a valid key.")]
    Auth { detail: String },

    /// The endpoint returned a non-success status, or the response body was
    /// malformed (missing the expected choice).
    #[error("Completion API error: {message}")]
    Api { message: String },

    /// No response within the configured client deadline.
    #[error("Completion call timed out after {secs}s\nIncrease --api-timeout for long screenplays.")]
    Timeout { secs: u64 },

    /// The run was cancelled before all sections completed.
    #[error("Analysis cancelled after {completed}/{total} sections")]
    Cancelled { completed: usize, total: usize },

    // ── Render errors ─────────────────────────────────────────────────────
    /// A required font file is not present.
    ///
    /// The renderer never falls back to a built-in non-Unicode font:
    /// screenplay text routinely contains non-ASCII names and places, and
    /// silent mojibake is worse than a hard failure.
    #[error("Font asset not found: '{path}'\nPlace DejaVuSans.ttf and DejaVuSans-Bold.ttf in the font directory.")]
    AssetMissing { path: PathBuf },

    /// The PDF layout engine failed.
    #[error("Report rendering failed: {detail}")]
    Render { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_display() {
        let e = RaincheckError::Auth {
            detail: "OPENAI_API_KEY is not set".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("OPENAI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn timeout_display() {
        let e = RaincheckError::Timeout { secs: 60 };
        assert!(e.to_string().contains("60s"));
    }

    #[test]
    fn cancelled_display() {
        let e = RaincheckError::Cancelled {
            completed: 3,
            total: 9,
        };
        assert!(e.to_string().contains("3/9"));
    }

    #[test]
    fn asset_missing_display() {
        let e = RaincheckError::AssetMissing {
            path: PathBuf::from("fonts/DejaVuSans.ttf"),
        };
        let msg = e.to_string();
        assert!(msg.contains("DejaVuSans.ttf"));
        assert!(msg.contains("font directory"));
    }

    #[test]
    fn api_display() {
        let e = RaincheckError::Api {
            message: "HTTP 500: upstream exploded".into(),
        };
        assert!(e.to_string().contains("HTTP 500"));
    }
}
