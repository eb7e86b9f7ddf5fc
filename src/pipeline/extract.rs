//! Text extraction: PDF bytes → one plain-text screenplay string.
//!
//! Backed entirely by the `pdf-extract` crate; we do no PDF parsing of our
//! own. `pdf-extract` inserts form feeds between pages — those are folded
//! into newlines so downstream prompts see one continuous document.
//!
//! A structurally valid PDF with no extractable text layer (a pure scan)
//! yields an empty string, not an error: whether that is acceptable is the
//! caller's call, and [`crate::analyze`] rejects it with
//! [`RaincheckError::EmptyScreenplay`] before spending any API quota.

use crate::error::RaincheckError;
use tracing::debug;

/// Extract the full text of a PDF byte stream.
///
/// # Errors
/// [`RaincheckError::Extraction`] when the byte stream cannot be parsed as
/// a PDF at all.
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, RaincheckError> {
    let text = pdf_extract::extract_text_from_mem(pdf_bytes).map_err(|e| {
        RaincheckError::Extraction {
            detail: e.to_string(),
        }
    })?;

    // Page separators become plain newlines, matching how a reader would
    // join the pages of a script.
    let text = text.replace('\x0C', "\n");
    debug!("Extracted {} chars of screenplay text", text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_extraction() {
        // pdf-extract needs actual PDF bytes; anything else is a parse error.
        let err = extract_text(b"This is not a PDF").unwrap_err();
        assert!(matches!(err, RaincheckError::Extraction { .. }));
    }

    #[test]
    fn empty_input_fails_extraction() {
        let err = extract_text(b"").unwrap_err();
        assert!(matches!(err, RaincheckError::Extraction { .. }));
    }
}
