//! Report rendering: lay the analysis out as a paginated PDF.
//!
//! Layout is delegated to `genpdf`, the paragraph-flow layer over the
//! `printpdf` engine: elements are pushed in reading order and pages break
//! automatically when content overflows — no pagination logic of our own.
//!
//! ## Font policy
//!
//! The report embeds DejaVu Sans in regular and bold weights, loaded from a
//! caller-supplied directory. If either file is missing, rendering fails
//! with [`RaincheckError::AssetMissing`] — there is no fallback to the
//! built-in Latin-1 fonts, because screenplay text routinely carries
//! non-ASCII character and place names and mojibake in a deliverable PDF is
//! worse than a hard failure.

use crate::error::RaincheckError;
use crate::output::AnalysisResult;
use crate::pipeline::sanitize;
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, SimplePageDecorator};
use std::path::Path;
use tracing::debug;

/// File name of the regular-weight font asset.
pub const REGULAR_FONT_FILE: &str = "DejaVuSans.ttf";

/// File name of the bold-weight font asset.
pub const BOLD_FONT_FILE: &str = "DejaVuSans-Bold.ttf";

const TITLE_SIZE: u8 = 16;
const HEADING_SIZE: u8 = 14;
const BODY_SIZE: u8 = 12;
const PAGE_MARGIN_MM: i32 = 15;

/// Load the Unicode font family (regular + bold) from `font_dir`.
///
/// # Errors
/// [`RaincheckError::AssetMissing`] when either TTF file is absent;
/// [`RaincheckError::Render`] when a file exists but is not a usable font.
pub fn load_fonts(font_dir: &Path) -> Result<FontFamily<FontData>, RaincheckError> {
    let regular = load_font_file(&font_dir.join(REGULAR_FONT_FILE))?;
    let bold = load_font_file(&font_dir.join(BOLD_FONT_FILE))?;
    // No separate italic assets; the report never uses italics, so the
    // remaining family slots alias the weights we have.
    Ok(FontFamily {
        regular: regular.clone(),
        bold: bold.clone(),
        italic: regular,
        bold_italic: bold,
    })
}

fn load_font_file(path: &Path) -> Result<FontData, RaincheckError> {
    let bytes = std::fs::read(path).map_err(|_| RaincheckError::AssetMissing {
        path: path.to_path_buf(),
    })?;
    FontData::new(bytes, None).map_err(|e| RaincheckError::Render {
        detail: format!("invalid font '{}': {e}", path.display()),
    })
}

/// Render the report into an in-memory PDF buffer.
///
/// Layout: the title centred, bold, and larger; then each section in result
/// order as a bold subheading, a small gap, the sanitised body as wrapped
/// paragraphs, and a trailing gap. The returned buffer is fully materialised
/// — the caller can stream or persist it directly.
pub fn render(
    title: &str,
    analysis: &AnalysisResult,
    fonts: FontFamily<FontData>,
) -> Result<Vec<u8>, RaincheckError> {
    let mut doc = Document::new(fonts);
    doc.set_title(title);
    doc.set_font_size(BODY_SIZE);
    doc.set_line_spacing(1.15);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(PAGE_MARGIN_MM);
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new(title)
            .aligned(Alignment::Center)
            .styled(Style::new().bold().with_font_size(TITLE_SIZE)),
    );
    doc.push(Break::new(1.5));

    for section in analysis.sections() {
        doc.push(
            Paragraph::new(section.name.as_str())
                .styled(Style::new().bold().with_font_size(HEADING_SIZE)),
        );
        doc.push(Break::new(0.5));

        let body = sanitize::sanitize(&section.body);
        for line in body.lines() {
            if line.trim().is_empty() {
                doc.push(Break::new(0.5));
            } else {
                doc.push(Paragraph::new(line));
            }
        }
        doc.push(Break::new(1.0));
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| RaincheckError::Render {
            detail: e.to_string(),
        })?;

    debug!(
        "Rendered report: {} bytes, {} sections",
        buffer.len(),
        analysis.len()
    );
    Ok(buffer)
}
