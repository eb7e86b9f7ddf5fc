//! Markdown sanitisation: strip control tokens from model answers before
//! PDF layout.
//!
//! Model answers arrive as Markdown; the report renderer lays out plain
//! paragraphs, so emphasis markers, heading prefixes, backticks, and link
//! syntax would show up as literal noise on the page. The rules here remove
//! them without touching content.
//!
//! ## Rule Order
//!
//! Rules run in a fixed order: emphasis and heading tokens go first, link
//! syntax is flattened before newline collapsing (flattening can merge
//! lines), and the final trim assumes collapsing already ran. Each rule is a
//! pure `&str → String` function with no shared state.
//!
//! ## Token-level stripping
//!
//! Emphasis delimiters (`**`, `__`) are stripped wherever they occur,
//! regardless of pairing — a stray unpaired token is removed like any other,
//! which can leave asymmetric residue on malformed input. The rules stay
//! token-level; none of them attempt pair matching.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all sanitisation rules to a raw model answer.
///
/// Pure and total: no failure modes, and idempotent —
/// `sanitize(sanitize(x)) == sanitize(x)` for all inputs.
///
/// Rules (applied in order):
/// 1. Strip every `**` and `__` token
/// 2. Strip heading markers (`#`+ plus trailing whitespace)
/// 3. Strip every backtick
/// 4. Flatten `[label](url)` links down to `label`
/// 5. Collapse runs of 3+ newlines to exactly 2
/// 6. Trim leading/trailing whitespace of the whole result
pub fn sanitize(text: &str) -> String {
    let s = strip_emphasis_tokens(text);
    let s = strip_heading_markers(&s);
    let s = strip_backticks(&s);
    let s = flatten_links(&s);
    let s = collapse_newlines(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip emphasis tokens ────────────────────────────────────────

static RE_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|__").unwrap());

fn strip_emphasis_tokens(input: &str) -> String {
    RE_EMPHASIS.replace_all(input, "").to_string()
}

// ── Rule 2: Strip heading markers ────────────────────────────────────────
//
// Every `#` run (plus the whitespace after it) goes, wherever it sits —
// once removed, a second pass finds nothing, which keeps the whole
// pipeline idempotent even on inputs like "## # Title".

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"#+\s*").unwrap());

fn strip_heading_markers(input: &str) -> String {
    RE_HEADING.replace_all(input, "").to_string()
}

// ── Rule 3: Strip backticks ──────────────────────────────────────────────

fn strip_backticks(input: &str) -> String {
    input.replace('`', "")
}

// ── Rule 4: Flatten links ────────────────────────────────────────────────

static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());

fn flatten_links(input: &str) -> String {
    RE_LINK.replace_all(input, "$1").to_string()
}

// ── Rule 5: Collapse newline runs ────────────────────────────────────────

static RE_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_newlines(input: &str) -> String {
    RE_NEWLINES.replace_all(input, "\n\n").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bold_and_heading() {
        assert_eq!(sanitize("## Title\n**Bold** text"), "Title\nBold text");
    }

    #[test]
    fn strips_underscore_emphasis() {
        assert_eq!(sanitize("__strong__ words"), "strong words");
    }

    #[test]
    fn single_asterisk_italic_is_preserved() {
        // Only the two-char tokens are targeted; `*italic*` passes through.
        assert_eq!(sanitize("*italic* stays"), "*italic* stays");
    }

    #[test]
    fn dangling_bold_token_is_still_removed() {
        // Odd token count: token-level stripping, not pair matching.
        assert_eq!(sanitize("a ** b"), "a  b");
        assert_eq!(sanitize("***x***"), "*x*");
    }

    #[test]
    fn strips_backticks() {
        assert_eq!(sanitize("use `fzf` here"), "use fzf here");
    }

    #[test]
    fn flattens_links() {
        assert_eq!(sanitize("[Open Sky](http://x)"), "Open Sky");
        assert_eq!(
            sanitize("see [the docs](https://example.com/a?b=c) for more"),
            "see the docs for more"
        );
    }

    #[test]
    fn empty_label_link_is_untouched() {
        assert_eq!(sanitize("[](http://x)"), "[](http://x)");
    }

    #[test]
    fn collapses_newline_runs() {
        assert_eq!(sanitize("a\n\n\n\nb"), "a\n\nb");
        // Two newlines are already fine.
        assert_eq!(sanitize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn trims_outer_whitespace() {
        assert_eq!(sanitize("  \n body \n\n"), "body");
    }

    #[test]
    fn heading_marker_mid_line_is_removed() {
        // The marker regex is not line-anchored.
        assert_eq!(sanitize("scene #3"), "scene 3");
    }

    #[test]
    fn idempotent() {
        let cases = [
            "## Title\n**Bold** text",
            "a ** b",
            "## # Title",
            "[Open Sky](http://x)\n\n\n\nnext",
            "`code` and __emphasis__ and #tags",
            "",
            "plain text, no markdown at all",
        ];
        for case in cases {
            let once = sanitize(case);
            assert_eq!(sanitize(&once), once, "not idempotent on {case:?}");
        }
    }

    #[test]
    fn full_answer_cleanup() {
        let input = "## Script Score\n\n**Overall: 8/10**\n\n\n\nSee `notes` and [refs](http://r).";
        assert_eq!(
            sanitize(input),
            "Script Score\n\nOverall: 8/10\n\nSee notes and refs."
        );
    }
}
