//! Integration tests for the analysis pipeline.
//!
//! The completion client is mocked, so everything here runs offline. The
//! only gated tests are the report-rendering ones, which need the DejaVu
//! font files in `./fonts/` — they skip with a notice when the assets are
//! absent.
//!
//! Run with:
//!   cargo test --test pipeline -- --nocapture

use async_trait::async_trait;
use raincheck::{
    AnalysisConfig, AnalysisResult, AnalysisSpec, CancelToken, Completion, CompletionClient,
    CompletionOptions, RaincheckError, SectionResult, SectionSpec,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn fonts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fonts")
}

/// Skip a font-dependent test when the DejaVu assets are not installed.
macro_rules! skip_unless_fonts {
    () => {{
        let dir = fonts_dir();
        if !dir.join("DejaVuSans.ttf").exists() || !dir.join("DejaVuSans-Bold.ttf").exists() {
            println!("SKIP — put DejaVuSans.ttf and DejaVuSans-Bold.ttf into ./fonts/");
            return;
        }
        dir
    }};
}

/// A scripted completion client: numbered answers, with optional failure
/// injection and cancellation triggering at a given call.
struct MockClient {
    calls: AtomicUsize,
    /// 1-based call number to fail on, if any.
    fail_at: Option<usize>,
    /// Cancel this token once the given 1-based call number has been served.
    cancel_after: Option<(usize, CancelToken)>,
}

impl MockClient {
    fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_at: None,
            cancel_after: None,
        }
    }

    fn failing_at(call: usize) -> Self {
        Self {
            fail_at: Some(call),
            ..Self::ok()
        }
    }

    fn cancelling_after(call: usize, token: CancelToken) -> Self {
        Self {
            cancel_after: Some((call, token)),
            ..Self::ok()
        }
    }

    fn calls_issued(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    async fn complete(
        &self,
        prompt: &str,
        _system: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, RaincheckError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((after, token)) = &self.cancel_after {
            if call >= *after {
                token.cancel();
            }
        }
        if self.fail_at == Some(call) {
            return Err(RaincheckError::Api {
                message: format!("injected failure on call {call}"),
            });
        }

        // Echo the head of the prompt so ordering tests can tell answers apart.
        let head: String = prompt.chars().take(12).collect();
        Ok(Completion {
            content: format!("answer {call} [{head}] (budget {})", options.max_tokens),
            prompt_tokens: 100,
            completion_tokens: 50,
        })
    }
}

const SCREENPLAY: &str = "FADE IN.\n\nINT. LIGHTHOUSE - NIGHT\n\nMARA (40s) winds the lamp.";

// ── Runner contract ──────────────────────────────────────────────────────────

#[tokio::test]
async fn run_yields_every_section_in_catalog_order() {
    let spec = AnalysisSpec::standard();
    let client = MockClient::ok();
    let config = AnalysisConfig::default();
    let cancel = CancelToken::new();

    let result = raincheck::run(SCREENPLAY, &spec, &client, &config, &cancel)
        .await
        .expect("run should succeed");

    assert_eq!(result.len(), spec.len());
    let names: Vec<&str> = result.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, spec.section_names());
    assert!(result.sections().iter().all(|s| !s.body.is_empty()));
    assert_eq!(client.calls_issued(), spec.len());
}

#[tokio::test]
async fn section_budgets_reach_the_client() {
    let spec = AnalysisSpec::standard();
    let client = MockClient::ok();
    let config = AnalysisConfig::default();
    let cancel = CancelToken::new();

    let result = raincheck::run(SCREENPLAY, &spec, &client, &config, &cancel)
        .await
        .unwrap();

    // The mock echoes the budget back; spot-check a short and a long section.
    assert!(result.get("Genre").unwrap().contains("(budget 200)"));
    assert!(result.get("Synopsis").unwrap().contains("(budget 700)"));
}

#[tokio::test]
async fn failure_mid_catalog_propagates_and_stops_issuing_calls() {
    let spec = AnalysisSpec::standard();
    let client = MockClient::failing_at(3);
    let config = AnalysisConfig::default();
    let cancel = CancelToken::new();

    let err = raincheck::run(SCREENPLAY, &spec, &client, &config, &cancel)
        .await
        .expect_err("third call fails");

    assert!(matches!(err, RaincheckError::Api { .. }), "got: {err}");
    // Fail-fast: the failing call was the last one issued. No partial
    // result exists — the Err arm is the only thing the caller sees.
    assert_eq!(client.calls_issued(), 3);
}

#[tokio::test]
async fn empty_screenplay_is_rejected_before_any_call() {
    let spec = AnalysisSpec::standard();
    let client = MockClient::ok();
    let config = AnalysisConfig::default();
    let cancel = CancelToken::new();

    let err = raincheck::run("   \n\n ", &spec, &client, &config, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, RaincheckError::EmptyScreenplay));
    assert_eq!(client.calls_issued(), 0);
}

#[tokio::test]
async fn cancellation_stops_after_the_inflight_call() {
    let token = CancelToken::new();
    let spec = AnalysisSpec::standard();
    let client = MockClient::cancelling_after(1, token.clone());
    let config = AnalysisConfig::default();

    let err = raincheck::run(SCREENPLAY, &spec, &client, &config, &token)
        .await
        .expect_err("run should be cancelled");

    match err {
        RaincheckError::Cancelled { completed, total } => {
            assert_eq!(completed, 1);
            assert_eq!(total, spec.len());
        }
        other => panic!("expected Cancelled, got: {other}"),
    }
    // The first call completed; nothing further was issued.
    assert_eq!(client.calls_issued(), 1);
}

#[tokio::test]
async fn pre_cancelled_token_issues_no_calls() {
    let token = CancelToken::new();
    token.cancel();
    let spec = AnalysisSpec::standard();
    let client = MockClient::ok();
    let config = AnalysisConfig::default();

    let err = raincheck::run(SCREENPLAY, &spec, &client, &config, &token)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RaincheckError::Cancelled {
            completed: 0,
            total: 9
        }
    ));
    assert_eq!(client.calls_issued(), 0);
}

// ── Concurrent dispatch ──────────────────────────────────────────────────────

fn marker_one(s: &str) -> String {
    format!("ONE {s}")
}
fn marker_two(s: &str) -> String {
    format!("TWO {s}")
}
fn marker_three(s: &str) -> String {
    format!("THREE {s}")
}

#[tokio::test]
async fn concurrent_mode_preserves_catalog_order() {
    let spec = AnalysisSpec::new(vec![
        SectionSpec::new("First", marker_one, 100),
        SectionSpec::new("Second", marker_two, 100),
        SectionSpec::new("Third", marker_three, 100),
    ])
    .unwrap();
    let client = MockClient::ok();
    let config = AnalysisConfig::builder().concurrency(3).build().unwrap();
    let cancel = CancelToken::new();

    let result = raincheck::run(SCREENPLAY, &spec, &client, &config, &cancel)
        .await
        .unwrap();

    let names: Vec<&str> = result.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
    // Each answer echoes its own prompt head, proving no cross-wiring.
    assert!(result.get("First").unwrap().contains("[ONE \"\"\"FADE"));
    assert!(result.get("Second").unwrap().contains("[TWO \"\"\"FADE"));
    assert!(result.get("Third").unwrap().contains("[THREE \"\"\"F"));
}

#[tokio::test]
async fn concurrent_failure_still_yields_no_partial_result() {
    let spec = AnalysisSpec::standard();
    let client = MockClient::failing_at(2);
    let config = AnalysisConfig::builder().concurrency(4).build().unwrap();
    let cancel = CancelToken::new();

    let err = raincheck::run(SCREENPLAY, &spec, &client, &config, &cancel)
        .await
        .expect_err("one section fails");
    assert!(matches!(err, RaincheckError::Api { .. }));
}

// ── Catalog validation ───────────────────────────────────────────────────────

#[test]
fn duplicate_section_names_are_rejected() {
    let err = AnalysisSpec::new(vec![
        SectionSpec::new("Genre", marker_one, 100),
        SectionSpec::new("Genre", marker_two, 100),
    ])
    .unwrap_err();
    assert!(matches!(err, RaincheckError::InvalidSpec(_)));
}

// ── Report rendering ─────────────────────────────────────────────────────────

fn section(name: &str, body: &str) -> SectionResult {
    SectionResult {
        name: name.into(),
        body: body.into(),
        input_tokens: 0,
        output_tokens: 0,
        duration_ms: 0,
    }
}

#[test]
fn render_without_fonts_fails_with_asset_missing() {
    let empty = tempfile::tempdir().unwrap();
    let err = raincheck::load_fonts(empty.path()).unwrap_err();
    assert!(matches!(err, RaincheckError::AssetMissing { .. }), "got: {err}");
}

#[test]
fn render_produces_a_pdf_with_sections_in_order() {
    let dir = skip_unless_fonts!();

    let analysis = AnalysisResult::new(vec![
        section("Alpha", "hello"),
        section("Beta", "world"),
    ]);
    let fonts = raincheck::load_fonts(&dir).expect("fonts load");
    let pdf = raincheck::render_report("Coverage", &analysis, fonts).expect("render succeeds");

    assert!(!pdf.is_empty());
    assert_eq!(&pdf[..5], b"%PDF-", "buffer must start with the PDF magic");

    // Re-parse the text stream and check relative order of the literals.
    let text = raincheck::extract_text(&pdf).expect("rendered report is parseable");
    let positions: Vec<usize> = ["Coverage", "Alpha", "hello", "Beta", "world"]
        .iter()
        .map(|needle| {
            text.find(needle)
                .unwrap_or_else(|| panic!("'{needle}' missing from report text"))
        })
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted, "section text out of order: {positions:?}");
}

#[test]
fn render_sanitises_markdown_in_bodies() {
    let dir = skip_unless_fonts!();

    let analysis = AnalysisResult::new(vec![section(
        "Script Score",
        "**Overall: 8/10** — see [notes](http://example.com)",
    )]);
    let fonts = raincheck::load_fonts(&dir).unwrap();
    let pdf = raincheck::render_report("T", &analysis, fonts).unwrap();

    let text = raincheck::extract_text(&pdf).unwrap();
    assert!(text.contains("Overall: 8/10"));
    assert!(!text.contains("**"), "bold tokens must not reach the page");
    assert!(!text.contains("(http://example.com)"));
}

// ── Sanitizer examples (public API surface) ──────────────────────────────────

#[test]
fn sanitize_examples() {
    assert_eq!(
        raincheck::sanitize("## Title\n**Bold** text"),
        "Title\nBold text"
    );
    assert_eq!(raincheck::sanitize("a\n\n\n\nb"), "a\n\nb");
    assert_eq!(raincheck::sanitize("[Open Sky](http://x)"), "Open Sky");
}
