//! CLI binary for raincheck.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig`, runs the analysis, and writes the report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use raincheck::{
    analyze, extract_text, generate_report, AnalysisConfig, AnalysisProgressCallback,
    ProgressCallback,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per section.
/// Works correctly when sections complete out of order (concurrency > 1).
struct CliProgress {
    bar: ProgressBar,
    /// Per-section wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgress {
    /// Create a callback whose bar length is set by `on_analysis_start`.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading screenplay…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once the total is known.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} sections  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Analysing");
    }
}

impl AnalysisProgressCallback for CliProgress {
    fn on_analysis_start(&self, total_sections: usize) {
        self.activate_bar(total_sections);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Running {total_sections} analysis sections…"))
        ));
    }

    fn on_section_start(&self, index: usize, _total: usize, name: &str) {
        self.start_times
            .lock()
            .unwrap()
            .insert(index, Instant::now());
        self.bar.set_message(name.to_string());
    }

    fn on_section_complete(&self, index: usize, total: usize, name: &str, body_len: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} {:>2}/{:<2}  {:<22}  {}  {}",
            green("✓"),
            index + 1,
            total,
            name,
            dim(&format!("{body_len:>5} chars")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_section_error(&self, index: usize, total: usize, name: &str, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.len() > 80 {
            let cut = error
                .char_indices()
                .nth(79)
                .map(|(i, _)| i)
                .unwrap_or(error.len());
            format!("{}\u{2026}", &error[..cut])
        } else {
            error
        };

        self.bar.println(format!(
            "  {} {:>2}/{:<2}  {:<22}  {}",
            red("✗"),
            index + 1,
            total,
            name,
            red(&msg),
        ));
        self.bar.abandon_with_message("aborted".to_string());
    }

    fn on_analysis_complete(&self, total: usize, succeeded: usize) {
        self.bar.finish_and_clear();
        if succeeded == total {
            eprintln!(
                "{} {} sections analysed successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse a screenplay and write <name>-report.pdf next to it
  raincheck screenplay.pdf

  # Explicit report path and title
  raincheck screenplay.pdf -o coverage.pdf --title "Coverage: Night Train"

  # Structured JSON to stdout (no fonts needed)
  raincheck --json screenplay.pdf > analysis.json

  # Just the extracted text (no API key needed)
  raincheck --extract-only screenplay.pdf

  # Faster, burstier: run sections in parallel
  raincheck --concurrency 4 screenplay.pdf

SECTIONS (in report order):
  Logline, Genre, Top Keywords, Location Setting, Synopsis,
  Script Score, Plot Assessment, Character Profiling, Box Office Collection

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY       API key (required unless --extract-only)
  OPENAI_BASE_URL      Override the chat-completion endpoint
                       (any OpenAI-compatible server works)
  RAINCHECK_MODEL      Override the model ID
  RAINCHECK_FONT_DIR   Directory holding the report fonts

SETUP:
  1. Set API key:   export OPENAI_API_KEY=sk-...
  2. Fetch fonts:   put DejaVuSans.ttf and DejaVuSans-Bold.ttf into ./fonts/
                    (https://dejavu-fonts.github.io/, or your distro's
                    fonts-dejavu package)
  3. Analyse:       raincheck screenplay.pdf
"#;

/// Analyse a screenplay PDF and produce a coverage-style PDF report.
#[derive(Parser, Debug)]
#[command(
    name = "raincheck",
    version,
    about = "Analyse a screenplay PDF and produce a coverage-style PDF report",
    long_about = "Extracts the text of a screenplay PDF, runs a nine-section analysis battery \
(logline, genre, keywords, synopsis, scoring, plot, characters, box office) against an \
OpenAI-compatible chat-completion endpoint, and renders the answers as a PDF report.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the screenplay PDF.
    input: PathBuf,

    /// Write the PDF report here (default: <input stem>-report.pdf).
    #[arg(short, long, env = "RAINCHECK_OUTPUT")]
    output: Option<PathBuf>,

    /// Chat-completion model ID.
    #[arg(long, env = "RAINCHECK_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "RAINCHECK_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Title placed at the top of the report.
    #[arg(long, env = "RAINCHECK_TITLE", default_value = "Screenplay Analysis Report")]
    title: String,

    /// Directory holding DejaVuSans.ttf and DejaVuSans-Bold.ttf.
    #[arg(long, env = "RAINCHECK_FONT_DIR", default_value = "fonts")]
    font_dir: PathBuf,

    /// Completion calls in flight at once (1 = strictly sequential).
    #[arg(long, env = "RAINCHECK_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Per-call API timeout in seconds.
    #[arg(long, env = "RAINCHECK_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Print the analysis as JSON to stdout instead of rendering a PDF.
    #[arg(long, env = "RAINCHECK_JSON")]
    json: bool,

    /// Extract and print the screenplay text, then exit (no API key needed).
    #[arg(long)]
    extract_only: bool,

    /// Disable the progress bar.
    #[arg(long, env = "RAINCHECK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RAINCHECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RAINCHECK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.extract_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let pdf_bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read '{}'", cli.input.display()))?;

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let text = extract_text(&pdf_bytes).context("Text extraction failed")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
        if !text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgress::new_dynamic() as ProgressCallback)
    } else {
        None
    };

    let mut builder = AnalysisConfig::builder()
        .model(&cli.model)
        .temperature(cli.temperature)
        .report_title(&cli.title)
        .font_dir(&cli.font_dir)
        .concurrency(cli.concurrency)
        .api_timeout_secs(cli.api_timeout);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── JSON mode: analysis only, no report ──────────────────────────────
    if cli.json {
        let output = analyze(&pdf_bytes, &config)
            .await
            .context("Analysis failed")?;
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialise analysis")?;
        println!("{json}");
        return Ok(());
    }

    // ── Full run: analysis + PDF report ──────────────────────────────────
    let output = generate_report(&pdf_bytes, &config)
        .await
        .context("Analysis failed")?;

    let out_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_report_path(&cli.input));
    write_atomic(&out_path, &output.report_pdf)
        .with_context(|| format!("Failed to write report to '{}'", out_path.display()))?;

    if !cli.quiet {
        eprintln!(
            "{}  {} sections  {}ms  →  {}",
            green("✔"),
            output.stats.sections,
            output.stats.total_duration_ms,
            bold(&out_path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&output.stats.total_input_tokens.to_string()),
            dim(&output.stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

/// Derive the default report path from the input name: `script.pdf` →
/// `script-report.pdf`, next to the input.
fn default_report_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("screenplay");
    input.with_file_name(format!("{stem}-report.pdf"))
}

/// Atomic write (temp file + rename) to prevent partial report files.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = path.with_extension("pdf.tmp");
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)
}
