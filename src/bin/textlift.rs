//! CLI binary for textlift.
//!
//! A thin transport stand-in over the library crate: maps CLI flags to
//! `PipelineConfig`, runs the pipeline, and prints the preview plus artifact
//! locations.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use textlift::{
    inspect_bytes, process_bytes, EngineChoice, OcrEngines, PipelineConfig, PipelineProgress,
    ProgressHook,
};
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

/// Trim long backend errors to keep the log tidy. Counts characters, not
/// bytes — error details can carry non-ASCII paths or stderr text.
fn truncate_for_log(error: &str) -> String {
    let mut msg: String = error.chars().take(79).collect();
    if msg.len() < error.len() {
        msg.push('\u{2026}');
    }
    msg
}

// ── CLI progress hook using indicatif ────────────────────────────────────────

/// Terminal progress hook: a live bar plus per-page log lines. Works when
/// pages complete out of order (concurrent extraction).
struct CliProgress {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgress {
    /// The bar length is set by `on_pipeline_start` once the page count is
    /// known; until then it spins.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading input…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl PipelineProgress for CliProgress {
    fn on_pipeline_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
    }

    fn on_page_start(&self, page: usize, _total: usize) {
        self.bar.set_message(format!("page {page}"));
    }

    fn on_page_done(&self, page: usize, total: usize, chars: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page,
            total,
            dim(&format!("{chars:>6} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = truncate_for_log(error);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_pipeline_finish(&self, total: usize, succeeded: usize) {
        let failed = total.saturating_sub(succeeded);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} pages extracted",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages extracted  ({} failed, empty text substituted)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR a scan with the fast engine (tesseract), artifacts next to the input
  textlift scan.pdf

  # Handwritten pages: the accurate neural engine
  textlift --engine accurate notes.jpg

  # Persian + English document, artifacts into ./out/
  textlift --lang fa,en -o out contract.pdf

  # Higher rendering resolution for small print
  textlift --dpi 400 receipt.pdf

  # Structured JSON report instead of the preview
  textlift --json scan.pdf > report.json

  # Just classify and count pages, no OCR
  textlift --pages-only scan.pdf

ENGINES:
  fast       tesseract subprocess — quick, printed/clean text
  accurate   in-process neural models (ocrs) — slower, handwriting and
             irregular layouts; models load once per process

ENVIRONMENT VARIABLES:
  TEXTLIFT_TESSERACT_CMD   Path or name of the tesseract binary
  TEXTLIFT_TESSDATA_DIR    Directory with tesseract *.traineddata files
  TEXTLIFT_MODELS_DIR      Directory with text-detection.rten / text-recognition.rten
  TEXTLIFT_LANGS           Default language hints, comma separated (e.g. en,fa)
  TEXTLIFT_DPI             Default rendering DPI
  PDFIUM_DYNAMIC_LIB_PATH  Location of the pdfium shared library

SETUP:
  fast engine:      install tesseract plus the language packs you need
  accurate engine:  download the ocrs models
                    (https://github.com/robertknight/ocrs-models/releases)
                    into ./models/ or TEXTLIFT_MODELS_DIR
  both:             a pdfium shared library is required for PDF input
"#;

/// Extract text from documents and images via OCR.
#[derive(Parser, Debug)]
#[command(
    name = "textlift",
    version,
    about = "Extract text from scanned documents and images, exporting .txt and .docx",
    long_about = "Extract text from PDF documents and raster images using a selectable OCR \
engine (tesseract for printed text, neural models for handwriting), producing a plain-text \
artifact, a paginated DOCX artifact with RTL-aware layout, and a bounded text preview.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file: a PDF or an image (png, jpg, jpeg, bmp, tiff, tif).
    input: PathBuf,

    /// Directory to publish <stem>.txt and <stem>.docx into.
    /// Defaults to the input file's directory.
    #[arg(short, long, env = "TEXTLIFT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// OCR engine to run.
    #[arg(long, env = "TEXTLIFT_ENGINE", value_enum, default_value = "fast")]
    engine: EngineArg,

    /// Language hints in priority order, comma separated (e.g. en,fa).
    #[arg(long, env = "TEXTLIFT_LANGS", default_value = "en,fa")]
    lang: String,

    /// Rendering DPI for document pages (72–1200).
    #[arg(long, env = "TEXTLIFT_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    dpi: u32,

    /// Pages recognised concurrently.
    #[arg(short, long, env = "TEXTLIFT_CONCURRENCY", default_value_t = 2)]
    concurrency: usize,

    /// Path or name of the tesseract binary (fast engine).
    #[arg(long, env = "TEXTLIFT_TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: String,

    /// Directory containing tesseract *.traineddata files.
    #[arg(long, env = "TEXTLIFT_TESSDATA_DIR")]
    tessdata_dir: Option<PathBuf>,

    /// Directory containing the neural models (accurate engine).
    #[arg(long, env = "TEXTLIFT_MODELS_DIR", default_value = "models")]
    models_dir: PathBuf,

    /// Maximum preview length in characters.
    #[arg(long, env = "TEXTLIFT_PREVIEW_LIMIT", default_value_t = 4000)]
    preview_limit: usize,

    /// Print the structured JSON report instead of the preview.
    #[arg(long, env = "TEXTLIFT_JSON")]
    json: bool,

    /// Classify the input and count pages; no OCR.
    #[arg(long)]
    pages_only: bool,

    /// Disable the progress bar.
    #[arg(long, env = "TEXTLIFT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TEXTLIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the preview.
    #[arg(short, long, env = "TEXTLIFT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    Fast,
    Accurate,
}

impl From<EngineArg> for EngineChoice {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Fast => EngineChoice::Fast,
            EngineArg::Accurate => EngineChoice::Accurate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs are suppressed while the progress bar is active;
    // the bar provides all the feedback that matters. Verbose wins always.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.pages_only;
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

    let bytes = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let file_name = cli
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    // ── Pages-only mode ──────────────────────────────────────────────────
    if cli.pages_only {
        let profile = inspect_bytes(&bytes, &file_name)
            .await
            .context("Failed to inspect input")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&profile).context("Failed to serialise profile")?
            );
        } else {
            println!("File:   {}", profile.file_name);
            println!("Kind:   {}", profile.kind);
            println!("Pages:  {}", profile.pages);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let languages: Vec<String> = cli
        .lang
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let output_dir = cli.output_dir.clone().unwrap_or_else(|| {
        cli.input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let progress: Option<ProgressHook> = if show_progress {
        Some(CliProgress::new_dynamic() as Arc<dyn PipelineProgress>)
    } else {
        None
    };

    let mut builder = PipelineConfig::builder()
        .dpi(cli.dpi)
        .concurrency(cli.concurrency)
        .engine(cli.engine.into())
        .languages(languages)
        .tesseract_cmd(cli.tesseract_cmd.as_str())
        .models_dir(&cli.models_dir)
        .preview_limit(cli.preview_limit)
        .output_dir(&output_dir);
    if let Some(ref dir) = cli.tessdata_dir {
        builder = builder.tessdata_dir(dir);
    }
    if let Some(hook) = progress {
        builder = builder.progress(hook);
    }
    let config = builder.build().context("Invalid configuration")?;

    let engines = OcrEngines::new(&config);

    // ── Run the pipeline ─────────────────────────────────────────────────
    let output = process_bytes(&bytes, &file_name, &engines, &config)
        .await
        .context("OCR failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.preview.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.preview.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {}/{} pages  {}ms  →  {}  +  {}",
            if stats.failed_pages == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.processed_pages,
            stats.total_pages,
            stats.total_duration_ms,
            bold(&output_dir.join(&output.text_artifact.file_name).display().to_string()),
            bold(&output_dir.join(&output.docx_artifact.file_name).display().to_string()),
        );
        if output.rtl {
            eprintln!("   {}", dim("right-to-left layout applied to the DOCX"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_errors_pass_through_untruncated() {
        assert_eq!(truncate_for_log("tesseract exited with 1"), "tesseract exited with 1");
        let exactly_79 = "e".repeat(79);
        assert_eq!(truncate_for_log(&exactly_79), exactly_79);
    }

    #[test]
    fn long_errors_are_cut_with_an_ellipsis() {
        let long = "x".repeat(200);
        let msg = truncate_for_log(&long);
        assert_eq!(msg.chars().count(), 80);
        assert!(msg.ends_with('\u{2026}'));
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        // 79 bytes in, the cut would land inside a character if it were
        // byte-indexed.
        let long = format!("Datei nicht gefunden: {}", "ü".repeat(120));
        let msg = truncate_for_log(&long);
        assert_eq!(msg.chars().count(), 80);
        assert!(msg.ends_with('\u{2026}'));
    }
}
