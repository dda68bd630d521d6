//! CLI binary for docshift.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConverterConfig`, reads the input file and writes the converted one.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Args, Parser, Subcommand};
use docshift::{
    convert_markdown_to_docx, convert_markdown_to_pdf, markdown_to_docx_bytes,
    markdown_to_pdf_bytes, write_output, ConverterConfig, DocShiftError, Locale,
    OptimizeProgressCallback, OptimizeStage, PdfOptimizer,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

/// Exit status when the optimizer declines to rewrite the file.
const EXIT_MINIMAL_GAIN: u8 = 3;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner plus one log line per finished optimizer stage.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Optimizing");
        bar.set_message("Reading PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn stage_elapsed(&self) -> String {
        let secs = self
            .started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        dim(&format!("{secs:.1}s"))
    }
}

impl OptimizeProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: OptimizeStage) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: OptimizeStage) {
        self.bar.println(format!(
            "  {} {:<24} {}",
            green("✓"),
            stage.label(),
            self.stage_elapsed()
        ));
    }

    fn on_stage_error(&self, stage: OptimizeStage, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['…']).collect()
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:<24} {}",
            red("✗"),
            stage.label(),
            red(&msg)
        ));
        self.bar.finish_and_clear();
    }

    fn on_optimize_complete(&self, original_size: usize, final_size: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} → {}",
            green("✔"),
            human_bytes(original_size),
            bold(&human_bytes(final_size))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Markdown to PDF (writes notes.pdf next to the input)
  docshift pdf notes.md

  # Markdown to DOCX, explicit output path
  docshift docx notes.md -o out/notes.docx

  # Read markdown from stdin
  cat notes.md | docshift pdf - -o notes.pdf

  # Shrink a PDF (writes report.optimized.pdf)
  docshift optimize report.pdf

  # Response JSON on stdout instead of a file, Spanish error messages
  docshift --json --locale es optimize report.pdf > result.json

EXIT STATUS:
  0  success
  1  conversion failed
  3  optimize: the PDF is already lean, nothing written

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory) for `optimize`
  CHROME_PATH             Path to the Chrome/Chromium executable for `optimize`
  DOCSHIFT_NO_SANDBOX     Launch Chrome without its sandbox (needed as root)
  DOCSHIFT_LOCALE         Language of error messages: en, es
  RUST_LOG                Overrides the log filter

SETUP:
  `pdf` and `docx` need nothing beyond the binary. `optimize` needs a pdfium
  shared library (https://github.com/bblanchon/pdfium-binaries) and a local
  Chrome or Chromium.
"#;

/// Convert Markdown to PDF or DOCX, and shrink text-heavy PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "docshift",
    version,
    about = "Convert Markdown to PDF or DOCX, and shrink text-heavy PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the response as JSON on stdout instead of writing a file.
    #[arg(long, global = true, env = "DOCSHIFT_JSON")]
    json: bool,

    /// Language of user-facing error messages.
    #[arg(long, global = true, env = "DOCSHIFT_LOCALE", value_enum, default_value = "en")]
    locale: LocaleArg,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "DOCSHIFT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCSHIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCSHIFT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a Markdown file as a plain-text PDF.
    Pdf(MarkdownArgs),
    /// Render a Markdown file as a Word document.
    Docx(MarkdownArgs),
    /// Shrink a PDF by extracting its text and re-printing it.
    Optimize(OptimizeArgs),
}

#[derive(Args, Debug)]
struct MarkdownArgs {
    /// Markdown file, or `-` for stdin.
    input: PathBuf,

    /// Output path. Defaults to the input with the new extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reject inputs larger than this many bytes.
    #[arg(long, env = "DOCSHIFT_MAX_MARKDOWN_BYTES")]
    max_bytes: Option<usize>,
}

#[derive(Args, Debug)]
struct OptimizeArgs {
    /// PDF file, or `-` for stdin.
    input: PathBuf,

    /// Output path. Defaults to `<input>.optimized.pdf`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reject inputs larger than this many bytes.
    #[arg(long, env = "DOCSHIFT_MAX_PDF_BYTES")]
    max_bytes: Option<usize>,

    /// Refuse results that shrink less than this percentage.
    #[arg(long, env = "DOCSHIFT_MIN_REDUCTION", default_value_t = 5,
          value_parser = clap::value_parser!(i64).range(0..=100))]
    min_reduction: i64,

    /// Path to the Chrome/Chromium executable.
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Launch Chrome without its sandbox.
    #[arg(long, env = "DOCSHIFT_NO_SANDBOX")]
    no_sandbox: bool,

    /// Browser timeout in seconds.
    #[arg(long, env = "DOCSHIFT_RENDER_TIMEOUT", default_value_t = 30)]
    render_timeout: u64,

    /// Path to libpdfium, or the directory containing it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LocaleArg {
    En,
    Es,
}

impl From<LocaleArg> for Locale {
    fn from(v: LocaleArg) -> Self {
        match v {
            LocaleArg::En => Locale::En,
            LocaleArg::Es => Locale::Es,
        }
    }
}

#[derive(Clone, Copy)]
enum Target {
    Pdf,
    Docx,
}

impl Target {
    fn extension(self) -> &'static str {
        match self {
            Target::Pdf => "pdf",
            Target::Docx => "docx",
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // per-stage lines carry the same information.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    match &cli.command {
        Command::Pdf(args) => run_markdown(&cli, args, Target::Pdf).await,
        Command::Docx(args) => run_markdown(&cli, args, Target::Docx).await,
        Command::Optimize(args) => run_optimize(&cli, args, show_progress).await,
    }
}

async fn run_markdown(cli: &Cli, args: &MarkdownArgs, target: Target) -> Result<ExitCode> {
    let mut builder = ConverterConfig::builder().locale(cli.locale.into());
    if let Some(max) = args.max_bytes {
        builder = builder.max_markdown_bytes(max);
    }
    let config = builder.build().context("Invalid configuration")?;

    let bytes = read_input(&args.input).await?;
    let markdown = String::from_utf8(bytes).context("Markdown input is not valid UTF-8")?;

    if cli.json {
        let response = match target {
            Target::Pdf => convert_markdown_to_pdf(&markdown, &config),
            Target::Docx => convert_markdown_to_docx(&markdown, &config),
        };
        print_json(&response)?;
        return Ok(if response.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let started = Instant::now();
    let out = match target {
        Target::Pdf => markdown_to_pdf_bytes(&markdown, &config),
        Target::Docx => markdown_to_docx_bytes(&markdown, &config),
    }
    .with_context(|| format!("Failed to convert markdown to {}", target.extension()))?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input, target.extension()));
    write_output(&output_path, &out)
        .await
        .context("Failed to write output")?;

    if !cli.quiet {
        eprintln!(
            "{}  {}  {}ms  →  {}",
            green("✔"),
            human_bytes(out.len()),
            started.elapsed().as_millis(),
            bold(&output_path.display().to_string()),
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_optimize(cli: &Cli, args: &OptimizeArgs, show_progress: bool) -> Result<ExitCode> {
    let mut builder = ConverterConfig::builder()
        .locale(cli.locale.into())
        .min_reduction_percent(args.min_reduction)
        .chrome_sandbox(!args.no_sandbox)
        .render_timeout_secs(args.render_timeout);
    if let Some(max) = args.max_bytes {
        builder = builder.max_pdf_bytes(max);
    }
    if let Some(ref path) = args.chrome_path {
        builder = builder.chrome_path(path);
    }
    if let Some(ref path) = args.pdfium_lib_path {
        builder = builder.pdfium_library_path(path);
    }
    let config = builder.build().context("Invalid configuration")?;

    let pdf = read_input(&args.input).await?;
    let mut optimizer = PdfOptimizer::new(config);

    if cli.json {
        let result = optimizer.optimize_base64(&STANDARD.encode(&pdf)).await;
        print_json(&result)?;
        return Ok(if result.is_success() {
            ExitCode::SUCCESS
        } else if result.error_kind == Some(docshift::ErrorKind::MinimalGain) {
            ExitCode::from(EXIT_MINIMAL_GAIN)
        } else {
            ExitCode::FAILURE
        });
    }

    if show_progress {
        optimizer = optimizer.with_progress(CliProgressCallback::new());
    }

    match optimizer.optimize_bytes(pdf).await {
        Ok(optimized) => {
            let output_path = args
                .output
                .clone()
                .unwrap_or_else(|| default_output(&args.input, "optimized.pdf"));
            write_output(&output_path, &optimized.bytes)
                .await
                .context("Failed to write output")?;
            if !cli.quiet {
                eprintln!(
                    "{}  {}% smaller  →  {}",
                    green("✔"),
                    optimized.reduction_percent,
                    bold(&output_path.display().to_string()),
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(DocShiftError::MinimalGain {
            reduction_percent, ..
        }) => {
            if !cli.quiet {
                let detail = reduction_percent
                    .map(|p| format!("re-rendering saves only {p}%"))
                    .unwrap_or_else(|| "the file is already lean".to_string());
                eprintln!("{}  Not optimized: {}", yellow("⚠"), detail);
            }
            Ok(ExitCode::from(EXIT_MINIMAL_GAIN))
        }
        Err(e) => Err(anyhow::Error::new(e).context("Optimization failed")),
    }
}

/// Read the whole input file, or stdin for `-`.
async fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise response")?;
    println!("{json}");
    Ok(())
}

/// `notes.md` → `notes.<ext>`; stdin → `output.<ext>`.
fn default_output(input: &Path, ext: &str) -> PathBuf {
    if input.as_os_str() == "-" {
        return PathBuf::from(format!("output.{ext}"));
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}.{ext}"))
}

fn human_bytes(n: usize) -> String {
    const KIB: f64 = 1024.0;
    let n = n as f64;
    if n < KIB {
        format!("{n} B")
    } else if n < KIB * KIB {
        format!("{:.1} KiB", n / KIB)
    } else {
        format!("{:.1} MiB", n / (KIB * KIB))
    }
}
