//! CLI binary for doc2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ClientConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use doc2md::{
    ClientConfig, ConversionOutput, ConversionProgressCallback, Converter, Doc2MdError,
    ProgressCallback, ResultSource, ResultWarning, DEFAULT_BASE_URL,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while uploading, then a percentage
/// bar while the server converts.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    /// Switch to the percentage bar once the server owns the task.
    fn activate_bar(&self) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}%  {msg}  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.set_position(0);
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_upload_started(&self, filename: &str) {
        self.bar.set_prefix("Uploading");
        self.bar.set_message(filename.to_string());
    }

    fn on_processing_started(&self, filename: &str) {
        self.activate_bar();
        self.bar.set_message(filename.to_string());
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Uploaded {filename}, waiting for the converter…"))
        ));
    }

    fn on_progress(&self, _filename: &str, percent: u8) {
        self.bar.set_position(percent as u64);
    }

    fn on_warning(&self, warning: &ResultWarning) {
        self.bar
            .println(format!("  {} {}", yellow("⚠"), dim(&warning.to_string())));
    }

    fn on_completed(&self, output: &ConversionOutput) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} characters converted {}",
            green("✔"),
            bold(&output.char_count.to_string()),
            dim(&format!("(task {})", output.task_id)),
        );
    }

    fn on_failed(&self, reason: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), red(reason));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (stdout)
  doc2md report.pdf

  # Convert to file
  doc2md slides.pptx -o slides.md

  # Extract embedded images, keep the server's artifact copy too
  doc2md --extract-images --save-artifact ./artifacts paper.docx

  # JSON output with source, warnings and timing
  doc2md --json spreadsheet.xlsx > result.json

  # Remove the task from the server once the result is saved
  doc2md --delete-after -o notes.md notes.html

  # Check the service is reachable (no secret needed)
  doc2md --health

ENVIRONMENT VARIABLES:
  DOC2MD_BASE_URL         API base URL (default http://127.0.0.1:8000/api/v1/async)
  DOC2MD_SECRET_KEY       Shared HMAC secret used to sign requests
  DOC2MD_USER_ID          Optional user id attached to created tasks
  RUST_LOG                Override log filtering (e.g. doc2md=debug)

AUTHENTICATION:
  Every API request carries X-API-Signature and X-API-Timestamp headers:
  hex HMAC-SHA256 of METHOD:PATH:TIMESTAMP:BODY with the shared secret.
  The server rejects timestamps more than 300 s away from its clock.
"#;

/// Convert documents to Markdown through a remote conversion service.
#[derive(Parser, Debug)]
#[command(
    name = "doc2md",
    version,
    about = "Convert documents to Markdown through a remote conversion service",
    long_about = "Upload a document (PDF, Office, HTML, images, audio, …) to a doc2md conversion \
service, wait for the server to convert it, and print or save the resulting Markdown.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to convert.
    #[arg(required_unless_present = "health")]
    input: Option<PathBuf>,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long, env = "DOC2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// API base URL.
    #[arg(long, env = "DOC2MD_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Shared secret used to sign API requests.
    #[arg(
        long,
        env = "DOC2MD_SECRET_KEY",
        hide_env_values = true,
        required_unless_present = "health"
    )]
    secret_key: Option<String>,

    /// User id attached to the created task.
    #[arg(long, env = "DOC2MD_USER_ID")]
    user_id: Option<String>,

    /// Ask the server to extract embedded images.
    #[arg(long, env = "DOC2MD_EXTRACT_IMAGES")]
    extract_images: bool,

    /// Print structured JSON (ConversionOutput) to stdout instead of Markdown.
    #[arg(long, env = "DOC2MD_JSON", conflicts_with = "output")]
    json: bool,

    /// Also save the server's artifact into this directory.
    #[arg(long, value_name = "DIR")]
    save_artifact: Option<PathBuf>,

    /// Delete the task on the server after the result is retrieved.
    #[arg(long)]
    delete_after: bool,

    /// Check service health and exit.
    #[arg(long)]
    health: bool,

    /// Delay between status checks, in milliseconds.
    #[arg(long, env = "DOC2MD_POLL_INTERVAL_MS", default_value_t = 2000,
          value_parser = clap::value_parser!(u64).range(100..))]
    poll_interval_ms: u64,

    /// Give up after this many status checks.
    #[arg(long, env = "DOC2MD_MAX_POLL_ATTEMPTS", default_value_t = 900)]
    max_poll_attempts: u32,

    /// Give up after this many seconds of polling.
    #[arg(long, env = "DOC2MD_POLL_TIMEOUT")]
    poll_timeout: Option<u64>,

    /// Per-request timeout for API calls, in seconds.
    #[arg(long, env = "DOC2MD_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,

    /// Timeout for the storage upload, in seconds.
    #[arg(long, env = "DOC2MD_TRANSFER_TIMEOUT", default_value_t = 300)]
    transfer_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "DOC2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.health;
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;
    let converter = Converter::new(config).context("Failed to create client")?;

    // ── Health mode ──────────────────────────────────────────────────────
    if cli.health {
        return run_health(&converter, cli.json).await;
    }

    let input = cli
        .input
        .as_deref()
        .context("No input file given")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = tokio::select! {
        result = convert(&converter, input, cli.output.as_deref()) => {
            result.context("Conversion failed")?
        }
        _ = tokio::signal::ctrl_c() => {
            converter.cancel_active();
            anyhow::bail!("Interrupted");
        }
    };

    match cli.output {
        Some(ref output_path) => {
            if !cli.quiet {
                eprintln!(
                    "{}  {} chars  {}ms  →  {}",
                    green("✔"),
                    output.char_count,
                    output.stats.total_duration_ms,
                    bold(&output_path.display().to_string()),
                );
            }
        }
        None if cli.json => {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.markdown.as_bytes())
                .context("Failed to write to stdout")?;
            // Ensure a trailing newline on stdout.
            if !output.markdown.is_empty() && !output.markdown.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }

    // Only print warnings and stats when the progress callback is disabled.
    if !cli.quiet && !show_progress && !cli.json {
        for warning in &output.warnings {
            eprintln!("{} {}", yellow("⚠"), warning);
        }
        eprintln!(
            "Converted {} in {}ms ({} status checks, source: {})",
            output.task_id,
            output.stats.total_duration_ms,
            output.stats.poll_count,
            source_label(output.source),
        );
    }

    // ── Follow-up actions ────────────────────────────────────────────────
    if let Some(ref dir) = cli.save_artifact {
        if output.download_url.is_some() {
            let path = converter
                .save_artifact(&output.task_id, dir)
                .await
                .context("Failed to save artifact")?;
            if !cli.quiet {
                eprintln!("   artifact  →  {}", bold(&path.display().to_string()));
            }
        } else if !cli.quiet {
            eprintln!(
                "   {}",
                dim("no artifact to save; the result came from the status response")
            );
        }
    }

    if cli.delete_after {
        converter
            .delete_task(&output.task_id)
            .await
            .context("Failed to delete task")?;
        if !cli.quiet {
            eprintln!("   {}", dim(&format!("deleted task {}", output.task_id)));
        }
    }

    Ok(())
}

async fn convert(
    converter: &Converter,
    input: &Path,
    output: Option<&Path>,
) -> Result<ConversionOutput, Doc2MdError> {
    match output {
        Some(path) => converter.convert_to_file(input, path).await,
        None => converter.convert(input).await,
    }
}

async fn run_health(converter: &Converter, json: bool) -> Result<()> {
    let status = converter
        .health()
        .await
        .context("Conversion service unreachable")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).context("Failed to serialise health")?
        );
    } else {
        println!("Status:     {}", status.status);
        if let Some(ref s) = status.service {
            println!("Service:    {}", s);
        }
        if let Some(ref c) = status.celery_status {
            println!("Workers:    {}", c);
        }
        if !status.supported_formats.is_empty() {
            println!("Formats:    {}", status.supported_formats.join(" "));
        }
    }

    if !status.is_healthy() {
        anyhow::bail!("Service reports status '{}'", status.status);
    }
    Ok(())
}

fn source_label(source: ResultSource) -> &'static str {
    match source {
        ResultSource::Artifact => "artifact",
        ResultSource::Inline => "inline",
        ResultSource::Empty => "empty",
    }
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ClientConfig> {
    // `/health` is unsigned, so health mode works without a secret.
    let secret = match (&cli.secret_key, cli.health) {
        (Some(key), _) => key.clone(),
        (None, true) => "unused-for-health".to_string(),
        (None, false) => anyhow::bail!("A secret key is required (--secret-key or DOC2MD_SECRET_KEY)"),
    };

    let mut builder = ClientConfig::builder()
        .base_url(&cli.base_url)
        .secret_key(secret)
        .extract_images(cli.extract_images)
        .poll_interval(Duration::from_millis(cli.poll_interval_ms))
        .max_poll_attempts(cli.max_poll_attempts)
        .request_timeout(Duration::from_secs(cli.request_timeout))
        .transfer_timeout(Duration::from_secs(cli.transfer_timeout));

    if let Some(secs) = cli.poll_timeout {
        builder = builder.poll_timeout(Duration::from_secs(secs));
    }
    if let Some(ref user) = cli.user_id {
        builder = builder.user_id(user);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
