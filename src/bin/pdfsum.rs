//! CLI binary for pdfsum.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SummarizerConfig` and renders the chat transcript in the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfsum::{
    cancel_pair, summarize_file_with_cancel, ChatUi, NoticeLevel, PipelineReport, Role,
    SummarizerConfig, Transcript,
};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal chat using indicatif ────────────────────────────────────────────

/// Terminal chat: bot messages on stdout, notices on stderr, and a spinner
/// on stderr while extraction or summarization runs.
struct TerminalChat {
    spinner: Mutex<Option<ProgressBar>>,
    show_spinner: bool,
    quiet: bool,
}

impl TerminalChat {
    fn new(show_spinner: bool, quiet: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            show_spinner,
            quiet,
        }
    }

    /// Print through the active spinner (if any) so lines don't get clobbered.
    fn eprint_line(&self, line: String) {
        match self.spinner.lock().unwrap_or_else(|p| p.into_inner()).as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl ChatUi for TerminalChat {
    fn render(&self, message: &str, role: Role) {
        if self.quiet {
            return;
        }
        let prefix = match role {
            Role::Bot => cyan("◆"),
            Role::User => bold("›"),
        };
        let guard = self.spinner.lock().unwrap_or_else(|p| p.into_inner());
        match guard.as_ref() {
            Some(bar) => bar.suspend(|| println!("{prefix} {message}")),
            None => println!("{prefix} {message}"),
        }
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        let line = match level {
            NoticeLevel::Warning => format!("{} {}", yellow("⚠"), yellow(message)),
            NoticeLevel::Error => format!("{} {}", red("✗"), red(message)),
        };
        self.eprint_line(line);
    }

    fn activity_started(&self, label: &str) {
        if !self.show_spinner {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.spinner.lock().unwrap_or_else(|p| p.into_inner()) = Some(bar);
    }

    fn activity_finished(&self) {
        if let Some(bar) = self.spinner.lock().unwrap_or_else(|p| p.into_inner()).take() {
            bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize a local PDF
  pdfsum report.pdf

  # Summarize a PDF from a URL
  pdfsum https://arxiv.org/pdf/1706.03762

  # Use another model and a shorter retry delay
  pdfsum --model gemini-2.0-flash --retry-delay 10 report.pdf

  # Full report (outcome, state path, transcript, stats) as JSON
  pdfsum --json report.pdf > report.json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY     Google Gemini API key (required)
  PDFSUM_PROVIDER    Override provider (default: gemini)
  PDFSUM_MODEL       Override model ID (default: gemini-1.5-flash-latest)
  PDFSUM_MAX_CHARS   Refuse documents with more extracted characters (default: 100000)
  PDFIUM_LIB_PATH    Path to libpdfium; the system library is used otherwise

  Variables may also be placed in a .env file in the working directory.

EXIT STATUS:
  0  a summary was produced
  1  fatal error (missing file, no API key, ...)
  2  the document was processed but no summary could be produced
"#;

/// Summarize PDF files and URLs with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsum",
    version,
    about = "Summarize PDF files and URLs with an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Load environment variables from this file instead of ./.env.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// LLM provider name.
    #[arg(long, env = "PDFSUM_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID.
    #[arg(long, env = "PDFSUM_MODEL")]
    model: Option<String>,

    /// Refuse documents whose extracted text has more characters than this.
    #[arg(long, env = "PDFSUM_MAX_CHARS")]
    max_chars: Option<usize>,

    /// Total LLM attempts when the quota is exhausted.
    #[arg(long, env = "PDFSUM_MAX_ATTEMPTS", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,

    /// Seconds to wait before retrying after a quota error.
    #[arg(long, env = "PDFSUM_RETRY_DELAY", default_value_t = 30)]
    retry_delay: u64,

    /// LLM temperature (0.0–2.0). Provider default if unset.
    #[arg(long, env = "PDFSUM_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max LLM output tokens. Provider default if unset.
    #[arg(long, env = "PDFSUM_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Per-call LLM timeout in seconds.
    #[arg(long, env = "PDFSUM_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDFSUM_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFSUM_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Output the full PipelineReport and transcript as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "PDFSUM_NO_SPINNER")]
    no_spinner: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSUM_VERBOSE")]
    verbose: bool,

    /// Print only the final message (the summary or the apology).
    #[arg(short, long, env = "PDFSUM_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // clap resolves `env = ...` fallbacks while parsing, so the env file
    // must already be loaded.
    load_env_file()?;
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and chat lines provide the feedback that matters; library
    // INFO logs would interleave with them, so only errors show by default.
    let show_spinner = !cli.quiet && !cli.no_spinner && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner || cli.json {
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

    let config = build_config(&cli)?;

    // ── Ctrl-C cancels the running summarization ─────────────────────────
    let (cancel_handle, cancel_signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_handle.cancel();
        }
    });

    // ── Run ──────────────────────────────────────────────────────────────
    let terminal = TerminalChat::new(show_spinner, cli.quiet || cli.json);
    let transcript = Transcript::new();
    let tee = pdfsum::ui::Tee::new(&terminal, &transcript);

    let report = summarize_file_with_cancel(&cli.input, &config, &tee, &cancel_signal)
        .await
        .context("Summarization failed")?;

    if cli.json {
        print_json(&report, &transcript)?;
    } else if cli.quiet {
        println!("{}", report.final_message());
    }

    if !report.is_success() {
        std::process::exit(2);
    }
    Ok(())
}

fn print_json(report: &PipelineReport, transcript: &Transcript) -> Result<()> {
    let value = serde_json::json!({
        "report": report,
        "transcript": transcript.entries(),
    });
    let json = serde_json::to_string_pretty(&value).context("Failed to serialise report")?;
    println!("{json}");
    Ok(())
}

/// Value of `--env-file` in `args`, if given.
fn env_file_arg(args: impl IntoIterator<Item = String>) -> Option<PathBuf> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--" {
            break;
        }
        if arg == "--env-file" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--env-file=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// Load `--env-file` if given, otherwise `./.env` when present.
/// Variables already set in the environment win.
fn load_env_file() -> Result<()> {
    let args = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned());
    match env_file_arg(args) {
        Some(path) => {
            dotenvy::from_path(&path)
                .with_context(|| format!("Cannot load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

/// Map CLI args (and the environment) to `SummarizerConfig`.
fn build_config(cli: &Cli) -> Result<SummarizerConfig> {
    let base = match cli.env_file {
        Some(ref path) => SummarizerConfig::from_env_file(path),
        None => SummarizerConfig::from_env(),
    }
    .context("Invalid environment configuration")?;

    let mut builder = SummarizerConfig::builder()
        .provider_name(cli.provider.clone().unwrap_or(base.provider_name))
        .model(cli.model.clone().unwrap_or(base.model))
        .max_text_chars(cli.max_chars.unwrap_or(base.max_text_chars))
        .max_attempts(cli.max_attempts)
        .retry_delay(Duration::from_secs(cli.retry_delay))
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(key) = base.api_key {
        builder = builder.api_key(key);
    }
    if let Some(path) = cli.pdfium_lib.clone().or(base.pdfium_lib_path) {
        builder = builder.pdfium_lib_path(path);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn env_file_arg_forms() {
        assert_eq!(
            env_file_arg(args(&["--env-file", "prod.env", "a.pdf"])),
            Some(PathBuf::from("prod.env"))
        );
        assert_eq!(
            env_file_arg(args(&["-q", "--env-file=/etc/pdfsum.env", "a.pdf"])),
            Some(PathBuf::from("/etc/pdfsum.env"))
        );
        assert_eq!(env_file_arg(args(&["a.pdf"])), None);
        assert_eq!(env_file_arg(args(&["--env-file"])), None);
        assert_eq!(env_file_arg(args(&["--", "--env-file", "x.env"])), None);
    }

    #[test]
    fn env_file_feeds_clap_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.env");
        std::fs::write(&path, "PDFSUM_TEST_ENV_FILE_MODEL=model-from-file\n").unwrap();
        dotenvy::from_path(&path).unwrap();

        #[derive(Parser)]
        struct ModelOnly {
            #[arg(long, env = "PDFSUM_TEST_ENV_FILE_MODEL")]
            model: Option<String>,
        }
        let parsed = ModelOnly::parse_from(["pdfsum"]);
        assert_eq!(parsed.model.as_deref(), Some("model-from-file"));
    }
}
