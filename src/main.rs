//! # persona-ask CLI (`ask`)
//!
//! Submits questions to the answer service and prints what the display
//! region shows once each submission settles: the answer text, or
//! `Error: <message>`.
//!
//! ## Usage
//!
//! ```bash
//! ask [--config ./config/ask.toml] [--url URL] [--json] [-v] [QUESTION...]
//! ```
//!
//! With a question, performs one submission and exits non-zero if it was
//! rejected or settled with an error. Without one, every stdin line is a
//! submission. Lines are handled one at a time, so answers are printed in
//! input order.
//!
//! ## Examples
//!
//! ```bash
//! ask "What is the capital of France?"
//! ask --url https://persona.example.com --json "bad"
//! cat questions.txt | ask
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use persona_ask::client::HttpAnswerService;
use persona_ask::config;
use persona_ask::display::DisplayState;
use persona_ask::notify::NotifyMode;
use persona_ask::submit::{SubmissionPolicy, SubmitOutcome, Submitter};

/// Ask the answer service a question and print the answer.
///
/// Settings are read from a TOML file (`[service] base_url`, `endpoint`,
/// `[client] policy`). Flags override the file.
#[derive(Parser)]
#[command(name = "ask", version, about = "Ask the answer service a question and print the answer")]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/ask.toml` when that file exists, otherwise
    /// built-in defaults are used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override `service.base_url` (e.g. `http://127.0.0.1:8000`).
    #[arg(long)]
    url: Option<String>,

    /// How overlapping submissions settle.
    #[arg(long, value_enum)]
    policy: Option<SubmissionPolicy>,

    /// Print each settled display state as a JSON object per line.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// The question. Reads questions from stdin when omitted.
    question: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut cfg = config::load_config_or_default(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        cfg.service.base_url = url.clone();
    }
    if let Some(policy) = cli.policy {
        cfg.client.policy = policy;
    }
    config::validate(&cfg)?;

    let service = HttpAnswerService::new(&cfg.service)?;
    info!(url = %service.url(), policy = ?cfg.client.policy, "answer service configured");

    let mode = if cli.json {
        NotifyMode::Json
    } else {
        NotifyMode::default_for_tty()
    };
    let submitter = Submitter::new(Arc::new(service), cfg.client.policy)
        .with_notifier(Arc::from(mode.notifier()));

    if !cli.question.is_empty() {
        let input = cli.question.join(" ");
        let outcome = submitter.submit(&input).await;
        print_outcome(&outcome, cli.json);
        let ok = matches!(&outcome, SubmitOutcome::Rendered(state) if !state.is_error());
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    run_stdin(submitter, cli.json).await?;
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Each line is one submission, settled before the next line is read.
async fn run_stdin(submitter: Submitter, json: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut count = 0usize;

    while let Some(line) = lines.next_line().await? {
        let outcome = submitter.submit(&line).await;
        print_outcome(&outcome, json);
        count += 1;
    }

    debug!(lines = count, "stdin closed");
    Ok(())
}

fn print_outcome(outcome: &SubmitOutcome, json: bool) {
    match outcome {
        SubmitOutcome::Rendered(state) => print_state(state, json),
        SubmitOutcome::Rejected | SubmitOutcome::Discarded => {}
    }
}

fn print_state(state: &DisplayState, json: bool) {
    if json {
        println!("{}", state.to_json());
    } else {
        println!("{}", state.content());
    }
}
