//! Trade Desk - trade analysis form
//!
//! Collects a free-text trade description, sends it to the analysis
//! service and shows the trade analysis, risk analysis and final decision.

mod analysis;
mod config;
mod input;
mod render;
mod runtime;
mod state_machine;
mod ui;

use analysis::{HttpAnalysisService, LoggingService};
use clap::Parser;
use config::AppConfig;
use input::is_submittable;
use render::View;
use runtime::{RuntimeError, RuntimeEvent, SubmissionHandle};
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Analyze trades against the trade analysis service
#[derive(Parser, Debug)]
#[command(name = "trade-desk")]
#[command(version)]
struct Args {
    /// Trade description to analyze once. Opens the interactive form when omitted.
    query: Option<String>,

    /// Base URL of the analysis service, overriding the environment
    #[arg(long)]
    service_url: Option<String>,

    /// Give up on a request after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "trade_desk=info".into())
}

/// JSON logs to stderr
fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// JSON logs appended to `path`; the form owns the terminal
fn init_file_logging(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::registry()
        .with(default_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = AppConfig::from_env()?.with_overrides(args.service_url, args.timeout_secs)?;

    match &args.query {
        Some(_) => init_stderr_logging(),
        None => {
            if let Some(path) = &config.log_file {
                init_file_logging(path)?;
            }
        }
    }

    tracing::info!(
        service_url = %config.service_url,
        timeout_secs = config.request_timeout.map(|t| t.as_secs()),
        "Configuration loaded"
    );

    let service = LoggingService::new(HttpAnalysisService::new(
        &config.service_url,
        config.request_timeout,
    )?);
    let handle = runtime::spawn(service);

    match args.query {
        Some(query) => analyze_once(&handle, query).await,
        None => {
            ui::run(&handle).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Submit one query and print the outcome
async fn analyze_once(
    handle: &SubmissionHandle,
    query: String,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if !is_submittable(&query) {
        eprintln!("Nothing to analyze: the trade description is blank");
        return Ok(ExitCode::from(2));
    }

    let mut events = handle.subscribe();
    handle.submit(query).await?;

    // The first loading view names the request this call is waiting on
    let mut submitted = None;
    loop {
        match events.recv().await {
            Ok(RuntimeEvent::StateChange {
                latest_request,
                view,
            }) => {
                if view.is_loading {
                    submitted.get_or_insert(latest_request);
                } else if submitted.is_none_or(|id| id == latest_request) {
                    return Ok(print_view(&view));
                }
            }
            Ok(RuntimeEvent::ResponseDiscarded { request_id }) => {
                tracing::debug!(request_id, "Discarded response for superseded request");
            }
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => return Err(RuntimeError::Stopped.into()),
        }
    }
}

fn print_view(view: &View) -> ExitCode {
    if let Some(error) = &view.error {
        eprintln!("Error: {error}");
        return ExitCode::FAILURE;
    }
    for (title, body) in view.sections() {
        println!("== {title} ==\n{body}\n");
    }
    ExitCode::SUCCESS
}
