use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tracing::{info, warn};

use seedbomb_aws::{SqsAcknowledger, SqsReceiver};
use seedbomb_consumer::SqsEvent;
use seedbomb_worker::config::WorkerConfig;
use seedbomb_worker::error::WorkerError;
use seedbomb_worker::{poll, telemetry, wiring};

/// Seedbomb provisioning-queue worker.
#[derive(Parser, Debug)]
#[command(
    name = "seedbomb-worker",
    about = "Consume provisioning requests from SQS and dispatch workflows exactly once"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "seedbomb.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Long-poll the configured queue until SIGINT or SIGTERM (default).
    Run,
    /// Process one Lambda-style SQS event read from a file, or stdin with `-`.
    Handle {
        /// Path to the event JSON.
        #[arg(long)]
        event: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = WorkerConfig::load(Path::new(&cli.config))?;

    let telemetry_guard = telemetry::init(&config.telemetry);

    if !Path::new(&cli.config).exists() {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_worker(&config).await,
        Commands::Handle { event } => handle_event_file(&config, &event).await,
    };

    // Flush pending OpenTelemetry spans before exit.
    telemetry_guard.shutdown();

    result.map_err(Into::into)
}

async fn run_worker(config: &WorkerConfig) -> Result<(), WorkerError> {
    let queue_url = wiring::required_queue_url(config)?;
    let receiver = Arc::new(SqsReceiver::new(wiring::sqs_config(config, queue_url)).await);
    let acknowledger = Arc::new(receiver.acknowledger());
    let orchestrator = Arc::new(wiring::build_orchestrator(config, acknowledger).await?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    info!(queue_url = %queue_url, "seedbomb-worker started");
    poll::run(receiver, orchestrator, config.queue.concurrency, shutdown_rx).await;
    info!("seedbomb-worker shut down");
    Ok(())
}

async fn handle_event_file(config: &WorkerConfig, path: &str) -> Result<(), WorkerError> {
    let contents = if path == "-" {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(path).await?
    };
    let event: SqsEvent = serde_json::from_str(&contents)?;

    if event.records.is_empty() {
        info!("event has no records");
        return Ok(());
    }

    // Prefer the configured queue; otherwise address the queue the event came from.
    let queue_url = match config.queue.queue_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => url.to_owned(),
        None => event
            .records
            .iter()
            .find_map(|r| r.event_source_arn.as_deref().and_then(wiring::queue_url_from_arn))
            .ok_or_else(|| {
                WorkerError::Config(
                    "[queue] queue_url is required when the event has no eventSourceARN".into(),
                )
            })?,
    };
    let acknowledger =
        Arc::new(SqsAcknowledger::new(&wiring::sqs_config(config, &queue_url)).await);
    let orchestrator = wiring::build_orchestrator(config, acknowledger).await?;

    let reports = orchestrator.handle_event(event).await?;
    for report in &reports {
        info!(
            message_id = %report.message_id,
            outcome = ?report.outcome,
            record_was_present = report.record_was_present,
            "record handled"
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
