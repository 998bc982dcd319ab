//! FraudGuard
//!
//! Screens payment transactions for fraud: balance-consistency rules first,
//! a trained classifier for everything the rules cannot decide.

use anyhow::{Context, Result};
use clap::Parser;
use fraudguard_batch::{write_csv, BatchOrchestrator};
use fraudguard_classifiers::load_adapter;
use fraudguard_core::TransactionRecord;
use fraudguard_policy::DecisionEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use fraudguard_cli::{report, routes, AppConfig, AppState, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.log_json);

    // Load configuration
    let config = AppConfig::load(&cli.config, &cli)?;
    info!(
        classifier = ?config.classifier.kind,
        model = ?config.classifier.path,
        high_value_threshold = config.policy.high_value_threshold,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Check {
            step,
            amount,
            old_balance_origin,
            new_balance_origin,
            old_balance_destination,
            new_balance_destination,
            flagged,
            json,
        } => {
            let record = TransactionRecord::new(
                step,
                amount,
                old_balance_origin,
                new_balance_origin,
                old_balance_destination,
                new_balance_destination,
                flagged,
            )?;
            run_check(&config, record, json).await
        }
        Commands::Batch { input, output, .. } => run_batch(&config, &input, output.as_deref()).await,
        Commands::Serve { listen, port } => run_serve(&config, &listen, port).await,
    }
}

async fn run_check(config: &AppConfig, record: TransactionRecord, json: bool) -> Result<()> {
    let engine = build_engine(config)?;
    let assessment = engine.assess(&record).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print!("{}", report::render_assessment(&assessment));
    }
    Ok(())
}

async fn run_batch(
    config: &AppConfig,
    input: &std::path::Path,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let engine = build_engine(config)?;
    let orchestrator = BatchOrchestrator::new(engine, config.batch.clone());

    let source = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;

    // Ctrl+C stops scheduling; rows already in flight still finish
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling batch");
            canceller.cancel();
        }
    });

    let result = orchestrator.run_csv(BufReader::new(source), token).await?;

    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            write_csv(&result, BufWriter::new(file))?;
            info!(path = %path.display(), "Results written");
        }
        None => write_csv(&result, std::io::stdout().lock())?,
    }

    eprint!(
        "{}",
        report::render_summary(
            &result.summary,
            &orchestrator.metrics().snapshot(),
            result.cancelled
        )
    );
    Ok(())
}

async fn run_serve(config: &AppConfig, listen: &str, port: u16) -> Result<()> {
    info!("Starting FraudGuard server");

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    let state = AppState::from_config(config, Some(metrics_handle))?;
    let shutdown_token = state.shutdown.clone();
    let app = routes::create_router(state);

    let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    // Graceful shutdown handler
    let shutdown = async move {
        shutdown_signal().await;
        shutdown_token.cancel();
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn build_engine(config: &AppConfig) -> Result<Arc<DecisionEngine>> {
    let adapter = load_adapter(&config.classifier)?;
    Ok(Arc::new(DecisionEngine::with_policy(
        Arc::new(adapter),
        config.policy.clone(),
    )))
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("fraudguard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fraudguard=info"))
    };

    // Logs go to stderr so batch output can be piped
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    fraudguard_telemetry::describe_metrics();

    info!("Metrics exporter initialized");
    Ok(handle)
}
