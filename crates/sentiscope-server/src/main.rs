//! SentiScope
//!
//! Sentiment scoring service for customer-service conversations.
//!
//! `sentiscope serve` loads the BERT classifier, opens the SQLite store and
//! serves the HTTP API. `sentiscope import` merges a CSV export (or JSON array)
//! of sentiment rows into the store.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use sentiscope_classifier::SentimentClassifier;
use sentiscope_server::{create_router, AppState, ConfigOverrides, ServerConfig};
use sentiscope_store::Store;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sentiscope")]
#[command(author, version, about = "Sentiment scoring API for customer-service conversations")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API
    Serve(ServeArgs),

    /// Merge a CSV export (or JSON array) of sentiment rows into the database
    Import {
        /// File to import; `.json` is read as JSON, anything else as CSV
        file: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "sentiscope.yaml")]
    config: PathBuf,

    /// Database URL (sqlite:///path.db or a plain path)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Key expected in the X-API-Key header
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Comma-separated CORS origins, `*` for any
    #[arg(long, env = "ALLOWED_ORIGIN")]
    allowed_origin: Option<String>,

    /// Local model directory
    #[arg(long, env = "MODEL_DIR")]
    model_dir: Option<String>,

    /// Hugging Face repository to fetch the model from when the directory is missing
    #[arg(long, env = "MODEL_REPO")]
    model_repo: Option<String>,
}

impl ServeArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen: self.listen.clone(),
            port: self.port,
            api_key: self.api_key.clone(),
            allowed_origins: self.allowed_origin.clone(),
            database_url: self.common.database_url.clone(),
            model_dir: self.model_dir.clone(),
            model_repo: self.model_repo.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Import { file, common } => import(file, common).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    init_tracing(args.common.verbose);
    info!("Starting SentiScope");

    let config = ServerConfig::load(&args.common.config, &args.overrides())
        .context("Failed to load configuration")?;
    config.validate().context("Refusing to start")?;

    info!("Configuration loaded successfully");
    info!("Database: {}", config.database.url);
    info!("Model directory: {}", config.model.source.model_dir().display());
    info!("CORS origins: {}", config.cors.allowed_origins.join(", "));
    info!(
        "API key enforcement: {}",
        if config.auth.require_api_key { "on" } else { "off" }
    );

    let metrics_handle = init_metrics()?;

    let store = Store::open_url(&config.database.url).context("Failed to open database")?;

    info!("Loading sentiment model...");
    let model_config = config.model.clone();
    let classifier = tokio::task::spawn_blocking(move || SentimentClassifier::load(&model_config))
        .await?
        .context("Failed to load sentiment model")?;
    info!("Model and tokenizer loaded successfully");

    let addr: SocketAddr = format!("{}:{}", config.server.listen, config.server.port)
        .parse()
        .context("Invalid listen address")?;

    let state = AppState::new(classifier, store, config, Some(metrics_handle));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn import(file: PathBuf, common: CommonArgs) -> Result<()> {
    init_tracing(common.verbose);

    let overrides = ConfigOverrides {
        database_url: common.database_url.clone(),
        ..Default::default()
    };
    let config = ServerConfig::load(&common.config, &overrides)
        .context("Failed to load configuration")?;

    let store = Store::open_url(&config.database.url).context("Failed to open database")?;
    let summary = store
        .import_file(&file)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    info!(
        "Imported {} new and {} replaced rows from {}",
        summary.inserted,
        summary.replaced,
        file.display()
    );
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("sentiscope=debug,sentiscope_server=debug,sentiscope_classifier=debug,sentiscope_store=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("sentiscope=info,sentiscope_server=info,sentiscope_classifier=info,sentiscope_store=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "sentiscope_requests_total",
        "Total number of requests processed by route"
    );
    metrics::describe_histogram!(
        "sentiscope_inference_latency_us",
        metrics::Unit::Microseconds,
        "Single-text classification latency in microseconds"
    );
    metrics::describe_counter!("sentiscope_errors_total", "Total number of errors by kind");

    info!("Metrics exporter initialized");
    Ok(handle)
}
