//! Ticket triage service entry point

use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process;
use ticket_triage::app::{ClassifierFactory, Services};
use ticket_triage::classifier::TicketClassifier;
use ticket_triage::config::TriageConfig;
use ticket_triage::error::{TriageError, TriageResult};
use ticket_triage::observability::init_default_logging;
use ticket_triage::routing::department_for;
use ticket_triage::store::Store;
use ticket_triage::ApiServer;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "ticket-triage")]
#[command(about = "Support ticket classification, routing and auto-reply service")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "TRIAGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        #[arg(long, env = "HOST")]
        host: Option<IpAddr>,
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Validate configuration
    Config {
        /// Print the resolved configuration
        #[arg(long)]
        show: bool,
    },
    /// Create the default accounts in the configured database
    SeedUsers,
    /// Classify and route a ticket text without storing it
    Classify {
        text: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_default_logging();

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Config { show } => handle_config_command(&config, show),
        Commands::SeedUsers => seed_users(&config),
        Commands::Classify { text } => classify(&config, &text).await,
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_configuration(path: Option<&std::path::Path>) -> TriageResult<TriageConfig> {
    if let Some(path) = path {
        info!("Loading configuration from: {}", path.display());
        return Ok(TriageConfig::load_from_file(path)?);
    }

    for candidate in ["triage.toml", "config/triage.toml"] {
        let path = PathBuf::from(candidate);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(TriageConfig::load_from_file(&path)?);
        }
    }

    Err(TriageError::internal_error(
        "No configuration file found; pass --config or create triage.toml",
    ))
}

async fn serve(config: TriageConfig, host: Option<IpAddr>, port: Option<u16>) -> TriageResult<()> {
    let host = match host {
        Some(host) => host,
        None => config.server.host.parse().map_err(|e| {
            TriageError::internal_error(format!("Invalid server.host '{}': {e}", config.server.host))
        })?,
    };
    let addr = SocketAddr::new(host, port.unwrap_or(config.server.port));

    info!(
        "Starting ticket triage service v{} on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    let state = Services::from_config(&config)?.into_state();
    ApiServer::new(state, addr).run_until(shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down gracefully..."),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}

fn handle_config_command(config: &TriageConfig, show: bool) -> TriageResult<()> {
    if show {
        let rendered = toml::to_string_pretty(config)
            .map_err(|e| TriageError::internal_error(format!("Failed to render config: {e}")))?;
        println!("{rendered}");
    }

    info!("Configuration validation complete");
    Ok(())
}

fn seed_users(config: &TriageConfig) -> TriageResult<()> {
    let store = Store::open(&config.database.path)?;
    let report = store.seed_default_users()?;
    info!(created = ?report.created, "Default users seeded");
    println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    Ok(())
}

async fn classify(config: &TriageConfig, text: &str) -> TriageResult<()> {
    let classifier = TicketClassifier::new(
        ClassifierFactory::create_model(config)?,
        config.label_encoder()?,
    );
    let classification = classifier.classify(text).await?;
    let department = department_for(&classification.queue);

    let output = serde_json::json!({
        "queue": classification.queue,
        "source": classification.source,
        "department": department,
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    Ok(())
}
