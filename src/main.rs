//! Macro nutrition skill - command line host
//!
//! `serve` exposes the skill over HTTP, `invoke` runs a single event document
//! through it and prints the response envelope.

use clap::{Parser, Subcommand};
use macroskill::config::SkillConfig;
use macroskill::observability::init_default_logging;
use macroskill::server::{self, ServerState};
use macroskill::skill::Skill;
use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

/// Macro nutrition voice skill
#[derive(Parser)]
#[command(name = "macroskill")]
#[command(about = "Macro nutrition voice skill endpoint")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "MACROSKILL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the skill over HTTP until interrupted
    Serve {
        /// Listen port, overrides configuration
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Handle one event document and print the response envelope
    Invoke {
        /// Event JSON file; reads stdin when omitted
        #[arg(short, long, value_name = "FILE")]
        event: Option<PathBuf>,
    },
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve { port } => run_server(config, port).await,
        Commands::Invoke { event } => invoke_once(config, event),
        Commands::Config { show } => handle_config_command(config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<SkillConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Ok(SkillConfig::load_from_file(path)?)
        }
        None => {
            for path_str in ["skill.toml", "config/skill.toml"] {
                let path = PathBuf::from(path_str);
                if path.exists() {
                    info!("Loading configuration from: {}", path.display());
                    return Ok(SkillConfig::load_from_file(&path)?);
                }
            }

            info!("No configuration file found, using defaults");
            Ok(SkillConfig::default())
        }
    }
}

async fn run_server(
    config: SkillConfig,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let skill = Skill::from_config(&config)?;
    let host: IpAddr = config.server.host.parse()?;
    let port = port_override.unwrap_or_else(|| config.listen_port());
    let addr = SocketAddr::new(host, port);

    info!(
        skill_id = %config.skill.id,
        version = env!("CARGO_PKG_VERSION"),
        "Starting macro nutrition skill"
    );

    let state = Arc::new(ServerState::new(skill, config.skill.id.clone()));
    server::serve(state, addr, shutdown_signal())
        .await
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    info!("Application shutdown complete");
    Ok(())
}

fn invoke_once(
    config: SkillConfig,
    event_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let skill = Skill::from_config(&config)?;

    let raw = match event_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    println!("{}", skill.invoke_str(&raw)?);
    Ok(())
}

fn handle_config_command(
    config: SkillConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolves application_id_env so a missing variable fails validation
    config.expected_application_id()?;

    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
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
