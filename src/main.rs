//! socmesh - SOC agent pipeline entry point
//!
//! Launches the four-agent pipeline and feeds it security events, either from
//! stdin (one raw event per line) or from the built-in demo scenario.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};

use socmesh::bootstrap::{SocPipeline, DEMO_SCENARIO};
use socmesh::config::SocConfig;
use socmesh::error::SocResult;
use socmesh::observability::init_default_logging;

/// Capability-driven SOC agent pipeline
#[derive(Parser)]
#[command(name = "socmesh")]
#[command(about = "Multi-agent security event detection and response pipeline")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent pipeline
    Run {
        /// Replay the built-in demo scenario instead of reading stdin
        #[arg(long)]
        scenario: bool,
    },
    /// Validate configuration
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();
    info!("Starting socmesh v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run { scenario } => run_pipeline(config, scenario).await,
        Commands::Config { show } => handle_config_command(config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }

    info!("Application shutdown complete");
}

fn load_configuration(config_path: &Option<PathBuf>) -> SocResult<SocConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());
        return Ok(SocConfig::load_from_file(path)?);
    }

    // Try default locations, fall back to the built-in defaults.
    for path_str in ["socmesh.toml", "config/socmesh.toml"] {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(SocConfig::load_from_file(&path)?);
        }
    }

    info!("No configuration file found, using built-in defaults");
    Ok(SocConfig::default())
}

fn handle_config_command(config: SocConfig, show: bool) -> SocResult<()> {
    config.validate()?;
    info!("Configuration is valid");
    if show {
        match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => warn!("Failed to render configuration: {}", e),
        }
    }
    Ok(())
}

async fn run_pipeline(config: SocConfig, scenario: bool) -> SocResult<()> {
    config.validate()?;
    let mut pipeline = SocPipeline::launch(config);

    // Log every incident report as it is emitted.
    if let Some(mut reports) = pipeline.take_reports() {
        tokio::spawn(async move {
            while let Some(report) = reports.recv().await {
                info!(
                    sequence = report.sequence,
                    decision = %report.decision,
                    status = %report.status,
                    "incident mitigated"
                );
            }
        });
    }

    let mut responder = match pipeline.take_responder() {
        Some(handle) => handle,
        None => {
            pipeline.shutdown().await;
            return Ok(());
        }
    };

    if scenario {
        info!(events = DEMO_SCENARIO.len(), "replaying demo scenario");
        for event in DEMO_SCENARIO {
            pipeline.inject_event(event)?;
        }
        responder.join().await;
        info!("demo scenario complete");
    } else {
        info!("reading security events from stdin, one per line (ctrl-c to exit)");
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
                _ = responder.join() => {
                    info!("response orchestrator terminated, stopping pipeline");
                    break;
                }
                line = lines.next_line() => match line? {
                    Some(event) => {
                        let event = event.trim();
                        if !event.is_empty() {
                            if let Err(e) = pipeline.inject_event(event) {
                                warn!(error = %e, "failed to deliver event");
                            }
                        }
                    }
                    None => {
                        info!("event source closed");
                        break;
                    }
                }
            }
        }
    }

    responder.stop();
    responder.join().await;
    pipeline.shutdown().await;
    Ok(())
}
