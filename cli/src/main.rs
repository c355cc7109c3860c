// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # fleetdeck CLI
//!
//! Terminal front end for the fleet control service.
//!
//! ## Commands
//!
//! - `fleetdeck node list|info|sys|runtime` - Node inventory and metrics
//! - `fleetdeck container list|start|stop|restart|rm|inspect|logs` - Container lifecycle
//! - `fleetdeck resource images|networks|volumes` - Runtime objects per node
//! - `fleetdeck app list|info|deploy` - Application templates and deployment
//! - `fleetdeck env get|set` - Global environment settings
//! - `fleetdeck view <LOCATION>` - Render a dashboard page
//! - `fleetdeck status` - Control service liveness
//! - `fleetdeck config show|validate|generate|proxy` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use fleetdeck::commands::{
    self, AppCommand, ConfigCommand, ContainerCommand, EnvCommand, NodeCommand, ResourceCommand,
    ViewArgs,
};
use fleetdeck::config::{default_search_paths, CliConfig, ConfigOverrides};
use fleetdeck_sdk::FleetClient;

/// fleetdeck - Manage a container fleet from the terminal
#[derive(Parser)]
#[command(name = "fleetdeck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "FLEETDECK_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Control service base URL
    #[arg(long, global = true, env = "FLEETDECK_SERVER", value_name = "URL")]
    server: Option<String>,

    /// API token for the control service
    #[arg(long, global = true, env = "FLEETDECK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "FLEETDECK_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Node inventory and metrics
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        command: NodeCommand,
    },

    /// Container lifecycle and logs
    #[command(name = "container")]
    Container {
        #[command(subcommand)]
        command: ContainerCommand,
    },

    /// Images, networks and volumes on a node
    #[command(name = "resource")]
    Resource {
        #[command(subcommand)]
        command: ResourceCommand,
    },

    /// Application templates and deployment
    #[command(name = "app")]
    App {
        #[command(subcommand)]
        command: AppCommand,
    },

    /// Global environment settings
    #[command(name = "env")]
    Env {
        #[command(subcommand)]
        command: EnvCommand,
    },

    /// Render a dashboard page
    #[command(name = "view")]
    View(ViewArgs),

    /// Check that the control service is up
    #[command(name = "status")]
    Status,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up FLEETDECK_* from a local .env before clap reads the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let overrides = ConfigOverrides {
        server: cli.server,
        token: cli.token,
    };

    let Some(command) = cli.command else {
        eprintln!("{}", "No command specified. Use --help for usage.".yellow());
        std::process::exit(1);
    };

    match command {
        Commands::Config { command } => {
            commands::config::handle_command(command, cli.config, overrides).await
        }
        Commands::Node { command } => {
            let (_, client) = connect(cli.config, overrides)?;
            commands::node::handle_command(command, &client).await
        }
        Commands::Container { command } => {
            let (_, client) = connect(cli.config, overrides)?;
            commands::container::handle_command(command, &client).await
        }
        Commands::Resource { command } => {
            let (_, client) = connect(cli.config, overrides)?;
            commands::resource::handle_command(command, &client).await
        }
        Commands::App { command } => {
            let (_, client) = connect(cli.config, overrides)?;
            commands::app::handle_command(command, &client).await
        }
        Commands::Env { command } => {
            let (_, client) = connect(cli.config, overrides)?;
            commands::env::handle_command(command, &client).await
        }
        Commands::View(args) => {
            let (_, client) = connect(cli.config, overrides)?;
            commands::view::handle_command(args, &client).await
        }
        Commands::Status => {
            let (config, client) = connect(cli.config, overrides)?;
            commands::status::handle_command(&client, &config.server).await
        }
    }
}

/// Resolve the effective configuration and build a client from it.
fn connect(
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
) -> Result<(CliConfig, FleetClient)> {
    let mut loaded = CliConfig::load(config_path, &default_search_paths())
        .context("Failed to load configuration")?;
    loaded.config.apply_overrides(overrides);
    loaded.config.validate().context("Invalid configuration")?;
    tracing::debug!(server = %loaded.config.server, "Using control service");

    let client = loaded.config.client()?;
    Ok((loaded.config, client))
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
