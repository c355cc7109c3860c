// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Container commands
//!
//! Commands: list, start, stop, restart, rm, inspect, logs

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::io::Write;

use fleetdeck_sdk::{
    CancellationToken, ContainerAction, FleetClient, LogSnapshot, LogStreamOutcome, NodeName,
    Transport,
};

use crate::render;

#[derive(Subcommand)]
pub enum ContainerCommand {
    /// List containers on a node
    List {
        #[arg(value_name = "NODE")]
        node: String,
    },

    /// Start a container
    Start {
        #[arg(value_name = "NODE")]
        node: String,
        #[arg(value_name = "CONTAINER")]
        id: String,
    },

    /// Stop a container
    Stop {
        #[arg(value_name = "NODE")]
        node: String,
        #[arg(value_name = "CONTAINER")]
        id: String,
    },

    /// Restart a container
    Restart {
        #[arg(value_name = "NODE")]
        node: String,
        #[arg(value_name = "CONTAINER")]
        id: String,
    },

    /// Remove a container
    #[command(alias = "remove")]
    Rm {
        #[arg(value_name = "NODE")]
        node: String,
        #[arg(value_name = "CONTAINER")]
        id: String,
    },

    /// Show a container's full runtime record
    Inspect {
        #[arg(value_name = "NODE")]
        node: String,
        #[arg(value_name = "CONTAINER")]
        id: String,
    },

    /// Follow a container's logs until it exits or Ctrl-C
    Logs {
        #[arg(value_name = "NODE")]
        node: String,
        #[arg(value_name = "CONTAINER")]
        id: String,
    },
}

pub async fn handle_command<T: Transport>(
    command: ContainerCommand,
    client: &FleetClient<T>,
) -> Result<()> {
    match command {
        ContainerCommand::List { node } => list_containers(client, NodeName::new(node)).await,
        ContainerCommand::Start { node, id } => {
            run_action(client, NodeName::new(node), ContainerAction::Start, id).await
        }
        ContainerCommand::Stop { node, id } => {
            run_action(client, NodeName::new(node), ContainerAction::Stop, id).await
        }
        ContainerCommand::Restart { node, id } => {
            run_action(client, NodeName::new(node), ContainerAction::Restart, id).await
        }
        ContainerCommand::Rm { node, id } => {
            run_action(client, NodeName::new(node), ContainerAction::Remove, id).await
        }
        ContainerCommand::Inspect { node, id } => inspect(client, NodeName::new(node), id).await,
        ContainerCommand::Logs { node, id } => follow_logs(client, NodeName::new(node), id).await,
    }
}

async fn list_containers<T: Transport>(client: &FleetClient<T>, node: NodeName) -> Result<()> {
    let containers = client
        .list_containers(&node)
        .await?
        .into_data()
        .with_context(|| format!("Failed to list containers on node '{}'", node))?;

    render::write_containers(&mut std::io::stdout(), &containers)?;
    Ok(())
}

fn past_tense(action: ContainerAction) -> &'static str {
    match action {
        ContainerAction::Start => "started",
        ContainerAction::Stop => "stopped",
        ContainerAction::Restart => "restarted",
        ContainerAction::Remove => "removed",
    }
}

async fn run_action<T: Transport>(
    client: &FleetClient<T>,
    node: NodeName,
    action: ContainerAction,
    id: String,
) -> Result<()> {
    client
        .container_action(&node, action, &id)
        .await?
        .into_optional_data()
        .with_context(|| format!("Failed to {} container '{}'", action.path_segment(), id))?;

    println!(
        "{}",
        format!("✓ Container {} {} on {}", id, past_tense(action), node).green()
    );
    Ok(())
}

async fn inspect<T: Transport>(client: &FleetClient<T>, node: NodeName, id: String) -> Result<()> {
    let record = client
        .inspect_container(&node, &id)
        .await?
        .into_data()
        .with_context(|| format!("Failed to inspect container '{}'", id))?;

    render::write_json(&mut std::io::stdout(), &record)?;
    Ok(())
}

async fn follow_logs<T: Transport>(
    client: &FleetClient<T>,
    node: NodeName,
    id: String,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let outcome = client
        .stream_container_logs(&node, &id, cancel, |snapshot: &LogSnapshot| {
            let mut out = std::io::stdout();
            if let Err(e) = out.write_all(snapshot.new_bytes()).and_then(|_| out.flush()) {
                tracing::debug!("Failed to write log chunk: {}", e);
            }
        })
        .await;
    watcher.abort();

    match outcome.with_context(|| format!("Log stream of container '{}' failed", id))? {
        LogStreamOutcome::Completed(snapshot) => {
            tracing::debug!(bytes = snapshot.len(), chunks = snapshot.chunks(), "Log stream ended");
        }
        LogStreamOutcome::Cancelled(snapshot) => {
            eprintln!(
                "{}",
                format!("Stopped following logs ({} bytes received)", snapshot.len()).dimmed()
            );
        }
    }
    Ok(())
}
