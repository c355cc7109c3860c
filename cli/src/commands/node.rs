// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use fleetdeck_sdk::{FleetClient, NodeListRequest, NodeName, Transport};

use crate::render;

#[derive(Subcommand)]
pub enum NodeCommand {
    /// List registered nodes
    List {
        /// Include offline nodes
        #[arg(short, long)]
        all: bool,
    },

    /// Show a node's registration record
    Info {
        #[arg(value_name = "NODE")]
        name: String,
    },

    /// Show host metrics reported by the node agent
    Sys {
        #[arg(value_name = "NODE")]
        name: String,
    },

    /// Show container runtime information
    Runtime {
        #[arg(value_name = "NODE")]
        name: String,
    },
}

pub async fn handle_command<T: Transport>(
    command: NodeCommand,
    client: &FleetClient<T>,
) -> Result<()> {
    let mut out = std::io::stdout();

    match command {
        NodeCommand::List { all } => {
            let nodes = client
                .list_nodes(&NodeListRequest { all })
                .await?
                .into_data()
                .context("Failed to list nodes")?;
            render::write_nodes(&mut out, &nodes)?;
        }
        NodeCommand::Info { name } => {
            let node = client.node_info(&name).await?.into_optional_data()?;
            match node {
                Some(node) => render::write_node(&mut out, &node)?,
                None => println!("{}", format!("Node '{}' not found", name).yellow()),
            }
        }
        NodeCommand::Sys { name } => {
            let info = client
                .node_system_info(&NodeName::new(name.as_str()))
                .await?
                .into_data()
                .with_context(|| format!("Failed to read system info of node '{}'", name))?;
            render::write_system_info(&mut out, &info)?;
        }
        NodeCommand::Runtime { name } => {
            let info = client
                .node_runtime_info(&NodeName::new(name.as_str()))
                .await?
                .into_data()
                .with_context(|| format!("Failed to read runtime info of node '{}'", name))?;
            render::write_json(&mut out, &info)?;
        }
    }

    Ok(())
}
