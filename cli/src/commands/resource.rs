// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;

use fleetdeck_sdk::{FleetClient, NodeName, RuntimeResource, Transport};

use crate::render;

/// Runtime objects known to a node's container runtime.
#[derive(Subcommand)]
pub enum ResourceCommand {
    /// List images on a node
    Images {
        #[arg(value_name = "NODE")]
        node: String,
    },

    /// List networks on a node
    Networks {
        #[arg(value_name = "NODE")]
        node: String,
    },

    /// List volumes on a node
    Volumes {
        #[arg(value_name = "NODE")]
        node: String,
    },
}

impl ResourceCommand {
    fn split(self) -> (RuntimeResource, NodeName) {
        match self {
            ResourceCommand::Images { node } => (RuntimeResource::Image, NodeName::new(node)),
            ResourceCommand::Networks { node } => (RuntimeResource::Network, NodeName::new(node)),
            ResourceCommand::Volumes { node } => (RuntimeResource::Volume, NodeName::new(node)),
        }
    }
}

pub async fn handle_command<T: Transport>(
    command: ResourceCommand,
    client: &FleetClient<T>,
) -> Result<()> {
    let (resource, node) = command.split();

    let payload = client
        .list_resources(&node, resource)
        .await?
        .into_data()
        .with_context(|| {
            format!("Failed to list {}s on node '{}'", resource.path_segment(), node)
        })?;

    render::write_resources(&mut std::io::stdout(), resource, &payload)?;
    Ok(())
}
