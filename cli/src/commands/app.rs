// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application commands
//!
//! Commands: list, info, deploy

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use fleetdeck_sdk::{DeployManifest, FleetClient, Transport};

use crate::render;

#[derive(Subcommand)]
pub enum AppCommand {
    /// List application templates
    List,

    /// Show one application template
    Info {
        #[arg(value_name = "TEMPLATE_ID")]
        id: String,
    },

    /// Deploy an application from a manifest file
    Deploy {
        /// Path to the manifest (sent verbatim)
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
    },
}

pub async fn handle_command<T: Transport>(
    command: AppCommand,
    client: &FleetClient<T>,
) -> Result<()> {
    match command {
        AppCommand::List => {
            let templates = client
                .list_app_templates()
                .await?
                .into_data()
                .context("Failed to list application templates")?;
            render::write_templates(&mut std::io::stdout(), &templates)?;
        }
        AppCommand::Info { id } => {
            let template = client
                .app_template_info(&id)
                .await?
                .into_data()
                .with_context(|| format!("Failed to load application template '{}'", id))?;
            render::write_template(&mut std::io::stdout(), &template)?;
        }
        AppCommand::Deploy { manifest } => deploy(client, manifest).await?,
    }
    Ok(())
}

async fn deploy<T: Transport>(client: &FleetClient<T>, path: PathBuf) -> Result<()> {
    let manifest = DeployManifest::from_file(&path)?;

    println!("Deploying {}...", path.display().to_string().bold());

    let result = client
        .deploy(&manifest)
        .await?
        .into_optional_data()
        .context("Deployment rejected")?;

    println!("{}", "✓ Deployment submitted".green());
    if let Some(result) = result.filter(|value| !value.is_null()) {
        render::write_json(&mut std::io::stdout(), &result)?;
    }
    Ok(())
}
