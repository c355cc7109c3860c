// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use fleetdeck_sdk::{EnvDocument, FleetClient, Transport};

/// Global environment settings of the control service.
#[derive(Subcommand)]
pub enum EnvCommand {
    /// Print the environment document
    Get {
        /// Print parsed KEY/VALUE pairs instead of the raw text
        #[arg(long)]
        parsed: bool,
    },

    /// Replace the environment document with a file's contents
    Set {
        /// dotenv-style file (KEY=VALUE lines)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub async fn handle_command<T: Transport>(
    command: EnvCommand,
    client: &FleetClient<T>,
) -> Result<()> {
    match command {
        EnvCommand::Get { parsed } => {
            let document = client
                .get_env()
                .await?
                .into_optional_data()
                .context("Failed to read environment")?
                .unwrap_or_default();

            if !parsed {
                print!("{}", document.values);
                if !document.values.is_empty() && !document.values.ends_with('\n') {
                    println!();
                }
                return Ok(());
            }

            let entries = document.entries();
            if entries.is_empty() {
                println!("{}", "No environment entries".yellow());
                return Ok(());
            }
            let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
            for (key, value) in entries {
                println!("{:<width$}  {}", key.bold(), value, width = width);
            }
        }
        EnvCommand::Set { file } => {
            let values = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read environment file: {:?}", file))?;
            let document = EnvDocument::new(values);
            let count = document.entries().len();

            client
                .save_env(&document)
                .await?
                .into_optional_data()
                .context("Failed to save environment")?;

            println!("{}", format!("✓ Environment saved ({} entries)", count).green());
        }
    }
    Ok(())
}
