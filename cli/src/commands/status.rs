// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use colored::Colorize;

use fleetdeck_sdk::{FleetClient, Transport};

/// Probe the control service's liveness endpoint.
pub async fn handle_command<T: Transport>(client: &FleetClient<T>, server: &str) -> Result<()> {
    match client.health().await {
        Ok(true) => {
            println!("{}", format!("✓ Control service is up ({})", server).green());
            Ok(())
        }
        Ok(false) => {
            println!("{}", format!("⚠ Control service at {} is unhealthy", server).yellow());
            std::process::exit(1);
        }
        Err(e) => {
            tracing::debug!("Health check failed: {}", e);
            println!("{}", format!("✗ Control service at {} is unreachable", server).red());
            println!("  {}", e.to_string().dimmed());
            std::process::exit(1);
        }
    }
}
