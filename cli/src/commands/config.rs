// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate, proxy

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use fleetdeck_dashboard::{dev_proxy_rules, DEFAULT_BACKEND_URL};

use crate::config::{
    default_search_paths, CliConfig, ConfigOverrides, ConfigSource, CONFIG_PATH_ENV,
};

const SAMPLE_CONFIG: &str = include_str!("../../templates/config.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate a sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./fleetdeck.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the dashboard's development proxy layout
    Proxy {
        /// Backend the proxy forwards to
        #[arg(long, default_value = DEFAULT_BACKEND_URL)]
        target: String,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
    overrides: ConfigOverrides,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, overrides, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output, force } => generate(output, force),
        ConfigCommand::Proxy { target } => proxy(&target),
    }
}

fn show(
    config_override: Option<PathBuf>,
    overrides: ConfigOverrides,
    show_paths: bool,
) -> Result<()> {
    let search_paths = default_search_paths();

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config / {}: {}", CONFIG_PATH_ENV, path.display()),
            None => println!("  1. --config / {}: {}", CONFIG_PATH_ENV, "(not set)".dimmed()),
        }
        for (i, path) in search_paths.iter().enumerate() {
            println!("  {}. {}", i + 2, path.display());
        }
        println!();
    }

    let mut loaded = CliConfig::load(config_override, &search_paths)
        .context("Failed to load configuration")?;
    loaded.config.apply_overrides(overrides);

    println!("{}", "Current configuration:".bold());
    match &loaded.source {
        ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => {
            println!("  Source: {}", path.display())
        }
        ConfigSource::Defaults => println!("  Source: {}", "(defaults)".dimmed()),
    }
    println!("  Server: {}", loaded.config.server);
    println!("  Token:  {}", loaded.config.masked_token());

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let loaded = CliConfig::load(config_path, &default_search_paths())
        .context("Failed to load configuration")?;
    loaded
        .config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());
    Ok(())
}

fn generate(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{:?} already exists (use --force to overwrite)", output);
    }

    std::fs::write(&output, SAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );
    Ok(())
}

fn proxy(target: &str) -> Result<()> {
    println!("{:<12} {:<28} {:<14} {}", "PREFIX", "TARGET", "CHANGE ORIGIN", "WEBSOCKET");
    for rule in dev_proxy_rules(target) {
        println!(
            "{:<12} {:<28} {:<14} {}",
            rule.prefix, rule.target, rule.change_origin, rule.websocket
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses_and_validates() {
        let config = CliConfig::from_yaml_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config, CliConfig::default());
        config.validate().unwrap();
    }
}
