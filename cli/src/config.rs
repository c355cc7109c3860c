// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! CLI configuration
//!
//! Resolution order, first wins per field:
//! 1. `--server` / `--token` flags (or `FLEETDECK_SERVER` / `FLEETDECK_TOKEN`)
//! 2. YAML file: `--config` / `FLEETDECK_CONFIG_PATH`, else the first existing
//!    discovery path
//! 3. built-in defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use fleetdeck_dashboard::DEFAULT_BACKEND_URL;
use fleetdeck_sdk::{FleetClient, ReqwestTransport};

pub const CONFIG_PATH_ENV: &str = "FLEETDECK_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Base URL of the control service
    pub server: String,

    /// API token sent as a bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_BACKEND_URL.to_string(),
            token: None,
        }
    }
}

/// Values given on the command line (or via their env vars).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Discovered(PathBuf),
    Defaults,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CliConfig,
    pub source: ConfigSource,
}

/// Standard discovery locations, most specific first.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("./fleetdeck.yaml")];

    if let Some(home) = dirs_next::home_dir() {
        paths.push(home.join(".fleetdeck").join("config.yaml"));
    }

    #[cfg(unix)]
    paths.push(PathBuf::from("/etc/fleetdeck/config.yaml"));
    #[cfg(windows)]
    paths.push(PathBuf::from("C:\\ProgramData\\fleetdeck\\config.yaml"));

    paths
}

pub fn discover_in(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|path| path.is_file()).cloned()
}

impl CliConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults config.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml_str(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load from an explicit path (must exist) or the first discovered file.
    pub fn load(explicit: Option<PathBuf>, search_paths: &[PathBuf]) -> Result<LoadedConfig> {
        if let Some(path) = explicit {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let config = Self::from_yaml_file(&path)?;
            return Ok(LoadedConfig {
                config,
                source: ConfigSource::Explicit(path),
            });
        }

        if let Some(path) = discover_in(search_paths) {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            let config = Self::from_yaml_file(&path)?;
            return Ok(LoadedConfig {
                config,
                source: ConfigSource::Discovered(path),
            });
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(LoadedConfig {
            config: Self::default(),
            source: ConfigSource::Defaults,
        })
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(server) = overrides.server {
            self.server = server;
        }
        if let Some(token) = overrides.token {
            self.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let server = self.server.trim();
        if server.is_empty() {
            anyhow::bail!("server cannot be empty");
        }

        let host = server
            .strip_prefix("http://")
            .or_else(|| server.strip_prefix("https://"))
            .ok_or_else(|| {
                anyhow::anyhow!("Invalid server '{}'. Must start with http:// or https://", server)
            })?;
        if host.is_empty() || host.starts_with('/') {
            anyhow::bail!("Invalid server '{}'. Missing host", server);
        }

        if matches!(&self.token, Some(token) if token.trim().is_empty()) {
            anyhow::bail!("token cannot be blank when set");
        }

        Ok(())
    }

    pub fn masked_token(&self) -> String {
        match &self.token {
            None => "(not set)".to_string(),
            Some(token) if token.chars().count() <= 4 => "****".to_string(),
            Some(token) => format!("{}****", token.chars().take(4).collect::<String>()),
        }
    }

    pub fn client(&self) -> Result<FleetClient> {
        let mut transport =
            ReqwestTransport::new(self.server.trim()).context("Failed to create HTTP client")?;
        if let Some(token) = &self.token {
            transport = transport.with_api_key(token.as_str());
        }
        Ok(FleetClient::new(transport))
    }
}
