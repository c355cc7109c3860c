// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Types
//!
//! Wire shapes exchanged with the control service. The service owns these
//! schemas, so every struct tolerates missing fields.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Envelope wrapping every JSON response of the control service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Payload of a successful envelope.
    pub fn into_data(self) -> Result<T, ClientError> {
        self.into_optional_data()?.ok_or(ClientError::EmptyPayload)
    }

    /// Payload of a successful envelope, allowing `data: null`.
    pub fn into_optional_data(self) -> Result<Option<T>, ClientError> {
        if !self.is_success() {
            return Err(ClientError::Api {
                code: self.code,
                msg: self.msg,
            });
        }
        Ok(self.data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeListRequest {
    /// Include offline nodes
    pub all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInfoRequest {
    pub name: String,
}

/// A registered node as listed by the control service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeItem {
    pub name: String,
    pub host_name: String,
    pub ip: String,
    /// Agent listen port
    pub port: u16,
    pub version: String,
    pub arch: String,
    pub os: String,
    pub os_version: String,
    pub os_kernel: String,
    /// `true` while the agent is online
    pub status: bool,
}

/// Host metrics reported by a node agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub cpu_usage: f32,
    pub cpu_count: u32,
    pub mem_available: u64,
    pub mem_total: u64,
    /// Percent
    pub mem_usage: f32,
    pub mem_free: u64,
    pub mem_used: u64,
    pub system_name: Option<String>,
    pub kernel_version: Option<String>,
    pub os_version: Option<String>,
    pub long_os_version: Option<String>,
    pub host_name: Option<String>,
    pub cpu_arch: Option<String>,
    pub disks: Vec<SystemDisk>,
    pub networks: Vec<SystemNetwork>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemDisk {
    pub name: String,
    pub total: u64,
    pub free: u64,
    pub mount: String,
    pub removable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemNetwork {
    pub name: String,
    pub ips: Vec<String>,
    pub mac: String,
    pub total_out: u64,
    pub total_in: u64,
}

/// Application template offered for deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    /// Template file names
    pub tmpls: Vec<String>,
    /// Default values as YAML text
    pub values: String,
}

/// Global environment settings, read and replaced as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvDocument {
    /// dotenv-style `KEY=VALUE` lines
    pub values: String,
}

impl EnvDocument {
    pub fn new(values: impl Into<String>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// `KEY=VALUE` pairs in document order.
    ///
    /// Blank lines, `#` comments and lines without `=` are skipped. Only the
    /// first `=` splits, so values may contain `=`.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.values
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .collect()
    }
}

/// Lifecycle request sent to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
    Remove,
}

impl ContainerAction {
    /// Route segment understood by the control service.
    pub fn path_segment(self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
            ContainerAction::Remove => "delete",
        }
    }
}

/// Runtime object collections that can be listed per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeResource {
    Image,
    Network,
    Volume,
}

impl RuntimeResource {
    pub fn path_segment(self) -> &'static str {
        match self {
            RuntimeResource::Image => "image",
            RuntimeResource::Network => "network",
            RuntimeResource::Volume => "volume",
        }
    }
}
