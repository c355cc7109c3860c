// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! fleetdeck Rust SDK
//!
//! Typed client for the fleet control service: one method per dashboard
//! action on top of a pluggable [`Transport`].

pub mod addressing;
pub mod client;
pub mod error;
pub mod logs;
pub mod manifest;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock;

pub use addressing::{NodeAddressing, NodeName, NODE_NAME_HEADER, NODE_NAME_QUERY_KEY};
pub use client::FleetClient;
pub use error::ClientError;
pub use logs::{LogSnapshot, LogStreamOutcome};
pub use manifest::DeployManifest;
pub use transport::{
    ApiRequest, ByteStream, ReqwestTransport, RequestBody, Transport, TransportResponse,
};
pub use types::*;

pub use tokio_util::sync::CancellationToken;
