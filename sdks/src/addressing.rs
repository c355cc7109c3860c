// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Node addressing
//!
//! Node-scoped calls name their target node in one of two wire forms: the
//! runtime endpoints take a `node_name` query parameter while the proxied
//! agent endpoints read an `X-NODE-NAME` header. Both go through
//! [`NodeName::scope`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transport::ApiRequest;

pub const NODE_NAME_QUERY_KEY: &str = "node_name";
pub const NODE_NAME_HEADER: &str = "X-NODE-NAME";

/// Name of a managed node, unique within the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeName(String);

impl NodeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Attach this node to `request` using the given wire form.
    pub fn scope(&self, request: ApiRequest, addressing: NodeAddressing) -> ApiRequest {
        match addressing {
            NodeAddressing::Query => request.query(NODE_NAME_QUERY_KEY, self.0.as_str()),
            NodeAddressing::Header => request.header(NODE_NAME_HEADER, self.0.as_str()),
        }
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAddressing {
    /// `?node_name=<name>`
    Query,
    /// `X-NODE-NAME: <name>`
    Header,
}
