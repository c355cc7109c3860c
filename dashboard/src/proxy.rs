// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Dev proxy layout
//!
//! During local development the dashboard forwards backend traffic to a
//! control service on a fixed local port. This module records that layout as
//! data; it does not run a proxy.

use serde::Serialize;

/// Where the control service listens during local development.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:6734";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRule {
    /// Path prefix, matched at a segment boundary
    pub prefix: String,
    pub target: String,
    /// Rewrite the `Origin`/`Host` to the target
    pub change_origin: bool,
    /// Allow websocket upgrades
    pub websocket: bool,
}

impl ProxyRule {
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }

    /// URL the request is forwarded to. Paths are passed through unchanged.
    pub fn forward_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.target.trim_end_matches('/'), path_and_query)
    }
}

/// `/api` and `/socket.io` forwarded to `target`.
pub fn dev_proxy_rules(target: &str) -> Vec<ProxyRule> {
    vec![
        ProxyRule {
            prefix: "/api".to_string(),
            target: target.to_string(),
            change_origin: true,
            websocket: false,
        },
        ProxyRule {
            prefix: "/socket.io".to_string(),
            target: target.to_string(),
            change_origin: true,
            websocket: true,
        },
    ]
}

/// First rule covering `path`.
pub fn rule_for<'a>(rules: &'a [ProxyRule], path: &str) -> Option<&'a ProxyRule> {
    rules.iter().find(|rule| rule.matches(path))
}
