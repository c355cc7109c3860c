// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::path::PathBuf;

use thiserror::Error;

/// The single failure type surfaced by the client.
///
/// Variants only record where the failure came from so callers can render it;
/// the client never retries or reinterprets them. Stream cancellation is not
/// an error and never shows up here.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// Identifier that would not survive as a single URL path segment.
    #[error("Identifier {0:?} cannot be sent as a path segment")]
    InvalidPathSegment(String),

    #[error("Invalid header {0}")]
    InvalidHeader(String),

    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Server rejected request (code {code}): {msg}")]
    Api { code: i32, msg: String },

    #[error("Server response carried no data")]
    EmptyPayload,

    #[error("Failed to read manifest {path:?}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by a non-HTTP transport implementation.
    #[error("Transport failed: {0}")]
    Other(String),
}

impl ClientError {
    /// HTTP status code, if the failure came from a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
