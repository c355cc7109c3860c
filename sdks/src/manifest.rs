// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt;
use std::path::Path;

use crate::error::ClientError;

/// Content type used when submitting a manifest.
pub const MANIFEST_CONTENT_TYPE: &str = "application/x-yaml";

/// A deployment manifest, passed to the control service untouched.
///
/// The client never parses or validates manifest text; the service owns
/// its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployManifest(String);

impl DeployManifest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ClientError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DeployManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
