// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Container log streaming
//!
//! Handlers receive a [`LogSnapshot`]: the whole buffer received so far, not
//! the latest chunk. Renderers that redraw a log pane use
//! [`LogSnapshot::as_bytes`]; renderers that append use
//! [`LogSnapshot::new_bytes`].

use std::borrow::Cow;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ClientError;
use crate::transport::ByteStream;

/// Cumulative log output observed on one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSnapshot {
    buffer: Vec<u8>,
    latest_start: usize,
    chunks: usize,
}

impl LogSnapshot {
    fn push(&mut self, chunk: &[u8]) {
        self.latest_start = self.buffer.len();
        self.buffer.extend_from_slice(chunk);
        self.chunks += 1;
    }

    /// Everything received so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Bytes that arrived with the most recent chunk.
    pub fn new_bytes(&self) -> &[u8] {
        &self.buffer[self.latest_start..]
    }

    /// Number of chunks folded into this snapshot.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// How a log stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogStreamOutcome {
    /// The server closed the stream.
    Completed(LogSnapshot),
    /// The caller's token was cancelled first.
    Cancelled(LogSnapshot),
}

impl LogStreamOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LogStreamOutcome::Cancelled(_))
    }

    pub fn snapshot(&self) -> &LogSnapshot {
        match self {
            LogStreamOutcome::Completed(s) | LogStreamOutcome::Cancelled(s) => s,
        }
    }

    pub fn into_snapshot(self) -> LogSnapshot {
        match self {
            LogStreamOutcome::Completed(s) | LogStreamOutcome::Cancelled(s) => s,
        }
    }
}

/// Fold `stream` into snapshots until it ends, fails or `cancel` fires.
///
/// The handler runs once per chunk. A cancelled token wins over a chunk that
/// is already available, so no handler call happens after cancellation.
/// Returning drops `stream`, which aborts the underlying request.
pub(crate) async fn follow_snapshots<F>(
    mut stream: ByteStream,
    cancel: &CancellationToken,
    mut on_snapshot: F,
) -> Result<LogStreamOutcome, ClientError>
where
    F: FnMut(&LogSnapshot),
{
    let mut snapshot = LogSnapshot::default();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(bytes = snapshot.len(), chunks = snapshot.chunks(), "Log stream cancelled");
                return Ok(LogStreamOutcome::Cancelled(snapshot));
            }
            next = stream.next() => next,
        };

        match next {
            Some(chunk) => {
                snapshot.push(&chunk?);
                on_snapshot(&snapshot);
            }
            None => {
                debug!(bytes = snapshot.len(), chunks = snapshot.chunks(), "Log stream completed");
                return Ok(LogStreamOutcome::Completed(snapshot));
            }
        }
    }
}
