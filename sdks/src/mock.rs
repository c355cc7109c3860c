// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory transports for unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use parking_lot::Mutex;

use crate::error::ClientError;
use crate::transport::{ApiRequest, ByteStream, RequestBody, Transport, TransportResponse};

/// Records every request and answers with a canned response or chunk list.
#[derive(Debug)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    response: TransportResponse,
    chunks: Vec<Bytes>,
    /// Keep the stream open after the last chunk instead of ending it.
    hold_open: bool,
}

impl RecordingTransport {
    pub(crate) fn ok_json(body: &str) -> Self {
        Self::with_status(200, body)
    }

    pub(crate) fn with_status(status: u16, body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: TransportResponse::new(status, body.to_string()),
            chunks: Vec::new(),
            hold_open: false,
        }
    }

    pub(crate) fn streaming(chunks: Vec<Bytes>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: TransportResponse::new(200, Bytes::new()),
            chunks,
            hold_open: false,
        }
    }

    /// Like [`Self::streaming`], but the body never finishes.
    pub(crate) fn streaming_then_idle(chunks: Vec<Bytes>) -> Self {
        Self {
            hold_open: true,
            ..Self::streaming(chunks)
        }
    }

    pub(crate) fn take_requests(&self) -> Vec<ApiRequest> {
        std::mem::take(&mut *self.requests.lock())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse, ClientError> {
        self.requests.lock().push(request);
        Ok(self.response.clone())
    }

    async fn open_stream(&self, request: ApiRequest) -> Result<ByteStream, ClientError> {
        self.requests.lock().push(request);
        self.response.clone().ensure_success()?;
        let chunks: Vec<Result<Bytes, ClientError>> = self.chunks.iter().cloned().map(Ok).collect();
        let stream = futures::stream::iter(chunks);
        if self.hold_open {
            Ok(Box::pin(stream.chain(futures::stream::pending())))
        } else {
            Ok(Box::pin(stream))
        }
    }
}

/// Stores the environment document like the control service does.
#[derive(Debug, Default)]
pub(crate) struct EnvBackend {
    stored: Mutex<String>,
}

#[async_trait]
impl Transport for EnvBackend {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse, ClientError> {
        match (request.path.as_str(), request.body) {
            ("/api/env/set", RequestBody::Json(body)) => {
                let values = body["values"].as_str().unwrap_or_default().to_string();
                *self.stored.lock() = values;
                Ok(TransportResponse::new(200, r#"{"code":0,"msg":""}"#))
            }
            ("/api/env/list", _) => {
                let body = serde_json::json!({
                    "code": 0,
                    "msg": "",
                    "data": { "values": *self.stored.lock() },
                });
                Ok(TransportResponse::new(200, body.to_string()))
            }
            (path, _) => Ok(TransportResponse::new(404, format!("no route {}", path))),
        }
    }

    async fn open_stream(&self, _request: ApiRequest) -> Result<ByteStream, ClientError> {
        Err(ClientError::Other("streaming not supported".into()))
    }
}
