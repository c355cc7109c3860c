// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Transport primitive
//!
//! A request is described as plain data ([`ApiRequest`]) so the facade can be
//! exercised against any [`Transport`]. [`ReqwestTransport`] is the HTTP
//! implementation used against a real control service.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

/// Body chunks of a long-lived response, in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Text { content_type: String, text: String },
}

/// A fully described HTTP call.
///
/// `path` is already percent-encoded. Query values are raw and get
/// form-urlencoded when the URL is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn text(mut self, content_type: impl Into<String>, text: impl Into<String>) -> Self {
        self.body = RequestBody::Text {
            content_type: content_type.into(),
            text: text.into(),
        };
        self
    }

    /// First value of a query key.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value of a header, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Absolute URL of this request against `base_url`.
    ///
    /// Any path prefix on the base is kept, so a control service mounted
    /// under `/fleet` works the same as one at the root.
    pub fn url(&self, base_url: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), self.path))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`ClientError::Status`].
    pub fn ensure_success(self) -> Result<Self, ClientError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(ClientError::Status {
            status: self.status,
            body: String::from_utf8_lossy(&self.body).into_owned(),
        })
    }
}

/// Generic request/response capability the facade sits on.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a request and buffer the whole response, whatever its status.
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse, ClientError>;

    /// Issue a request whose body is consumed incrementally.
    ///
    /// Non-2xx responses fail with [`ClientError::Status`] before any chunk is
    /// produced. Dropping the returned stream aborts the request.
    async fn open_stream(&self, request: ApiRequest) -> Result<ByteStream, ClientError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse, ClientError> {
        (**self).send(request).await
    }

    async fn open_stream(&self, request: ApiRequest) -> Result<ByteStream, ClientError> {
        (**self).open_stream(request).await
    }
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        // No global timeout: log streams stay open until the caller cancels.
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Send `Authorization: Bearer <key>` on every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build(&self, request: ApiRequest) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = request.url(&self.base_url)?;
        debug!(method = %request.method, path = %request.path, "Sending control service request");

        let mut builder = self.client.request(request.method, url);
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::InvalidHeader(format!("{}: {:?}", name, value)))?;
            builder = builder.header(header_name, header_value);
        }

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        Ok(match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Text { content_type, text } => {
                builder.header(CONTENT_TYPE, content_type).body(text)
            }
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse, ClientError> {
        let response = self.build(request)?.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(status, bytes = body.len(), "Control service responded");
        Ok(TransportResponse { status, body })
    }

    async fn open_stream(&self, request: ApiRequest) -> Result<ByteStream, ClientError> {
        let response = self.build(request)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Box::pin(response.bytes_stream().map_err(ClientError::from)))
    }
}
