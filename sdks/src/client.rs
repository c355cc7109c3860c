// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::addressing::{NodeAddressing, NodeName};
use crate::error::ClientError;
use crate::logs::{follow_snapshots, LogSnapshot, LogStreamOutcome};
use crate::manifest::{DeployManifest, MANIFEST_CONTENT_TYPE};
use crate::transport::{ApiRequest, ReqwestTransport, Transport};
use crate::types::{
    ApiEnvelope, AppTemplate, ContainerAction, EnvDocument, NodeInfoRequest, NodeItem,
    NodeListRequest, RuntimeResource, SystemInfo,
};

/// Characters escaped when caller input becomes a single path segment.
///
/// `\` is included because URL parsers treat it as `/` in http URLs.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'\\')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Encode `raw` as exactly one path segment.
///
/// Empty, `.` and `..` are refused: URL normalisation would drop or collapse
/// them (also when written as `%2e`) and the call would reach another route.
fn segment(raw: &str) -> Result<String, ClientError> {
    if matches!(raw, "" | "." | "..") {
        return Err(ClientError::InvalidPathSegment(raw.to_string()));
    }
    Ok(utf8_percent_encode(raw, PATH_SEGMENT).to_string())
}

fn container_path(action: &str, id: &str) -> Result<String, ClientError> {
    Ok(format!("/api/node/docker/container/{}/{}", action, segment(id)?))
}

/// Client for the fleet control service.
///
/// One method per dashboard action. Methods only build the request and decode
/// the response envelope: nothing is validated, retried or cached, and every
/// failure comes back as a [`ClientError`]. The one exception is an id that
/// cannot be carried as a single path segment, which fails before sending.
#[derive(Debug, Clone)]
pub struct FleetClient<T = ReqwestTransport> {
    transport: T,
}

impl FleetClient<ReqwestTransport> {
    /// Create a client talking HTTP to `base_url`.
    pub fn connect(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self::new(ReqwestTransport::new(base_url)?))
    }
}

impl<T: Transport> FleetClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ClientError> {
        let response = self.transport.send(request).await?.ensure_success()?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    fn on_node(&self, node: &NodeName, request: ApiRequest) -> ApiRequest {
        node.scope(request, NodeAddressing::Query)
    }

    // Nodes

    pub async fn list_nodes(
        &self,
        criteria: &NodeListRequest,
    ) -> Result<ApiEnvelope<Vec<NodeItem>>, ClientError> {
        self.call(ApiRequest::post("/api/node/list").json(criteria)?).await
    }

    /// Registration record of one node; `data` is empty for unknown names.
    pub async fn node_info(&self, name: &str) -> Result<ApiEnvelope<NodeItem>, ClientError> {
        let body = NodeInfoRequest {
            name: name.to_string(),
        };
        self.call(ApiRequest::post("/api/node/info").json(&body)?).await
    }

    /// Container runtime metadata of a node.
    pub async fn node_runtime_info(
        &self,
        node: &NodeName,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        self.call(self.on_node(node, ApiRequest::post("/api/node/docker/info")))
            .await
    }

    /// Host metrics of a node, fetched through the agent proxy.
    ///
    /// Unlike every other node-scoped call this one names the node in the
    /// `X-NODE-NAME` header.
    pub async fn node_system_info(
        &self,
        node: &NodeName,
    ) -> Result<ApiEnvelope<SystemInfo>, ClientError> {
        let request = node.scope(ApiRequest::get("/api/node/proxy/sys"), NodeAddressing::Header);
        self.call(request).await
    }

    // Containers

    pub async fn list_containers(
        &self,
        node: &NodeName,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let request = ApiRequest::post("/api/node/docker/container/list");
        self.call(self.on_node(node, request)).await
    }

    pub async fn container_action(
        &self,
        node: &NodeName,
        action: ContainerAction,
        id: &str,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let path = container_path(action.path_segment(), id)?;
        self.call(self.on_node(node, ApiRequest::post(path))).await
    }

    pub async fn start_container(
        &self,
        node: &NodeName,
        id: &str,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        self.container_action(node, ContainerAction::Start, id).await
    }

    pub async fn stop_container(
        &self,
        node: &NodeName,
        id: &str,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        self.container_action(node, ContainerAction::Stop, id).await
    }

    pub async fn restart_container(
        &self,
        node: &NodeName,
        id: &str,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        self.container_action(node, ContainerAction::Restart, id).await
    }

    pub async fn remove_container(
        &self,
        node: &NodeName,
        id: &str,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        self.container_action(node, ContainerAction::Remove, id).await
    }

    pub async fn inspect_container(
        &self,
        node: &NodeName,
        id: &str,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let path = container_path("inspect", id)?;
        self.call(self.on_node(node, ApiRequest::post(path))).await
    }

    /// Follow a container's log output.
    ///
    /// `on_snapshot` is called once per received chunk with the cumulative
    /// output so far (see [`LogSnapshot`]). Cancelling `cancel` aborts the
    /// request, stops handler calls and resolves to
    /// [`LogStreamOutcome::Cancelled`]; transport failures resolve to `Err`.
    pub async fn stream_container_logs<F>(
        &self,
        node: &NodeName,
        id: &str,
        cancel: CancellationToken,
        on_snapshot: F,
    ) -> Result<LogStreamOutcome, ClientError>
    where
        F: FnMut(&LogSnapshot) + Send,
    {
        let request = ApiRequest::post(container_path("logs", id)?)
            .header(CONTENT_TYPE.as_str(), "application/json");
        let request = self.on_node(node, request);

        let stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Ok(LogStreamOutcome::Cancelled(LogSnapshot::default()));
            }
            opened = self.transport.open_stream(request) => opened?,
        };

        follow_snapshots(stream, &cancel, on_snapshot).await
    }

    // Runtime objects

    pub async fn list_resources(
        &self,
        node: &NodeName,
        resource: RuntimeResource,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let path = format!("/api/node/docker/{}/list", resource.path_segment());
        self.call(self.on_node(node, ApiRequest::post(path))).await
    }

    pub async fn list_images(&self, node: &NodeName) -> Result<ApiEnvelope<Value>, ClientError> {
        self.list_resources(node, RuntimeResource::Image).await
    }

    pub async fn list_networks(&self, node: &NodeName) -> Result<ApiEnvelope<Value>, ClientError> {
        self.list_resources(node, RuntimeResource::Network).await
    }

    pub async fn list_volumes(&self, node: &NodeName) -> Result<ApiEnvelope<Value>, ClientError> {
        self.list_resources(node, RuntimeResource::Volume).await
    }

    // Applications

    pub async fn list_app_templates(&self) -> Result<ApiEnvelope<Vec<AppTemplate>>, ClientError> {
        self.call(ApiRequest::post("/api/app/tmpl/list")).await
    }

    pub async fn app_template_info(
        &self,
        id: &str,
    ) -> Result<ApiEnvelope<AppTemplate>, ClientError> {
        let path = format!("/api/app/tmpl/info/{}", segment(id)?);
        self.call(ApiRequest::post(path)).await
    }

    /// Submit a manifest exactly as given.
    pub async fn deploy(
        &self,
        manifest: &DeployManifest,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let request =
            ApiRequest::post("/api/app/deploy").text(MANIFEST_CONTENT_TYPE, manifest.as_str());
        self.call(request).await
    }

    // Environment

    pub async fn get_env(&self) -> Result<ApiEnvelope<EnvDocument>, ClientError> {
        self.call(ApiRequest::post("/api/env/list")).await
    }

    /// Replace the whole environment document.
    pub async fn save_env(
        &self,
        document: &EnvDocument,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        self.call(ApiRequest::post("/api/env/set").json(document)?).await
    }

    /// `true` when the service answers its liveness probe with a 2xx.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let response = self.transport.send(ApiRequest::get("/healthz")).await?;
        Ok(response.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{EnvBackend, RecordingTransport};
    use crate::transport::RequestBody;
    use bytes::Bytes;
    use percent_encoding::percent_decode_str;
    use reqwest::Method;
    use std::sync::Arc;

    const NODES: [&str; 4] = ["alpha", "edge node 7", "db&cache=1", "zürich/2"];
    const IDS: [&str; 6] = ["3f2a9c", "with space", "a/b", "a\\b", "q?x#y%z", "x[1]^|2"];

    fn client() -> (FleetClient<Arc<RecordingTransport>>, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::ok_json(
            r#"{"code":0,"msg":"","data":null}"#,
        ));
        (FleetClient::new(Arc::clone(&transport)), transport)
    }

    fn expect_node_scoped(request: &ApiRequest, path: &str, node: &str) {
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, path);
        assert_eq!(request.query, vec![("node_name".to_string(), node.to_string())]);
        assert_eq!(request.header_value("X-NODE-NAME"), None);
    }

    #[tokio::test]
    async fn container_actions_build_node_scoped_routes() {
        let (client, transport) = client();

        for node in NODES {
            for id in IDS {
                let node_name = NodeName::new(node);
                client.start_container(&node_name, id).await.unwrap();
                client.stop_container(&node_name, id).await.unwrap();
                client.restart_container(&node_name, id).await.unwrap();
                client.remove_container(&node_name, id).await.unwrap();
                client.inspect_container(&node_name, id).await.unwrap();

                let requests = transport.take_requests();
                let encoded = segment(id).unwrap();
                assert!(!encoded.contains(['/', '\\']));
                for (request, action) in requests
                    .iter()
                    .zip(["start", "stop", "restart", "delete", "inspect"])
                {
                    let path = format!("/api/node/docker/container/{}/{}", action, encoded);
                    expect_node_scoped(request, &path, node);
                }
            }
        }
    }

    #[tokio::test]
    async fn listing_calls_build_node_scoped_routes() {
        let (client, transport) = client();

        for node in NODES {
            let node_name = NodeName::from(node);
            client.node_runtime_info(&node_name).await.unwrap();
            client.list_containers(&node_name).await.unwrap();
            client.list_images(&node_name).await.unwrap();
            client.list_networks(&node_name).await.unwrap();
            client.list_volumes(&node_name).await.unwrap();

            let requests = transport.take_requests();
            let paths = [
                "/api/node/docker/info",
                "/api/node/docker/container/list",
                "/api/node/docker/image/list",
                "/api/node/docker/network/list",
                "/api/node/docker/volume/list",
            ];
            assert_eq!(requests.len(), paths.len());
            for (request, path) in requests.iter().zip(paths) {
                expect_node_scoped(request, path, node);
                assert_eq!(request.body, RequestBody::Empty);
            }
        }
    }

    #[tokio::test]
    async fn encoded_ids_survive_url_building() {
        let (client, transport) = client();
        client
            .start_container(&NodeName::new("edge 1"), "a/b c")
            .await
            .unwrap();

        let url = transport.take_requests()[0].url("http://cp:6734").unwrap();
        assert_eq!(
            url.as_str(),
            "http://cp:6734/api/node/docker/container/start/a%2Fb%20c?node_name=edge+1"
        );
    }

    #[tokio::test]
    async fn every_id_stays_one_segment_of_the_final_url() {
        let (client, transport) = client();

        for id in IDS {
            client.start_container(&NodeName::new("alpha"), id).await.unwrap();
            client.app_template_info(id).await.unwrap();

            let prefixes: [&[&str]; 2] = [
                &["api", "node", "docker", "container", "start"],
                &["api", "app", "tmpl", "info"],
            ];
            for (request, prefix) in transport.take_requests().iter().zip(prefixes) {
                let url = request.url("http://cp:6734").unwrap();
                let segments: Vec<&str> = url.path_segments().unwrap().collect();
                let (last, leading) = segments.split_last().unwrap();
                assert_eq!(leading, prefix, "{} -> {}", id, url);
                assert_eq!(percent_decode_str(last).decode_utf8().unwrap(), id);
            }
        }
    }

    #[tokio::test]
    async fn dot_and_empty_ids_are_refused_before_sending() {
        let (client, transport) = client();
        let node = NodeName::new("alpha");

        for id in ["", ".", ".."] {
            let results = [
                client.start_container(&node, id).await.map(drop),
                client.stop_container(&node, id).await.map(drop),
                client.restart_container(&node, id).await.map(drop),
                client.remove_container(&node, id).await.map(drop),
                client.inspect_container(&node, id).await.map(drop),
                client
                    .stream_container_logs(&node, id, CancellationToken::new(), |_| {})
                    .await
                    .map(drop),
                client.app_template_info(id).await.map(drop),
            ];
            for result in results {
                assert!(
                    matches!(&result, Err(ClientError::InvalidPathSegment(raw)) if raw == id),
                    "{:?} -> {:?}",
                    id,
                    result
                );
            }
        }
        assert!(transport.take_requests().is_empty());
    }

    #[tokio::test]
    async fn system_info_uses_the_header_and_no_query() {
        let transport = Arc::new(RecordingTransport::ok_json(
            r#"{"code":0,"msg":"","data":{"cpu_count":8,"host_name":"alpha-host"}}"#,
        ));
        let client = FleetClient::new(Arc::clone(&transport));

        let info = client
            .node_system_info(&NodeName::new("alpha"))
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(info.cpu_count, 8);
        assert_eq!(info.host_name.as_deref(), Some("alpha-host"));

        let request = &transport.take_requests()[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/api/node/proxy/sys");
        assert_eq!(request.header_value("X-NODE-NAME"), Some("alpha"));
        assert!(request.query.is_empty());
        assert_eq!(request.url("http://cp").unwrap().query(), None);
    }

    #[tokio::test]
    async fn unscoped_calls_build_their_routes() {
        let (client, transport) = client();

        client.list_nodes(&NodeListRequest { all: true }).await.unwrap();
        client.node_info("alpha").await.unwrap();
        client.list_app_templates().await.unwrap();
        client.app_template_info("redis/7").await.unwrap();
        client.get_env().await.unwrap();
        client.save_env(&EnvDocument::new("A=1")).await.unwrap();

        let requests = transport.take_requests();
        let expected = [
            ("/api/node/list", RequestBody::Json(serde_json::json!({"all": true}))),
            ("/api/node/info", RequestBody::Json(serde_json::json!({"name": "alpha"}))),
            ("/api/app/tmpl/list", RequestBody::Empty),
            ("/api/app/tmpl/info/redis%2F7", RequestBody::Empty),
            ("/api/env/list", RequestBody::Empty),
            ("/api/env/set", RequestBody::Json(serde_json::json!({"values": "A=1"}))),
        ];
        assert_eq!(requests.len(), expected.len());
        for (request, (path, body)) in requests.iter().zip(expected) {
            assert_eq!(request.method, Method::POST);
            assert_eq!(request.path, path);
            assert!(request.query.is_empty());
            assert_eq!(request.body, body);
        }
    }

    #[tokio::test]
    async fn deploy_sends_the_manifest_verbatim() {
        let (client, transport) = client();
        let text = "name: web\nreplicas: 3\n# not: [parsed\n";

        client.deploy(&DeployManifest::from_text(text)).await.unwrap();

        let request = &transport.take_requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/api/app/deploy");
        assert_eq!(
            request.body,
            RequestBody::Text {
                content_type: MANIFEST_CONTENT_TYPE.to_string(),
                text: text.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn non_success_status_propagates_unchanged() {
        let transport = RecordingTransport::with_status(503, "node agent unreachable");
        let client = FleetClient::new(transport);

        let err = client.list_containers(&NodeName::new("alpha")).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(client.transport().take_requests().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let client = FleetClient::new(RecordingTransport::ok_json("<html>proxy error</html>"));
        let err = client.get_env().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn health_reports_status_without_decoding() {
        let up = FleetClient::new(RecordingTransport::ok_json("UP"));
        assert!(tokio_test::assert_ok!(up.health().await));
        assert_eq!(up.transport().take_requests()[0].path, "/healthz");

        let down = FleetClient::new(RecordingTransport::with_status(500, ""));
        assert!(!down.health().await.unwrap());
    }

    #[tokio::test]
    async fn env_round_trips_the_exact_document() {
        let client = FleetClient::new(EnvBackend::default());
        let document = EnvDocument::new("# comment kept\nA=1\r\nB= spaced = value \n\n=odd\n");

        let saved = client.save_env(&document).await.unwrap();
        assert!(saved.is_success());

        let fetched = client.get_env().await.unwrap().into_data().unwrap();
        assert_eq!(fetched, document);
    }

    #[tokio::test]
    async fn log_handler_sees_every_chunk_cumulatively() {
        let chunks = ["first\n", "", "second\n", "third"];
        let transport =
            RecordingTransport::streaming(chunks.iter().map(|c| Bytes::from(*c)).collect());
        let client = FleetClient::new(transport);
        let node = NodeName::new("alpha");
        let mut seen = Vec::new();

        let outcome = client
            .stream_container_logs(&node, "web/1", CancellationToken::new(), |s| {
                seen.push(s.to_text_lossy().into_owned())
            })
            .await
            .unwrap();

        assert_eq!(
            seen,
            vec!["first\n", "first\n", "first\nsecond\n", "first\nsecond\nthird"]
        );
        assert!(matches!(outcome, LogStreamOutcome::Completed(_)));
        assert_eq!(outcome.snapshot().chunks(), chunks.len());

        let request = &client.transport().take_requests()[0];
        expect_node_scoped(request, "/api/node/docker/container/logs/web%2F1", "alpha");
        assert_eq!(request.header_value("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn cancelling_after_chunk_k_stops_handler_calls() {
        let total = 10;
        for k in 1..=total {
            let chunks = (0..total).map(|i| Bytes::from(format!("line {}\n", i))).collect();
            let client = FleetClient::new(RecordingTransport::streaming(chunks));
            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            let mut calls = 0;

            let outcome = client
                .stream_container_logs(&NodeName::new("alpha"), "c1", cancel, |_| {
                    calls += 1;
                    if calls == k {
                        trigger.cancel();
                    }
                })
                .await
                .unwrap();

            assert_eq!(calls, k);
            if k < total {
                assert!(outcome.is_cancelled());
            }
            assert_eq!(outcome.snapshot().chunks(), k);
        }
    }

    #[tokio::test]
    async fn cancelled_before_open_never_sends() {
        let client = FleetClient::new(RecordingTransport::streaming(vec![Bytes::from("x")]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = client
            .stream_container_logs(&NodeName::new("alpha"), "c1", cancel, |_| {
                panic!("handler must not run")
            })
            .await
            .unwrap();

        assert!(outcome.is_cancelled());
        assert!(client.transport().take_requests().is_empty());
    }

    #[tokio::test]
    async fn failed_stream_open_is_an_error() {
        let client = FleetClient::new(RecordingTransport::with_status(404, "no such container"));
        let node = NodeName::new("alpha");
        let err = client
            .stream_container_logs(&node, "gone", CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn cancel_ends_a_stream_that_stops_producing() {
        let client =
            FleetClient::new(RecordingTransport::streaming_then_idle(vec![Bytes::from("up\n")]));
        let cancel = CancellationToken::new();
        let first_chunk = Arc::new(tokio::sync::Notify::new());

        let canceller = tokio::spawn({
            let cancel = cancel.clone();
            let first_chunk = Arc::clone(&first_chunk);
            async move {
                first_chunk.notified().await;
                cancel.cancel();
            }
        });

        let mut calls = 0;
        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            client.stream_container_logs(&NodeName::new("alpha"), "c1", cancel, |_| {
                calls += 1;
                first_chunk.notify_one();
            }),
        )
        .await
        .expect("cancellation must end the stream")
        .unwrap();

        canceller.await.unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.snapshot().chunks(), 1);
        assert_eq!(calls, 1);
    }
}
