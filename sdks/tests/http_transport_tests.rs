// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::io::Write;
use std::time::Duration;

use fleetdeck_sdk::{
    CancellationToken, ClientError, DeployManifest, EnvDocument, FleetClient, LogStreamOutcome,
    NodeListRequest, NodeName, ReqwestTransport,
};
use mockito::Matcher;

const EMPTY_OK: &str = r#"{"code":0,"msg":""}"#;

#[tokio::test]
async fn node_scoped_call_encodes_id_and_node_name() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/node/docker/container/restart/web%2F1%20blue")
        .match_query(Matcher::UrlEncoded("node_name".into(), "edge 1&2".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EMPTY_OK)
        .create_async()
        .await;

    let client = FleetClient::connect(server.url()).unwrap();
    let envelope = client
        .restart_container(&NodeName::new("edge 1&2"), "web/1 blue")
        .await
        .unwrap();

    assert!(envelope.is_success());
    mock.assert_async().await;
}

#[tokio::test]
async fn system_info_sends_node_header_and_api_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/node/proxy/sys")
        .match_header("x-node-name", "alpha")
        .match_header("authorization", "Bearer s3cret")
        .with_status(200)
        .with_body(
            r#"{"code":0,"msg":"","data":{"cpu_usage":12.5,"cpu_count":4,"disks":[{"name":"sda","total":100,"free":40,"mount":"/","removable":false}]}}"#,
        )
        .create_async()
        .await;

    let transport = ReqwestTransport::new(server.url()).unwrap().with_api_key("s3cret");
    let info = FleetClient::new(transport)
        .node_system_info(&NodeName::new("alpha"))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(info.cpu_count, 4);
    assert_eq!(info.disks.len(), 1);
    assert_eq!(info.disks[0].mount, "/");
    mock.assert_async().await;
}

#[tokio::test]
async fn list_nodes_posts_criteria_and_decodes_nodes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/node/list")
        .match_body(Matcher::Json(serde_json::json!({"all": true})))
        .with_status(200)
        .with_body(
            r#"{"code":0,"msg":"","data":[{"name":"alpha","ip":"10.0.0.2","port":6734,"status":true},{"name":"beta","status":false}]}"#,
        )
        .create_async()
        .await;

    let client = FleetClient::connect(server.url()).unwrap();
    let nodes = client
        .list_nodes(&NodeListRequest { all: true })
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].ip, "10.0.0.2");
    assert!(!nodes[1].status);
    mock.assert_async().await;
}

#[tokio::test]
async fn deploy_body_is_the_manifest_text() {
    let manifest = "app: redis\nvalues:\n  port: 6379\n";
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/app/deploy")
        .match_header("content-type", "application/x-yaml")
        .match_body(manifest)
        .with_status(200)
        .with_body(r#"{"code":0,"msg":"","data":{"name":"redis"}}"#)
        .create_async()
        .await;

    let client = FleetClient::connect(server.url()).unwrap();
    let result = client
        .deploy(&DeployManifest::from_text(manifest))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(result["name"], "redis");
    mock.assert_async().await;
}

#[tokio::test]
async fn save_env_posts_the_document_as_is() {
    let document = EnvDocument::new("# shared\nREGISTRY=registry.local:5000\nTOKEN=a=b\n");
    let mut server = mockito::Server::new_async().await;
    let set = server
        .mock("POST", "/api/env/set")
        .match_body(Matcher::Json(serde_json::json!({ "values": document.values })))
        .with_status(200)
        .with_body(EMPTY_OK)
        .create_async()
        .await;
    let list = server
        .mock("POST", "/api/env/list")
        .with_status(200)
        .with_body(serde_json::json!({"code": 0, "msg": "", "data": document}).to_string())
        .create_async()
        .await;

    let client = FleetClient::connect(server.url()).unwrap();
    client.save_env(&document).await.unwrap();
    let fetched = client.get_env().await.unwrap().into_data().unwrap();

    assert_eq!(fetched, document);
    set.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn server_error_surfaces_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/app/tmpl/list")
        .with_status(500)
        .with_body("Manager went wrong because service inner error")
        .create_async()
        .await;

    let client = FleetClient::connect(server.url()).unwrap();
    match client.list_app_templates().await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("inner error"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let client = FleetClient::connect("http://127.0.0.1:9").unwrap();
    let err = client.get_env().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn logs_stream_to_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/node/docker/container/logs/c1")
        .match_query(Matcher::UrlEncoded("node_name".into(), "alpha".into()))
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_chunked_body(|w| {
            w.write_all(b"booting\n")?;
            w.write_all(b"ready\n")
        })
        .create_async()
        .await;

    let client = FleetClient::connect(server.url()).unwrap();
    let mut last_len = 0;
    let outcome = client
        .stream_container_logs(&NodeName::new("alpha"), "c1", CancellationToken::new(), |s| {
            assert!(s.len() >= last_len);
            last_len = s.len();
        })
        .await
        .unwrap();

    match outcome {
        LogStreamOutcome::Completed(snapshot) => {
            assert_eq!(snapshot.to_text_lossy(), "booting\nready\n");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn cancelling_a_quiet_log_stream_returns_promptly() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/node/docker/container/logs/c1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_chunked_body(|w| {
            w.write_all(b"waiting for traffic\n")?;
            std::thread::sleep(Duration::from_secs(10));
            Ok(())
        })
        .create_async()
        .await;

    let client = FleetClient::connect(server.url()).unwrap();
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            cancel.cancel();
        }
    });

    let mut calls = 0;
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        client.stream_container_logs(&NodeName::new("alpha"), "c1", cancel, |_| calls += 1),
    )
    .await
    .expect("stream did not stop after cancellation")
    .unwrap();

    assert!(outcome.is_cancelled());
    assert!(calls <= 1);
}

#[tokio::test]
async fn logs_for_missing_container_fail_before_streaming() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/node/docker/container/logs/gone")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let client = FleetClient::connect(server.url()).unwrap();
    let err = client
        .stream_container_logs(&NodeName::new("alpha"), "gone", CancellationToken::new(), |_| {
            panic!("no chunk expected")
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn health_probe_hits_healthz() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/healthz")
        .with_status(200)
        .with_body("UP")
        .create_async()
        .await;

    let client = FleetClient::connect(server.url()).unwrap();
    assert!(client.health().await.unwrap());
    mock.assert_async().await;
}
