//! Contract tests for the HTTP adapters.
//!
//! wiremock stands in for the gateway, the upload service and the message
//! unit. Request and response shapes follow the public endpoints.

use std::time::Duration;

use mdprov_net::{
    http_client, GatewayClient, Ingest, MessengerClient, NameResolver, NetError, TagQuery,
    UploadClient,
};
use wiremock::matchers::{body_bytes, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> reqwest::Client {
    http_client(Duration::from_secs(5)).unwrap()
}

fn base(server: &MockServer) -> url::Url {
    server.uri().parse().unwrap()
}

// ── POST /graphql ─────────────────────────────────────────────────────

#[tokio::test]
async fn find_by_tag_sends_tag_filter_and_parses_edges() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(serde_json::json!({
            "variables": {
                "tags": [{ "name": "IPFS-CID", "values": ["bafkreiexample"] }],
                "first": 1
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "transactions": { "edges": [
                { "node": { "id": "remote-tx-1", "tags": [
                    { "name": "App-Name", "value": "Markdown Provenance" },
                    { "name": "IPFS-CID", "value": "bafkreiexample" }
                ] } }
            ] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = GatewayClient::new(client(), base(&server));
    let items = gateway
        .find_by_tag("IPFS-CID", "bafkreiexample", 1)
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id.as_str(), "remote-tx-1");
    assert!(items[0].has_tag("IPFS-CID", "bafkreiexample"));
}

#[tokio::test]
async fn find_by_tag_with_no_edges_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "transactions": { "edges": [] } }
        })))
        .mount(&server)
        .await;

    let gateway = GatewayClient::new(client(), base(&server));
    assert!(gateway.find_by_tag("IPFS-CID", "x", 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn find_by_tag_surfaces_graphql_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{ "message": "rate limited" }]
        })))
        .mount(&server)
        .await;

    let gateway = GatewayClient::new(client(), base(&server));
    match gateway.find_by_tag("IPFS-CID", "x", 1).await {
        Err(NetError::Decode { message, .. }) => assert_eq!(message, "rate limited"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn find_by_tag_maps_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let gateway = GatewayClient::new(client(), base(&server));
    assert!(matches!(
        gateway.find_by_tag("IPFS-CID", "x", 1).await,
        Err(NetError::Rejected { status: 502, .. })
    ));
}

// ── GET /ar-io/resolver/records/{name} ────────────────────────────────

#[tokio::test]
async fn resolve_returns_process_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ar-io/resolver/records/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "processId": "ant-process-1",
            "txId": "current-target",
            "ttlSeconds": 900,
            "owner": "someone"
        })))
        .mount(&server)
        .await;

    let gateway = GatewayClient::new(client(), base(&server));
    let record = gateway.resolve("alice").await.unwrap();
    assert_eq!(record.process_id, "ant-process-1");
    assert_eq!(record.tx_id.as_deref(), Some("current-target"));
    assert_eq!(record.ttl_seconds, Some(900));
}

#[tokio::test]
async fn resolve_unknown_name_is_distinct_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ar-io/resolver/records/nobody"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let gateway = GatewayClient::new(client(), base(&server));
    assert!(matches!(
        gateway.resolve("nobody").await,
        Err(NetError::NameNotRegistered(name)) if name == "nobody"
    ));
}

// ── POST /v1/tx ───────────────────────────────────────────────────────

#[tokio::test]
async fn upload_posts_raw_octets() {
    let server = MockServer::start().await;
    let item = vec![0x02, 0x00, 0xaa, 0xbb];

    Mock::given(method("POST"))
        .and(path("/v1/tx"))
        .and(header("content-type", "application/octet-stream"))
        .and(body_bytes(item.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "new-item-id",
            "owner": "addr",
            "dataCaches": ["arweave.net"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let upload = UploadClient::new(client(), base(&server));
    let id = upload.post_item(item.into()).await.unwrap();
    assert_eq!(id.as_str(), "new-item-id");
}

#[tokio::test]
async fn upload_payment_required_is_insufficient_funds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/tx"))
        .respond_with(ResponseTemplate::new(402).set_body_string("Insufficient balance"))
        .mount(&server)
        .await;

    let upload = UploadClient::new(client(), base(&server));
    let err = upload.post_item(vec![1, 2, 3].into()).await.unwrap_err();
    assert!(err.is_insufficient_funds());
}

#[tokio::test]
async fn upload_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/tx"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "late" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let http = http_client(Duration::from_millis(200)).unwrap();
    let upload = UploadClient::new(http, base(&server));
    assert!(matches!(
        upload.post_item(vec![1].into()).await,
        Err(NetError::Timeout { .. })
    ));
}

#[tokio::test]
async fn upload_unreachable_is_connectivity() {
    // Nothing listens on the discard port.
    let upload = UploadClient::new(client(), "http://127.0.0.1:9".parse().unwrap());
    let err = upload.post_item(vec![1].into()).await.unwrap_err();
    assert!(err.is_connectivity());
}

// ── POST / (message unit) ─────────────────────────────────────────────

#[tokio::test]
async fn messenger_posts_to_root() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "id": "message-id",
            "message": "Processing DataItem"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let messenger = MessengerClient::new(client(), base(&server));
    let id = messenger.post_item(vec![9, 9].into()).await.unwrap();
    assert_eq!(id.as_str(), "message-id");
}
