//! Cluster REST API Integration Tests
//!
//! Tests the slot, hash-tag and topology endpoints against a live server

use keyslot_server::{AppState, TopologyGenerator, create_router};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;

/// Helper to spawn a test server, returns the base URL of the cluster routes
async fn spawn_test_server(prefix: &str) -> String {
    let state = AppState::new(TopologyGenerator::new("127.0.0.1", 7000));
    let app = create_router(state, prefix);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{}{}", addr, prefix.trim_end_matches('/'));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait a bit for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    url
}

#[tokio::test]
async fn test_health_endpoint() {
    let url = spawn_test_server("/api/cluster").await;
    let base = url.trim_end_matches("/api/cluster");

    let response = Client::new()
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "keyslot");
}

#[tokio::test]
async fn test_slot_endpoint() {
    let url = spawn_test_server("/api/cluster").await;
    let client = Client::new();

    let response = client
        .get(format!("{}/slot/foo", url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["key"], "foo");
    assert_eq!(body["slot"], 12182);
    assert!(body["hashTag"].is_null());
}

#[tokio::test]
async fn test_slot_endpoint_with_hash_tag() {
    let url = spawn_test_server("/api/cluster").await;
    let client = Client::new();

    // Braces are percent-encoded in the path
    let tagged: serde_json::Value = client
        .get(format!("{}/slot/foo%7Bbar%7Dbaz", url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let plain: serde_json::Value = client
        .get(format!("{}/slot/bar", url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(tagged["key"], "foo{bar}baz");
    assert_eq!(tagged["hashTag"], "bar");
    assert_eq!(tagged["slot"], plain["slot"]);
}

#[tokio::test]
async fn test_hash_tag_analyze_co_located() {
    let url = spawn_test_server("/api/cluster").await;

    let response = Client::new()
        .post(format!("{}/hash-tag/analyze", url))
        .json(&json!(["{user:1}:cart", "{user:1}:orders"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["coLocated"], true);
    assert_eq!(body["hashTag"], "user:1");
    assert_eq!(body["keys"], json!(["{user:1}:cart", "{user:1}:orders"]));
    assert!(body["slot"].is_u64());
}

#[tokio::test]
async fn test_hash_tag_analyze_not_co_located() {
    let url = spawn_test_server("/api/cluster").await;

    let body: serde_json::Value = Client::new()
        .post(format!("{}/hash-tag/analyze", url))
        .json(&json!(["{user:1}:cart", "{user:2}:orders"]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["coLocated"], false);
    assert!(body["hashTag"].is_null());
    assert!(body["slot"].is_null());
}

#[tokio::test]
async fn test_hash_tag_analyze_empty_list() {
    let url = spawn_test_server("/api/cluster").await;

    let response = Client::new()
        .post(format!("{}/hash-tag/analyze", url))
        .json(&json!([]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().starts_with("Empty input"));
}

#[tokio::test]
async fn test_recommended_topology() {
    let url = spawn_test_server("/api/cluster").await;

    let response = Client::new()
        .get(format!("{}/topology", url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["masterCount"], 3);
    assert_eq!(body["replicaCount"], 3);
    assert_eq!(body["totalNodes"], 6);
    assert_eq!(body["totalSlots"], 16384);

    let nodes = body["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 6);
    assert_eq!(nodes[0]["nodeId"], "master-0");
    assert_eq!(nodes[0]["address"], "127.0.0.1:7000");
    assert_eq!(nodes[0]["slotRangeStart"], 0);
    assert_eq!(nodes[0]["slotRangeEnd"], 5461);
    assert_eq!(nodes[0]["pairedWith"], "master-0-replica");
    assert_eq!(nodes[1]["role"], "replica");
    assert_eq!(nodes[1]["address"], "127.0.0.1:7003");
    assert_eq!(nodes[5]["pairedWith"], "master-2");
}

#[tokio::test]
async fn test_topology_for_master_count() {
    let url = spawn_test_server("/api/cluster").await;

    let body: serde_json::Value = Client::new()
        .get(format!("{}/topology/5", url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["masterCount"], 5);
    assert_eq!(body["nodes"].as_array().unwrap().len(), 10);
    // 16384 = 4 * 3277 + 1 * 3276
    assert_eq!(body["nodes"][0]["slotRangeEnd"], 3276);
    assert_eq!(body["nodes"][8]["slotRangeStart"], 13108);
    assert_eq!(body["nodes"][8]["slotRangeEnd"], 16383);
}

#[tokio::test]
async fn test_topology_quorum_rejected() {
    let url = spawn_test_server("/api/cluster").await;

    let response = Client::new()
        .get(format!("{}/topology/2", url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid configuration")
    );
}

#[tokio::test]
async fn test_topology_non_numeric_rejected() {
    let url = spawn_test_server("/api/cluster").await;

    let response = Client::new()
        .get(format!("{}/topology/three", url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_route_endpoint() {
    let url = spawn_test_server("/api/cluster").await;
    let client = Client::new();

    let body: serde_json::Value = client
        .get(format!("{}/route/foo", url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["key"], "foo");
    assert_eq!(body["slot"], 12182);
    assert_eq!(body["master"]["nodeId"], "master-2");

    let response = client
        .get(format!("{}/route/foo?masters=1", url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_custom_prefix() {
    let url = spawn_test_server("/v2/").await;

    let response = Client::new()
        .get(format!("{}/topology/4", url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(url.ends_with("/v2"));
}
