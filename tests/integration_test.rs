//! Integration tests using the TrackdTest harness

mod common;

use common::TrackdTest;

#[tokio::test]
async fn test_server_starts_and_stops() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");
    // Server shuts down automatically when trackd is dropped
    drop(trackd);
}

#[tokio::test]
async fn test_health_endpoint() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");

    let resp = trackd.get("/health").await.expect("Failed to get health");
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_root_endpoint() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");

    let resp = trackd.get("/").await.expect("Failed to get root");
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["name"], "trackd");
}

#[tokio::test]
async fn test_parallel_servers() {
    // Start multiple servers to verify port isolation
    let trackd1 = TrackdTest::start().await.expect("Failed to start server 1");
    let trackd2 = TrackdTest::start().await.expect("Failed to start server 2");

    assert_ne!(trackd1.addr, trackd2.addr);

    // Both should respond
    let resp1 = trackd1.get("/health").await.expect("Failed to get health 1");
    let resp2 = trackd2.get("/health").await.expect("Failed to get health 2");

    assert_eq!(resp1.status(), 200);
    assert_eq!(resp2.status(), 200);
}

#[tokio::test]
async fn test_database_isolation() {
    let trackd1 = TrackdTest::start().await.expect("Failed to start server 1");
    let trackd2 = TrackdTest::start().await.expect("Failed to start server 2");

    // Add a combatant on server 1 only
    let resp = trackd1
        .post(
            "/api/characters",
            &serde_json::json!({"name": "Goblin", "type": "enemy"}),
        )
        .await
        .expect("Failed to add combatant");
    assert_eq!(resp.status(), 201);

    let roster1: serde_json::Value = trackd1
        .get("/api/characters")
        .await
        .expect("Failed to list 1")
        .json()
        .await
        .expect("Failed to parse 1");
    let roster2: serde_json::Value = trackd2
        .get("/api/characters")
        .await
        .expect("Failed to list 2")
        .json()
        .await
        .expect("Failed to parse 2");

    assert_eq!(roster1.as_array().unwrap().len(), 1);
    assert_eq!(roster2.as_array().unwrap().len(), 0);
}
