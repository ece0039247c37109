//! End-to-end tests for the REST API, running the real router in-process.

use axum::http::StatusCode;
use axum_test::TestServer;
use parlor::{AppState, app};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn server() -> TestServer {
    TestServer::new(app(AppState::new())).expect("router should start")
}

async fn signup(server: &TestServer, username: &str, password: &str) -> Value {
    server
        .post("/auth/signup")
        .json(&json!({ "username": username, "password": password }))
        .await
        .json::<Value>()
}

/// Signs up and signs in, returning the access token.
async fn bearer_for(server: &TestServer, username: &str) -> String {
    signup(server, username, "hunter22").await;
    let body = server
        .post("/auth/signin")
        .json(&json!({ "username": username, "password": "hunter22" }))
        .await
        .json::<Value>();
    body["accessToken"]
        .as_str()
        .expect("signin returns a token")
        .to_owned()
}

#[tokio::test]
async fn signup_then_signin_round_trip() {
    let server = server();

    let res = server
        .post("/auth/signup")
        .json(&json!({ "username": "alice", "password": "hunter22" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body = res.json::<Value>();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["username"], json!("alice"));
    assert!(body["user"]["id"].is_string());

    let res = server
        .post("/auth/signin")
        .json(&json!({ "username": "alice", "password": "hunter22" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body = res.json::<Value>();
    assert_eq!(body["user"]["username"], json!("alice"));
    assert!(body["accessToken"].is_string());
}

#[tokio::test]
async fn sequential_duplicate_signup_is_rejected() {
    let server = server();
    signup(&server, "alice", "hunter22").await;

    let res = server
        .post("/auth/signup")
        .json(&json!({ "username": "alice", "password": "other" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], json!("Username is already taken"));

    // the marker is lowercased, so a case-variant collides too
    let res = server
        .post("/auth/signup")
        .json(&json!({ "username": "Alice", "password": "other" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_validates_its_input() {
    let server = server();

    let res = server.post("/auth/signup").json(&json!({})).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>()["error"],
        json!("Username and password are required")
    );

    let res = server
        .post("/auth/signup")
        .json(&json!({ "username": "ab", "password": "hunter22" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>()["error"],
        json!("Username must be at least 3 characters long")
    );

    let res = server
        .post("/auth/signup")
        .json(&json!({ "username": "bad name!", "password": "hunter22" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>()["error"],
        json!("Username can only contain letters, numbers, underscores, and hyphens")
    );
}

#[tokio::test]
async fn signin_with_wrong_password_is_unauthorized() {
    let server = server();
    signup(&server, "alice", "hunter22").await;

    let res = server
        .post("/auth/signin")
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.json::<Value>()["error"],
        json!("Invalid username or password")
    );
}

#[tokio::test]
async fn rooms_require_a_bearer_token() {
    let server = server();

    let res = server.get("/rooms").await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>()["error"], json!("Unauthorized"));

    let res = server
        .get("/rooms")
        .authorization_bearer("not-a-real-token")
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn init_seeds_default_rooms_once() {
    let server = server();
    let token = bearer_for(&server, "alice").await;

    let res = server.get("/init").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.json::<Value>()["success"], json!(true));
    // second call is a no-op
    server.get("/init").await;

    let res = server.get("/rooms").authorization_bearer(&token).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body = res.json::<Value>();
    let rooms = body["rooms"].as_array().expect("rooms array");
    assert_eq!(rooms.len(), 4);

    let mut ids: Vec<&str> = rooms.iter().filter_map(|r| r["id"].as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["design", "general", "random", "tech-talk"]);
    for room in rooms {
        let count = room["participantCount"].as_u64().expect("count is a number");
        assert!((1..=20u64).contains(&count));
    }
}

#[tokio::test]
async fn create_room_and_exchange_messages() {
    let server = server();
    let token = bearer_for(&server, "alice").await;

    let res = server
        .post("/rooms")
        .authorization_bearer(&token)
        .json(&json!({ "name": "  Dog Pics  " }))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body = res.json::<Value>();
    assert_eq!(body["room"]["name"], json!("Dog Pics"));
    let room_id = body["room"]["id"].as_str().expect("room id").to_owned();
    assert!(room_id.starts_with("room_"));

    let res = server
        .post(&format!("/rooms/{room_id}/messages"))
        .authorization_bearer(&token)
        .json(&json!({ "content": "first!" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body = res.json::<Value>();
    assert_eq!(body["message"]["username"], json!("alice"));
    assert_eq!(body["message"]["roomId"], json!(room_id));

    server
        .post(&format!("/rooms/{room_id}/messages"))
        .authorization_bearer(&token)
        .json(&json!({ "content": "second" }))
        .await;

    let res = server
        .get(&format!("/rooms/{room_id}/messages"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body = res.json::<Value>();
    let messages = body["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 2);
    for msg in messages {
        assert_eq!(msg["username"], json!("alice"));
        assert!(msg["timestamp"].as_str().expect("timestamp").contains('T'));
    }
}

#[tokio::test]
async fn empty_bodies_are_rejected() {
    let server = server();
    let token = bearer_for(&server, "alice").await;

    let res = server
        .post("/rooms")
        .authorization_bearer(&token)
        .json(&json!({ "name": "   " }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], json!("Room name is required"));

    let res = server
        .post("/rooms/general/messages")
        .authorization_bearer(&token)
        .json(&json!({}))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>()["error"],
        json!("Message content is required")
    );
}

#[tokio::test]
async fn static_fallback_serves_the_embedded_pages() {
    let server = server();

    let res = server.get("/").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(res.text().contains("<html"));

    let res = server.get("/no-such-file.js").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    let body = res.text();
    assert!(body.contains("404"));
    assert!(body.contains("/no-such-file.js"));
}
