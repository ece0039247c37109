//! Rooms and messages over the KV store.
//!
//! Same read-modify-write-without-transaction pattern as signup. Message
//! retrieval is a prefix scan sorted by timestamp per read, no pagination.

use std::sync::Arc;

use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::AppState;
use crate::appresult::AppResult;

use super::identity::IdentityProvider;
use super::kv::KvStore;
use super::{bearer_user, reject, rfc3339_now, unauthorized};

const DEFAULT_ROOMS: [(&str, &str); 4] = [
    ("general", "General"),
    ("tech-talk", "Tech Talk"),
    ("random", "Random"),
    ("design", "Design"),
];

/// `<prefix>_<millis>_<random suffix>`, matching the gateway's best-effort
/// id scheme.
fn kv_id(prefix: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(9)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("{prefix}_{millis}_{suffix}")
}

fn field(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_rooms(
    State(kv): State<Arc<dyn KvStore>>,
    State(identity): State<Arc<dyn IdentityProvider>>,
    headers: HeaderMap,
) -> AppResult<Response> {
    if bearer_user(&identity, &headers).await.is_none() {
        return Ok(unauthorized());
    }

    let rooms: Vec<Value> = kv
        .get_by_prefix("room:")
        .await?
        .iter()
        .map(|room| {
            json!({
                "id": field(room, "id"),
                "name": field(room, "name"),
                "participantCount": room.get("participantCount").cloned().unwrap_or(json!(0)),
                "createdAt": field(room, "createdAt"),
            })
        })
        .collect();

    Ok(Json(json!({ "rooms": rooms })).into_response())
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRoomBody {
    name: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_room(
    State(kv): State<Arc<dyn KvStore>>,
    State(identity): State<Arc<dyn IdentityProvider>>,
    headers: HeaderMap,
    Json(body): Json<CreateRoomBody>,
) -> AppResult<Response> {
    let Some(user_id) = bearer_user(&identity, &headers).await else {
        return Ok(unauthorized());
    };

    let name = body.name.unwrap_or_default();
    let name = name.trim();
    if name.is_empty() {
        return Ok(reject(StatusCode::BAD_REQUEST, "Room name is required"));
    }

    let room_id = kv_id("room");
    let room = json!({
        "id": room_id,
        "name": name,
        "participantCount": 1,
        "createdBy": user_id,
        "createdAt": rfc3339_now(),
    });
    kv.set(&format!("room:{room_id}"), room.clone()).await?;

    tracing::info!(%room_id, %name, "room created");
    Ok(Json(json!({ "success": true, "room": room })).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_messages(
    State(kv): State<Arc<dyn KvStore>>,
    State(identity): State<Arc<dyn IdentityProvider>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    if bearer_user(&identity, &headers).await.is_none() {
        return Ok(unauthorized());
    }

    let mut messages = kv
        .get_by_prefix(&format!("message:{room_id}:"))
        .await?;
    // RFC 3339 UTC timestamps sort lexicographically
    messages.sort_by(|a, b| {
        let a = a.get("timestamp").and_then(Value::as_str).unwrap_or("");
        let b = b.get("timestamp").and_then(Value::as_str).unwrap_or("");
        a.cmp(b)
    });

    let messages: Vec<Value> = messages
        .iter()
        .map(|msg| {
            json!({
                "id": field(msg, "id"),
                "roomId": field(msg, "roomId"),
                "userId": field(msg, "userId"),
                "username": field(msg, "username"),
                "content": field(msg, "content"),
                "timestamp": field(msg, "timestamp"),
            })
        })
        .collect();

    Ok(Json(json!({ "messages": messages })).into_response())
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageBody {
    content: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_message(
    State(kv): State<Arc<dyn KvStore>>,
    State(identity): State<Arc<dyn IdentityProvider>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
    Json(body): Json<SendMessageBody>,
) -> AppResult<Response> {
    let Some(user_id) = bearer_user(&identity, &headers).await else {
        return Ok(unauthorized());
    };

    let content = body.content.unwrap_or_default();
    let content = content.trim();
    if content.is_empty() {
        return Ok(reject(
            StatusCode::BAD_REQUEST,
            "Message content is required",
        ));
    }

    let Some(user) = kv.get(&format!("user:{user_id}")).await? else {
        return Ok(reject(StatusCode::NOT_FOUND, "User data not found"));
    };

    let message_id = kv_id("msg");
    let message = json!({
        "id": message_id,
        "roomId": room_id,
        "userId": user_id,
        "username": field(&user, "username"),
        "content": content,
        "timestamp": rfc3339_now(),
    });
    kv.set(&format!("message:{room_id}:{message_id}"), message.clone())
        .await?;

    Ok(Json(json!({ "success": true, "message": message })).into_response())
}

/// Idempotent seed of the default rooms; safe to call on every boot.
#[debug_handler(state = AppState)]
pub(crate) async fn init_default_rooms(
    State(kv): State<Arc<dyn KvStore>>,
) -> AppResult<Response> {
    for (id, name) in DEFAULT_ROOMS {
        if kv.get(&format!("room:{id}")).await?.is_none() {
            let room = json!({
                "id": id,
                "name": name,
                "participantCount": rand::rng().random_range(1..=20),
                "createdBy": "system",
                "createdAt": rfc3339_now(),
            });
            kv.set(&format!("room:{id}"), room).await?;
        }
    }

    Ok(Json(json!({ "success": true, "message": "Default rooms initialized" })).into_response())
}
