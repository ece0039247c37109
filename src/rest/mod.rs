//! The KV-backed REST API: stateless handlers over the key-value store,
//! bearer-token authenticated against the identity provider on every call.

pub mod auth;
pub mod identity;
pub mod kv;
pub mod rooms;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::AppState;
use identity::IdentityProvider;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route(
            "/rooms/{room_id}/messages",
            get(rooms::list_messages).post(rooms::send_message),
        )
        .route("/init", get(rooms::init_default_rooms))
}

/// One-line error body; human string only, no machine code.
pub(crate) fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub(crate) fn unauthorized() -> Response {
    reject(StatusCode::UNAUTHORIZED, "Unauthorized")
}

/// Resolves the `Authorization: Bearer <token>` header against the
/// identity provider. Each endpoint pays this round-trip independently.
pub(crate) async fn bearer_user(
    identity: &Arc<dyn IdentityProvider>,
    headers: &HeaderMap,
) -> Option<String> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    identity.verify(token).await.ok()
}

pub(crate) fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
