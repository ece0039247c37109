//! Signup and signin.
//!
//! The provider only needs a username, so accounts are created under a
//! synthesized `<username>@chat.local` email. Uniqueness is a lowercased
//! `user:username:<name>` marker in the KV store; the existence check and
//! the write are not atomic, so two concurrent signups with the same
//! username can both succeed. That race is observed behavior, kept as-is.

use std::sync::Arc;

use axum::{Json, debug_handler, extract::State, http::StatusCode, response::{IntoResponse, Response}};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::appresult::AppResult;
use crate::{AppState, validate};

use super::identity::IdentityProvider;
use super::kv::KvStore;
use super::{reject, rfc3339_now};

#[derive(Debug, Deserialize)]
pub(crate) struct CredentialsBody {
    username: Option<String>,
    password: Option<String>,
}

pub(crate) fn fake_email(username: &str) -> String {
    format!("{username}@chat.local")
}

fn username_marker(username: &str) -> String {
    format!("user:username:{}", username.to_lowercase())
}

#[debug_handler(state = AppState)]
pub(crate) async fn signup(
    State(kv): State<Arc<dyn KvStore>>,
    State(identity): State<Arc<dyn IdentityProvider>>,
    Json(body): Json<CredentialsBody>,
) -> AppResult<Response> {
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return Ok(reject(
            StatusCode::BAD_REQUEST,
            "Username and password are required",
        ));
    };
    let username = match validate::username(&username) {
        Ok(name) => name.to_owned(),
        Err(err) => return Ok(reject(StatusCode::BAD_REQUEST, &err.to_string())),
    };

    // check-then-write, no transaction
    if kv.get(&username_marker(&username)).await?.is_some() {
        return Ok(reject(StatusCode::BAD_REQUEST, "Username is already taken"));
    }

    let user_id = match identity
        .create_account(&fake_email(&username), &password)
        .await
    {
        Ok(id) => id,
        Err(err) => {
            tracing::warn!(%username, %err, "identity provider rejected signup");
            return Ok(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create user account",
            ));
        }
    };

    let user = json!({
        "id": user_id,
        "username": username,
        "createdAt": rfc3339_now(),
    });
    kv.set(&format!("user:{user_id}"), user.clone()).await?;
    kv.set(&username_marker(&username), Value::String(user_id))
        .await?;

    tracing::info!(%username, "user signed up");
    Ok(Json(json!({ "success": true, "user": user })).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn signin(
    State(kv): State<Arc<dyn KvStore>>,
    State(identity): State<Arc<dyn IdentityProvider>>,
    Json(body): Json<CredentialsBody>,
) -> AppResult<Response> {
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return Ok(reject(
            StatusCode::BAD_REQUEST,
            "Username and password are required",
        ));
    };

    let auth = match identity.sign_in(&fake_email(&username), &password).await {
        Ok(auth) => auth,
        Err(_) => {
            return Ok(reject(
                StatusCode::UNAUTHORIZED,
                "Invalid username or password",
            ));
        }
    };

    let Some(user) = kv.get(&format!("user:{}", auth.user_id)).await? else {
        return Ok(reject(StatusCode::NOT_FOUND, "User data not found"));
    };

    Ok(Json(json!({
        "success": true,
        "user": user,
        "accessToken": auth.access_token,
    }))
    .into_response())
}
