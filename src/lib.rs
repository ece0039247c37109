pub mod appresult;
pub mod demo;
pub mod error;
pub mod format;
pub mod gateway;
pub mod hub;
pub mod rest;
pub mod statics;
pub mod validate;

use std::sync::Arc;

use axum::{Router, extract::FromRef};
use tower_http::cors::CorsLayer;

pub use appresult::{AppError, AppResult};

use hub::Hub;
use rest::identity::{IdentityProvider, MemoryIdentity};
use rest::kv::{KvStore, MemoryKv};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub kv: Arc<dyn KvStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// In-memory everything: the gateway hub plus the demo KV store and
    /// identity provider behind their trait seams.
    pub fn new() -> Self {
        Self {
            hub: Arc::new(Hub::new()),
            kv: Arc::new(MemoryKv::new()),
            identity: Arc::new(MemoryIdentity::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// The whole app on one router: realtime gateway, REST API, static file
/// fallback.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(gateway::router())
        .merge(rest::router())
        .fallback(statics::file)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
