//! Static file serving: extension-based MIME lookup over the public
//! directory, with embedded 404/500 fallback pages.

use axum::{
    debug_handler,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};

#[macro_export]
macro_rules! include_res {
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

pub fn content_type_for(path: &str) -> &'static str {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        _ => "text/plain",
    }
}

/// Fallback handler: any path no route claimed is looked up on disk.
#[debug_handler]
pub async fn file(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        return Html(include_res!(str, "/pages/index.html")).into_response();
    }
    if path.split('/').any(|segment| segment == "..") {
        return not_found(uri.path());
    }

    let root = dotenv::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_owned());
    match tokio::fs::read(std::path::Path::new(&root).join(path)).await {
        Ok(contents) => (
            [(header::CONTENT_TYPE, content_type_for(path))],
            contents,
        )
            .into_response(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => not_found(uri.path()),
        Err(err) => {
            tracing::error!(%err, path, "failed to read static file");
            server_error()
        }
    }
}

fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(include_res!(str, "/pages/404.html").replace("{path}", path)),
    )
        .into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(include_res!(str, "/pages/500.html")),
    )
        .into_response()
}
