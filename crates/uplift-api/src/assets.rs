//! Static asset handler for the dashboard files.
//!
//! `/` maps to `index.html`; the content type comes from a fixed extension
//! table with a `text/plain` default; a missing file is a plain-text 404.
//! Paths escaping the asset directory are rejected.

use std::path::{Component, Path, PathBuf};

use axum::{
  extract::State,
  http::{Method, StatusCode, Uri, header},
  response::{IntoResponse, Response},
};
use uplift_core::{
  notify::Notifier,
  store::{AnalyticsStore, SubscriberStore},
};

use crate::AppState;

/// Fallback route handler: everything not matched by the API routes is
/// treated as an asset request.
pub async fn handler<S, A, N>(
  State(state): State<AppState<S, A, N>>,
  method: Method,
  uri: Uri,
) -> Response
where
  S: SubscriberStore + 'static,
  A: AnalyticsStore + 'static,
  N: Notifier + 'static,
{
  serve(method, uri, state.assets_dir.clone()).await
}

/// Map a file extension to its content type; unknown extensions default
/// to `text/plain`.
fn content_type(path: &Path) -> &'static str {
  match path.extension().and_then(|e| e.to_str()) {
    Some("html") => "text/html",
    Some("css") => "text/css",
    Some("js") => "application/javascript",
    Some("json") => "application/json",
    Some("png") => "image/png",
    Some("jpg") => "image/jpeg",
    Some("svg") => "image/svg+xml",
    Some("ico") => "image/x-icon",
    _ => "text/plain",
  }
}

/// Resolve a request path to a file inside `assets_dir`, refusing any
/// component that would escape it.
fn resolve(assets_dir: &Path, request_path: &str) -> Option<PathBuf> {
  let trimmed = request_path.trim_start_matches('/');
  let relative = if trimmed.is_empty() {
    Path::new("index.html")
  } else {
    Path::new(trimmed)
  };

  if !relative
    .components()
    .all(|c| matches!(c, Component::Normal(_)))
  {
    return None;
  }
  Some(assets_dir.join(relative))
}

pub async fn serve(method: Method, uri: Uri, assets_dir: PathBuf) -> Response {
  if method != Method::GET {
    return not_found();
  }

  let Some(path) = resolve(&assets_dir, uri.path()) else {
    return not_found();
  };

  match tokio::fs::read(&path).await {
    Ok(bytes) => (
      StatusCode::OK,
      [(header::CONTENT_TYPE, content_type(&path))],
      bytes,
    )
      .into_response(),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => not_found(),
    Err(e) => {
      tracing::error!(path = %path.display(), error = %e, "failed to read asset");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain")],
        format!("Error: {e}"),
      )
        .into_response()
    }
  }
}

fn not_found() -> Response {
  (
    StatusCode::NOT_FOUND,
    [(header::CONTENT_TYPE, "text/plain")],
    "File not found",
  )
    .into_response()
}
