//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Every variant renders as a well-formed JSON body; nothing escapes as a
/// bare panic or an empty 500.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Internal(String),
}

impl From<uplift_core::Error> for ApiError {
  fn from(e: uplift_core::Error) -> Self {
    use uplift_core::Error;
    match e {
      Error::InvalidPhone(_) | Error::MissingParameter(_) => {
        ApiError::BadRequest(e.to_string())
      }
      Error::SubscriberNotFound(_) => ApiError::NotFound(e.to_string()),
      Error::EmptyCatalog | Error::Store(_) | Error::Notify(_) => {
        ApiError::Internal(e.to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::BadRequest(message) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": message })),
      )
        .into_response(),
      ApiError::NotFound(message) => {
        (StatusCode::NOT_FOUND, Json(json!({ "message": message })))
          .into_response()
      }
      ApiError::Internal(message) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": format!("Error: {message}") })),
      )
        .into_response(),
    }
  }
}
