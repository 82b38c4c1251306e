//! Handlers for `/subscribers`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subscribers` | All records, `{"subscribers": [...], "count": N}` |
//! | `POST` | `/subscribers` | Body: `{"action": "add"\|"update"\|"remove", "phone", "category"?}` |
//!
//! POST mirrors the classic manage-subscriber contract: any failure,
//! validation or transport alike, comes back as `400 {"success": false,
//! "message": ...}`, success as `200 {"success": true, "message": ...}`.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uplift_core::{
  PhoneNumber, Subscriber, manage,
  notify::Notifier,
  store::{AnalyticsStore, SubscriberStore},
};

use crate::{AppState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub subscribers: Vec<Subscriber>,
  pub count:       usize,
}

/// `GET /subscribers`
pub async fn list<S, A, N>(
  State(state): State<AppState<S, A, N>>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: SubscriberStore + 'static,
  A: AnalyticsStore + 'static,
  N: Notifier + 'static,
{
  let subscribers = state
    .store
    .scan()
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  let count = subscribers.len();
  Ok(Json(ListResponse { subscribers, count }))
}

// ─── Manage ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ManageBody {
  pub action:   Option<String>,
  pub phone:    Option<String>,
  pub category: Option<String>,
}

/// Result body shared by the manage and send endpoints.
#[derive(Debug, Serialize)]
pub struct ActionResult {
  pub success: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message_id: Option<String>,
}

impl ActionResult {
  pub fn ok(message: impl Into<String>) -> Self {
    Self {
      success:    true,
      message:    message.into(),
      message_id: None,
    }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      success:    false,
      message:    message.into(),
      message_id: None,
    }
  }
}

/// `POST /subscribers`
pub async fn manage<S, A, N>(
  State(state): State<AppState<S, A, N>>,
  Json(body): Json<ManageBody>,
) -> (StatusCode, Json<ActionResult>)
where
  S: SubscriberStore + 'static,
  A: AnalyticsStore + 'static,
  N: Notifier + 'static,
{
  let (Some(action), Some(phone)) = (body.action, body.phone) else {
    return failure("Missing required parameters");
  };

  let phone = match PhoneNumber::new(phone) {
    Ok(phone) => phone,
    Err(e) => return failure(e.to_string()),
  };

  let result = match action.as_str() {
    "add" => manage::add(
      state.store.as_ref(),
      state.notifier.as_ref(),
      &state.topic,
      phone.clone(),
      body.category,
    )
    .await
    .map(|_| format!("Subscriber {phone} added successfully")),
    "update" => manage::update(state.store.as_ref(), &phone, body.category)
      .await
      .map(|()| format!("Subscriber {phone} updated successfully")),
    "remove" => {
      manage::remove(state.store.as_ref(), state.notifier.as_ref(), &phone)
        .await
        .map(|()| format!("Subscriber {phone} removed successfully"))
    }
    _ => return failure("Invalid action"),
  };

  match result {
    Ok(message) => (StatusCode::OK, Json(ActionResult::ok(message))),
    Err(e) => {
      tracing::warn!(error = %e, "subscriber management failed");
      failure(e.to_string())
    }
  }
}

fn failure(message: impl Into<String>) -> (StatusCode, Json<ActionResult>) {
  (StatusCode::BAD_REQUEST, Json(ActionResult::failure(message)))
}
