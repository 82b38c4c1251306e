//! Handler for `/send`: ad-hoc sends with caller-supplied text.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/send` | Body: `{"phone", "message", "category"?}`; bypasses the catalog |

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use uplift_core::{
  PhoneNumber,
  notify::Notifier,
  store::{AnalyticsStore, SubscriberStore},
};

use crate::{AppState, subscribers::ActionResult};

#[derive(Debug, Deserialize)]
pub struct SendBody {
  pub phone:    Option<String>,
  pub message:  Option<String>,
  pub category: Option<String>,
}

/// `POST /send`
pub async fn custom<S, A, N>(
  State(state): State<AppState<S, A, N>>,
  Json(body): Json<SendBody>,
) -> (StatusCode, Json<ActionResult>)
where
  S: SubscriberStore + 'static,
  A: AnalyticsStore + 'static,
  N: Notifier + 'static,
{
  let (Some(phone), Some(message)) = (body.phone, body.message) else {
    return failure("Missing required parameters");
  };

  let phone = match PhoneNumber::new(phone) {
    Ok(phone) => phone,
    Err(e) => return failure(e.to_string()),
  };

  match state
    .dispatcher()
    .send_custom(&phone, &message, body.category.as_deref())
    .await
  {
    Ok(message_id) => (
      StatusCode::OK,
      Json(ActionResult {
        message_id: Some(message_id),
        ..ActionResult::ok(format!("Message sent to {phone} successfully"))
      }),
    ),
    Err(e) => {
      tracing::warn!(error = %e, "custom send failed");
      failure(e.to_string())
    }
  }
}

fn failure(message: impl Into<String>) -> (StatusCode, Json<ActionResult>) {
  (StatusCode::BAD_REQUEST, Json(ActionResult::failure(message)))
}
