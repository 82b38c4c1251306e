//! Handler for `/dispatch`, the scheduled-delivery entry point.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/dispatch` | Empty body: scheduled fan-out. `{"phone", "category"?}`: targeted send |
//!
//! External timers (cron, EventBridge-style schedulers) hit this with no
//! body. A body naming a phone number triggers the targeted variant, which
//! deliberately writes no analytics record.

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uplift_core::{
  PhoneNumber,
  dispatch::FanoutOutcome,
  notify::Notifier,
  store::{AnalyticsStore, SubscriberStore},
};

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct DispatchBody {
  pub phone:    Option<String>,
  pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DispatchResponse {
  Targeted { success: bool, message_id: String },
  Fanout(FanoutOutcome),
}

/// `POST /dispatch`
pub async fn trigger<S, A, N>(
  State(state): State<AppState<S, A, N>>,
  body: Option<Json<DispatchBody>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriberStore + 'static,
  A: AnalyticsStore + 'static,
  N: Notifier + 'static,
{
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let dispatcher = state.dispatcher();

  match body.phone {
    Some(phone) => {
      let phone = PhoneNumber::new(phone)?;
      let message_id = dispatcher
        .send_to(&phone, body.category.as_deref())
        .await?;
      Ok(Json(DispatchResponse::Targeted {
        success: true,
        message_id,
      }))
    }
    None => {
      let outcome = dispatcher.run_fanout().await?;
      Ok(Json(DispatchResponse::Fanout(outcome)))
    }
  }
}
