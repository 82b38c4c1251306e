//! Handler for `/analytics`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/analytics?days=N` | Full-history summary; `days` accepted but not yet a filter |

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use uplift_core::{
  analytics::AnalyticsSummary,
  notify::Notifier,
  store::{AnalyticsStore, SubscriberStore},
};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct Params {
  /// Accepted for forward compatibility; the summary always covers the
  /// full history.
  pub days: Option<u32>,
}

/// `GET /analytics[?days=N]`
pub async fn summary<S, A, N>(
  State(state): State<AppState<S, A, N>>,
  Query(params): Query<Params>,
) -> Result<Json<AnalyticsSummary>, ApiError>
where
  S: SubscriberStore + 'static,
  A: AnalyticsStore + 'static,
  N: Notifier + 'static,
{
  if let Some(days) = params.days {
    tracing::debug!(days, "analytics window parameter ignored");
  }

  let Some(analytics) = &state.analytics else {
    return Ok(Json(AnalyticsSummary::default()));
  };

  let records = analytics
    .scan()
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  Ok(Json(AnalyticsSummary::from_records(&records)))
}
