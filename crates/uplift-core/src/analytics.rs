//! Send-event analytics.
//!
//! One record is appended per send event; records are never mutated or
//! deleted. The summary is a read model computed on demand from a full
//! scan of the records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single send event.
///
/// `category` is always either a catalog key or the literal fallback
/// category used when resolution failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
  /// Message identifier issued by the notification service.
  pub message_id:       String,
  pub timestamp:        DateTime<Utc>,
  pub category:         String,
  /// 1 for a per-subscriber send; 0 when the recipient count is unknown
  /// because delivery went through the broadcast topic.
  pub subscriber_count: u32,
  /// True only for ad-hoc sends whose text bypassed the catalog.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub custom:           bool,
}

impl AnalyticsRecord {
  /// A record for a catalog-driven send, stamped with the current time.
  pub fn for_send(
    message_id: impl Into<String>,
    category: impl Into<String>,
    subscriber_count: u32,
  ) -> Self {
    Self {
      message_id: message_id.into(),
      timestamp: Utc::now(),
      category: category.into(),
      subscriber_count,
      custom: false,
    }
  }

  /// A record for an ad-hoc send with caller-supplied text.
  pub fn for_custom_send(
    message_id: impl Into<String>,
    category: impl Into<String>,
  ) -> Self {
    Self {
      custom: true,
      ..Self::for_send(message_id, category, 1)
    }
  }
}

/// Aggregated view over all analytics records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsSummary {
  pub category_counts: BTreeMap<String, u64>,
  /// Send counts keyed by the date part (`YYYY-MM-DD`) of the timestamp.
  pub daily_counts:    BTreeMap<String, u64>,
  pub total_messages:  u64,
}

impl AnalyticsSummary {
  pub fn from_records(records: &[AnalyticsRecord]) -> Self {
    let mut summary = Self {
      total_messages: records.len() as u64,
      ..Self::default()
    };
    for record in records {
      *summary
        .category_counts
        .entry(record.category.clone())
        .or_default() += 1;
      let date = record.timestamp.date_naive().to_string();
      *summary.daily_counts.entry(date).or_default() += 1;
    }
    summary
  }
}
