//! Subscriber records.
//!
//! A subscriber is keyed by phone number and is never physically deleted:
//! `remove` flips `active` to `false` and keeps the row for analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::phone::PhoneNumber;

/// A stored subscriber record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
  pub phone_number:       PhoneNumber,
  pub active:             bool,
  /// Opaque subscription identifier issued by the notification service
  /// when the number was subscribed to the broadcast topic.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subscription_arn:   Option<String>,
  /// Preferred message category; resolution falls back to `motivation`
  /// when absent or unrecognised.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub preferred_category: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at:         Option<DateTime<Utc>>,
}

impl Subscriber {
  /// A fresh active record, as written on `add`.
  pub fn new(phone_number: PhoneNumber, subscription_arn: String) -> Self {
    Self {
      phone_number,
      active: true,
      subscription_arn: Some(subscription_arn),
      preferred_category: None,
      created_at: Some(Utc::now()),
    }
  }
}

/// A partial update applied to a stored record.
///
/// Fields left as `None` keep their stored value. Updating a phone number
/// with no stored record creates one, matching single-key upsert semantics
/// of the backing table.
#[derive(Debug, Clone, Default)]
pub struct SubscriberUpdate {
  pub active:             Option<bool>,
  pub preferred_category: Option<String>,
}

impl SubscriberUpdate {
  pub fn is_empty(&self) -> bool {
    self.active.is_none() && self.preferred_category.is_none()
  }
}
