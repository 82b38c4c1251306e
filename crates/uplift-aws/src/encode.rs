//! Mapping between domain types and DynamoDB attribute maps.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use uplift_core::{
  PhoneNumber, Subscriber, analytics::AnalyticsRecord,
};

use crate::{Error, Result};

pub const PHONE_KEY: &str = "phone_number";

type Item = HashMap<String, AttributeValue>;

// ─── Attribute helpers ───────────────────────────────────────────────────────

fn require_s<'a>(item: &'a Item, name: &'static str) -> Result<&'a str> {
  item
    .get(name)
    .and_then(|v| v.as_s().ok())
    .map(String::as_str)
    .ok_or(Error::MissingField(name))
}

fn opt_s(item: &Item, name: &str) -> Option<String> {
  item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn opt_bool(item: &Item, name: &str) -> Option<bool> {
  item.get(name).and_then(|v| v.as_bool().ok()).copied()
}

fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

fn decode_dt(raw: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {raw:?}: {e}")))
}

// ─── Subscribers ─────────────────────────────────────────────────────────────

pub fn subscriber_to_item(subscriber: &Subscriber) -> Item {
  let mut item = Item::new();
  item.insert(
    PHONE_KEY.to_string(),
    AttributeValue::S(subscriber.phone_number.as_str().to_string()),
  );
  item.insert("active".to_string(), AttributeValue::Bool(subscriber.active));
  if let Some(arn) = &subscriber.subscription_arn {
    item.insert(
      "subscription_arn".to_string(),
      AttributeValue::S(arn.clone()),
    );
  }
  if let Some(category) = &subscriber.preferred_category {
    item.insert(
      "preferred_category".to_string(),
      AttributeValue::S(category.clone()),
    );
  }
  if let Some(created_at) = subscriber.created_at {
    item.insert(
      "created_at".to_string(),
      AttributeValue::S(encode_dt(created_at)),
    );
  }
  item
}

pub fn subscriber_from_item(item: &Item) -> Result<Subscriber> {
  let phone = PhoneNumber::new(require_s(item, PHONE_KEY)?)
    .map_err(|e| Error::Decode(e.to_string()))?;
  let created_at = opt_s(item, "created_at")
    .map(|raw| decode_dt(&raw))
    .transpose()?;

  Ok(Subscriber {
    phone_number:       phone,
    active:             opt_bool(item, "active").unwrap_or(false),
    subscription_arn:   opt_s(item, "subscription_arn"),
    preferred_category: opt_s(item, "preferred_category"),
    created_at,
  })
}

// ─── Analytics ───────────────────────────────────────────────────────────────

pub fn record_to_item(record: &AnalyticsRecord) -> Item {
  let mut item = Item::new();
  item.insert(
    "message_id".to_string(),
    AttributeValue::S(record.message_id.clone()),
  );
  item.insert(
    "timestamp".to_string(),
    AttributeValue::S(encode_dt(record.timestamp)),
  );
  item.insert(
    "category".to_string(),
    AttributeValue::S(record.category.clone()),
  );
  item.insert(
    "subscriber_count".to_string(),
    AttributeValue::N(record.subscriber_count.to_string()),
  );
  if record.custom {
    item.insert("custom".to_string(), AttributeValue::Bool(true));
  }
  item
}

pub fn record_from_item(item: &Item) -> Result<AnalyticsRecord> {
  let subscriber_count = item
    .get("subscriber_count")
    .and_then(|v| v.as_n().ok())
    .ok_or(Error::MissingField("subscriber_count"))?
    .parse::<u32>()
    .map_err(|e| Error::Decode(format!("subscriber_count: {e}")))?;

  Ok(AnalyticsRecord {
    message_id: require_s(item, "message_id")?.to_string(),
    timestamp: decode_dt(require_s(item, "timestamp")?)?,
    category: require_s(item, "category")?.to_string(),
    subscriber_count,
    custom: opt_bool(item, "custom").unwrap_or(false),
  })
}
