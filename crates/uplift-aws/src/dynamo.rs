//! DynamoDB implementations of the store traits.

use aws_config::SdkConfig;
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use uplift_core::{
  PhoneNumber, Subscriber,
  analytics::AnalyticsRecord,
  store::{AnalyticsStore, SubscriberStore},
  subscriber::SubscriberUpdate,
};

use crate::{
  Error, Result,
  encode::{
    PHONE_KEY, record_from_item, record_to_item, subscriber_from_item,
    subscriber_to_item,
  },
};

// ─── Subscribers ─────────────────────────────────────────────────────────────

/// Subscriber records in a DynamoDB table keyed by phone number.
/// Cloning is cheap; the inner client is reference-counted.
#[derive(Clone)]
pub struct DynamoSubscriberStore {
  client: Client,
  table:  String,
}

impl DynamoSubscriberStore {
  pub fn new(config: &SdkConfig, table: impl Into<String>) -> Self {
    Self {
      client: Client::new(config),
      table:  table.into(),
    }
  }
}

impl SubscriberStore for DynamoSubscriberStore {
  type Error = Error;

  async fn get(&self, phone: &PhoneNumber) -> Result<Option<Subscriber>> {
    let output = self
      .client
      .get_item()
      .table_name(&self.table)
      .key(PHONE_KEY, AttributeValue::S(phone.as_str().to_string()))
      .send()
      .await
      .map_err(Error::dynamo)?;

    output.item().map(subscriber_from_item).transpose()
  }

  async fn put(&self, subscriber: Subscriber) -> Result<()> {
    self
      .client
      .put_item()
      .table_name(&self.table)
      .set_item(Some(subscriber_to_item(&subscriber)))
      .send()
      .await
      .map_err(Error::dynamo)?;
    Ok(())
  }

  async fn update(
    &self,
    phone: &PhoneNumber,
    update: SubscriberUpdate,
  ) -> Result<()> {
    if update.is_empty() {
      return Ok(());
    }

    let mut clauses = Vec::new();
    let mut request = self
      .client
      .update_item()
      .table_name(&self.table)
      .key(PHONE_KEY, AttributeValue::S(phone.as_str().to_string()));

    if let Some(active) = update.active {
      clauses.push("active = :a");
      request =
        request.expression_attribute_values(":a", AttributeValue::Bool(active));
    }
    if let Some(category) = update.preferred_category {
      clauses.push("preferred_category = :c");
      request =
        request.expression_attribute_values(":c", AttributeValue::S(category));
    }

    request
      .update_expression(format!("SET {}", clauses.join(", ")))
      .send()
      .await
      .map_err(Error::dynamo)?;
    Ok(())
  }

  async fn scan(&self) -> Result<Vec<Subscriber>> {
    let mut items = self
      .client
      .scan()
      .table_name(&self.table)
      .into_paginator()
      .items()
      .send();

    let mut subscribers = Vec::new();
    while let Some(item) = items.next().await {
      let item = item.map_err(Error::dynamo)?;
      subscribers.push(subscriber_from_item(&item)?);
    }
    Ok(subscribers)
  }
}

// ─── Analytics ───────────────────────────────────────────────────────────────

/// Append-only send-event records in a DynamoDB table keyed by message id.
#[derive(Clone)]
pub struct DynamoAnalyticsStore {
  client: Client,
  table:  String,
}

impl DynamoAnalyticsStore {
  pub fn new(config: &SdkConfig, table: impl Into<String>) -> Self {
    Self {
      client: Client::new(config),
      table:  table.into(),
    }
  }
}

impl AnalyticsStore for DynamoAnalyticsStore {
  type Error = Error;

  async fn record(&self, record: AnalyticsRecord) -> Result<()> {
    self
      .client
      .put_item()
      .table_name(&self.table)
      .set_item(Some(record_to_item(&record)))
      .send()
      .await
      .map_err(Error::dynamo)?;
    Ok(())
  }

  async fn scan(&self) -> Result<Vec<AnalyticsRecord>> {
    let mut items = self
      .client
      .scan()
      .table_name(&self.table)
      .into_paginator()
      .items()
      .send();

    let mut records = Vec::new();
    while let Some(item) = items.next().await {
      let item = item.map_err(Error::dynamo)?;
      records.push(record_from_item(&item)?);
    }
    Ok(records)
  }
}
