//! In-memory adapter implementations.
//!
//! Back the CLI demo REPL and the test suites; no external service is
//! touched. The fake notifier keeps every published message so tests can
//! assert on what was actually sent, and can be told to refuse delivery to
//! specific endpoints to exercise the fail-open fan-out path.

use std::{
  collections::{HashMap, HashSet},
  convert::Infallible,
  sync::{Arc, RwLock},
};

use thiserror::Error;
use uuid::Uuid;

use crate::{
  analytics::AnalyticsRecord,
  notify::Notifier,
  phone::PhoneNumber,
  store::{AnalyticsStore, SubscriberStore},
  subscriber::{Subscriber, SubscriberUpdate},
};

// ─── Subscriber store ────────────────────────────────────────────────────────

/// A `HashMap`-backed [`SubscriberStore`]. Cheap to clone.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<RwLock<HashMap<String, Subscriber>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.inner.read().expect("store lock").len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl SubscriberStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, phone: &PhoneNumber) -> Result<Option<Subscriber>, Infallible> {
    Ok(
      self
        .inner
        .read()
        .expect("store lock")
        .get(phone.as_str())
        .cloned(),
    )
  }

  async fn put(&self, subscriber: Subscriber) -> Result<(), Infallible> {
    self
      .inner
      .write()
      .expect("store lock")
      .insert(subscriber.phone_number.as_str().to_string(), subscriber);
    Ok(())
  }

  async fn update(
    &self,
    phone: &PhoneNumber,
    update: SubscriberUpdate,
  ) -> Result<(), Infallible> {
    let mut inner = self.inner.write().expect("store lock");
    let record = inner
      .entry(phone.as_str().to_string())
      .or_insert_with(|| Subscriber {
        phone_number:       phone.clone(),
        active:             false,
        subscription_arn:   None,
        preferred_category: None,
        created_at:         None,
      });
    if let Some(active) = update.active {
      record.active = active;
    }
    if let Some(category) = update.preferred_category {
      record.preferred_category = Some(category);
    }
    Ok(())
  }

  async fn scan(&self) -> Result<Vec<Subscriber>, Infallible> {
    Ok(
      self
        .inner
        .read()
        .expect("store lock")
        .values()
        .cloned()
        .collect(),
    )
  }
}

// ─── Analytics store ─────────────────────────────────────────────────────────

/// A `Vec`-backed append-only [`AnalyticsStore`]. Cheap to clone.
#[derive(Clone, Default)]
pub struct MemoryAnalytics {
  inner: Arc<RwLock<Vec<AnalyticsRecord>>>,
}

impl MemoryAnalytics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn records(&self) -> Vec<AnalyticsRecord> {
    self.inner.read().expect("analytics lock").clone()
  }
}

impl AnalyticsStore for MemoryAnalytics {
  type Error = Infallible;

  async fn record(&self, record: AnalyticsRecord) -> Result<(), Infallible> {
    self.inner.write().expect("analytics lock").push(record);
    Ok(())
  }

  async fn scan(&self) -> Result<Vec<AnalyticsRecord>, Infallible> {
    Ok(self.records())
  }
}

// ─── Notifier ────────────────────────────────────────────────────────────────

/// Where a fake-published message was addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
  /// Direct publish to one phone number.
  Endpoint(String),
  /// Publish to a broadcast topic.
  Topic(String),
}

/// A message captured by [`MemoryNotifier`].
#[derive(Debug, Clone)]
pub struct SentMessage {
  pub delivery: Delivery,
  pub subject:  Option<String>,
  pub body:     String,
}

/// Error injected via [`MemoryNotifier::refuse_endpoint`].
#[derive(Debug, Error)]
#[error("delivery refused for {0}")]
pub struct DeliveryRefused(pub String);

#[derive(Default)]
struct NotifierState {
  sent:          Vec<SentMessage>,
  subscriptions: HashMap<String, (String, String)>,
  refused:       HashSet<String>,
}

/// A fake [`Notifier`] that records publishes instead of sending them.
/// Cheap to clone.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
  inner: Arc<RwLock<NotifierState>>,
}

impl MemoryNotifier {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every message published so far, in publish order.
  pub fn sent(&self) -> Vec<SentMessage> {
    self.inner.read().expect("notifier lock").sent.clone()
  }

  pub fn subscription_count(&self) -> usize {
    self
      .inner
      .read()
      .expect("notifier lock")
      .subscriptions
      .len()
  }

  /// Make every future direct publish to `phone` fail.
  pub fn refuse_endpoint(&self, phone: &PhoneNumber) {
    self
      .inner
      .write()
      .expect("notifier lock")
      .refused
      .insert(phone.as_str().to_string());
  }
}

impl Notifier for MemoryNotifier {
  type Error = DeliveryRefused;

  async fn subscribe(
    &self,
    topic: &str,
    phone: &PhoneNumber,
  ) -> Result<String, DeliveryRefused> {
    let arn = format!("{topic}:{}", Uuid::new_v4());
    self
      .inner
      .write()
      .expect("notifier lock")
      .subscriptions
      .insert(arn.clone(), (topic.to_string(), phone.as_str().to_string()));
    Ok(arn)
  }

  async fn unsubscribe(
    &self,
    subscription_arn: &str,
  ) -> Result<(), DeliveryRefused> {
    self
      .inner
      .write()
      .expect("notifier lock")
      .subscriptions
      .remove(subscription_arn);
    Ok(())
  }

  async fn publish_to_endpoint(
    &self,
    phone: &PhoneNumber,
    message: &str,
  ) -> Result<String, DeliveryRefused> {
    let mut inner = self.inner.write().expect("notifier lock");
    if inner.refused.contains(phone.as_str()) {
      return Err(DeliveryRefused(phone.as_str().to_string()));
    }
    inner.sent.push(SentMessage {
      delivery: Delivery::Endpoint(phone.as_str().to_string()),
      subject:  None,
      body:     message.to_string(),
    });
    Ok(Uuid::new_v4().to_string())
  }

  async fn publish_to_topic(
    &self,
    topic: &str,
    subject: &str,
    message: &str,
  ) -> Result<String, DeliveryRefused> {
    self
      .inner
      .write()
      .expect("notifier lock")
      .sent
      .push(SentMessage {
        delivery: Delivery::Topic(topic.to_string()),
        subject:  Some(subject.to_string()),
        body:     message.to_string(),
      });
    Ok(Uuid::new_v4().to_string())
  }
}
