//! Delivery dispatch: targeted sends, scheduled fan-out, and the
//! broadcast-topic fallback.
//!
//! The dispatcher owns the adapter handles and the catalog; every HTTP
//! call or timer tick constructs its work from these injected pieces, so
//! there is no hidden process-wide state.

use std::sync::Arc;

use serde::Serialize;

use crate::{
  Error, Result,
  analytics::AnalyticsRecord,
  catalog::Catalog,
  notify::Notifier,
  phone::PhoneNumber,
  store::{AnalyticsStore, SubscriberStore},
  subscriber::Subscriber,
};

/// Subject line attached to broadcast-topic publishes.
pub const BROADCAST_SUBJECT: &str = "Daily Uplift";

/// Summary of one fan-out invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FanoutOutcome {
  /// Per-subscriber sends that succeeded.
  pub sent:      usize,
  /// Per-subscriber sends that failed and were skipped.
  pub failed:    usize,
  /// True when the subscriber list was empty and a single broadcast-topic
  /// publish was made instead.
  pub broadcast: bool,
}

/// Fans messages out to subscribers and records analytics.
pub struct Dispatcher<S, A, N> {
  store:     Arc<S>,
  analytics: Option<Arc<A>>,
  notifier:  Arc<N>,
  catalog:   Arc<Catalog>,
  topic:     String,
}

impl<S, A, N> Clone for Dispatcher<S, A, N> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      analytics: self.analytics.clone(),
      notifier:  Arc::clone(&self.notifier),
      catalog:   Arc::clone(&self.catalog),
      topic:     self.topic.clone(),
    }
  }
}

impl<S, A, N> Dispatcher<S, A, N>
where
  S: SubscriberStore,
  A: AnalyticsStore,
  N: Notifier,
{
  pub fn new(
    store: Arc<S>,
    analytics: Option<Arc<A>>,
    notifier: Arc<N>,
    catalog: Arc<Catalog>,
    topic: impl Into<String>,
  ) -> Self {
    Self {
      store,
      analytics,
      notifier,
      catalog,
      topic: topic.into(),
    }
  }

  /// Send one catalog message to a single known subscriber.
  ///
  /// The request-supplied category, when given, takes precedence over the
  /// stored preference. Returns the message id. Targeted sends write no
  /// analytics record.
  pub async fn send_to(
    &self,
    phone: &PhoneNumber,
    requested_category: Option<&str>,
  ) -> Result<String> {
    let subscriber = self
      .store
      .get(phone)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::SubscriberNotFound(phone.to_string()))?;

    let resolution = {
      let mut rng = rand::thread_rng();
      self.catalog.resolve(
        requested_category,
        subscriber.preferred_category.as_deref(),
        &mut rng,
      )?
    };

    let message_id = self
      .notifier
      .publish_to_endpoint(phone, &resolution.message)
      .await
      .map_err(Error::notify)?;

    tracing::info!(
      phone = %phone,
      category = %resolution.category,
      message_id = %message_id,
      "sent targeted message"
    );
    Ok(message_id)
  }

  /// Send the caller's literal message text to a phone number, bypassing
  /// the catalog. Records one analytics entry flagged as custom.
  pub async fn send_custom(
    &self,
    phone: &PhoneNumber,
    message: &str,
    category: Option<&str>,
  ) -> Result<String> {
    let message_id = self
      .notifier
      .publish_to_endpoint(phone, message)
      .await
      .map_err(Error::notify)?;

    tracing::info!(phone = %phone, message_id = %message_id, "sent custom message");
    self
      .record(AnalyticsRecord::for_custom_send(
        message_id.clone(),
        category.unwrap_or("custom"),
      ))
      .await;
    Ok(message_id)
  }

  /// One scheduled delivery pass.
  ///
  /// Sends one message per stored record (the `active` flag is not
  /// filtered on), resolving each subscriber's category from their stored
  /// preference. A failed send is logged and skipped; it never aborts the
  /// rest of the batch. With no stored records at all, a single message is
  /// published to the broadcast topic instead.
  pub async fn run_fanout(&self) -> Result<FanoutOutcome> {
    let subscribers = self.store.scan().await.map_err(Error::store)?;
    if subscribers.is_empty() {
      return self.broadcast().await;
    }

    let mut outcome = FanoutOutcome::default();
    for subscriber in &subscribers {
      match self.send_one(subscriber).await {
        Ok(()) => outcome.sent += 1,
        Err(e) => {
          outcome.failed += 1;
          tracing::warn!(
            phone = %subscriber.phone_number,
            error = %e,
            "send failed, continuing fan-out"
          );
        }
      }
    }

    tracing::info!(sent = outcome.sent, failed = outcome.failed, "fan-out complete");
    Ok(outcome)
  }

  async fn send_one(&self, subscriber: &Subscriber) -> Result<()> {
    let resolution = {
      let mut rng = rand::thread_rng();
      self
        .catalog
        .resolve(None, subscriber.preferred_category.as_deref(), &mut rng)?
    };

    let message_id = self
      .notifier
      .publish_to_endpoint(&subscriber.phone_number, &resolution.message)
      .await
      .map_err(Error::notify)?;

    self
      .record(AnalyticsRecord::for_send(message_id, resolution.category, 1))
      .await;
    Ok(())
  }

  async fn broadcast(&self) -> Result<FanoutOutcome> {
    let resolution = {
      let mut rng = rand::thread_rng();
      self.catalog.random(&mut rng)?
    };

    let message_id = self
      .notifier
      .publish_to_topic(&self.topic, BROADCAST_SUBJECT, &resolution.message)
      .await
      .map_err(Error::notify)?;

    tracing::info!(
      category = %resolution.category,
      message_id = %message_id,
      "no subscribers stored, published to broadcast topic"
    );
    self
      .record(AnalyticsRecord::for_send(message_id, resolution.category, 0))
      .await;

    Ok(FanoutOutcome {
      broadcast: true,
      ..FanoutOutcome::default()
    })
  }

  /// Append an analytics record if a store is configured. A write failure
  /// is logged and swallowed; the send it describes already happened.
  async fn record(&self, record: AnalyticsRecord) {
    let Some(analytics) = &self.analytics else {
      return;
    };
    if let Err(e) = analytics.record(record).await {
      tracing::warn!(error = %e, "failed to append analytics record");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    memory::{Delivery, MemoryAnalytics, MemoryNotifier, MemoryStore},
    store::SubscriberStore as _,
    subscriber::Subscriber,
  };

  fn phone(raw: &str) -> PhoneNumber {
    PhoneNumber::new(raw).unwrap()
  }

  fn subscriber(raw: &str, category: Option<&str>) -> Subscriber {
    Subscriber {
      phone_number:       phone(raw),
      active:             true,
      subscription_arn:   Some(format!("arn:{raw}")),
      preferred_category: category.map(str::to_string),
      created_at:         None,
    }
  }

  fn dispatcher(
    store: &MemoryStore,
    analytics: &MemoryAnalytics,
    notifier: &MemoryNotifier,
  ) -> Dispatcher<MemoryStore, MemoryAnalytics, MemoryNotifier> {
    Dispatcher::new(
      Arc::new(store.clone()),
      Some(Arc::new(analytics.clone())),
      Arc::new(notifier.clone()),
      Arc::new(Catalog::builtin()),
      "arn:aws:sns:test:topic",
    )
  }

  #[tokio::test]
  async fn fanout_sends_once_per_subscriber_and_records_each() {
    let store = MemoryStore::new();
    let analytics = MemoryAnalytics::new();
    let notifier = MemoryNotifier::new();
    for (raw, cat) in [
      ("+15551230001", Some("mental_health")),
      ("+15551230002", None),
      ("+15551230003", Some("mindfulness")),
    ] {
      store.put(subscriber(raw, cat)).await.unwrap();
    }

    let outcome = dispatcher(&store, &analytics, &notifier)
      .run_fanout()
      .await
      .unwrap();

    assert_eq!(outcome, FanoutOutcome { sent: 3, failed: 0, broadcast: false });
    assert_eq!(notifier.sent().len(), 3);

    let records = analytics.records();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.subscriber_count == 1 && !r.custom));
  }

  #[tokio::test]
  async fn fanout_ignores_the_active_flag() {
    let store = MemoryStore::new();
    let analytics = MemoryAnalytics::new();
    let notifier = MemoryNotifier::new();
    let mut inactive = subscriber("+15551230001", None);
    inactive.active = false;
    store.put(inactive).await.unwrap();

    let outcome = dispatcher(&store, &analytics, &notifier)
      .run_fanout()
      .await
      .unwrap();

    assert_eq!(outcome.sent, 1);
    assert_eq!(notifier.sent().len(), 1);
  }

  #[tokio::test]
  async fn fanout_resolves_each_subscribers_preference() {
    let store = MemoryStore::new();
    let analytics = MemoryAnalytics::new();
    let notifier = MemoryNotifier::new();
    store
      .put(subscriber("+15551230000", Some("mental_health")))
      .await
      .unwrap();

    dispatcher(&store, &analytics, &notifier)
      .run_fanout()
      .await
      .unwrap();

    let catalog = Catalog::builtin();
    let sent = notifier.sent();
    assert!(catalog.messages("mental_health").unwrap().contains(&sent[0].body));
    assert_eq!(analytics.records()[0].category, "mental_health");
  }

  #[tokio::test]
  async fn one_failed_send_does_not_abort_the_batch() {
    let store = MemoryStore::new();
    let analytics = MemoryAnalytics::new();
    let notifier = MemoryNotifier::new();
    for raw in ["+15551230001", "+15551230002", "+15551230003"] {
      store.put(subscriber(raw, None)).await.unwrap();
    }
    notifier.refuse_endpoint(&phone("+15551230002"));

    let outcome = dispatcher(&store, &analytics, &notifier)
      .run_fanout()
      .await
      .unwrap();

    assert_eq!(outcome.sent, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(analytics.records().len(), 2);
  }

  #[tokio::test]
  async fn empty_store_broadcasts_once_with_zero_count() {
    let store = MemoryStore::new();
    let analytics = MemoryAnalytics::new();
    let notifier = MemoryNotifier::new();

    let outcome = dispatcher(&store, &analytics, &notifier)
      .run_fanout()
      .await
      .unwrap();

    assert_eq!(outcome, FanoutOutcome { sent: 0, failed: 0, broadcast: true });

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
      sent[0].delivery,
      Delivery::Topic("arn:aws:sns:test:topic".to_string())
    );
    assert_eq!(sent[0].subject.as_deref(), Some(BROADCAST_SUBJECT));

    let records = analytics.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].subscriber_count, 0);
    // The recorded category matches the message actually sent.
    let catalog = Catalog::builtin();
    assert!(
      catalog
        .messages(&records[0].category)
        .unwrap()
        .contains(&sent[0].body)
    );
  }

  #[tokio::test]
  async fn targeted_send_uses_stored_preference_and_skips_analytics() {
    let store = MemoryStore::new();
    let analytics = MemoryAnalytics::new();
    let notifier = MemoryNotifier::new();
    store
      .put(subscriber("+15551230000", Some("mental_health")))
      .await
      .unwrap();

    let d = dispatcher(&store, &analytics, &notifier);
    d.send_to(&phone("+15551230000"), None).await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    let catalog = Catalog::builtin();
    assert!(catalog.messages("mental_health").unwrap().contains(&sent[0].body));
    assert!(analytics.records().is_empty());
  }

  #[tokio::test]
  async fn targeted_send_honours_request_category_override() {
    let store = MemoryStore::new();
    let analytics = MemoryAnalytics::new();
    let notifier = MemoryNotifier::new();
    store
      .put(subscriber("+15551230000", Some("mental_health")))
      .await
      .unwrap();

    let d = dispatcher(&store, &analytics, &notifier);
    d.send_to(&phone("+15551230000"), Some("mindfulness"))
      .await
      .unwrap();

    let catalog = Catalog::builtin();
    assert!(
      catalog
        .messages("mindfulness")
        .unwrap()
        .contains(&notifier.sent()[0].body)
    );
  }

  #[tokio::test]
  async fn targeted_send_to_unknown_phone_is_not_found() {
    let store = MemoryStore::new();
    let analytics = MemoryAnalytics::new();
    let notifier = MemoryNotifier::new();

    let d = dispatcher(&store, &analytics, &notifier);
    let err = d.send_to(&phone("+15550000000"), None).await.unwrap_err();
    assert!(matches!(err, Error::SubscriberNotFound(_)));
    assert!(notifier.sent().is_empty());
  }

  #[tokio::test]
  async fn custom_send_records_custom_analytics() {
    let store = MemoryStore::new();
    let analytics = MemoryAnalytics::new();
    let notifier = MemoryNotifier::new();

    let d = dispatcher(&store, &analytics, &notifier);
    d.send_custom(&phone("+15551230000"), "hello there", None)
      .await
      .unwrap();

    assert_eq!(notifier.sent()[0].body, "hello there");
    let records = analytics.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].custom);
    assert_eq!(records[0].category, "custom");
    assert_eq!(records[0].subscriber_count, 1);
  }

  #[tokio::test]
  async fn analytics_are_skipped_when_unconfigured() {
    let store = MemoryStore::new();
    let notifier = MemoryNotifier::new();
    store.put(subscriber("+15551230000", None)).await.unwrap();

    let d: Dispatcher<_, MemoryAnalytics, _> = Dispatcher::new(
      Arc::new(store),
      None,
      Arc::new(notifier.clone()),
      Arc::new(Catalog::builtin()),
      "arn:aws:sns:test:topic",
    );

    let outcome = d.run_fanout().await.unwrap();
    assert_eq!(outcome.sent, 1);
    assert_eq!(notifier.sent().len(), 1);
  }
}
