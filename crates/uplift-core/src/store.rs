//! Storage traits for subscriber records and analytics events.
//!
//! The traits are implemented by storage backends (`uplift-aws` for
//! DynamoDB, [`crate::memory`] for tests and the demo REPL). Higher layers
//! depend on these abstractions, not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (tokio with `axum`).

use std::future::Future;

use crate::{
  analytics::AnalyticsRecord,
  phone::PhoneNumber,
  subscriber::{Subscriber, SubscriberUpdate},
};

/// Abstraction over the subscriber key-value table.
///
/// Records are keyed by phone number. `update` has single-key upsert
/// semantics: updating an unknown phone number creates the record.
pub trait SubscriberStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Exact-key lookup. Returns `None` if no record exists.
  fn get<'a>(
    &'a self,
    phone: &'a PhoneNumber,
  ) -> impl Future<Output = Result<Option<Subscriber>, Self::Error>> + Send + 'a;

  /// Write a full record, replacing any existing one with the same key.
  fn put(
    &self,
    subscriber: Subscriber,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply a partial update to the record with the given key.
  fn update<'a>(
    &'a self,
    phone: &'a PhoneNumber,
    update: SubscriberUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Return every record. Iteration order is whatever the backend yields
  /// (unordered scan semantics); callers must not assume any order.
  fn scan(
    &self,
  ) -> impl Future<Output = Result<Vec<Subscriber>, Self::Error>> + Send + '_;
}

/// Abstraction over the append-only analytics table.
pub trait AnalyticsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append one record.
  fn record(
    &self,
    record: AnalyticsRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Return every record, unordered.
  fn scan(
    &self,
  ) -> impl Future<Output = Result<Vec<AnalyticsRecord>, Self::Error>> + Send + '_;
}
