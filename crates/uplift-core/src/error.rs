//! Error types for `uplift-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid phone number: {0:?} (must start with '+' and a country code)")]
  InvalidPhone(String),

  #[error("subscriber not found: {0}")]
  SubscriberNotFound(String),

  #[error("missing required parameter: {0}")]
  MissingParameter(&'static str),

  #[error("message catalog is empty")]
  EmptyCatalog,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("notification error: {0}")]
  Notify(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend store error.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Error::Store(Box::new(e))
  }

  /// Wrap a notification transport error.
  pub fn notify<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Error::Notify(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
