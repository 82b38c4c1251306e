//! The notification transport trait.
//!
//! Models the minimal pub/sub capability surface the service needs:
//! subscribe/unsubscribe a phone number on a broadcast topic, publish
//! directly to one endpoint, publish once to the whole topic. Implemented
//! by `uplift-aws` (SNS) and [`crate::memory`] (fake for tests/demo).

use std::future::Future;

use crate::phone::PhoneNumber;

pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Subscribe a phone number to the broadcast topic. Returns the opaque
  /// subscription identifier issued by the service.
  fn subscribe<'a>(
    &'a self,
    topic: &'a str,
    phone: &'a PhoneNumber,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Cancel a subscription by its identifier.
  fn unsubscribe<'a>(
    &'a self,
    subscription_arn: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Send one SMS directly to a phone number. Returns the message id.
  fn publish_to_endpoint<'a>(
    &'a self,
    phone: &'a PhoneNumber,
    message: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Publish one message to the broadcast topic. Returns the message id.
  fn publish_to_topic<'a>(
    &'a self,
    topic: &'a str,
    subject: &'a str,
    message: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
