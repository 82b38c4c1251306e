//! [`SnsNotifier`], the SNS implementation of [`Notifier`].

use aws_config::SdkConfig;
use aws_sdk_sns::{Client, types::MessageAttributeValue};
use uplift_core::{PhoneNumber, notify::Notifier};

use crate::{Error, Result};

/// Cloning is cheap; the inner client is reference-counted.
#[derive(Clone)]
pub struct SnsNotifier {
  client: Client,
}

impl SnsNotifier {
  pub fn new(config: &SdkConfig) -> Self {
    Self {
      client: Client::new(config),
    }
  }

  /// SMS messages are sent as transactional so carriers prioritise them.
  fn sms_attributes() -> Result<MessageAttributeValue> {
    MessageAttributeValue::builder()
      .data_type("String")
      .string_value("Transactional")
      .build()
      .map_err(Error::sns)
  }

  /// Find the subscription identifier for a phone number by walking the
  /// topic's subscription list. Returns `None` when the number is not
  /// subscribed.
  pub async fn find_subscription(
    &self,
    topic: &str,
    phone: &PhoneNumber,
  ) -> Result<Option<String>> {
    let mut pages = self
      .client
      .list_subscriptions_by_topic()
      .topic_arn(topic)
      .into_paginator()
      .send();

    while let Some(page) = pages.next().await {
      let page = page.map_err(Error::sns)?;
      for subscription in page.subscriptions() {
        if subscription.endpoint() == Some(phone.as_str()) {
          return Ok(subscription.subscription_arn().map(str::to_string));
        }
      }
    }
    Ok(None)
  }
}

impl Notifier for SnsNotifier {
  type Error = Error;

  async fn subscribe(&self, topic: &str, phone: &PhoneNumber) -> Result<String> {
    let output = self
      .client
      .subscribe()
      .topic_arn(topic)
      .protocol("sms")
      .endpoint(phone.as_str())
      .send()
      .await
      .map_err(Error::sns)?;

    output
      .subscription_arn()
      .map(str::to_string)
      .ok_or(Error::MissingField("subscription arn"))
  }

  async fn unsubscribe(&self, subscription_arn: &str) -> Result<()> {
    self
      .client
      .unsubscribe()
      .subscription_arn(subscription_arn)
      .send()
      .await
      .map_err(Error::sns)?;
    Ok(())
  }

  async fn publish_to_endpoint(
    &self,
    phone: &PhoneNumber,
    message: &str,
  ) -> Result<String> {
    let output = self
      .client
      .publish()
      .phone_number(phone.as_str())
      .message(message)
      .message_attributes("SMSType", Self::sms_attributes()?)
      .send()
      .await
      .map_err(Error::sns)?;

    output
      .message_id()
      .map(str::to_string)
      .ok_or(Error::MissingField("message id"))
  }

  async fn publish_to_topic(
    &self,
    topic: &str,
    subject: &str,
    message: &str,
  ) -> Result<String> {
    let output = self
      .client
      .publish()
      .topic_arn(topic)
      .subject(subject)
      .message(message)
      .message_attributes("SMSType", Self::sms_attributes()?)
      .send()
      .await
      .map_err(Error::sns)?;

    output
      .message_id()
      .map(str::to_string)
      .ok_or(Error::MissingField("message id"))
  }
}
