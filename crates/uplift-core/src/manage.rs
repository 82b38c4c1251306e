//! Subscriber management: the add/update/remove operations shared by the
//! HTTP API and the CLI.

use crate::{
  Error, Result,
  notify::Notifier,
  phone::PhoneNumber,
  store::SubscriberStore,
  subscriber::{Subscriber, SubscriberUpdate},
};

/// Subscribe a phone number to the broadcast topic and store its record.
pub async fn add<S, N>(
  store: &S,
  notifier: &N,
  topic: &str,
  phone: PhoneNumber,
  category: Option<String>,
) -> Result<Subscriber>
where
  S: SubscriberStore,
  N: Notifier,
{
  let subscription_arn = notifier
    .subscribe(topic, &phone)
    .await
    .map_err(Error::notify)?;

  let mut subscriber = Subscriber::new(phone, subscription_arn);
  subscriber.preferred_category = category;
  store
    .put(subscriber.clone())
    .await
    .map_err(Error::store)?;

  tracing::info!(phone = %subscriber.phone_number, "subscriber added");
  Ok(subscriber)
}

/// Re-activate a subscriber and overwrite their preferred category when
/// one is given.
pub async fn update<S>(
  store: &S,
  phone: &PhoneNumber,
  category: Option<String>,
) -> Result<()>
where
  S: SubscriberStore,
{
  store
    .update(phone, SubscriberUpdate {
      active:             Some(true),
      preferred_category: category,
    })
    .await
    .map_err(Error::store)?;

  tracing::info!(phone = %phone, "subscriber updated");
  Ok(())
}

/// Soft-delete a subscriber.
///
/// Unsubscribes from the topic when a subscription identifier is stored,
/// then marks the record inactive. A phone number with no record is
/// treated as success with no unsubscribe call, which makes the operation
/// idempotent.
pub async fn remove<S, N>(store: &S, notifier: &N, phone: &PhoneNumber) -> Result<()>
where
  S: SubscriberStore,
  N: Notifier,
{
  if let Some(subscriber) = store.get(phone).await.map_err(Error::store)?
    && let Some(arn) = &subscriber.subscription_arn
  {
    notifier.unsubscribe(arn).await.map_err(Error::notify)?;
  }

  store
    .update(phone, SubscriberUpdate {
      active:             Some(false),
      preferred_category: None,
    })
    .await
    .map_err(Error::store)?;

  tracing::info!(phone = %phone, "subscriber marked inactive");
  Ok(())
}
