//! AWS backends for the Uplift SMS broadcast service.
//!
//! [`SnsNotifier`] implements [`uplift_core::notify::Notifier`] over SNS;
//! [`DynamoSubscriberStore`] and [`DynamoAnalyticsStore`] implement the
//! store traits over DynamoDB tables.

mod dynamo;
mod encode;
mod sns;

pub mod error;

pub use dynamo::{DynamoAnalyticsStore, DynamoSubscriberStore};
pub use error::{Error, Result};
pub use sns::SnsNotifier;
