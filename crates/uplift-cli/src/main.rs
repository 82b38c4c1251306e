//! `uplift`, the subscriber management CLI for Daily Uplift SMS.
//!
//! # Usage
//!
//! ```
//! uplift subscribe --topic-arn arn:aws:sns:...:daily-uplift --phone +12345678901
//! uplift unsubscribe --topic-arn arn:aws:sns:...:daily-uplift --phone +12345678901
//! uplift update --phone +12345678901 --category mindfulness
//! uplift demo
//! ```
//!
//! Exit code 0 on success, 1 on validation or operation failure. The phone
//! number is validated before any network call. Set `SUBSCRIBERS_TABLE` to
//! also keep the DynamoDB record in sync.

mod demo;

use anyhow::{Context as _, Result, bail};
use aws_config::BehaviorVersion;
use clap::{Parser, Subcommand, ValueEnum};
use uplift_aws::{DynamoSubscriberStore, SnsNotifier};
use uplift_core::{
  PhoneNumber, Subscriber,
  notify::Notifier as _,
  store::SubscriberStore as _,
  subscriber::SubscriberUpdate,
};

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "uplift", about = "Manage Daily Uplift SMS subscribers")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Subscribe a phone number to the broadcast topic.
  Subscribe {
    /// SNS topic ARN.
    #[arg(long)]
    topic_arn: String,

    /// Phone number with country code (e.g. +12345678901).
    #[arg(long)]
    phone: String,

    /// Preferred message category.
    #[arg(long, value_enum)]
    category: Option<Category>,
  },

  /// Unsubscribe a phone number from the broadcast topic.
  Unsubscribe {
    /// SNS topic ARN.
    #[arg(long)]
    topic_arn: String,

    /// Phone number with country code.
    #[arg(long)]
    phone: String,
  },

  /// Update a subscriber's preferred category.
  Update {
    /// Phone number with country code.
    #[arg(long)]
    phone: String,

    /// New preferred message category.
    #[arg(long, value_enum)]
    category: Category,
  },

  /// Interactive demo REPL over in-memory adapters; nothing is sent.
  Demo,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "snake_case")]
enum Category {
  Motivation,
  MentalHealth,
  Mindfulness,
}

impl Category {
  fn as_str(self) -> &'static str {
    match self {
      Category::Motivation => "motivation",
      Category::MentalHealth => "mental_health",
      Category::Mindfulness => "mindfulness",
    }
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Command::Subscribe {
      topic_arn,
      phone,
      category,
    } => subscribe(&topic_arn, &phone, category).await,
    Command::Unsubscribe { topic_arn, phone } => {
      unsubscribe(&topic_arn, &phone).await
    }
    Command::Update { phone, category } => update(&phone, category).await,
    Command::Demo => demo::run().await,
  }
}

// ─── Commands ────────────────────────────────────────────────────────────────

async fn subscribe(
  topic_arn: &str,
  phone: &str,
  category: Option<Category>,
) -> Result<()> {
  let phone = PhoneNumber::new(phone)?;

  let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
  let notifier = SnsNotifier::new(&aws);

  let subscription_arn = notifier
    .subscribe(topic_arn, &phone)
    .await
    .with_context(|| format!("error subscribing {phone}"))?;

  println!("Successfully subscribed {phone} to Daily Uplift SMS!");
  println!("Subscription ARN: {subscription_arn}");

  if let Some(table) = subscribers_table() {
    let store = DynamoSubscriberStore::new(&aws, table);
    let mut subscriber = Subscriber::new(phone, subscription_arn);
    subscriber.preferred_category = category.map(|c| c.as_str().to_string());
    store
      .put(subscriber)
      .await
      .context("error saving subscriber preferences")?;
    println!("Subscriber preferences saved to database");
  }

  Ok(())
}

async fn unsubscribe(topic_arn: &str, phone: &str) -> Result<()> {
  let phone = PhoneNumber::new(phone)?;

  let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
  let notifier = SnsNotifier::new(&aws);

  let Some(subscription_arn) =
    notifier.find_subscription(topic_arn, &phone).await?
  else {
    bail!("no subscription found for {phone}");
  };

  notifier
    .unsubscribe(&subscription_arn)
    .await
    .with_context(|| format!("error unsubscribing {phone}"))?;
  println!("Successfully unsubscribed {phone} from Daily Uplift SMS!");

  if let Some(table) = subscribers_table() {
    let store = DynamoSubscriberStore::new(&aws, table);
    store
      .update(&phone, SubscriberUpdate {
        active:             Some(false),
        preferred_category: None,
      })
      .await
      .context("error updating subscriber record")?;
    println!("Subscriber marked as inactive in database");
  }

  Ok(())
}

async fn update(phone: &str, category: Category) -> Result<()> {
  let phone = PhoneNumber::new(phone)?;

  let Some(table) = subscribers_table() else {
    bail!("SUBSCRIBERS_TABLE is not configured");
  };

  let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
  let store = DynamoSubscriberStore::new(&aws, table);
  store
    .update(&phone, SubscriberUpdate {
      active:             None,
      preferred_category: Some(category.as_str().to_string()),
    })
    .await
    .context("error updating preferences")?;

  println!("Updated preferences for {phone}: category={}", category.as_str());
  Ok(())
}

fn subscribers_table() -> Option<String> {
  std::env::var("SUBSCRIBERS_TABLE").ok().filter(|t| !t.is_empty())
}
