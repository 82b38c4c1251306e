//! Interactive demo REPL.
//!
//! Runs the full subscribe/dispatch flow against the in-memory adapters so
//! the service can be explored without an AWS account. Nothing leaves the
//! process.

use std::{
  io::{self, BufRead as _, Write as _},
  sync::Arc,
};

use anyhow::Result;
use uplift_core::{
  Catalog, PhoneNumber,
  dispatch::Dispatcher,
  ist, manage,
  memory::{Delivery, MemoryAnalytics, MemoryNotifier, MemoryStore},
  store::{AnalyticsStore as _, SubscriberStore as _},
};

const DEMO_TOPIC: &str = "demo:daily-uplift";

pub async fn run() -> Result<()> {
  let store = MemoryStore::new();
  let analytics = MemoryAnalytics::new();
  let notifier = MemoryNotifier::new();
  let dispatcher = Dispatcher::new(
    Arc::new(store.clone()),
    Some(Arc::new(analytics.clone())),
    Arc::new(notifier.clone()),
    Arc::new(Catalog::builtin()),
    DEMO_TOPIC,
  );

  println!("Daily Uplift SMS demo (in-memory)");
  print_help();

  let stdin = io::stdin();
  let mut line = String::new();
  loop {
    print!("> ");
    io::stdout().flush().ok();

    line.clear();
    if stdin.lock().read_line(&mut line)? == 0 {
      break;
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
      continue;
    };

    let result = match command {
      "add" => add(&store, &notifier, args).await,
      "update" => update(&store, args).await,
      "remove" => remove(&store, &notifier, args).await,
      "list" => list(&store).await,
      "send" => send(&dispatcher, args).await,
      "fanout" => fanout(&dispatcher, &notifier).await,
      "stats" => stats(&store, &analytics).await,
      "time" => {
        println!("{}", ist::format(ist::now()));
        Ok(())
      }
      "help" => {
        print_help();
        Ok(())
      }
      "quit" | "exit" => break,
      _ => {
        println!("Unknown command: {command} (try 'help')");
        Ok(())
      }
    };

    if let Err(e) = result {
      println!("Error: {e}");
    }
  }

  Ok(())
}

fn print_help() {
  println!("Commands:");
  println!("  add <phone> [category]     subscribe a phone number");
  println!("  update <phone> <category>  change a preferred category");
  println!("  remove <phone>             unsubscribe (soft delete)");
  println!("  list                       show stored subscribers");
  println!("  send <phone> <text...>     ad-hoc custom-text send");
  println!("  fanout                     run one scheduled delivery pass");
  println!("  stats                      message statistics");
  println!("  time                       current IST time");
  println!("  quit                       exit");
}

fn parse_phone(args: &[&str]) -> Result<PhoneNumber> {
  let raw = args.first().ok_or_else(|| {
    anyhow::anyhow!("a phone number is required (e.g. +12345678901)")
  })?;
  Ok(PhoneNumber::new(*raw)?)
}

async fn add(
  store: &MemoryStore,
  notifier: &MemoryNotifier,
  args: &[&str],
) -> Result<()> {
  let phone = parse_phone(args)?;
  let category = args.get(1).map(|c| c.to_string());
  let subscriber =
    manage::add(store, notifier, DEMO_TOPIC, phone, category).await?;
  println!(
    "Subscribed {} (category: {})",
    subscriber.phone_number,
    subscriber.preferred_category.as_deref().unwrap_or("motivation"),
  );
  Ok(())
}

async fn update(store: &MemoryStore, args: &[&str]) -> Result<()> {
  let phone = parse_phone(args)?;
  let category = args
    .get(1)
    .ok_or_else(|| anyhow::anyhow!("a category is required"))?;
  manage::update(store, &phone, Some(category.to_string())).await?;
  println!("Updated {phone}: category={category}");
  Ok(())
}

async fn remove(
  store: &MemoryStore,
  notifier: &MemoryNotifier,
  args: &[&str],
) -> Result<()> {
  let phone = parse_phone(args)?;
  manage::remove(store, notifier, &phone).await?;
  println!("Removed {phone}");
  Ok(())
}

async fn list(store: &MemoryStore) -> Result<()> {
  let subscribers = store.scan().await?;
  if subscribers.is_empty() {
    println!("No subscribers stored");
    return Ok(());
  }
  for s in subscribers {
    println!(
      "{}  {}  {}",
      s.phone_number,
      s.preferred_category.as_deref().unwrap_or("motivation"),
      if s.active { "active" } else { "inactive" },
    );
  }
  Ok(())
}

async fn send(
  dispatcher: &Dispatcher<MemoryStore, MemoryAnalytics, MemoryNotifier>,
  args: &[&str],
) -> Result<()> {
  let phone = parse_phone(args)?;
  let text = args[1..].join(" ");
  if text.is_empty() {
    anyhow::bail!("message text is required");
  }
  let message_id = dispatcher.send_custom(&phone, &text, None).await?;
  println!("Sent to {phone} (message id {message_id})");
  Ok(())
}

async fn fanout(
  dispatcher: &Dispatcher<MemoryStore, MemoryAnalytics, MemoryNotifier>,
  notifier: &MemoryNotifier,
) -> Result<()> {
  let outcome = dispatcher.run_fanout().await?;
  if outcome.broadcast {
    println!("No subscribers stored; published once to the broadcast topic");
  } else {
    println!("Fan-out complete: {} sent, {} failed", outcome.sent, outcome.failed);
  }
  if let Some(last) = notifier.sent().last() {
    let target = match &last.delivery {
      Delivery::Endpoint(phone) => phone.clone(),
      Delivery::Topic(topic) => format!("topic {topic}"),
    };
    println!("Last message ({target}): {}", last.body);
  }
  Ok(())
}

async fn stats(store: &MemoryStore, analytics: &MemoryAnalytics) -> Result<()> {
  let records = analytics.scan().await?;
  println!("Total subscribers: {}", store.len());
  println!("Messages sent: {}", records.len());
  println!("Categories: motivation, mental_health, mindfulness");
  println!("IST time: {}", ist::format(ist::now()));
  Ok(())
}
