//! uplift-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) overlaid with
//! environment variables (`SNS_TOPIC_ARN`, `SUBSCRIBERS_TABLE`,
//! `ANALYTICS_TABLE`, ...), builds the SNS/DynamoDB adapters, and serves
//! the HTTP API plus the dashboard assets.
//!
//! # Scheduled delivery
//!
//! External timers (cron and friends) should invoke:
//!
//! ```
//! uplift-server --dispatch
//! ```
//!
//! which runs one fan-out pass and exits. Alternatively, set
//! `dispatch_interval_minutes` in the config to run an in-process
//! scheduler alongside the API.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use aws_config::BehaviorVersion;
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uplift_api::AppState;
use uplift_aws::{DynamoAnalyticsStore, DynamoSubscriberStore, SnsNotifier};
use uplift_core::{
  Catalog,
  dispatch::Dispatcher,
  ist,
  notify::Notifier,
  store::{AnalyticsStore, SubscriberStore},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` plus the
/// environment.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host: String,
  #[serde(default = "default_port")]
  port: u16,
  /// Broadcast topic identifier (env: `SNS_TOPIC_ARN`).
  sns_topic_arn: String,
  /// Subscriber table name (env: `SUBSCRIBERS_TABLE`).
  subscribers_table: String,
  /// Analytics table name (env: `ANALYTICS_TABLE`). Optional; analytics
  /// writes are skipped entirely when unset.
  analytics_table: Option<String>,
  #[serde(default = "default_assets_dir")]
  assets_dir: PathBuf,
  /// When set, run an in-process fan-out every N minutes.
  dispatch_interval_minutes: Option<u64>,
}

fn default_host() -> String {
  "0.0.0.0".to_string()
}

fn default_port() -> u16 {
  8080
}

fn default_assets_dir() -> PathBuf {
  PathBuf::from("assets")
}

// ─── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Uplift SMS broadcast server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run one scheduled fan-out pass and exit.
  #[arg(long)]
  dispatch: bool,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::default())
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
  let state = AppState {
    store:      Arc::new(DynamoSubscriberStore::new(
      &aws,
      &server_cfg.subscribers_table,
    )),
    analytics:  server_cfg
      .analytics_table
      .as_deref()
      .map(|table| Arc::new(DynamoAnalyticsStore::new(&aws, table))),
    notifier:   Arc::new(SnsNotifier::new(&aws)),
    catalog:    Arc::new(Catalog::builtin()),
    topic:      server_cfg.sns_topic_arn.clone(),
    assets_dir: server_cfg.assets_dir.clone(),
  };

  // One-shot mode for external timers.
  if cli.dispatch {
    let outcome = state.dispatcher().run_fanout().await?;
    tracing::info!(
      sent = outcome.sent,
      failed = outcome.failed,
      broadcast = outcome.broadcast,
      "dispatch complete"
    );
    return Ok(());
  }

  if let Some(minutes) = server_cfg.dispatch_interval_minutes {
    tokio::spawn(run_scheduler(state.dispatcher(), minutes));
  }

  let app = uplift_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

// ─── In-process scheduler ────────────────────────────────────────────────────

async fn run_scheduler<S, A, N>(dispatcher: Dispatcher<S, A, N>, minutes: u64)
where
  S: SubscriberStore + 'static,
  A: AnalyticsStore + 'static,
  N: Notifier + 'static,
{
  let mut interval = tokio::time::interval(Duration::from_secs(minutes * 60));
  // The first tick completes immediately; the first real pass happens one
  // interval from startup.
  interval.tick().await;

  loop {
    interval.tick().await;
    tracing::info!(at = %ist::format(ist::now()), "scheduled dispatch tick");
    match dispatcher.run_fanout().await {
      Ok(outcome) => tracing::info!(
        sent = outcome.sent,
        failed = outcome.failed,
        broadcast = outcome.broadcast,
        "scheduled dispatch complete"
      ),
      Err(e) => tracing::error!(error = %e, "scheduled dispatch failed"),
    }
  }
}
