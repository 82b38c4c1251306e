//! JSON HTTP API for the Uplift SMS broadcast service.
//!
//! Exposes an axum [`Router`] backed by any combination of
//! [`SubscriberStore`], [`AnalyticsStore`], and [`Notifier`]
//! implementations. Transport concerns (TLS, tracing layers) are the
//! caller's responsibility.
//!
//! | Method | Path | Behaviour |
//! |--------|------|-----------|
//! | `GET`  | `/subscribers` | List all records |
//! | `POST` | `/subscribers` | Add / update / remove a subscriber |
//! | `GET`  | `/analytics` | Send-event summary |
//! | `POST` | `/send` | Ad-hoc custom-text send |
//! | `POST` | `/dispatch` | Scheduled fan-out, or targeted send with a body |
//! | `GET`  | `/<path>` | Static dashboard assets (fallback) |

pub mod analytics;
pub mod assets;
pub mod dispatch;
pub mod error;
pub mod send;
pub mod subscribers;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use uplift_core::{
  Catalog,
  dispatch::Dispatcher,
  notify::Notifier,
  store::{AnalyticsStore, SubscriberStore},
};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
///
/// `analytics` is optional: when no analytics table is configured, writes
/// are skipped and the summary endpoint reports an empty history.
pub struct AppState<S, A, N> {
  pub store:      Arc<S>,
  pub analytics:  Option<Arc<A>>,
  pub notifier:   Arc<N>,
  pub catalog:    Arc<Catalog>,
  /// Broadcast topic identifier handed to the notifier.
  pub topic:      String,
  pub assets_dir: PathBuf,
}

impl<S, A, N> Clone for AppState<S, A, N> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      analytics:  self.analytics.clone(),
      notifier:   Arc::clone(&self.notifier),
      catalog:    Arc::clone(&self.catalog),
      topic:      self.topic.clone(),
      assets_dir: self.assets_dir.clone(),
    }
  }
}

impl<S, A, N> AppState<S, A, N>
where
  S: SubscriberStore,
  A: AnalyticsStore,
  N: Notifier,
{
  /// A dispatcher over this state's adapters.
  pub fn dispatcher(&self) -> Dispatcher<S, A, N> {
    Dispatcher::new(
      Arc::clone(&self.store),
      self.analytics.clone(),
      Arc::clone(&self.notifier),
      Arc::clone(&self.catalog),
      self.topic.clone(),
    )
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the fully-materialised application router for `state`.
pub fn router<S, A, N>(state: AppState<S, A, N>) -> Router
where
  S: SubscriberStore + 'static,
  A: AnalyticsStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    .route(
      "/subscribers",
      get(subscribers::list::<S, A, N>).post(subscribers::manage::<S, A, N>),
    )
    .route("/analytics", get(analytics::summary::<S, A, N>))
    .route("/send", post(send::custom::<S, A, N>))
    .route("/dispatch", post(dispatch::trigger::<S, A, N>))
    .fallback(assets::handler::<S, A, N>)
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uplift_core::{
    PhoneNumber,
    memory::{Delivery, MemoryAnalytics, MemoryNotifier, MemoryStore},
    store::SubscriberStore as _,
    subscriber::Subscriber,
  };

  use super::*;

  const TOPIC: &str = "arn:aws:sns:test:uplift";

  struct TestApp {
    state: AppState<MemoryStore, MemoryAnalytics, MemoryNotifier>,
  }

  impl TestApp {
    fn new() -> Self {
      Self::with_assets_dir(PathBuf::from("/nonexistent-assets"))
    }

    fn with_assets_dir(assets_dir: PathBuf) -> Self {
      Self {
        state: AppState {
          store: Arc::new(MemoryStore::new()),
          analytics: Some(Arc::new(MemoryAnalytics::new())),
          notifier: Arc::new(MemoryNotifier::new()),
          catalog: Arc::new(Catalog::builtin()),
          topic: TOPIC.to_string(),
          assets_dir,
        },
      }
    }

    fn store(&self) -> &MemoryStore {
      &self.state.store
    }

    fn analytics(&self) -> &MemoryAnalytics {
      self.state.analytics.as_ref().unwrap()
    }

    fn notifier(&self) -> &MemoryNotifier {
      &self.state.notifier
    }

    async fn request(
      &self,
      method: &str,
      uri: &str,
      body: Option<Value>,
    ) -> (StatusCode, Value) {
      let mut builder = Request::builder().method(method).uri(uri);
      let body = match body {
        Some(v) => {
          builder = builder.header(header::CONTENT_TYPE, "application/json");
          Body::from(v.to_string())
        }
        None => Body::empty(),
      };
      let response = router(self.state.clone())
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

      let status = response.status();
      let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
      let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)));
      (status, value)
    }
  }

  fn phone(raw: &str) -> PhoneNumber {
    PhoneNumber::new(raw).unwrap()
  }

  // ── GET /subscribers ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_on_empty_store_returns_zero_count() {
    let app = TestApp::new();
    let (status, body) = app.request("GET", "/subscribers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "subscribers": [], "count": 0 }));
  }

  #[tokio::test]
  async fn list_returns_all_records() {
    let app = TestApp::new();
    app
      .request(
        "POST",
        "/subscribers",
        Some(json!({ "action": "add", "phone": "+15551230000" })),
      )
      .await;
    app
      .request(
        "POST",
        "/subscribers",
        Some(json!({ "action": "add", "phone": "+15551230001" })),
      )
      .await;

    let (status, body) = app.request("GET", "/subscribers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["subscribers"].as_array().unwrap().len(), 2);
  }

  // ── POST /subscribers ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_stores_an_active_record_with_category() {
    let app = TestApp::new();
    let (status, body) = app
      .request(
        "POST",
        "/subscribers",
        Some(json!({
          "action": "add",
          "phone": "+15551230000",
          "category": "mindfulness"
        })),
      )
      .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let stored = app
      .store()
      .get(&phone("+15551230000"))
      .await
      .unwrap()
      .unwrap();
    assert!(stored.active);
    assert_eq!(stored.preferred_category.as_deref(), Some("mindfulness"));
    assert!(stored.subscription_arn.is_some());
  }

  #[tokio::test]
  async fn unknown_action_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
      .request(
        "POST",
        "/subscribers",
        Some(json!({ "action": "bogus", "phone": "+15551230000" })),
      )
      .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "message": "Invalid action" }));
  }

  #[tokio::test]
  async fn missing_parameters_are_rejected() {
    let app = TestApp::new();
    for body in [
      json!({ "action": "add" }),
      json!({ "phone": "+15551230000" }),
      json!({}),
    ] {
      let (status, response) =
        app.request("POST", "/subscribers", Some(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(response["success"], false);
      assert_eq!(response["message"], "Missing required parameters");
    }
  }

  #[tokio::test]
  async fn malformed_phone_is_rejected_before_any_subscription() {
    let app = TestApp::new();
    let (status, body) = app
      .request(
        "POST",
        "/subscribers",
        Some(json!({ "action": "add", "phone": "5551230000" })),
      )
      .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(app.notifier().subscription_count(), 0);
  }

  #[tokio::test]
  async fn remove_twice_succeeds_and_leaves_inactive() {
    let app = TestApp::new();
    app
      .request(
        "POST",
        "/subscribers",
        Some(json!({ "action": "add", "phone": "+15551230000" })),
      )
      .await;

    for _ in 0..2 {
      let (status, body) = app
        .request(
          "POST",
          "/subscribers",
          Some(json!({ "action": "remove", "phone": "+15551230000" })),
        )
        .await;
      assert_eq!(status, StatusCode::OK);
      assert_eq!(body["success"], true);
    }

    let stored = app
      .store()
      .get(&phone("+15551230000"))
      .await
      .unwrap()
      .unwrap();
    assert!(!stored.active);
  }

  // ── GET /analytics ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn analytics_summarises_send_history() {
    let app = TestApp::new();
    app
      .request(
        "POST",
        "/send",
        Some(json!({
          "phone": "+15551230000",
          "message": "hi",
          "category": "greeting"
        })),
      )
      .await;
    app
      .request(
        "POST",
        "/send",
        Some(json!({ "phone": "+15551230000", "message": "hi again" })),
      )
      .await;

    let (status, body) = app.request("GET", "/analytics?days=7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_messages"], 2);
    assert_eq!(body["category_counts"]["greeting"], 1);
    assert_eq!(body["category_counts"]["custom"], 1);
    assert_eq!(body["daily_counts"].as_object().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn analytics_without_a_store_reports_empty_history() {
    let mut app = TestApp::new();
    app.state.analytics = None;

    let (status, body) = app.request("GET", "/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_messages"], 0);
  }

  // ── POST /send ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn custom_send_delivers_literal_text_and_records_it() {
    let app = TestApp::new();
    let (status, body) = app
      .request(
        "POST",
        "/send",
        Some(json!({ "phone": "+15551230000", "message": "Custom hello!" })),
      )
      .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message_id"].is_string());

    let sent = app.notifier().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, "Custom hello!");

    let records = app.analytics().records();
    assert_eq!(records.len(), 1);
    assert!(records[0].custom);
    assert_eq!(records[0].subscriber_count, 1);
  }

  #[tokio::test]
  async fn send_without_message_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
      .request("POST", "/send", Some(json!({ "phone": "+15551230000" })))
      .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing required parameters");
    assert!(app.notifier().sent().is_empty());
  }

  // ── POST /dispatch ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dispatch_without_body_fans_out_to_every_subscriber() {
    let app = TestApp::new();
    for raw in ["+15551230001", "+15551230002"] {
      app
        .request(
          "POST",
          "/subscribers",
          Some(json!({ "action": "add", "phone": raw })),
        )
        .await;
    }

    let (status, body) = app.request("POST", "/dispatch", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "sent": 2, "failed": 0, "broadcast": false }));
    assert_eq!(app.notifier().sent().len(), 2);
    assert_eq!(app.analytics().records().len(), 2);
  }

  #[tokio::test]
  async fn dispatch_on_empty_store_broadcasts_to_the_topic() {
    let app = TestApp::new();
    let (status, body) = app.request("POST", "/dispatch", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["broadcast"], true);

    let sent = app.notifier().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].delivery, Delivery::Topic(TOPIC.to_string()));

    let records = app.analytics().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].subscriber_count, 0);
  }

  #[tokio::test]
  async fn targeted_dispatch_sends_once_and_writes_no_analytics() {
    let app = TestApp::new();
    let mut subscriber =
      Subscriber::new(phone("+15551230000"), "arn:test".to_string());
    subscriber.preferred_category = Some("mental_health".to_string());
    app.store().put(subscriber).await.unwrap();

    let (status, body) = app
      .request(
        "POST",
        "/dispatch",
        Some(json!({ "phone": "+15551230000" })),
      )
      .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let sent = app.notifier().sent();
    assert_eq!(sent.len(), 1);
    let catalog = Catalog::builtin();
    assert!(
      catalog
        .messages("mental_health")
        .unwrap()
        .contains(&sent[0].body)
    );
    assert!(app.analytics().records().is_empty());
  }

  #[tokio::test]
  async fn targeted_dispatch_for_unknown_phone_is_404() {
    let app = TestApp::new();
    let (status, _) = app
      .request(
        "POST",
        "/dispatch",
        Some(json!({ "phone": "+15559999999" })),
      )
      .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Static assets ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn serves_index_html_at_the_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>uplift</html>")
      .unwrap();
    let app = TestApp::with_assets_dir(dir.path().to_path_buf());

    let response = router(app.state.clone())
      .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
      .await
      .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
      response.headers()[header::CONTENT_TYPE],
      "text/html"
    );
  }

  #[tokio::test]
  async fn missing_asset_is_a_plain_text_404() {
    let app = TestApp::new();
    let response = router(app.state.clone())
      .oneshot(
        Request::builder()
          .uri("/no-such-page.html")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    assert_eq!(&bytes[..], b"File not found");
  }
}
