//! End-to-end dashboard behaviour over a file-backed store

use async_trait::async_trait;
use finboard::{
    ApiConfig, Dashboard, FetchError, FetchStatus, FileStore, JsonSource, Projection,
    RepositoryError, ValidationError, Widget, WidgetRepository, WidgetType,
};
use finboard::storage::{KeyValueStore, WIDGETS_KEY};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

const PRICE_URL: &str = "https://api.example.com/price";
const FLAKY_URL: &str = "https://api.example.com/flaky";

/// Serves a fixed queue of responses per URL, repeating the last one
#[derive(Default)]
struct Upstream {
    responses: Mutex<HashMap<String, Vec<Result<Value, FetchError>>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl Upstream {
    fn script(&self, url: &str, responses: Vec<Result<Value, FetchError>>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), responses);
    }

    fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl JsonSource for Upstream {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) => queue[0].clone(),
            None => Err(FetchError::Status {
                status: 404,
                reason: "Not Found".to_string(),
            }),
        }
    }
}

fn price_widget(title: &str) -> Widget {
    Widget::new(
        title,
        WidgetType::Card,
        ApiConfig::new(PRICE_URL).refresh_interval(10),
    )
}

#[tokio::test(start_paused = true)]
async fn widgets_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Arc::new(Upstream::default());
    upstream.script(PRICE_URL, vec![Ok(json!({"bitcoin": {"usd": 42000}}))]);

    let dashboard = Dashboard::open(FileStore::open(dir.path()).unwrap(), upstream.clone())
        .await
        .unwrap();
    let btc = dashboard.add_widget(price_widget("BTC")).await.unwrap();
    let table = dashboard
        .add_widget(Widget::new(
            "BTC raw",
            WidgetType::Table,
            ApiConfig::new(PRICE_URL).refresh_interval(30),
        ))
        .await
        .unwrap();
    dashboard.shutdown().await;

    let reopened = Dashboard::open(FileStore::open(dir.path()).unwrap(), upstream.clone())
        .await
        .unwrap();
    let widgets = reopened.widgets().await;
    let ids: Vec<_> = widgets.iter().map(|w| w.id.clone()).collect();
    assert_eq!(ids, vec![btc.clone(), table.clone()]);
    assert_eq!(widgets[1].api_config.refresh_interval, 30);

    sleep(Duration::from_millis(10)).await;
    let view = reopened.view(&table).await.unwrap();
    match view.projection {
        Some(Projection::Table(rows)) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].key, "bitcoin.usd");
        }
        other => panic!("unexpected projection: {:?}", other),
    }
    reopened.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn snapshot_uses_camel_case_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let upstream = Arc::new(Upstream::default());

    let dashboard = Dashboard::open(store.clone(), upstream).await.unwrap();
    dashboard.add_widget(price_widget("BTC")).await.unwrap();
    dashboard.shutdown().await;

    let raw = store.get(WIDGETS_KEY).unwrap().unwrap();
    let snapshot: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot[0]["type"], json!("card"));
    assert_eq!(snapshot[0]["apiConfig"]["url"], json!(PRICE_URL));
    assert_eq!(snapshot[0]["apiConfig"]["refreshInterval"], json!(10));
}

#[tokio::test(start_paused = true)]
async fn rejected_widget_is_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Arc::new(Upstream::default());
    let dashboard = Dashboard::open(FileStore::open(dir.path()).unwrap(), upstream.clone())
        .await
        .unwrap();

    let bad_url = Widget::new("BTC", WidgetType::Card, ApiConfig::new("ftp://example.com"));
    let err = dashboard.add_widget(bad_url).await.unwrap_err();
    assert!(matches!(
        err,
        finboard::DashboardError::Repository(RepositoryError::Invalid(
            ValidationError::InvalidUrl(_)
        ))
    ));
    dashboard.shutdown().await;

    let repo = WidgetRepository::open(FileStore::open(dir.path()).unwrap()).unwrap();
    assert!(repo.is_empty());
}

#[tokio::test(start_paused = true)]
async fn failing_widget_does_not_affect_others() {
    let upstream = Arc::new(Upstream::default());
    upstream.script(PRICE_URL, vec![Ok(json!({"usd": 42000}))]);
    upstream.script(
        FLAKY_URL,
        vec![
            Ok(json!({"usd": 1.5})),
            Err(FetchError::Status {
                status: 503,
                reason: "Service Unavailable".to_string(),
            }),
        ],
    );

    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::open(FileStore::open(dir.path()).unwrap(), upstream.clone())
        .await
        .unwrap();
    let healthy = dashboard.add_widget(price_widget("BTC")).await.unwrap();
    let flaky = dashboard
        .add_widget(Widget::new(
            "Flaky",
            WidgetType::Card,
            ApiConfig::new(FLAKY_URL).refresh_interval(5),
        ))
        .await
        .unwrap();

    // Flaky: ok at 0s, failing at 5s and 10s; healthy: ok at 0s and 10s
    sleep(Duration::from_secs(11)).await;

    let flaky_view = dashboard.view(&flaky).await.unwrap();
    assert_eq!(flaky_view.result.status, FetchStatus::Error);
    assert_eq!(
        flaky_view.result.error_message.as_deref(),
        Some("HTTP 503: Service Unavailable")
    );
    assert_eq!(flaky_view.projection, Some(Projection::Card(Some(1.5))));

    let healthy_view = dashboard.view(&healthy).await.unwrap();
    assert_eq!(healthy_view.result.status, FetchStatus::Success);
    assert_eq!(healthy_view.projection, Some(Projection::Card(Some(42000.0))));

    assert_eq!(upstream.calls(FLAKY_URL), 3);
    assert_eq!(upstream.calls(PRICE_URL), 2);
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn manual_refresh_fetches_immediately() {
    let upstream = Arc::new(Upstream::default());
    upstream.script(
        PRICE_URL,
        vec![Ok(json!({"usd": 1})), Ok(json!({"usd": 2}))],
    );

    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::open(FileStore::open(dir.path()).unwrap(), upstream.clone())
        .await
        .unwrap();
    let id = dashboard.add_widget(price_widget("BTC")).await.unwrap();
    sleep(Duration::from_millis(10)).await;

    let mut rx = dashboard.subscribe(&id).await.unwrap();
    rx.borrow_and_update();
    dashboard.refresh(&id).await.unwrap();

    loop {
        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        if state.status == FetchStatus::Success {
            assert_eq!(state.payload, Some(json!({"usd": 2})));
            break;
        }
    }
    assert_eq!(upstream.calls(PRICE_URL), 2);
    dashboard.shutdown().await;
}
