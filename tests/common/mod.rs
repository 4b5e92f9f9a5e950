//! Local HTTP server for integration tests.
//!
//! Runs on its own thread and runtime so it serves both blocking and async
//! tests. Routes:
//!
//! - `GET /delay?ms=N&tag=T` sleeps N ms, then answers `T`
//! - `GET /status?code=N` answers with status N and body `status:N`
//! - `ANY /echo` answers with a JSON description of the request

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::{any, get};
use axum::Router;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct Stats {
    inflight: AtomicUsize,
    max_inflight: AtomicUsize,
    hits: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

impl Stats {
    pub fn max_inflight(&self) -> usize {
        self.max_inflight.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Tags of `/delay` requests in the order the server finished them.
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

pub struct TestServer {
    pub base_url: String,
    pub stats: Arc<Stats>,
}

impl TestServer {
    pub fn start() -> Self {
        let stats = Arc::new(Stats::default());
        let app_stats = stats.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("test server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind test server");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("send address");
                axum::serve(listener, router(app_stats))
                    .await
                    .expect("serve");
            });
        });

        let addr = rx.recv().expect("test server address");
        Self {
            base_url: format!("http://{}", addr),
            stats,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn router(stats: Arc<Stats>) -> Router {
    Router::new()
        .route("/delay", get(delay))
        .route("/status", get(status))
        .route("/echo", any(echo))
        .with_state(stats)
}

async fn delay(State(stats): State<Arc<Stats>>, Query(q): Query<HashMap<String, String>>) -> String {
    stats.hits.fetch_add(1, Ordering::SeqCst);
    let now = stats.inflight.fetch_add(1, Ordering::SeqCst) + 1;
    stats.max_inflight.fetch_max(now, Ordering::SeqCst);

    let ms = q.get("ms").and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
    tokio::time::sleep(Duration::from_millis(ms)).await;

    stats.inflight.fetch_sub(1, Ordering::SeqCst);
    let tag = q.get("tag").cloned().unwrap_or_default();
    if let Ok(mut done) = stats.completed.lock() {
        done.push(tag.clone());
    }
    tag
}

async fn status(Query(q): Query<HashMap<String, String>>) -> (StatusCode, String) {
    let code = q
        .get("code")
        .and_then(|v| v.parse::<u16>().ok())
        .and_then(|c| StatusCode::from_u16(c).ok())
        .unwrap_or(StatusCode::OK);
    (code, format!("status:{}", code.as_u16()))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> String {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    serde_json::json!({
        "method": method.as_str(),
        "query": uri.query().unwrap_or(""),
        "content_type": content_type,
        "body": body,
    })
    .to_string()
}

/// Route tracing output through the test harness. `RUST_LOG=batch_http=debug`
/// shows per-request events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A local port with nothing listening on it.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{}/", addr)
}
