use eps_generator::{GenerationController, GeneratorConfig, MemorySink, router};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

struct TestServer {
    base: String,
    sink: Arc<MemorySink>,
    client: Client,
}

async fn spawn_server(sink: Arc<MemorySink>) -> TestServer {
    let controller = Arc::new(GenerationController::new(GeneratorConfig::default(), sink.clone()).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(controller)).await.expect("Server crash");
    });
    TestServer {
        base: format!("http://{addr}"),
        sink,
        client: Client::new(),
    }
}

impl TestServer {
    async fn post(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.post(format!("{}{}", self.base, path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(format!("{}{}", self.base, path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

#[tokio::test]
async fn start_stop_cycle_over_http() {
    let server = spawn_server(Arc::new(MemorySink::new())).await;

    let (code, body) = server.get("/status").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["isGenerating"], false);
    assert_eq!(body["status"], "stopped");
    assert!(body["message"].is_string());

    let (code, body) = server.post("/start").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert!(body["message"].is_string());

    let (code, body) = server.get("/status").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["isGenerating"], true);
    assert_eq!(body["status"], "running");
    assert!(body["sessionId"].is_string());

    tokio::time::sleep(Duration::from_millis(200)).await;

    let (code, body) = server.post("/stop").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "stopped");
    assert!(!server.sink.is_empty());
}

#[tokio::test]
async fn conflicts_return_409() {
    let server = spawn_server(Arc::new(MemorySink::new())).await;

    let (code, body) = server.post("/stop").await;
    assert_eq!(code, StatusCode::CONFLICT);
    assert_eq!(body["error"], "not running");

    let (code, _) = server.post("/start").await;
    assert_eq!(code, StatusCode::OK);

    let (code, body) = server.post("/start").await;
    assert_eq!(code, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already running");

    let (code, _) = server.post("/stop").await;
    assert_eq!(code, StatusCode::OK);
}

#[tokio::test]
async fn unavailable_sink_rejects_start() {
    let sink = Arc::new(MemorySink::new());
    sink.set_available(false);
    let server = spawn_server(sink).await;

    let (code, body) = server.post("/start").await;
    assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().starts_with("sink unavailable"));

    let (_, body) = server.get("/status").await;
    assert_eq!(body["isGenerating"], false);
}

#[tokio::test]
async fn health_and_metrics_endpoints() {
    let server = spawn_server(Arc::new(MemorySink::new())).await;
    eps_generator::metrics::init();

    let res = server.client.get(format!("{}/health", server.base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");

    let res = server.client.get(format!("{}/metrics", server.base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("eps_sessions_started_total"));
}
