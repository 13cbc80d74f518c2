//! Insight Degradation Tests
//!
//! Runs `OpenAiBackend` + `InsightService` against a local axum server that
//! misbehaves in each of the ways a real provider can. Every failure must
//! come back as a tagged `InsightUnavailable`, never a panic or an error
//! that blocks the prediction.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use quake_grade::config::LlmConfig;
use quake_grade::llm::{AnalysisKind, InsightService, InsightUnavailable, OpenAiBackend};
use quake_grade::model::Predictor;
use quake_grade::{load_dataset, EarthquakeRecord, SeverityPrediction};

const TIMEOUT_SECS: u64 = 1;

async fn ok_reply(Json(body): Json<Value>) -> Json<Value> {
    // Echo the requested token budget so callers can check it was sent
    let budget = body["max_tokens"].as_u64().unwrap_or_default();
    Json(json!({
        "choices": [{"message": {"role": "assistant", "content": format!("  Stay alert ({budget}).  ")}}]
    }))
}

async fn malformed_reply() -> &'static str {
    "{\"choices\": [ this is not json"
}

async fn error_reply() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": {"message": "upstream exploded"}})),
    )
}

async fn slow_reply() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(TIMEOUT_SECS + 2)).await;
    Json(json!({"choices": [{"message": {"content": "too late"}}]}))
}

async fn empty_reply() -> Json<Value> {
    Json(json!({"choices": []}))
}

/// Start the mock provider and return its base URL.
async fn spawn_provider() -> String {
    let app = Router::new()
        .route("/ok/chat/completions", post(ok_reply))
        .route("/malformed/chat/completions", post(malformed_reply))
        .route("/error/chat/completions", post(error_reply))
        .route("/slow/chat/completions", post(slow_reply))
        .route("/empty/chat/completions", post(empty_reply));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn service(base: &str, scenario: &str) -> InsightService {
    let config = LlmConfig {
        timeout_secs: TIMEOUT_SECS,
        ..LlmConfig::default()
    };
    let backend = OpenAiBackend::new(
        format!("{base}/{scenario}"),
        "test-model",
        "test-key",
        Duration::from_secs(TIMEOUT_SECS),
    )
    .unwrap();
    InsightService::new(Arc::new(backend), &config)
}

fn reference() -> (EarthquakeRecord, SeverityPrediction) {
    let record = EarthquakeRecord::new(7.5, 10.0, -23.5, -46.6);
    let prediction = Predictor::load("model/severity_model.json")
        .unwrap()
        .predict(&record)
        .unwrap();
    (record, prediction)
}

#[tokio::test]
async fn successful_reply_is_trimmed() {
    let base = spawn_provider().await;
    let (record, prediction) = reference();

    let insight = service(&base, "ok").generate_insight(&record, &prediction).await.unwrap();
    assert_eq!(insight.text, "Stay alert (500).");
    assert!(!insight.cached);
}

#[tokio::test]
async fn malformed_body_is_tagged() {
    let base = spawn_provider().await;
    let (record, prediction) = reference();

    let err = service(&base, "malformed")
        .generate_insight(&record, &prediction)
        .await
        .unwrap_err();
    assert!(matches!(err, InsightUnavailable::MalformedResponse(_)), "{err:?}");
    assert_eq!(err.reason(), "malformed_response");
}

#[tokio::test]
async fn empty_choices_is_malformed() {
    let base = spawn_provider().await;
    let (record, prediction) = reference();

    let err = service(&base, "empty")
        .generate_insight(&record, &prediction)
        .await
        .unwrap_err();
    assert!(matches!(err, InsightUnavailable::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn server_error_is_provider_failure() {
    let base = spawn_provider().await;
    let (record, prediction) = reference();

    let err = service(&base, "error")
        .generate_insight(&record, &prediction)
        .await
        .unwrap_err();
    match &err {
        InsightUnavailable::Provider(msg) => {
            assert!(msg.contains("500"), "{msg}");
            assert!(msg.contains("upstream exploded"), "{msg}");
        }
        other => panic!("expected Provider, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_provider_times_out() {
    let base = spawn_provider().await;
    let (record, prediction) = reference();

    let err = service(&base, "slow")
        .generate_insight(&record, &prediction)
        .await
        .unwrap_err();
    assert_eq!(err, InsightUnavailable::Timeout(TIMEOUT_SECS));
}

#[tokio::test]
async fn disabled_service_never_calls_out() {
    let (record, prediction) = reference();
    let err = InsightService::disabled()
        .generate_insight(&record, &prediction)
        .await
        .unwrap_err();
    assert_eq!(err, InsightUnavailable::Disabled);
}

#[test]
fn disabled_service_skips_dataset_analyses() {
    let table = load_dataset("data/earthquakes.csv").unwrap();
    let service = InsightService::disabled();

    for kind in AnalysisKind::ALL {
        let err = tokio_test::block_on(service.analyze(kind, &table, &[])).unwrap_err();
        assert_eq!(err, InsightUnavailable::Disabled);
    }
    assert!(!service.is_available());
}

#[tokio::test]
async fn dataset_analysis_is_cached_per_table() {
    let base = spawn_provider().await;
    let service = service(&base, "ok");
    let table = load_dataset("data/earthquakes.csv").unwrap();
    let predictions = Predictor::load("model/severity_model.json")
        .unwrap()
        .predict_table(&table)
        .unwrap();

    let first = service.analyze(AnalysisKind::Risk, &table, &predictions).await.unwrap();
    let second = service.analyze(AnalysisKind::Risk, &table, &predictions).await.unwrap();
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.text, "Stay alert (800).");
    assert_eq!(service.cached_entries().await, 1);

    let quality = service.analyze(AnalysisKind::Quality, &table, &predictions).await.unwrap();
    assert_eq!(quality.text, "Stay alert (600).");
    assert_eq!(service.cached_entries().await, 2);
}

#[tokio::test]
async fn failed_analysis_is_not_cached() {
    let base = spawn_provider().await;
    let service = service(&base, "error");
    let table = load_dataset("data/earthquakes.csv").unwrap();
    let predictions = Predictor::load("model/severity_model.json")
        .unwrap()
        .predict_table(&table)
        .unwrap();

    assert!(service.analyze(AnalysisKind::Insights, &table, &predictions).await.is_err());
    assert_eq!(service.cached_entries().await, 0);
}
