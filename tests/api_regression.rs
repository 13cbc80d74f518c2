//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the /api/v1/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use quake_grade::api::{create_app, ApiState};
use quake_grade::{AppConfig, AppContext, InsightService};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_state() -> ApiState {
    create_state_with(AppConfig::default())
}

fn create_state_with(config: AppConfig) -> ApiState {
    Arc::new(
        AppContext::load(
            config,
            Some(Path::new("data/earthquakes.csv")),
            Some(Path::new("model/severity_model.json")),
            InsightService::disabled(),
        )
        .expect("shipped assets load"),
    )
}

async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn post_csv(uri: &str, csv: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .unwrap()
}

/// All GET endpoints should return 200.
#[tokio::test]
async fn test_get_endpoints_return_200() {
    let endpoints = ["/health", "/api/v1/status", "/api/v1/dataset", "/api/v1/analysis"];

    for endpoint in &endpoints {
        let app = create_app(create_test_state());
        let resp = app
            .oneshot(Request::builder().uri(*endpoint).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "GET {endpoint} should return 200");
    }
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let v = body_json(resp).await;
    assert_eq!(v["status"], "ok");
    assert!(v["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_assess_valid_record() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(post_json(
            "/api/v1/assess",
            serde_json::json!({"magnitude": 7.5, "depth": 10.0, "latitude": -23.5, "longitude": -46.6}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["prediction"]["severity"], "VeryHigh");
    assert_eq!(v["data"]["probabilities"].as_array().unwrap().len(), 4);
    assert_eq!(v["data"]["charts"][0]["type"], "bar");
    assert_eq!(v["data"]["charts"][1]["type"], "severity_map");
    assert_eq!(v["meta"]["version"], "1");
}

#[tokio::test]
async fn test_assess_accepts_dataset_field_names() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(post_json(
            "/api/v1/assess",
            serde_json::json!({"magnitud": 4.2, "profundidad": 12.0, "latitud": 16.0, "longitud": -95.0}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["prediction"]["severity"], "Low");
}

#[tokio::test]
async fn test_assess_invalid_record_is_422_with_field_errors() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(post_json(
            "/api/v1/assess",
            serde_json::json!({"magnitude": 12.0, "depth": -5.0, "latitude": 0.0, "longitude": 0.0}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["code"], "VALIDATION_FAILED");
    let fields: Vec<&str> = v["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["magnitude", "depth"]);
    assert!(v["error"]["message"].as_str().unwrap().contains("Magnitude"));
}

#[tokio::test]
async fn test_assess_missing_field_is_422() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(post_json(
            "/api/v1/assess",
            serde_json::json!({"magnitude": 5.0, "depth": 10.0}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_assess_malformed_json_is_400() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/assess")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_assess_with_insight_but_no_key_still_predicts() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(post_json(
            "/api/v1/assess?insight=true",
            serde_json::json!({"magnitude": 6.0, "depth": 40.0, "latitude": 17.0, "longitude": -98.0}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["prediction"]["severity"], "High");
    assert!(v["data"].get("insight").is_none());
    assert_eq!(v["data"]["insight_unavailable"]["reason"], "disabled");
}

#[tokio::test]
async fn test_upload_missing_column_is_400() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(post_csv(
            "/api/v1/analysis",
            "Magnitud,Latitud,Longitud\n5.0,17.0,-98.0\n",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = body_json(resp).await;
    assert!(v["error"]["message"].as_str().unwrap().contains("Profundidad"));
}

#[tokio::test]
async fn test_upload_analysis() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(post_csv(
            "/api/v1/analysis",
            "Magnitud,Latitud,Longitud,Profundidad\n3.0,17.0,-98.0,50\n5.0,17.0,-98.0,30\n6.0,17.0,-98.0,40\n",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["rows"], 3);
    assert_eq!(v["data"]["predictive"]["status"], "ready");
    let counts: Vec<u64> = v["data"]["predictive"]["counts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, [1, 1, 1, 0]);
}

#[tokio::test]
async fn test_empty_upload_is_400() {
    let app = create_app(create_test_state());
    let resp = app.oneshot(post_csv("/api/v1/analysis", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    let mut config = AppConfig::default();
    config.data.max_upload_mb = 1;
    let app = create_app(create_state_with(config));

    let big = "Magnitud,Latitud,Longitud,Profundidad\n".to_string() + &"5.0,17.0,-98.0,30\n".repeat(70_000);
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/analysis")
                .header(header::CONTENT_TYPE, "text/csv")
                .header(header::CONTENT_LENGTH, big.len())
                .body(Body::from(big))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let v = body_json(resp).await;
    assert!(v["error"]["message"].as_str().unwrap().contains("maximum is 1 MB"));
}

#[tokio::test]
async fn test_predictions_csv_download() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(post_csv(
            "/api/v1/predictions/csv",
            "Magnitud,Latitud,Longitud,Profundidad\n7.5,-23.5,-46.6,10\n",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("quake_predictions.csv"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Magnitud,Latitud,Longitud,Profundidad,Gravedad,Confianza"));
    assert!(lines.next().unwrap().contains(",Muy Alta,"));
}

#[tokio::test]
async fn test_predictions_csv_defaults_to_base_dataset() {
    let state = create_test_state();
    let rows = state.base.len();
    let app = create_app(state);
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/predictions/csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().count(), rows + 1);
}

#[tokio::test]
async fn test_unknown_api_path_is_enveloped_404() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(Request::builder().uri("/api/v1/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_root_serves_form_page() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}
