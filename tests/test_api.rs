//! Integration test: Prediction server endpoints

mod common;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use heart_failure_prediction::error::Result;
use heart_failure_prediction::inference::Predictor;
use heart_failure_prediction::server::{create_router, AppState, ServerConfig};
use heart_failure_prediction::training::train_and_evaluate;
use ndarray::{array, Array1, Array2};
use polars::prelude::DataFrame;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Returns fixed outputs and counts how often it was called
struct FixedPredictor {
    calls: Arc<AtomicUsize>,
}

impl Predictor for FixedPredictor {
    fn predict(&self, x: &DataFrame) -> Result<Array1<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(x.height(), 1);
        Ok(array![1])
    }

    fn predict_proba(&self, _x: &DataFrame) -> Result<Array2<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(array![[0.2, 0.8]])
    }
}

fn config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        model_path: PathBuf::from("unused/model.json"),
        cors_origins: Vec::new(),
    }
}

fn app_with_mock() -> (axum::Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let model = Arc::new(FixedPredictor {
        calls: Arc::clone(&calls),
    });
    let state = Arc::new(AppState::with_model(model));
    (create_router(state, &config()), calls)
}

fn app_without_model() -> axum::Router {
    create_router(Arc::new(AppState::unloaded()), &config())
}

fn valid_record() -> Value {
    json!({
        "Age": 45,
        "Sex": "M",
        "ChestPainType": "ATA",
        "RestingBP": 130,
        "Cholesterol": 230,
        "FastingBS": 0,
        "RestingECG": "Normal",
        "MaxHR": 140,
        "ExerciseAngina": "N",
        "Oldpeak": 1.5,
        "ST_Slope": "Flat"
    })
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_healthy() {
    let (app, _) = app_with_mock();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_secs"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_unhealthy() {
    let response = app_without_model()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_returns_model_outputs() {
    let (app, calls) = app_with_mock();
    let response = app.oneshot(post("/predict", &valid_record())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["HeartDisease"], 1);
    assert_eq!(body["Probability-positive"], 0.8);
    assert_eq!(body["Probability-negative"], 0.2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rejects_invalid_record() {
    let (app, calls) = app_with_mock();
    let mut record = valid_record();
    record["Age"] = json!(-45);
    record.as_object_mut().unwrap().remove("RestingECG");

    let response = app.oneshot(post("/predict", &record)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    let errors = body["detail"].as_array().unwrap();
    let locations: Vec<&Value> = errors.iter().map(|e| &e["loc"][1]).collect();
    assert!(locations.contains(&&json!("Age")));
    assert!(locations.contains(&&json!("RestingECG")));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejects_unknown_category() {
    let (app, calls) = app_with_mock();
    let mut record = valid_record();
    record["ChestPainType"] = json!("XYZ");

    let response = app.oneshot(post("/predict", &record)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejects_malformed_json() {
    let (app, _) = app_with_mock();
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_accepts_numeric_strings_and_missing_cholesterol() {
    let (app, calls) = app_with_mock();
    let mut record = valid_record();
    record["Age"] = json!("45");
    record["Oldpeak"] = json!("1.5");
    record.as_object_mut().unwrap().remove("Cholesterol");

    let response = app.oneshot(post("/predict", &record)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_predict_without_model() {
    let response = app_without_model()
        .oneshot(post("/predict", &valid_record()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Model not loaded");
}

#[tokio::test]
async fn test_explain_not_supported_by_model() {
    let (app, _) = app_with_mock();
    let response = app.oneshot(post("/explain", &valid_record())).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_explain_with_trained_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::train_config(&dir.path().join("heart.csv"), dir.path());
    let outcome = train_and_evaluate(&config, &common::heart_frame(200, 4)).unwrap();

    let state = Arc::new(AppState::with_model(Arc::new(outcome.pipeline)));
    let app = create_router(state, &self::config());

    let response = app.oneshot(post("/explain", &valid_record())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let contributions = body.as_object().unwrap();
    assert_eq!(contributions.len(), 11);
    assert!(contributions.contains_key("ST_Slope"));
    assert!(contributions.values().all(Value::is_f64));
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = app_with_mock();
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
