use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use diabetes_api::{
    model::ModelService,
    server::{self, handlers::AppState},
};
use serde_json::{Value, json};
use std::path::PathBuf;
use tower::ServiceExt; // for `oneshot`

/// Path of the pipeline artifact shipped with the repository
pub fn artifact_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models/diabetes_pipeline.json")
}

pub async fn shipped_model() -> ModelService {
    ModelService::load(artifact_path()).await.unwrap()
}

pub fn create_test_app(model: ModelService) -> Router {
    server::router(AppState { model })
}

pub fn example_payload() -> Value {
    json!({
        "Pregnancies": 6,
        "Glucose": 148,
        "BloodPressure": 72,
        "SkinThickness": 35,
        "Insulin": 0,
        "BMI": 33.6,
        "DiabetesPedigreeFunction": 0.627,
        "Age": 50
    })
}

pub fn healthy_payload() -> Value {
    json!({
        "Pregnancies": 1,
        "Glucose": 85,
        "BloodPressure": 66,
        "SkinThickness": 29,
        "Insulin": 0,
        "BMI": 26.6,
        "DiabetesPedigreeFunction": 0.351,
        "Age": 31
    })
}

/// Sends a request through the router and decodes the JSON body (`Null` when
/// the body is not JSON).
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn post_predict(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

pub fn assert_valid_prediction(body: &Value) {
    let class = body["prediction"].as_u64().expect("prediction is an integer");
    assert!(class == 0 || class == 1);

    let label = body["prediction_label"].as_str().unwrap();
    let expected_label = if class == 1 { "Diabetic" } else { "Non-Diabetic" };
    assert_eq!(label, expected_label);

    let scores = body["confidence_scores"].as_object().unwrap();
    assert_eq!(scores.len(), 2);
    let healthy = scores["Non-Diabetic"].as_f64().unwrap();
    let diabetic = scores["Diabetic"].as_f64().unwrap();
    assert!((healthy + diabetic - 1.0).abs() < 1e-9);
}
