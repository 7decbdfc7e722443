//! Integration tests for the prediction and explanation endpoints.

use api::{create_router, AppState, ServiceConfig, SharedState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fallback::{AttributionConfig, AttributionEngine, ReloadSource};
use inference_engine::{ConstantModel, FeatureBundle, InferenceEngine, LinearModel, ModelSpec};
use preprocess::{ImputeStrategy, Imputer, StandardScaler};
use serde_json::{json, Value};
use std::sync::Arc;
use storage::{BundleRecord, BundleStore};
use tower::ServiceExt;

fn cols() -> Vec<String> {
    vec!["LotArea".to_string(), "OverallQual".to_string()]
}

fn linear_bundle() -> FeatureBundle {
    FeatureBundle::new(Arc::new(LinearModel::new(vec![1.5, -2.0], 0.0)), cols())
}

fn constant_bundle() -> FeatureBundle {
    FeatureBundle::new(Arc::new(ConstantModel::new(12345.0)), cols())
}

fn make_state(engine: InferenceEngine, config: &AttributionConfig) -> SharedState {
    Arc::new(AppState::new(engine, AttributionEngine::from_config(config, None)))
}

fn make_post_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn send(state: SharedState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let app = create_router(state);
    let resp = ServiceExt::<Request<Body>>::oneshot(app, request).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    (status, body.to_vec())
}

async fn post_json(state: SharedState, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, body) = send(state, make_post_request(uri, body)).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_json(state: SharedState, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(state, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

// --- GET / ---

#[tokio::test]
async fn test_health_reports_model_loaded() {
    let state = make_state(InferenceEngine::new(linear_bundle()), &AttributionConfig::default());
    let (status, json) = get_json(state, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model_loaded"], true);
    assert!(json.get("version").is_some());
    assert!(json.get("uptime_seconds").is_some());
}

#[tokio::test]
async fn test_health_without_model() {
    let state = make_state(InferenceEngine::unloaded(), &AttributionConfig::default());
    let (status, json) = get_json(state, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["model_loaded"], false);
}

// --- POST /predict ---

#[tokio::test]
async fn test_predict_linear() {
    let state = make_state(InferenceEngine::new(linear_bundle()), &AttributionConfig::default());
    let body = json!({"features": {"LotArea": 8000, "OverallQual": 7}});
    let (status, json) = post_json(state, "/predict", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], 11986.0);
}

#[tokio::test]
async fn test_predict_without_model_is_503() {
    let state = make_state(InferenceEngine::unloaded(), &AttributionConfig::default());
    let body = json!({"features": {"LotArea": 8000}});
    let (status, json) = post_json(state, "/predict", body).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["detail"], "Model not loaded");
}

#[tokio::test]
async fn test_predict_missing_features_field_is_rejected() {
    let state = make_state(InferenceEngine::new(linear_bundle()), &AttributionConfig::default());
    let (status, _) = send(state, make_post_request("/predict", json!({"rows": []}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// --- POST /explain ---

#[tokio::test]
async fn test_explain_top_contribution() {
    let state = make_state(InferenceEngine::new(linear_bundle()), &AttributionConfig::default());
    let body = json!({"features": {"LotArea": 8000, "OverallQual": 7}, "top_k": 1});
    let (status, json) = post_json(state, "/explain", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], 11986.0);
    assert_eq!(
        json["prediction_explanation"],
        json!([{"feature": "LotArea", "contribution": 12000.0}])
    );
}

#[tokio::test]
async fn test_explain_coefficients_without_library() {
    let state = make_state(InferenceEngine::new(linear_bundle()), &AttributionConfig::without_library());
    let body = json!({"features": {"LotArea": 8000, "OverallQual": 7}});
    let (status, json) = post_json(state, "/explain", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["prediction_explanation"],
        json!([
            {"feature": "LotArea", "contribution": 12000.0},
            {"feature": "OverallQual", "contribution": -14.0}
        ])
    );
}

#[tokio::test]
async fn test_explain_constant_model_without_library_is_empty() {
    let state = make_state(InferenceEngine::new(constant_bundle()), &AttributionConfig::without_library());
    let body = json!({"features": {"LotArea": 8000, "OverallQual": 7}});
    let (status, json) = post_json(state, "/explain", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], 12345.0);
    assert_eq!(json["prediction_explanation"], json!([]));
}

#[tokio::test]
async fn test_explain_non_positive_top_k_is_empty() {
    let state = make_state(InferenceEngine::new(linear_bundle()), &AttributionConfig::default());
    for top_k in [0, -3] {
        let body = json!({"features": {"LotArea": 8000, "OverallQual": 7}, "top_k": top_k});
        let (status, json) = post_json(state.clone(), "/explain", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prediction_explanation"], json!([]));
    }
}

#[tokio::test]
async fn test_explain_default_top_k() {
    let names: Vec<String> = (0..8).map(|i| format!("f{}", i)).collect();
    let bundle = FeatureBundle::new(Arc::new(LinearModel::new(vec![1.0; 8], 0.0)), names);
    let state = make_state(InferenceEngine::new(bundle), &AttributionConfig::without_library());

    let features: serde_json::Map<String, Value> =
        (0..8).map(|i| (format!("f{}", i), json!(i + 1))).collect();
    let (status, json) = post_json(state, "/explain", json!({"features": features})).await;
    assert_eq!(status, StatusCode::OK);

    let ranked = json["prediction_explanation"].as_array().unwrap();
    assert_eq!(ranked.len(), 5);
    assert_eq!(ranked[0]["feature"], "f7");
    assert_eq!(ranked[4]["feature"], "f3");
}

#[tokio::test]
async fn test_explain_wide_row_with_exact_shapley() {
    let names: Vec<String> = (0..14).map(|i| format!("f{}", i)).collect();
    let coef: Vec<f64> = (0..14).map(|i| i as f64 + 1.0).collect();
    let bundle = FeatureBundle::new(Arc::new(LinearModel::new(coef, 0.0)), names);
    let config = AttributionConfig {
        library_enabled: true,
        max_exact_features: 16,
    };
    let state = make_state(InferenceEngine::new(bundle), &config);

    let features: serde_json::Map<String, Value> = (0..14).map(|i| (format!("f{}", i), json!(1.0))).collect();
    let (status, json) = post_json(state, "/explain", json!({"features": features, "top_k": 2})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], 105.0);

    let ranked = json["prediction_explanation"].as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["feature"], "f13");
    assert!((ranked[0]["contribution"].as_f64().unwrap() - 14.0).abs() < 1e-6);
    assert_eq!(ranked[1]["feature"], "f12");
}

#[tokio::test]
async fn test_explain_missing_feature_defaults_to_zero() {
    let state = make_state(InferenceEngine::new(linear_bundle()), &AttributionConfig::without_library());
    let body = json!({"features": {"LotArea": 100}});
    let (status, json) = post_json(state, "/explain", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], 150.0);
    assert_eq!(json["prediction_explanation"][1]["feature"], "OverallQual");
    assert_eq!(json["prediction_explanation"][1]["contribution"], 0.0);
}

#[tokio::test]
async fn test_explain_without_model_is_503() {
    let state = make_state(InferenceEngine::unloaded(), &AttributionConfig::default());
    let body = json!({"features": {"LotArea": 8000}});
    let (status, json) = post_json(state, "/explain", body).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["detail"], "Model not loaded");
}

#[tokio::test]
async fn test_explain_pipeline_failure_is_500() {
    // Scaler fitted on three columns but the bundle only builds two
    let scaler = StandardScaler::from_parts(vec![0.0; 3], vec![1.0; 3]).unwrap();
    let bundle = linear_bundle().with_scaler(Arc::new(scaler));
    let state = make_state(InferenceEngine::new(bundle), &AttributionConfig::default());

    let body = json!({"features": {"LotArea": 8000, "OverallQual": 7}});
    let (status, json) = post_json(state, "/explain", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["detail"].as_str().unwrap().starts_with("Explain failed"));
}

#[tokio::test]
async fn test_explain_null_feature_without_imputer_is_500() {
    let state = make_state(InferenceEngine::new(linear_bundle()), &AttributionConfig::without_library());
    let body = json!({"features": {"LotArea": null, "OverallQual": 7}});
    let (status, json) = post_json(state.clone(), "/explain", body.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["detail"].as_str().unwrap().starts_with("Explain failed"));

    let (status, json) = post_json(state, "/predict", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["detail"].as_str().unwrap().starts_with("Prediction failed"));
}

#[tokio::test]
async fn test_explain_null_feature_with_imputer_is_filled() {
    let imputer = Imputer::from_statistics(ImputeStrategy::Median, vec![8000.0, 5.0]);
    let bundle = linear_bundle().with_imputer(Arc::new(imputer));
    let state = make_state(InferenceEngine::new(bundle), &AttributionConfig::without_library());

    let body = json!({"features": {"LotArea": null, "OverallQual": 7}, "top_k": 1});
    let (status, json) = post_json(state, "/explain", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], 11986.0);
    assert_eq!(
        json["prediction_explanation"],
        json!([{"feature": "LotArea", "contribution": 12000.0}])
    );
}

#[tokio::test]
async fn test_explain_falls_back_to_reloaded_coefficients() {
    let dir = tempfile::tempdir().unwrap();
    let store = BundleStore::new(dir.path().join("baseline.json"));
    store
        .save(&BundleRecord {
            model: ModelSpec::Linear(LinearModel::new(vec![1.5, -2.0], 0.0)),
            imputer: None,
            scaler: None,
            numeric_cols: cols(),
        })
        .unwrap();

    let reload: Arc<dyn ReloadSource> = Arc::new(store);
    let attribution = AttributionEngine::from_config(&AttributionConfig::without_library(), Some(reload));
    let state = Arc::new(AppState::new(InferenceEngine::new(constant_bundle()), attribution));

    let body = json!({"features": {"LotArea": 8000, "OverallQual": 7}, "top_k": 1});
    let (status, json) = post_json(state, "/explain", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], 12345.0);
    assert_eq!(
        json["prediction_explanation"],
        json!([{"feature": "LotArea", "contribution": 12000.0}])
    );
}

// --- startup ---

#[tokio::test]
async fn test_from_config_loads_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("baseline.bin");
    BundleStore::new(&path)
        .save(&BundleRecord {
            model: ModelSpec::Linear(LinearModel::new(vec![1.5, -2.0], 0.0)),
            imputer: None,
            scaler: None,
            numeric_cols: cols(),
        })
        .unwrap();

    let config = ServiceConfig {
        bundle_path: path,
        ..Default::default()
    };
    let state = Arc::new(AppState::from_config(&config));
    assert!(state.engine.is_loaded());

    let body = json!({"features": {"LotArea": 8000, "OverallQual": 7}});
    let (status, json) = post_json(state, "/predict", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], 11986.0);
}

#[tokio::test]
async fn test_from_config_missing_bundle_serves_503() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        bundle_path: dir.path().join("absent.json"),
        ..Default::default()
    };
    let state = Arc::new(AppState::from_config(&config));
    assert!(!state.engine.is_loaded());

    let (status, json) = get_json(state.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["model_loaded"], false);

    let body = json!({"features": {"LotArea": 8000}});
    let (status, _) = post_json(state, "/explain", body).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// --- GET /metrics ---

#[tokio::test]
async fn test_metrics_without_recorder_is_empty() {
    let state = make_state(InferenceEngine::unloaded(), &AttributionConfig::default());
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}
