// HTTP API tests against the router with in-memory storage

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use car_configurator::{
    catalog::Catalog, handlers::AppState, pricing::EstimateRules, server::create_router,
    storage::ConfigurationRepository,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let repository = ConfigurationRepository::connect("sqlite::memory:", 1)
        .await
        .unwrap();
    create_router(AppState {
        catalog: Arc::new(Catalog::builtin().unwrap()),
        repository,
        rules: Arc::new(EstimateRules::default()),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "car-configurator");
}

#[tokio::test]
async fn test_series_browsing() {
    let app = app().await;

    let (status, series) = send(&app, "GET", "/api/series", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = series
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Electric"));

    let (status, body) = send(&app, "GET", "/api/models/Electric", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["series"]["name"], "Electric");
    let ids: Vec<&str> = body["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["i4", "iX"]);

    let (status, body) = send(&app, "GET", "/api/models/Roadsters", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "series_not_found");
}

#[tokio::test]
async fn test_models_and_options() {
    let app = app().await;

    let (status, models) = send(&app, "GET", "/api/models", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(models
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["id"] == "X3"));

    let (status, options) = send(&app, "GET", "/api/options/X3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(options["model"]["id"], "X3");
    let premium = options["groups"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["name"] == "package_premium")
        .unwrap();
    let values: Vec<&str> = premium["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["Luxury"]);

    let (status, body) = send(&app, "GET", "/api/options/Z4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "model_not_found");
}

#[tokio::test]
async fn test_calculate_price_applies_bundle_discount() {
    let app = app().await;
    let request = json!({
        "model": "X3",
        "configuration": {
            "exterior_color": {"value": "Black", "price": 0},
            "package_premium": [{"value": "Luxury", "price": 3500}],
            "package_technology": [{"value": "Technology", "price": 2200}]
        }
    });

    let (status, body) = send(&app, "POST", "/api/calculate-price", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["breakdown"]["total"], 50700.0);
    assert_eq!(body["estimate"]["discounts"][0]["name"], "Luxury + Technology");
    assert_eq!(body["estimate"]["subtotal"], 50200.0);
    assert_eq!(body["estimate"]["total_msrp"], 51195.0);

    let items = body["estimate"]["itemized_breakdown"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], json!({"item": "Luxury", "price": 3500.0, "category": "Package"}));
}

#[tokio::test]
async fn test_validate_configuration_reports_missing_dependency() {
    let app = app().await;
    let request = json!({
        "model": "X3",
        "configuration": {
            "package_sport": [{"value": "M Sport Pro", "price": 2300}]
        }
    });

    let (status, body) = send(&app, "POST", "/api/validate-configuration", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"][0]["type"], "missing_required_options");
    assert_eq!(body["warnings"], json!([]));
}

#[tokio::test]
async fn test_validate_configuration_engine_drivetrain() {
    let app = app().await;
    let request = json!({
        "model": "i4",
        "configuration": {
            "engine": {"value": "Electric Motor", "price": 0},
            "drivetrain": {"value": "xDrive", "price": 2000}
        }
    });

    let (status, body) = send(&app, "POST", "/api/validate-configuration", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"][0]["type"], "engine_drivetrain_incompatible");
    assert_eq!(body["errors"][0]["available_drivetrains"], json!(["sDrive"]));
}

#[tokio::test]
async fn test_save_without_name_is_untitled() {
    let app = app().await;

    let (status, saved) = send(
        &app,
        "POST",
        "/api/save-configuration",
        Some(json!({"model": "X3", "configuration": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = saved["id"].as_str().unwrap().to_string();

    let (status, loaded) = send(&app, "GET", &format!("/api/load-configuration/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["name"], "Untitled Configuration");
}

#[tokio::test]
async fn test_malformed_bodies_return_json_errors() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/save-configuration",
        Some(json!({"name": "x", "configuration": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "bad_request");
    assert!(body["error"]["message"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/api/calculate-price",
        Some(json!({"model": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "bad_request");
}

#[tokio::test]
async fn test_save_load_list_delete() {
    let app = app().await;
    let configuration = json!({
        "exterior_color": {"value": "Black Sapphire Metallic", "price": 650.0},
        "individual_options": [{"value": "Sunroof", "price": 1200.0}]
    });

    let (status, saved) = send(
        &app,
        "POST",
        "/api/save-configuration",
        Some(json!({
            "name": "Weekend",
            "model": "X3",
            "configuration": configuration,
            "totalPrice": 46850.0,
            "timestamp": "2026-10-17T09:30:00.000Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["success"], true);
    let id = saved["id"].as_str().unwrap().to_string();

    let (status, loaded) = send(&app, "GET", &format!("/api/load-configuration/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["success"], true);
    assert_eq!(loaded["name"], "Weekend");
    assert_eq!(loaded["totalPrice"], 46850.0);
    assert_eq!(loaded["configuration"], configuration);

    send(
        &app,
        "POST",
        "/api/save-configuration",
        Some(json!({"name": "", "model": null, "configuration": {}})),
    )
    .await;

    let (status, list) = send(&app, "GET", "/api/configurations", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Untitled Configuration", "Weekend"]);

    let (status, deleted) = send(&app, "DELETE", &format!("/api/configurations/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);

    let (status, body) = send(&app, "GET", &format!("/api/load-configuration/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "DELETE", &format!("/api/configurations/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
