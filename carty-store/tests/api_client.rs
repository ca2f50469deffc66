use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use carty_core::search::{SearchForm, TripType};
use carty_core::{CoreError, Credentials, RentalBackend};
use carty_shared::models::{AuthScheme, TempBookingId};
use carty_shared::Money;
use carty_store::app_config::ApiConfig;
use carty_store::ApiClient;
use serde_json::{json, Value};
use std::collections::HashMap;

async fn available(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let cars = if params.get("trip_type").map(String::as_str) == Some("Hourly") {
        json!([{"id": 5, "name": "Swift", "base_fare": "1000.00", "seats": 5}])
    } else {
        json!([])
    };
    Json(json!({ "count": 1, "results": cars }))
}

async fn car_detail(Path(id): Path<i64>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != "Bearer abc" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"id": id, "name": "Swift", "brand": "Maruti", "model": "Swift VXi", "base_fare": 1000})),
    )
}

async fn create_temp(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["trip_type"] == "Hourly Rental" && body["package"] == "3" && body.get("drop_location").is_none() {
        (StatusCode::CREATED, Json(json!({"temp_id": "t-9"})))
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({"detail": "bad payload"})))
    }
}

async fn temp_booking(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "id": id,
        "trip_type": "Hourly Rental",
        "pickup_location": "Chennai Airport",
        "start_datetime": "2025-08-11T10:00:00Z",
        "package": 3
    }))
}

async fn locations(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("search").cloned().unwrap_or_default();
    Json(json!([{"id": 1, "name": format!("{} Airport", q)}]))
}

async fn faqs() -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"})))
}

async fn packages() -> &'static str {
    "<html>not json</html>"
}

async fn spawn_stub() -> ApiClient {
    let app = Router::new()
        .route("/api/cars/available/", get(available))
        .route("/api/cars/{id}/", get(car_detail))
        .route("/api/booking-temp/", post(create_temp))
        .route("/api/booking-temp/{id}/", get(temp_booking))
        .route("/api/locations/", get(locations))
        .route("/api/faqs/", get(faqs))
        .route("/api/packages/", get(packages));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ApiClient::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_seconds: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_paged_car_list_with_query() {
    let client = spawn_stub().await;
    let query = vec![
        ("trip_type".to_string(), "Hourly".to_string()),
        ("price_max".to_string(), "10000".to_string()),
    ];
    let cars = client.available_cars(&query).await.unwrap();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].base_fare, Money::from_rupees(1000));
}

#[tokio::test]
async fn test_credentials_are_sent_as_authorization_header() {
    let client = spawn_stub().await;
    let car = client
        .get_car(&Credentials::new(AuthScheme::Jwt, "abc"), 5)
        .await
        .unwrap();
    assert_eq!(car.display_name(), "Maruti Swift VXi");

    let err = client
        .get_car(&Credentials::new(AuthScheme::Token, "abc"), 5)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::backend(401, "Authentication credentials were not provided.")
    );
}

#[tokio::test]
async fn test_temp_booking_round_trip() {
    let client = spawn_stub().await;
    let credentials = Credentials::new(AuthScheme::Jwt, "abc");
    let form = SearchForm {
        pickup: "Chennai Airport".to_string(),
        start_date: "2025-08-11".to_string(),
        start_time: "10:00".to_string(),
        package: "3".to_string(),
        ..SearchForm::new(TripType::Hourly)
    };
    let created = client
        .create_temp_booking(&credentials, &form.payload())
        .await
        .unwrap();
    let id = created.temp_id.unwrap();
    assert_eq!(id, TempBookingId::new("t-9"));

    let temp = client.get_temp_booking(&credentials, &id).await.unwrap();
    assert_eq!(temp.package.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_location_search_sends_query() {
    let client = spawn_stub().await;
    let found = client.search_locations("Chennai").await.unwrap();
    assert_eq!(found[0].name, "Chennai Airport");
}

#[tokio::test]
async fn test_error_bodies_are_reported() {
    let client = spawn_stub().await;
    assert_eq!(
        client.list_faqs().await.unwrap_err(),
        CoreError::backend(500, "boom")
    );
    assert!(matches!(
        client.list_packages().await.unwrap_err(),
        CoreError::InvalidResponse(_)
    ));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    let client = ApiClient::new(&ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_seconds: 1,
    })
    .unwrap();
    assert!(matches!(
        client.list_cars().await.unwrap_err(),
        CoreError::TransportError(_)
    ));
}
