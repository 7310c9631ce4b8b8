//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use booking::OrchestratorConfig;
use booking_store::InMemoryBookingStore;
use chrono::NaiveDate;
use common::{HotelId, RoomId, UserId};
use domain::{Money, RoomInfo, RoomType, UserProfile};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, Arc<AppState<InMemoryBookingStore>>) {
    let state =
        api::create_default_state(InMemoryBookingStore::new(), OrchestratorConfig::default());

    state.directory().insert_user(UserProfile {
        user_id: UserId::new(1),
        email: "guest@example.com".to_string(),
        age: 30,
    });
    state.directory().insert_user(UserProfile {
        user_id: UserId::new(2),
        email: "teen@example.com".to_string(),
        age: 17,
    });
    state.inventory().add_room(
        HotelId::new(5),
        RoomInfo::new(
            RoomId::new(501),
            RoomType::new("Deluxe").unwrap(),
            Money::from_dollars(150),
        )
        .with_last_check_out(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
    );

    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

fn booking_body(user_id: i64, check_in: &str, check_out: &str) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "hotel_id": 5,
        "room_id": 501,
        "room_type": "Deluxe",
        "check_in": check_in,
        "check_out": check_out,
    })
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, json) = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_and_get_booking() {
    let (app, _) = setup();

    let (status, json) = send(
        &app,
        json_request("POST", "/bookings", &booking_body(1, "2024-01-10", "2024-01-12")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["kind"], "booking");
    let id = json["id"].as_i64().unwrap();
    assert!(json["message"].as_str().unwrap().contains(&id.to_string()));

    let (status, json) = send(&app, empty_request("GET", &format!("/bookings/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["room_id"], 501);
    assert_eq!(json["room_type"], "Deluxe");
    assert_eq!(json["check_in"], "2024-01-10");
    assert_eq!(json["nights"], 2);
    assert_eq!(json["total_cents"], 30_000);
    assert_eq!(json["status"], "Active");
}

#[tokio::test]
async fn test_unavailable_room_falls_back_to_waitlist() {
    let (app, state) = setup();

    let (status, json) = send(
        &app,
        json_request("POST", "/bookings", &booking_body(1, "2024-01-09", "2024-01-11")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["kind"], "waitlist");
    assert!(state.inventory().availability_changes().is_empty());

    let id = json["id"].as_i64().unwrap();
    let (status, json) = send(&app, empty_request("GET", &format!("/waitlist/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Waiting");
    assert_eq!(json["user_email"], "guest@example.com");
}

#[tokio::test]
async fn test_minor_is_forbidden() {
    let (app, _) = setup();

    let (status, json) = send(
        &app,
        json_request("POST", "/bookings", &booking_body(2, "2024-01-10", "2024-01-12")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["kind"], "IneligibleUser");
}

#[tokio::test]
async fn test_invalid_dates_are_bad_request() {
    let (app, _) = setup();

    let (status, json) = send(
        &app,
        json_request("POST", "/bookings", &booking_body(1, "2024-01-12", "2024-01-10")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "InvalidRequest");
}

#[tokio::test]
async fn test_cancel_missing_booking_is_not_found() {
    let (app, _) = setup();

    let (status, json) = send(&app, empty_request("POST", "/bookings/999/cancel")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "BookingNotFound");
}

#[tokio::test]
async fn test_update_and_cancel_booking() {
    let (app, state) = setup();
    let (_, json) = send(
        &app,
        json_request("POST", "/bookings", &booking_body(1, "2024-01-10", "2024-01-12")),
    )
    .await;
    let id = json["id"].as_i64().unwrap();

    let change = serde_json::json!({
        "room_id": 501,
        "room_type": "Deluxe",
        "check_in": "2024-01-10",
        "check_out": "2024-01-15",
    });
    let (status, _) = send(&app, json_request("PUT", &format!("/bookings/{id}"), &change)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, empty_request("GET", &format!("/bookings/{id}"))).await;
    assert_eq!(json["total_cents"], 75_000);

    let (status, _) = send(&app, empty_request("POST", &format!("/bookings/{id}/cancel"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, empty_request("GET", &format!("/bookings/{id}"))).await;
    assert_eq!(json["status"], "Cancelled");
    assert!(
        state
            .inventory()
            .room(HotelId::new(5), RoomId::new(501))
            .unwrap()
            .available
    );

    let (status, json) = send(&app, json_request("PUT", &format!("/bookings/{id}"), &change)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["kind"], "BookingCancelled");
}

#[tokio::test]
async fn test_waitlist_crud() {
    let (app, _) = setup();
    let body = serde_json::json!({
        "user_id": 1,
        "user_email": "guest@example.com",
        "hotel_id": 5,
        "room_type": "Deluxe",
        "check_in": "2024-02-01",
        "check_out": "2024-02-03",
    });

    let (status, json) = send(&app, json_request("POST", "/waitlist", &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["id"].as_i64().unwrap();

    let change = serde_json::json!({
        "hotel_id": 6,
        "room_type": "Suite",
        "check_in": "2024-03-01",
        "check_out": "2024-03-04",
    });
    let (status, _) = send(&app, json_request("PUT", &format!("/waitlist/{id}"), &change)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, empty_request("DELETE", &format!("/waitlist/{id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, empty_request("GET", &format!("/waitlist/{id}"))).await;
    assert_eq!(json["hotel_id"], 6);
    assert_eq!(json["status"], "Cancelled");

    let (status, json) = send(&app, empty_request("GET", "/waitlist/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "WaitlistEntryNotFound");
}

#[tokio::test]
async fn test_correlation_header_is_accepted() {
    let (app, _) = setup();

    let request = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header("content-type", "application/json")
        .header(
            api::routes::CORRELATION_HEADER,
            "6f1c2b1e-3f4a-4c6e-9a0b-2d9f8e7c6b5a",
        )
        .body(Body::from(
            booking_body(1, "2024-01-10", "2024-01-12").to_string(),
        ))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let malformed = Request::builder()
        .uri("/bookings/1")
        .header(api::routes::CORRELATION_HEADER, "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();
    send(
        &app,
        json_request("POST", "/bookings", &booking_body(1, "2024-01-10", "2024-01-12")),
    )
    .await;

    let response = app
        .oneshot(empty_request("GET", "/metrics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("booking_operations_total"));
}
