use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .new_user("alice", Some("Alice"), "secret")
        .await
        .unwrap();
    engine.new_user("bob", Some("Bob"), "secret").await.unwrap();
    engine.new_user("carol", None, "secret").await.unwrap();
    server::router(engine)
}

fn basic(user: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:secret")))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn trip_with_everyone(app: &Router) -> String {
    let body = json!({"name": "Lisbon"});
    let (status, trip) = call(app, "POST", "/trips", "alice", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let trip_id = trip["id"].as_str().unwrap().to_string();

    for user in ["bob", "@carol"] {
        let (status, _) = call(
            app,
            "POST",
            &format!("/trips/{trip_id}/participants"),
            "alice",
            Some(json!({"user": user})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    trip_id
}

#[tokio::test]
async fn missing_or_wrong_credentials_are_rejected() {
    let app = app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/trips/whatever")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_ne!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("GET")
        .uri("/trips/whatever")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("alice:wrong")),
        )
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn trip_creator_is_first_participant() {
    let app = app().await;
    let body = json!({"name": "Lisbon"});
    let (status, trip) = call(&app, "POST", "/trips", "alice", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let trip_id = trip["id"].as_str().unwrap();

    let (status, fetched) = call(&app, "GET", &format!("/trips/{trip_id}"), "bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Lisbon");

    let (_, participants) =
        call(&app, "GET", &format!("/trips/{trip_id}/participants"), "alice", None).await;
    let participants = participants["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["user_id"], trip["created_by"]);
}

#[tokio::test]
async fn equal_expense_shows_up_in_balances_and_summary() {
    let app = app().await;
    let trip_id = trip_with_everyone(&app).await;

    let (status, expense) = call(
        &app,
        "POST",
        &format!("/trips/{trip_id}/expenses"),
        "alice",
        Some(json!({
            "name": "Hotel",
            "category": "lodging",
            "amount_minor": 300000,
            "date": "2026-07-01T20:00:00+01:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["shares"].as_array().unwrap().len(), 3);

    let uri = format!("/trips/{trip_id}/balances");
    let (status, balances) = call(&app, "GET", &uri, "bob", None).await;
    assert_eq!(status, StatusCode::OK);
    let balances = balances["balances"].as_array().unwrap();
    let net_total: i64 = balances
        .iter()
        .map(|b| b["net_balance_minor"].as_i64().unwrap())
        .sum();
    assert_eq!(net_total, 0);

    let alice = balances.iter().find(|b| b["display_name"] == "Alice").unwrap();
    assert_eq!(alice["net_balance_minor"], 200000);
    assert!(alice["transactions"].as_array().unwrap().is_empty());
    let bob = balances.iter().find(|b| b["display_name"] == "Bob").unwrap();
    assert_eq!(bob["transactions"][0]["amount_minor"], 100000);
    assert_eq!(bob["transactions"][0]["to_user_id"], alice["user_id"]);

    let uri = format!("/trips/{trip_id}/summary");
    let (status, summary) = call(&app, "GET", &uri, "carol", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["trip_name"], "Lisbon");
    assert_eq!(summary["total_expense_minor"], 300000);
    assert_eq!(summary["expenses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn custom_split_paid_by_someone_else() {
    let app = app().await;
    let trip_id = trip_with_everyone(&app).await;

    let (status, expense) = call(
        &app,
        "POST",
        &format!("/trips/{trip_id}/expenses"),
        "alice",
        Some(json!({
            "name": "Dinner",
            "category": null,
            "amount_minor": 9000,
            "date": "2026-07-02T21:00:00Z",
            "payer": "bob",
            "split": {"kind": "custom", "amounts": [
                {"user": "alice", "amount_minor": 6000},
                {"user": "bob", "amount_minor": 3000}
            ]}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["shares"].as_array().unwrap().len(), 2);

    let (_, listed) = call(&app, "GET", &format!("/trips/{trip_id}/expenses"), "alice", None).await;
    let listed = listed["expenses"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["payer_id"], expense["payer_id"]);
}

#[tokio::test]
async fn engine_errors_map_to_statuses() {
    let app = app().await;
    let trip_id = trip_with_everyone(&app).await;

    let (status, body) = call(&app, "GET", "/trips/missing/balances", "alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &app,
        "POST",
        &format!("/trips/{trip_id}/expenses"),
        "alice",
        Some(json!({
            "name": "Taxi",
            "category": null,
            "amount_minor": 0,
            "date": "2026-07-02T21:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/trips/{trip_id}/expenses"),
        "alice",
        Some(json!({
            "name": "Taxi",
            "category": null,
            "amount_minor": 1000,
            "date": "2026-07-02T21:00:00Z",
            "split": {"kind": "custom", "amounts": [
                {"user": "alice", "amount_minor": 300},
                {"user": "bob", "amount_minor": 300}
            ]}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/trips/{trip_id}/participants"),
        "alice",
        Some(json!({"user": "nobody"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
