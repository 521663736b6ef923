//! End-to-end API tests driving the full router over `tower::oneshot`:
//! auth enforcement, error mapping, and a complete city track down to
//! certificate release.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use storage::Database;
use tower::ServiceExt;
use web::build_router;
use web::middleware::auth::ApiKeys;

const API_KEY: &str = "test-key";

async fn test_app() -> Router {
    let db = Database::in_memory().await.unwrap();
    db.run_migrations().await.unwrap();
    build_router(db, ApiKeys::from_comma_separated(API_KEY))
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
    authed: bool,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if authed {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {API_KEY}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// Seed a competition with one city and `n` participants through the API.
/// Returns (competition_id, city_id, participation_ids).
async fn seed_city(app: &Router, n: i64) -> (i64, i64, Vec<i64>) {
    let (status, competition) = send(
        app,
        "POST",
        "/api/competitions",
        Some(json!({ "name": "City League", "status": "ACTIVE", "registration_open": true })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let competition_id = competition["competition_id"].as_i64().unwrap();

    let (status, city) = send(app, "POST", "/api/cities", Some(json!({ "name": "Lyon" })), true).await;
    assert_eq!(status, StatusCode::CREATED);
    let city_id = city["city_id"].as_i64().unwrap();

    let (status, _) = send(
        app,
        "POST",
        &format!("/api/competitions/{competition_id}/cities"),
        Some(json!({ "city_id": city_id })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut participation_ids = Vec::new();
    for i in 1..=n {
        let (status, participation) = send(
            app,
            "POST",
            &format!("/api/competitions/{competition_id}/participations"),
            Some(json!({ "user_id": 100 + i, "full_name": format!("Player {i}"), "city_id": city_id })),
            false,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        participation_ids.push(participation["participation_id"].as_i64().unwrap());
    }

    (competition_id, city_id, participation_ids)
}

async fn create_round(app: &Router, competition_id: i64, city_id: i64, is_finale: bool) -> i64 {
    let (status, round) = send(
        app,
        "POST",
        &format!("/api/competitions/{competition_id}/cities/{city_id}/rounds"),
        Some(json!({ "is_finale": is_finale })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    round["round_id"].as_i64().unwrap()
}

async fn add_participants(app: &Router, round_id: i64, participation_ids: &[i64]) {
    for participation_id in participation_ids {
        let (status, _) = send(
            app,
            "POST",
            &format!("/api/rounds/{round_id}/participants"),
            Some(json!({ "participation_id": participation_id })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/health", None, false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, spec) = send(&app, "GET", "/api-docs/openapi.json", None, false).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"].get("/api/rounds/{id}/promote").is_some());
}

#[tokio::test]
async fn mutating_routes_require_a_valid_api_key() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/competitions",
        Some(json!({ "name": "No auth" })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/competitions")
        .header(header::AUTHORIZATION, "Bearer wrong-key")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "Bad key" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // reads stay public
    let (status, _) = send(&app, "GET", "/api/competitions", None, false).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn validation_and_missing_resources_map_to_400_and_404() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/competitions",
        Some(json!({ "name": "" })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");

    let (status, _) = send(&app, "GET", "/api/competitions/999", None, false).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/rounds/999", None, false).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn score_batch_reports_per_row_outcomes_over_http() {
    let app = test_app().await;
    let (competition_id, city_id, players) = seed_city(&app, 3).await;
    let round_id = create_round(&app, competition_id, city_id, false).await;
    add_participants(&app, round_id, &players).await;

    let (status, outcome) = send(
        &app,
        "POST",
        &format!("/api/rounds/{round_id}/scores/batch"),
        Some(json!({ "entries": [
            { "participation_id": players[0], "score": "95.5" },
            { "participation_id": players[1], "score": "88" },
            { "participation_id": players[2], "score": "oops" },
        ]})),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["success"], 2);
    assert_eq!(outcome["failed"], 1);

    let (status, leaderboard) = send(
        &app,
        "GET",
        &format!("/api/rounds/{round_id}/leaderboard"),
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = leaderboard.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["participation_id"].as_i64().unwrap(), players[0]);
    assert_eq!(entries[0]["rank_in_round"], 1);
}

#[tokio::test]
async fn promotion_conflicts_surface_as_http_errors() {
    let app = test_app().await;
    let (competition_id, city_id, players) = seed_city(&app, 2).await;
    let round_id = create_round(&app, competition_id, city_id, false).await;
    add_participants(&app, round_id, &players).await;

    // no next round yet
    send(
        &app,
        "POST",
        &format!("/api/rounds/{round_id}/scores/batch"),
        Some(json!({ "entries": [
            { "participation_id": players[0], "score": "10" },
            { "participation_id": players[1], "score": "20" },
        ]})),
        true,
    )
    .await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/rounds/{round_id}/promote"),
        Some(json!({ "count": 1 })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    create_round(&app, competition_id, city_id, true).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/rounds/{round_id}/promote"),
        Some(json!({ "count": 5 })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, outcome) = send(
        &app,
        "POST",
        &format!("/api/rounds/{round_id}/promote"),
        Some(json!({ "count": 2 })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["promoted"], 2);
}

#[tokio::test]
async fn full_city_track_down_to_certificates() {
    let app = test_app().await;
    let (competition_id, city_id, players) = seed_city(&app, 4).await;

    let round1 = create_round(&app, competition_id, city_id, false).await;
    let finale = create_round(&app, competition_id, city_id, true).await;
    add_participants(&app, round1, &players).await;

    send(
        &app,
        "POST",
        &format!("/api/rounds/{round1}/scores/batch"),
        Some(json!({ "entries": [
            { "participation_id": players[0], "score": "40" },
            { "participation_id": players[1], "score": "30" },
            { "participation_id": players[2], "score": "20" },
            { "participation_id": players[3], "score": "10" },
        ]})),
        true,
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/rounds/{round1}/promote"),
        Some(json!({ "count": 2 })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    send(
        &app,
        "POST",
        &format!("/api/rounds/{finale}/scores/batch"),
        Some(json!({ "entries": [
            { "participation_id": players[0], "score": "9" },
            { "participation_id": players[1], "score": "8" },
        ]})),
        true,
    )
    .await;

    // winner selection needs the finale's round_participation_id
    let (status, detail) = send(&app, "GET", &format!("/api/rounds/{finale}"), None, false).await;
    assert_eq!(status, StatusCode::OK);
    let winner_rp = detail["participants"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["participation_id"].as_i64().unwrap() == players[0])
        .unwrap()["round_participation_id"]
        .as_i64()
        .unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/rounds/{finale}/winners"),
        Some(json!({ "winners": [{ "round_participation_id": winner_rp, "position": 1 }] })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // finishing before winners would have been 409; now it succeeds
    let (status, city_state) = send(
        &app,
        "POST",
        &format!("/api/competitions/{competition_id}/cities/{city_id}/finish"),
        None,
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(city_state["is_finished"], true);

    // the whole competition is now complete
    let (_, competition) = send(
        &app,
        "GET",
        &format!("/api/competitions/{competition_id}"),
        None,
        false,
    )
    .await;
    assert_eq!(competition["status"], "COMPLETED");

    let (status, generated) = send(
        &app,
        "POST",
        "/api/certificates/generate/competition",
        Some(json!({ "competition_id": competition_id, "template_id": 1 })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["created"], 4);

    let (status, preview) = send(
        &app,
        "GET",
        &format!(
            "/api/certificates/preview?participation_id={}&template_id=1",
            players[0]
        ),
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["result_status"], "WINNER");
    assert_eq!(preview["position"], 1);

    let (status, released) = send(
        &app,
        "POST",
        "/api/certificates/release",
        Some(json!({ "competition_id": competition_id })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(released["affected"], 4);

    let (status, summary) = send(
        &app,
        "GET",
        &format!("/api/certificates/summary?competition_id={competition_id}"),
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total"], 4);
    assert_eq!(summary["released"], 4);

    // bulk revoke without a reason is rejected
    let (status, _) = send(
        &app,
        "POST",
        "/api/certificates/revoke",
        Some(json!({ "competition_id": competition_id, "reason": " " })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn winner_selection_on_a_non_finale_round_is_a_conflict() {
    let app = test_app().await;
    let (competition_id, city_id, players) = seed_city(&app, 1).await;
    let round_id = create_round(&app, competition_id, city_id, false).await;
    add_participants(&app, round_id, &players).await;
    send(
        &app,
        "POST",
        &format!("/api/rounds/{round_id}/scores/batch"),
        Some(json!({ "entries": [{ "participation_id": players[0], "score": "1" }] })),
        true,
    )
    .await;

    let (_, detail) = send(&app, "GET", &format!("/api/rounds/{round_id}"), None, false).await;
    let rp = detail["participants"][0]["round_participation_id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/rounds/{round_id}/winners"),
        Some(json!({ "winners": [{ "round_participation_id": rp, "position": 1 }] })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
