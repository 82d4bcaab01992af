//! Adaptive assessment flows over HTTP

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use compass_server::AppState;
use serde_json::{Value, json};

async fn post(app: &common::TestApp, path: &str, body: Value) -> axum_test::TestResponse {
    let (name, value) = app.auth();
    app.server.post(path).add_header(name, value).json(&body).await
}

async fn get(app: &common::TestApp, path: &str) -> axum_test::TestResponse {
    let (name, value) = app.auth();
    app.server.get(path).add_header(name, value).await
}

fn question_ids(body: &Value) -> Vec<String> {
    body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["question_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn initialize_seeds_catalog_once() {
    let state = Arc::new(AppState::new_in_memory().unwrap());
    let app = common::create_test_app_with_state(state);

    let first = post(&app, "/api/adaptive/initialize", json!({})).await;
    first.assert_status_ok();
    assert_eq!(first.json::<Value>()["questions_inserted"], 15);

    let second = post(&app, "/api/adaptive/initialize", json!({})).await;
    assert_eq!(second.json::<Value>()["questions_inserted"], 0);
    assert_eq!(second.json::<Value>()["questions_existing"], 15);
}

#[tokio::test]
async fn start_classifies_from_initial_responses() {
    let app = common::create_test_app();
    let response = post(
        &app,
        "/api/adaptive/start",
        json!({"initial_responses": {"work_experience": 6, "leadership_roles": 1}}),
    )
    .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["path_type"], "experienced_professional");
    assert_eq!(body["path_config"]["question_priorities"], json!([1, 2]));
    assert_eq!(body["questions"].as_array().unwrap().len(), 5);
    assert_eq!(body["progress"]["total_questions"], 10);
}

#[tokio::test]
async fn start_without_answers_is_beginner() {
    let app = common::create_test_app();
    let body = post(&app, "/api/adaptive/start", json!({}))
        .await
        .json::<Value>();
    assert_eq!(body["path_type"], "beginner_entrepreneur");
    assert_eq!(body["questions"][0]["explanation_level"], "detailed");
}

#[tokio::test]
async fn answer_then_next_excludes_answered() {
    let app = common::create_test_app();
    post(&app, "/api/adaptive/start", json!({})).await;

    let response = post(
        &app,
        "/api/adaptive/response",
        json!({"question_id": "core_motivation", "response_value": "freedom", "time_spent": 90}),
    )
    .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["progress"]["questions_completed"], 1);
    assert_eq!(body["progress"]["current_question_id"], "core_motivation");

    let next = post(&app, "/api/adaptive/questions/next", json!({})).await;
    next.assert_status_ok();
    let body = next.json::<Value>();
    assert!(!question_ids(&body).contains(&"core_motivation".to_string()));
    assert_eq!(body["has_more_questions"], true);
}

#[tokio::test]
async fn response_missing_fields_is_bad_request() {
    let app = common::create_test_app();
    let response = post(&app, "/api/adaptive/response", json!({"question_id": "risk_tolerance"})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn response_to_unknown_question_is_not_found() {
    let app = common::create_test_app();
    let response = post(
        &app,
        "/api/adaptive/response",
        json!({"question_id": "favourite_colour", "response_value": "teal"}),
    )
    .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn skipping_completed_question_conflicts() {
    let app = common::create_test_app();
    post(
        &app,
        "/api/adaptive/response",
        json!({"question_id": "risk_tolerance", "response_value": 7}),
    )
    .await
    .assert_status_ok();

    let response = post(&app, "/api/adaptive/skip", json!({"question_id": "risk_tolerance"})).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], "CONFLICT");

    let response = post(&app, "/api/adaptive/skip", json!({"question_id": "core_motivation"})).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["questions_skipped"], 1);
}

#[tokio::test]
async fn pre_populate_saves_suggestions() {
    let app = common::create_test_app();
    for (id, value) in [("current_savings", 12000), ("monthly_expenses", 3000)] {
        let response = post(
            &app,
            "/api/adaptive/response",
            json!({"question_id": id, "response_value": value}),
        )
        .await;
        response.assert_status_ok();
    }

    let response = post(&app, "/api/adaptive/pre-populate", json!({})).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["pre_populated_count"], 1);
    assert_eq!(body["pre_populated_questions"][0]["question_id"], "financial_runway");
    assert_eq!(body["pre_populated_questions"][0]["pre_populated_value"], "4");
    assert_eq!(body["pre_populated_questions"][0]["response_value"], 4);

    let analytics = get(&app, "/api/adaptive/analytics").await.json::<Value>();
    assert_eq!(analytics["total_responses"], 3);
    assert_eq!(analytics["pre_populated_responses"], 1);
    assert_eq!(analytics["question_categories"]["finances"], 3);
}

#[tokio::test]
async fn path_update_reports_change() {
    let app = common::create_test_app();
    post(&app, "/api/adaptive/start", json!({})).await;
    for (id, value) in [("work_experience", 9), ("leadership_roles", 2)] {
        post(
            &app,
            "/api/adaptive/response",
            json!({"question_id": id, "response_value": value}),
        )
        .await
        .assert_status_ok();
    }

    let body = post(&app, "/api/adaptive/path/update", json!({}))
        .await
        .json::<Value>();
    assert_eq!(body["path_changed"], true);
    assert_eq!(body["path_type"], "experienced_professional");

    let body = post(&app, "/api/adaptive/path/update", json!({}))
        .await
        .json::<Value>();
    assert_eq!(body["path_changed"], false);
}

#[tokio::test]
async fn progress_before_start_is_not_started() {
    let app = common::create_test_app();
    let response = get(&app, "/api/adaptive/progress").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "not_started");
    assert_eq!(body["completion_percentage"], 0.0);
}
