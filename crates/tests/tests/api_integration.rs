use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use rihla_api::build_app;
use serde_json::json;
use tower::ServiceExt;

const API_KEY: &str = "dev-rihla-key";

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app().await.expect("app should build");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_reports_latency_after_traffic() {
    let app = build_app().await.expect("app should build");

    let record = Request::builder()
        .method("POST")
        .uri("/v1/interactions")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "session_id": "s-metrics",
                "user_message": "hello",
                "ai_response": "hi"
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(record).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(health).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    let metrics = &parsed["metrics"];
    assert!(metrics["requests_total"].as_u64().unwrap() >= 2);
    assert!(metrics["interactions_total"].as_u64().unwrap() >= 1);
    assert!(metrics["avg_latency_millis"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn interactions_require_api_key() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/interactions")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "session_id": "s-unauth",
                "user_message": "hello",
                "ai_response": "hi"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn interaction_flow_updates_conversation_context() {
    let app = build_app().await.expect("app should build");

    let first = Request::builder()
        .method("POST")
        .uri("/v1/interactions")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "session_id": "s-flow",
                "user_message": "hello, can you help me plan a trip?",
                "ai_response": "Of course!",
                "locale": "en"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(first).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    let context = &parsed["memory"]["conversation_context"];
    assert_eq!(context["conversation_flow"], "greeting");
    assert_eq!(context["current_topic"], "general");
    assert_eq!(parsed["memory"]["total_interactions"], 1);

    let second = Request::builder()
        .method("POST")
        .uri("/v1/interactions")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "session_id": "s-flow",
                "user_message": "What's the weather in Mecca this month?",
                "ai_response": "Warm days ahead",
                "locale": "en"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(second).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    let context = &parsed["memory"]["conversation_context"];
    assert_eq!(context["conversation_flow"], "recommendation");
    assert_eq!(context["current_topic"], "weather");
    assert_eq!(context["previous_topics"], json!(["general"]));
    assert_eq!(parsed["memory"]["total_interactions"], 2);
}

#[tokio::test]
async fn export_then_import_round_trips_over_http() {
    let app = build_app().await.expect("app should build");

    let record = Request::builder()
        .method("POST")
        .uri("/v1/interactions")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "session_id": "s-export",
                "user_message": "أبحث عن فندق في جدة",
                "ai_response": "تم",
                "locale": "ar"
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(record).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let export = Request::builder()
        .uri("/v1/sessions/s-export")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(export).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let exported = body_json(response).await;
    assert_eq!(exported["preferred_language"], "ar");

    let clear = Request::builder()
        .method("POST")
        .uri("/v1/sessions/s-export/clear")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(clear).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let missing = Request::builder()
        .uri("/v1/sessions/s-export")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(missing).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let import = Request::builder()
        .method("POST")
        .uri("/v1/sessions/import")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(exported.to_string()))
        .unwrap();
    let response = app.clone().oneshot(import).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let restored = Request::builder()
        .uri("/v1/sessions/s-export")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(restored).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, exported);
}

#[tokio::test]
async fn greeting_and_suggestions_reflect_stored_profile() {
    let app = build_app().await.expect("app should build");

    let record = Request::builder()
        .method("POST")
        .uri("/v1/interactions")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "session_id": "s-greet",
                "user_message": "I need a hotel near the corniche",
                "ai_response": "Let me look",
                "locale": "en"
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(record).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let prefs = Request::builder()
        .method("POST")
        .uri("/v1/sessions/s-greet/preferences/personal")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "display_name": "Omar",
                "title": "Mr."
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(prefs).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let greeting = Request::builder()
        .uri("/v1/sessions/s-greet/greeting?locale=en")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(greeting).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    let text = parsed["greeting"].as_str().unwrap();
    assert!(text.contains("Welcome back"));
    assert!(text.contains("Mr. Omar"));

    let suggestions = Request::builder()
        .uri("/v1/sessions/s-greet/suggestions?locale=en")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(suggestions).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    let items = parsed["suggestions"].as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items[0].as_str().unwrap().contains("stays"));
}

#[tokio::test]
async fn calendar_endpoints_resolve_locale_and_date() {
    let app = build_app().await.expect("app should build");

    let holidays = Request::builder()
        .uri("/v1/calendar/holidays?date=2025-03-15&locale=en")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(holidays).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    let ids: Vec<&str> = parsed["holidays"]
        .as_array()
        .unwrap()
        .iter()
        .map(|holiday| holiday["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec!["saudi-founding-day", "ramadan-start", "eid-al-fitr"]
    );

    let season = Request::builder()
        .uri("/v1/calendar/season?date=2025-07-10&locale=ar")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(season).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["season"]["id"], "summer");

    let bad_date = Request::builder()
        .uri("/v1/calendar/season?date=july-10")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(bad_date).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
