mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Json, Path as AxumPath, Query, State};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use chrono::{NaiveDate, Utc};
use rihla_core::{
    calendar, ConversationMemory, CulturalPreferencesUpdate, InteractionExtra, Locale,
    PersonalPreferencesUpdate, TravelInteraction,
};
use rihla_engine::MemoryEngine;
use rihla_observability::AppMetrics;
use rihla_storage::Store;
use serde::{Deserialize, Serialize};

use crate::rate_limit::IpRateLimiter;

const MAX_SESSION_ID_LEN: usize = 128;
const MAX_MESSAGE_LEN: usize = 8_000;
const DEFAULT_RECENT_COUNT: usize = 10;
const MAX_RECENT_COUNT: usize = 50;

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<MemoryEngine<Store>>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    sessions: usize,
    metrics: rihla_observability::MetricsSnapshot,
}

#[derive(Debug, Deserialize)]
struct SessionCreateRequest {
    session_id: String,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InteractionRequest {
    session_id: String,
    user_message: String,
    ai_response: String,
    locale: Option<String>,
    #[serde(default)]
    extra: Option<InteractionExtra>,
}

#[derive(Debug, Serialize)]
struct InteractionResponse {
    interaction: TravelInteraction,
    memory: ConversationMemory,
}

#[derive(Debug, Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct CalendarQuery {
    date: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Serialize)]
struct HolidayView {
    id: &'static str,
    name: &'static str,
    significance: &'static str,
    travel_considerations: &'static str,
    recommendations: &'static str,
    date: NaiveDate,
    is_lunar: bool,
    category: calendar::HolidayCategory,
}

#[derive(Debug, Serialize)]
struct SeasonView {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    travel_impact: &'static str,
    recommendations: &'static str,
}

pub async fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();

    let store = match env::var("RIHLA_SNAPSHOT_PATH") {
        Ok(path) if !path.trim().is_empty() => Store::file(path),
        _ => Store::ephemeral(),
    };

    let engine = Arc::new(MemoryEngine::load(Arc::new(store), metrics.clone()).await);

    let api_key = env::var("RIHLA_API_KEY").unwrap_or_else(|_| "dev-rihla-key".to_string());
    let rate_limit_window = Duration::from_secs(
        env::var("RIHLA_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let rate_limit_max = env::var("RIHLA_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(120);

    let state = ApiState {
        engine,
        metrics,
        api_key,
        limiter: IpRateLimiter::new(rate_limit_window, rate_limit_max),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    use tower_http::limit::RequestBodyLimitLayer;
    use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/health", get(health))
        .route("/v1/sessions", post(session_create))
        .route("/v1/sessions/import", post(session_import))
        .route("/v1/sessions/:session_id", get(session_export))
        .route("/v1/sessions/:session_id/clear", post(session_clear))
        .route(
            "/v1/sessions/:session_id/preferences/personal",
            post(personal_preferences_update),
        )
        .route(
            "/v1/sessions/:session_id/preferences/cultural",
            post(cultural_preferences_update),
        )
        .route("/v1/sessions/:session_id/greeting", get(session_greeting))
        .route(
            "/v1/sessions/:session_id/suggestions",
            get(session_suggestions),
        )
        .route("/v1/sessions/:session_id/recent", get(session_recent))
        .route("/v1/interactions", post(interaction_record))
        .route("/v1/calendar/holidays", get(calendar_holidays))
        .route("/v1/calendar/season", get(calendar_season))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

fn is_public_endpoint(path: &str) -> bool {
    path == "/health"
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": "missing or invalid x-api-key"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    state.metrics.inc_request();

    let skip_limit =
        request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path());
    if !skip_limit {
        let ip = request_ip(&request);
        if !state.limiter.allow(&ip) {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limited",
                    "message": "rate limit exceeded for this IP"
                })),
            )
                .into_response();
        }
    }

    let started = std::time::Instant::now();
    let response = next.run(request).await;
    state.metrics.observe_latency(started.elapsed());
    response
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "bad_request",
            "message": message
        })),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "not_found",
            "message": message
        })),
    )
        .into_response()
}

fn validate_session_id(session_id: &str) -> Option<Response> {
    let trimmed = session_id.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_SESSION_ID_LEN {
        return Some(bad_request("session_id must be 1..=128 characters"));
    }
    None
}

fn parse_reference_date(raw: Option<&str>) -> Result<NaiveDate, Response> {
    match raw {
        None => Ok(Utc::now().date_naive()),
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| bad_request("date must be formatted YYYY-MM-DD")),
    }
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: Utc::now().to_rfc3339(),
        sessions: state.engine.session_count(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn session_create(
    State(state): State<ApiState>,
    Json(input): Json<SessionCreateRequest>,
) -> Response {
    if let Some(rejection) = validate_session_id(&input.session_id) {
        return rejection;
    }

    let locale = Locale::from_optional_str(input.locale.as_deref());
    let memory = state
        .engine
        .get_or_create_memory(input.session_id.trim(), locale)
        .await;
    (StatusCode::OK, Json(memory)).into_response()
}

async fn interaction_record(
    State(state): State<ApiState>,
    Json(input): Json<InteractionRequest>,
) -> Response {
    if let Some(rejection) = validate_session_id(&input.session_id) {
        return rejection;
    }
    if input.user_message.trim().is_empty() {
        return bad_request("user_message must not be empty");
    }
    if input.user_message.len() > MAX_MESSAGE_LEN || input.ai_response.len() > MAX_MESSAGE_LEN {
        return bad_request("message fields are limited to 8000 bytes");
    }

    let session_id = input.session_id.trim();
    let locale = Locale::from_optional_str(input.locale.as_deref());
    let interaction = state
        .engine
        .add_interaction(
            session_id,
            &input.user_message,
            &input.ai_response,
            locale,
            input.extra,
        )
        .await;

    // add_interaction lazily creates the session, so the export is present.
    match state.engine.export_memory(session_id) {
        Some(memory) => (
            StatusCode::OK,
            Json(InteractionResponse {
                interaction,
                memory,
            }),
        )
            .into_response(),
        None => not_found("session vanished during recording"),
    }
}

async fn session_export(
    State(state): State<ApiState>,
    AxumPath(session_id): AxumPath<String>,
) -> Response {
    match state.engine.export_memory(&session_id) {
        Some(memory) => (StatusCode::OK, Json(memory)).into_response(),
        None => not_found("no memory recorded for this session"),
    }
}

async fn session_import(
    State(state): State<ApiState>,
    Json(memory): Json<ConversationMemory>,
) -> Response {
    if let Some(rejection) = validate_session_id(&memory.session_id) {
        return rejection;
    }

    let session_id = memory.session_id.clone();
    state.engine.import_memory(memory).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "imported": true,
            "session_id": session_id
        })),
    )
        .into_response()
}

async fn session_clear(
    State(state): State<ApiState>,
    AxumPath(session_id): AxumPath<String>,
) -> Response {
    state.engine.clear_memory(&session_id).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "cleared": true,
            "session_id": session_id
        })),
    )
        .into_response()
}

async fn personal_preferences_update(
    State(state): State<ApiState>,
    AxumPath(session_id): AxumPath<String>,
    Json(update): Json<PersonalPreferencesUpdate>,
) -> Response {
    if let Some(rejection) = validate_session_id(&session_id) {
        return rejection;
    }

    state
        .engine
        .update_personal_preferences(session_id.trim(), update)
        .await;
    match state.engine.export_memory(session_id.trim()) {
        Some(memory) => (StatusCode::OK, Json(memory.personal_preferences)).into_response(),
        None => not_found("no memory recorded for this session"),
    }
}

async fn cultural_preferences_update(
    State(state): State<ApiState>,
    AxumPath(session_id): AxumPath<String>,
    Json(update): Json<CulturalPreferencesUpdate>,
) -> Response {
    if let Some(rejection) = validate_session_id(&session_id) {
        return rejection;
    }

    state
        .engine
        .update_cultural_preferences(session_id.trim(), update)
        .await;
    match state.engine.export_memory(session_id.trim()) {
        Some(memory) => (StatusCode::OK, Json(memory.cultural_preferences)).into_response(),
        None => not_found("no memory recorded for this session"),
    }
}

async fn session_greeting(
    State(state): State<ApiState>,
    AxumPath(session_id): AxumPath<String>,
    Query(query): Query<LocaleQuery>,
) -> Response {
    let locale = Locale::from_optional_str(query.locale.as_deref());
    let greeting = state.engine.personalized_greeting(&session_id, locale);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "session_id": session_id,
            "locale": locale.as_code(),
            "greeting": greeting
        })),
    )
        .into_response()
}

async fn session_suggestions(
    State(state): State<ApiState>,
    AxumPath(session_id): AxumPath<String>,
    Query(query): Query<LocaleQuery>,
) -> Response {
    let locale = Locale::from_optional_str(query.locale.as_deref());
    let suggestions = state.engine.contextual_suggestions(&session_id, locale);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "session_id": session_id,
            "locale": locale.as_code(),
            "suggestions": suggestions
        })),
    )
        .into_response()
}

async fn session_recent(
    State(state): State<ApiState>,
    AxumPath(session_id): AxumPath<String>,
    Query(query): Query<RecentQuery>,
) -> Response {
    let count = query
        .count
        .unwrap_or(DEFAULT_RECENT_COUNT)
        .min(MAX_RECENT_COUNT);
    let interactions = state.engine.recent_interactions(&session_id, count);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "session_id": session_id,
            "interactions": interactions
        })),
    )
        .into_response()
}

async fn calendar_holidays(Query(query): Query<CalendarQuery>) -> Response {
    let reference = match parse_reference_date(query.date.as_deref()) {
        Ok(date) => date,
        Err(rejection) => return rejection,
    };
    let locale = Locale::from_optional_str(query.locale.as_deref());

    let holidays: Vec<HolidayView> = calendar::active_holidays(reference)
        .into_iter()
        .map(|holiday| HolidayView {
            id: holiday.id,
            name: holiday.name.for_locale(locale),
            significance: holiday.significance.for_locale(locale),
            travel_considerations: holiday.travel_considerations.for_locale(locale),
            recommendations: holiday.recommendations.for_locale(locale),
            date: holiday.date,
            is_lunar: holiday.is_lunar,
            category: holiday.category,
        })
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "reference_date": reference,
            "locale": locale.as_code(),
            "holidays": holidays
        })),
    )
        .into_response()
}

async fn calendar_season(Query(query): Query<CalendarQuery>) -> Response {
    let reference = match parse_reference_date(query.date.as_deref()) {
        Ok(date) => date,
        Err(rejection) => return rejection,
    };
    let locale = Locale::from_optional_str(query.locale.as_deref());

    let season = calendar::active_season(reference).map(|season| SeasonView {
        id: season.id,
        name: season.name.for_locale(locale),
        description: season.description.for_locale(locale),
        travel_impact: season.travel_impact.for_locale(locale),
        recommendations: season.recommendations.for_locale(locale),
    });

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "reference_date": reference,
            "locale": locale.as_code(),
            "season": season
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_endpoints_skip_auth() {
        assert!(is_public_endpoint("/health"));
        assert!(!is_public_endpoint("/v1/interactions"));
        assert!(!is_public_endpoint("/v1/sessions/abc"));
    }

    #[test]
    fn reference_date_defaults_to_today_and_rejects_garbage() {
        assert_eq!(
            parse_reference_date(None).ok(),
            Some(Utc::now().date_naive())
        );
        assert!(parse_reference_date(Some("2025-03-15")).is_ok());
        assert!(parse_reference_date(Some("15/03/2025")).is_err());
        assert!(parse_reference_date(Some("not-a-date")).is_err());
    }

    #[test]
    fn session_id_validation_bounds() {
        assert!(validate_session_id("s-1").is_none());
        assert!(validate_session_id("").is_some());
        assert!(validate_session_id("   ").is_some());
        assert!(validate_session_id(&"x".repeat(200)).is_some());
    }
}
