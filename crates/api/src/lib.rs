mod rate_limit;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use vidhi_agents::{check_query, ChatRejection, LegalAssistant};
use vidhi_core::{ChatInput, KnowledgeStats};
use vidhi_observability::{AppMetrics, MetricsSnapshot};
use vidhi_storage::{MemoryStore, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};

pub use crate::rate_limit::IpRateLimiter;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
const MAX_BODY_BYTES: usize = 16 * 1024;
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: String,
    pub kb_root: Option<PathBuf>,
    pub allowed_origins: Vec<String>,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            kb_root: None,
            allowed_origins: default_origins(),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max: 60,
            session_ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind: env::var("VIDHI_BIND").unwrap_or(defaults.bind),
            kb_root: env::var("VIDHI_KB_ROOT")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            allowed_origins: env::var("VIDHI_ALLOWED_ORIGINS")
                .ok()
                .map(|value| parse_origins(&value))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.allowed_origins),
            rate_limit_window: env::var("VIDHI_RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_window),
            rate_limit_max: env::var("VIDHI_RATE_LIMIT_MAX")
                .ok()
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(defaults.rate_limit_max),
            session_ttl: env::var("VIDHI_SESSION_TTL_SECONDS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            max_sessions: env::var("VIDHI_MAX_SESSIONS")
                .ok()
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(defaults.max_sessions),
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Arc<LegalAssistant<MemoryStore>>,
    pub metrics: Arc<AppMetrics>,
    pub limiter: IpRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
    knowledge: KnowledgeStats,
    active_sessions: Option<usize>,
}

/// Body sent by the web widget.
#[derive(Debug, Deserialize)]
struct WidgetChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    session_id: Option<String>,
    text: String,
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct ClearRequest {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct SectionQuery {
    code: String,
    number: String,
}

pub async fn build_app(config: &ApiConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();

    let knowledge = vidhi_knowledge::load_or_builtin(config.kb_root.as_deref())
        .context("failed to load legal knowledge base")?;
    let stats = knowledge.stats();
    info!(
        ipc_sections = stats.ipc_sections,
        crpc_sections = stats.crpc_sections,
        procedures = stats.procedures,
        custom = config.kb_root.is_some(),
        "knowledge base ready"
    );

    let store = MemoryStore::new()
        .with_session_ttl(config.session_ttl)
        .with_max_sessions(config.max_sessions);
    let assistant = Arc::new(LegalAssistant::new(
        Arc::new(knowledge),
        Arc::new(store),
        metrics.clone(),
    ));
    spawn_session_sweeper(assistant.clone());

    let state = ApiState {
        assistant,
        metrics,
        limiter: IpRateLimiter::new(config.rate_limit_window, config.rate_limit_max),
        allowed_origins: Arc::new(config.allowed_origins.clone()),
    };

    Ok(build_router(state))
}

fn spawn_session_sweeper(assistant: Arc<LegalAssistant<MemoryStore>>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(err) = assistant.purge_expired_sessions().await {
                warn!(error = %err, "session purge failed");
            }
        }
    });
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(widget_chat))
        .route("/v1/chat", post(chat))
        .route("/v1/chat/history", get(chat_history))
        .route("/v1/chat/clear", post(chat_clear))
        .route("/v1/sections", get(section_lookup))
        .route("/v1/procedures", get(procedures_list))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let active_sessions = session_gauge(state.assistant.active_sessions().await);
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        knowledge: state.assistant.knowledge_stats(),
        active_sessions,
    };
    (StatusCode::OK, Json(payload))
}

/// A store failure is reported as an unknown count rather than zero.
fn session_gauge(count: Result<usize>) -> Option<usize> {
    count
        .inspect_err(|err| warn!(error = %err, "session count unavailable"))
        .ok()
}

async fn widget_chat(
    State(state): State<ApiState>,
    Json(request): Json<WidgetChatRequest>,
) -> Response {
    match check_query(&request.message) {
        Ok(()) => {
            let response = state.assistant.ask(&request.message);
            (StatusCode::OK, Json(json!({ "response": response }))).into_response()
        }
        Err(rejection) => {
            state.metrics.inc_rejected();
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.to_string() })),
            )
                .into_response()
        }
    }
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    let input = ChatInput {
        session_id: request.session_id,
        text: request.text,
    };

    match state.assistant.handle_chat(input).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => match err.downcast_ref::<ChatRejection>() {
            Some(rejection) => error_response(
                StatusCode::BAD_REQUEST,
                "invalid_message",
                &rejection.to_string(),
            ),
            None => {
                error!(error = %err, "chat failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "chat_failed",
                    "unable to process the message",
                )
            }
        },
    }
}

async fn chat_history(
    State(state): State<ApiState>,
    Query(query): Query<SessionQuery>,
) -> Response {
    match state.assistant.history(query.session_id.trim()).await {
        Ok(transcript) => (StatusCode::OK, Json(transcript)).into_response(),
        Err(err) => {
            error!(error = %err, "history lookup failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "history_failed",
                "unable to load the conversation",
            )
        }
    }
}

async fn chat_clear(State(state): State<ApiState>, Json(request): Json<ClearRequest>) -> Response {
    let session_id = request.session_id.trim();
    if session_id.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "session_required",
            "session_id is required",
        );
    }

    match state.assistant.clear(session_id).await {
        Ok(transcript) => (StatusCode::OK, Json(transcript)).into_response(),
        Err(err) => {
            error!(error = %err, "clear failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "clear_failed",
                "unable to clear the conversation",
            )
        }
    }
}

async fn section_lookup(
    State(state): State<ApiState>,
    Query(query): Query<SectionQuery>,
) -> Response {
    match state.assistant.section(&query.code, &query.number) {
        Some(section) => (StatusCode::OK, Json(section.clone())).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "section_not_found",
            &format!("no {} section {} in the knowledge base", query.code, query.number),
        ),
    }
}

async fn procedures_list(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.assistant.procedures()))
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message,
        })),
    )
        .into_response()
}

fn default_origins() -> Vec<String> {
    [
        "http://localhost:8080",
        "http://127.0.0.1:8080",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded for this IP",
        );
    }

    next.run(request).await
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

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}
