//! HTTP API gateway for CareerLens.
//!
//! Thin JSON adapters over [`ReflectionCoach`]: every handler makes one
//! coach call and wraps the outcome in the uniform envelope
//! (`{"status":"success",..}` or `{"status":"error","message":..}`).
//!
//! Built on Axum.

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use careerlens_agent::ReflectionCoach;
use careerlens_core::error::{Error, GenerationError};
use careerlens_core::locale::Locale;
use careerlens_core::reflection::Reflection;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub coach: ReflectionCoach,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/question", get(question_handler))
        .route("/api/reflection", post(save_reflection_handler))
        .route("/api/reflections", get(list_reflections_handler))
        .route("/api/advice", get(advice_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server. Runs until the listener fails.
pub async fn start(
    config: &careerlens_config::AppConfig,
    coach: ReflectionCoach,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(Arc::new(GatewayState { coach }));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "CareerLens gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Failure envelope ──────────────────────────────────────────────────────

/// Substrings that mark an infrastructure failure in rendered error text.
///
/// A crude heuristic: driver messages are matched as text, case-insensitively.
const INFRASTRUCTURE_SIGNATURES: &[&str] = &[
    "connection reset",
    "ssl syscall error",
    "server closed the connection unexpectedly",
    "broken pipe",
    "connection refused",
];

pub fn has_infrastructure_signature(message: &str) -> bool {
    let lower = message.to_lowercase();
    INFRASTRUCTURE_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// A failed request, ready to render as `{"status":"error","message":..}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Map a domain error to a status code and a user-facing message.
    pub fn from_error(err: &Error, locale: Locale) -> Self {
        let status = match err {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Generation(GenerationError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Error::Generation(GenerationError::Transport(_) | GenerationError::Parse(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Error::Store(e) if e.is_connection() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let rendered = match err {
            Error::Generation(e) => e.to_string(),
            Error::Store(e) => e.to_string(),
            Error::InvalidInput(m) => m.clone(),
            other => other.to_string(),
        };

        let is_connection = matches!(err, Error::Store(e) if e.is_connection());
        let message = if is_connection || has_infrastructure_signature(&rendered) {
            locale.database_connection_message().to_string()
        } else {
            rendered
        };

        Self { status, message }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                status: "error",
                message: self.message,
            }),
        )
            .into_response()
    }
}

/// Log the failure with its operation and convert it for the client.
fn failure(state: &GatewayState, operation: &'static str, err: Error) -> ApiError {
    let api_error = ApiError::from_error(&err, state.coach.locale());
    error!(operation, status = api_error.status.as_u16(), error = %err, "Request failed");
    api_error
}

// ── Handlers ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize, Deserialize)]
struct QuestionResponse {
    status: String,
    question: String,
}

async fn question_handler(
    State(state): State<SharedState>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let result = state
        .coach
        .next_question()
        .await
        .map_err(|e| failure(&state, "question", e))?;

    Ok(Json(QuestionResponse {
        status: "success".into(),
        question: result.text,
    }))
}

#[derive(Deserialize)]
struct SaveReflectionRequest {
    question: String,
    answer: String,
}

#[derive(Serialize, Deserialize)]
struct StatusResponse {
    status: String,
}

async fn save_reflection_handler(
    State(state): State<SharedState>,
    payload: Result<Json<SaveReflectionRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        let err = Error::InvalidInput(rejection.body_text());
        failure(&state, "save_reflection", err)
    })?;

    state
        .coach
        .save_reflection(req.question, req.answer)
        .await
        .map_err(|e| failure(&state, "save_reflection", e))?;

    Ok(Json(StatusResponse {
        status: "success".into(),
    }))
}

#[derive(Serialize, Deserialize)]
struct ReflectionDto {
    id: i64,
    date: String,
    question: String,
    answer: String,
}

impl From<Reflection> for ReflectionDto {
    fn from(r: Reflection) -> Self {
        Self {
            id: r.id,
            date: r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            question: r.question,
            answer: r.answer,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ReflectionListResponse {
    status: String,
    reflections: Vec<ReflectionDto>,
}

async fn list_reflections_handler(
    State(state): State<SharedState>,
) -> Result<Json<ReflectionListResponse>, ApiError> {
    let history = state
        .coach
        .history()
        .await
        .map_err(|e| failure(&state, "list_reflections", e))?;

    Ok(Json(ReflectionListResponse {
        status: "success".into(),
        reflections: history.into_iter().map(ReflectionDto::from).collect(),
    }))
}

#[derive(Serialize, Deserialize)]
struct AdviceResponse {
    status: String,
    advice: String,
}

async fn advice_handler(
    State(state): State<SharedState>,
) -> Result<Json<AdviceResponse>, ApiError> {
    let result = state
        .coach
        .advice()
        .await
        .map_err(|e| failure(&state, "advice", e))?;

    Ok(Json(AdviceResponse {
        status: "success".into(),
        advice: result.text,
    }))
}
