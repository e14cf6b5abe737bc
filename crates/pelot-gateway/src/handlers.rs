use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use pelot_core::AssistantError;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Deserialize)]
pub(crate) struct AskRequest {
    pub question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
}

#[derive(Serialize)]
struct WarningResponse<'a> {
    warning: &'a str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct IngestResponse {
    status: String,
    processed: Vec<String>,
    skipped: Vec<String>,
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

pub(crate) async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.page.to_string())
}

pub(crate) async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Response {
    match state.service.ask(&request.question).await {
        Ok(answer) => Json(AskResponse { answer }).into_response(),
        Err(AssistantError::EmptyQuestion) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(WarningResponse {
                warning: &state.ui.empty_question_warning,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("ask failed: {e}");
            internal_error(&e)
        }
    }
}

pub(crate) async fn ingest_handler(State(state): State<AppState>) -> Response {
    match state.service.ingest().await {
        Ok(report) => Json(IngestResponse {
            status: state.ui.ingest_status(&report),
            processed: report.processed,
            skipped: report.skipped,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("ingestion failed: {e}");
            internal_error(&e)
        }
    }
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

fn internal_error(e: &AssistantError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}
