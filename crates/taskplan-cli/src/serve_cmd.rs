use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use taskplan_core::planner::{
    CreatePlanError, TextGenerator, create_plan_from_goal, get_plan_with_tasks,
};
use taskplan_db::queries::plans as plan_queries;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<CreatePlanError> for AppError {
    fn from(err: CreatePlanError) -> Self {
        match err {
            // Provider and transport failures are upstream problems; the
            // caller can retry them.
            CreatePlanError::Provider(e) => Self::bad_gateway(e.to_string()),
            CreatePlanError::Store(e) => Self::internal(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub provider: Arc<dyn TextGenerator>,
}

pub fn build_router(pool: SqlitePool, provider: Arc<dyn TextGenerator>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/plan", post(create_plan))
        .route("/api/plan/{id}", get(get_plan))
        .route("/api/plans", get(list_plans))
        .layer(CorsLayer::permissive())
        .with_state(AppState { pool, provider })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(
    pool: SqlitePool,
    provider: Arc<dyn TextGenerator>,
    bind: &str,
    port: u16,
) -> Result<()> {
    let app = build_router(pool, provider);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("taskplan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("taskplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Minimal entity escape for goal text interpolated into the index page.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn index(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let plans = plan_queries::list_plans(&state.pool)
        .await
        .map_err(AppError::internal)?;

    let rows = if plans.is_empty() {
        "<tr><td colspan=\"3\">No plans yet. POST a goal to /api/plan.</td></tr>".to_string()
    } else {
        plans
            .iter()
            .map(|p| {
                format!(
                    "<tr><td><a href=\"/api/plan/{id}\">{goal}</a></td><td>{created}</td><td>{id}</td></tr>",
                    id = p.id,
                    goal = escape_html(&p.goal),
                    created = p.created_at.format("%Y-%m-%d %H:%M UTC"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>taskplan</title></head><body>\
<h1>taskplan</h1>\
<p><a href=\"/api/plans\">/api/plans</a></p>\
<table><tr><th>Goal</th><th>Created</th><th>ID</th></tr>{rows}</table>\
</body></html>"
    );

    Ok(Html(html).into_response())
}

async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<GoalRequest>,
) -> Result<axum::response::Response, AppError> {
    let created = create_plan_from_goal(&state.pool, state.provider.as_ref(), &request.goal).await?;
    Ok(Json(created).into_response())
}

async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let plan = get_plan_with_tasks(&state.pool, id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(format!("plan {id} not found")))?;

    Ok(Json(plan).into_response())
}

async fn list_plans(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let plans = plan_queries::list_plans(&state.pool)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(plans).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
