//! HTTP API over the submission gateway

use crate::{
    checker::Checker,
    core::{ApplicationPayload, PipelineHandle, PipelineSnapshot, StepDefinition},
    gateway::{GatewayError, SubmissionGateway},
};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::AlreadyStarted(_) => StatusCode::CONFLICT,
            GatewayError::Internal(msg) => {
                error!("Request failed: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the API router
pub fn router<C: Checker + 'static>(gateway: Arc<SubmissionGateway<C>>) -> Router {
    Router::new()
        .route("/api/vendors/submit", post(submit::<C>))
        .route("/api/vendors/:id", get(status::<C>).delete(cancel::<C>))
        .route("/api/steps", get(steps::<C>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(gateway)
}

/// Listen on `bind` until the process is stopped
pub async fn serve<C: Checker + 'static>(gateway: Arc<SubmissionGateway<C>>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Vendor verification API listening on {}", bind);

    axum::serve(listener, router(gateway))
        .await
        .context("HTTP server failed")
}

async fn submit<C: Checker + 'static>(
    State(gateway): State<Arc<SubmissionGateway<C>>>,
    Json(payload): Json<ApplicationPayload>,
) -> Result<(StatusCode, Json<PipelineHandle>), GatewayError> {
    let handle = gateway.submit(payload).await?;
    Ok((StatusCode::ACCEPTED, Json(handle)))
}

async fn status<C: Checker + 'static>(
    State(gateway): State<Arc<SubmissionGateway<C>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PipelineSnapshot>, GatewayError> {
    gateway.get_status(id).await.map(Json)
}

async fn cancel<C: Checker + 'static>(
    State(gateway): State<Arc<SubmissionGateway<C>>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, GatewayError> {
    gateway.cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn steps<C: Checker + 'static>(State(gateway): State<Arc<SubmissionGateway<C>>>) -> Json<Vec<StepDefinition>> {
    Json(gateway.registry().definitions().to_vec())
}
