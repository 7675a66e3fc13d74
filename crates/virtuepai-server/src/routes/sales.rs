//! Sales directory route: `GET /api/sales`.
//!
//! Serves the sales-team JSON file as-is. The file is re-read on every
//! request so edits show up without a restart.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::error;

use crate::error::AppError;
use crate::state::AppState;

const LOAD_FAILED: &str = "获取销售团队信息失败";

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(sales_team))
}

#[derive(Debug, Serialize)]
pub struct SalesResponse {
    pub success: bool,
    pub data: serde_json::Value,
}

async fn sales_team(State(state): State<Arc<AppState>>) -> Result<Json<SalesResponse>, AppError> {
    let path = &state.sales_team_path;

    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to read sales team file");
        AppError::Internal(LOAD_FAILED.to_owned())
    })?;

    let data = serde_json::from_str(&raw).map_err(|e| {
        error!(path = %path.display(), error = %e, "sales team file is not valid JSON");
        AppError::Internal(LOAD_FAILED.to_owned())
    })?;

    Ok(Json(SalesResponse {
        success: true,
        data,
    }))
}
