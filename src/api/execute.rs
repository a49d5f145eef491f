//! 远程命令执行 API

use axum::{extract::State, routing::post, Json, Router};
use std::{sync::Arc, time::Duration};

use crate::config::env::constants::EXECUTE_TIMEOUT_SECS;
use crate::domain::{ExecuteRequest, ExecuteResponse};
use crate::error::{ApiError, ApiResult};
use crate::middleware::JsonBody;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/execute", post(execute_command))
}

/// 在远程主机上原样执行命令
///
/// POST /execute
async fn execute_command(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<ExecuteRequest>,
) -> ApiResult<Json<ExecuteResponse>> {
    let command = request
        .command
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("command required"))?;

    let output = state
        .executor
        .run(&command, Duration::from_secs(EXECUTE_TIMEOUT_SECS))
        .await?;

    Ok(Json(ExecuteResponse::from_output(output)))
}
