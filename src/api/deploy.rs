//! 部署 API
//!
//! 包含 /deploy/mcp 端点

use axum::{extract::State, routing::post, Json, Router};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::config::env::constants::{DEFAULT_REGION, DEPLOY_TIMEOUT_SECS};
use crate::domain::{DeployRequest, DeployResponse, DeployStatus};
use crate::error::{ApiError, ApiResult};
use crate::infra::ExecError;
use crate::middleware::JsonBody;
use crate::services::deploy::DeployPlan;
use crate::state::AppState;

/// 创建部署路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/deploy/mcp", post(deploy_mcp))
}

/// 部署 MCP 服务
///
/// POST /deploy/mcp
///
/// 远程命令非零退出仍返回 200，`status` 为 `failed`
async fn deploy_mcp(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<DeployRequest>,
) -> ApiResult<Json<DeployResponse>> {
    let plan = DeployPlan::new(
        request.app_name,
        request.repo,
        request.region,
        DEFAULT_REGION,
    )
    .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let command = plan.command(&state.config.deploy);

    info!(
        app_name = %plan.app_name,
        repo = %plan.repo,
        region = %plan.region,
        "Starting deployment"
    );

    let output = state
        .executor
        .run(&command, Duration::from_secs(DEPLOY_TIMEOUT_SECS))
        .await
        .map_err(|e| match e {
            ExecError::Timeout(_) => {
                warn!(app_name = %plan.app_name, "Deployment timed out");
                ApiError::internal(format!(
                    "Deployment timed out after {} minutes",
                    DEPLOY_TIMEOUT_SECS / 60
                ))
            }
            other => ApiError::from(other),
        })?;

    let status = DeployStatus::from_output(&output);
    info!(
        app_name = %plan.app_name,
        returncode = output.returncode,
        status = ?status,
        "Deployment finished"
    );

    Ok(Json(DeployResponse {
        status,
        app_name: plan.app_name,
        region: plan.region,
        returncode: output.returncode,
        stdout: output.stdout,
        stderr: output.stderr,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
