//! 远程执行相关领域模型

use serde::{Deserialize, Serialize};

/// 部署请求
///
/// 字段全部可选，缺失与空字符串在 handler 中统一视为缺失
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployRequest {
    pub app_name: Option<String>,
    pub repo: Option<String>,
    pub region: Option<String>,
}

/// 命令执行请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteRequest {
    pub command: Option<String>,
}

/// 远程命令的捕获结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// 退出码，被信号终止时为 -1
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.returncode == 0
    }
}

/// 部署结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    Success,
    Failed,
}

impl DeployStatus {
    pub fn from_output(output: &ExecOutput) -> Self {
        if output.success() {
            DeployStatus::Success
        } else {
            DeployStatus::Failed
        }
    }
}

/// POST /deploy/mcp 响应
#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub status: DeployStatus,
    pub app_name: String,
    pub region: String,
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
    pub timestamp: String,
}

/// POST /execute 响应
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
    pub timestamp: String,
}

impl ExecuteResponse {
    pub fn from_output(output: ExecOutput) -> Self {
        Self {
            returncode: output.returncode,
            stdout: output.stdout,
            stderr: output.stderr,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
