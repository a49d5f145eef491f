//! SSH 远程执行
//!
//! 通过本机 ssh 客户端在固定的远程主机上执行命令

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use super::command::{CommandError, CommandRunner};
use crate::domain::ExecOutput;

/// 远程执行错误
///
/// 远程命令非零退出不属于错误，只体现在 `ExecOutput::returncode` 中
#[derive(Debug, Error)]
pub enum ExecError {
    /// 超过调用方给定的超时时间
    #[error("Command timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),
    /// 启动或等待 ssh 进程失败
    #[error("{0}")]
    Launch(String),
}

impl From<CommandError> for ExecError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Timeout(d) => ExecError::Timeout(d),
            other => ExecError::Launch(other.to_string()),
        }
    }
}

/// 远程执行器
///
/// handler 只依赖这个 trait，测试中可替换为内存实现
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn run(&self, command: &str, timeout: Duration) -> Result<ExecOutput, ExecError>;
}

/// ssh 目标主机
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SshTarget {
    /// ssh 客户端程序
    pub program: String,
    pub user: String,
    pub host: String,
    /// ConnectTimeout（秒）
    pub connect_timeout_secs: u64,
    /// `-i` 私钥路径
    pub identity_file: Option<PathBuf>,
}

impl SshTarget {
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// 组装 ssh 参数，远程命令作为最后一个独立参数
    pub fn args(&self, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout_secs),
        ];

        if let Some(ref identity) = self.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }

        args.push("--".to_string());
        args.push(self.destination());
        args.push(command.to_string());
        args
    }
}

/// 基于 ssh 客户端子进程的执行器
pub struct SshExecutor {
    target: SshTarget,
}

impl SshExecutor {
    pub fn new(target: SshTarget) -> Self {
        Self { target }
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn run(&self, command: &str, timeout: Duration) -> Result<ExecOutput, ExecError> {
        let args = self.target.args(command);
        let started = Instant::now();

        info!(
            destination = %self.target.destination(),
            timeout_secs = timeout.as_secs(),
            "Running remote command"
        );

        let output = CommandRunner::run_captured(&self.target.program, &args, timeout)
            .await
            .map_err(|e| {
                warn!(destination = %self.target.destination(), error = %e, "Remote command failed to complete");
                ExecError::from(e)
            })?;

        let result = ExecOutput {
            returncode: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        info!(
            destination = %self.target.destination(),
            returncode = result.returncode,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Remote command finished"
        );

        Ok(result)
    }
}
