//! 命令执行器
//!
//! 提供统一的子进程执行接口，支持：
//! - stdout/stderr 分离捕获
//! - 超时控制（超时后终止整个进程组并回收子进程）
//! - 请求被丢弃时自动终止子进程

use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{error, warn};

/// 命令执行器
pub struct CommandRunner;

/// 命令执行错误
#[derive(Debug, Error)]
pub enum CommandError {
    /// 命令启动失败
    #[error("Failed to spawn command: {0}")]
    SpawnFailed(std::io::Error),
    /// 命令超时
    #[error("Command timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),
    /// 等待命令完成失败
    #[error("Failed to wait for command: {0}")]
    WaitFailed(std::io::Error),
}

impl CommandRunner {
    /// 执行命令并捕获输出
    ///
    /// # Arguments
    /// * `program` - 要执行的程序
    /// * `args` - 命令行参数
    /// * `timeout` - 超时时间，包含读取输出的时间
    ///
    /// 非零退出码不算错误，由调用方检查 `Output::status`
    pub async fn run_captured<S: AsRef<str>>(
        program: &str,
        args: &[S],
        timeout: Duration,
    ) -> Result<Output, CommandError> {
        let deadline = Instant::now() + timeout;

        let mut cmd = Command::new(program);
        cmd.args(args.iter().map(AsRef::as_ref))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // 独立进程组，超时时可以连同后代进程一起终止
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(CommandError::SpawnFailed)?;
        let pid = child.id();

        let stdout_task = tokio::spawn(read_all(child.stdout.take()));
        let stderr_task = tokio::spawn(read_all(child.stderr.take()));

        let status = tokio::select! {
            status = child.wait() => status.map_err(|e| {
                kill_group(pid);
                CommandError::WaitFailed(e)
            })?,
            _ = tokio::time::sleep_until(deadline) => {
                error!(program, "Command timed out after {:?}, killing process", timeout);
                kill_group(pid);
                if let Err(e) = child.kill().await {
                    warn!(program, error = %e, "Failed to kill timed out process");
                }
                stdout_task.abort();
                stderr_task.abort();
                return Err(CommandError::Timeout(timeout));
            }
        };

        // 子进程退出后，后台进程仍可能持有管道；读取同样受 deadline 约束
        let drained = tokio::time::timeout_at(deadline, async {
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            (stdout, stderr)
        })
        .await;

        match drained {
            Ok((stdout, stderr)) => Ok(Output {
                status,
                stdout,
                stderr,
            }),
            Err(_) => {
                error!(program, "Output pipes still open at deadline");
                kill_group(pid);
                Err(CommandError::Timeout(timeout))
            }
        }
    }
}

/// 终止以 `pid` 为组长的进程组（包括后台遗留的后代进程）
fn kill_group(pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        // SAFETY: killpg 只接收整数参数，不涉及内存访问
        let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if rc != 0 {
            warn!(pid, error = %std::io::Error::last_os_error(), "Failed to kill process group");
        }
    }

    #[cfg(not(unix))]
    let _ = pid;
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            warn!(error = %e, "Failed to read child output");
        }
    }
    buf
}
