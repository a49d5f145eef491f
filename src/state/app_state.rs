//! 应用状态

use std::sync::Arc;

use crate::config::env::EnvConfig;
use crate::infra::{RemoteExecutor, SshExecutor};

/// 应用状态
///
/// 请求之间没有共享的可变状态，这里只保存启动时确定的配置和执行器
pub struct AppState {
    /// 环境配置
    pub config: EnvConfig,
    /// 远程执行器
    pub executor: Arc<dyn RemoteExecutor>,
}

impl AppState {
    /// 使用 ssh 执行器创建应用状态
    ///
    /// `key_installed` 为 true 时 ssh 显式使用落盘的私钥
    pub fn new(config: EnvConfig, key_installed: bool) -> Self {
        let target = config.ssh_target(key_installed);

        tracing::info!(
            port = config.port,
            destination = %target.destination(),
            ssh_bin = %target.program,
            connect_timeout_secs = target.connect_timeout_secs,
            identity_file = ?target.identity_file,
            "Loaded configuration"
        );

        Self::with_executor(config, Arc::new(SshExecutor::new(target)))
    }

    /// 使用自定义执行器创建应用状态
    pub fn with_executor(config: EnvConfig, executor: Arc<dyn RemoteExecutor>) -> Self {
        Self {
            config,
            executor,
        }
    }
}
