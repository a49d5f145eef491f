//! 环境变量配置加载

use std::env;
use std::path::PathBuf;

use crate::infra::ssh::SshTarget;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 服务监听端口
    pub port: u16,
    /// 私钥内容（来自 SSH_PRIVATE_KEY）
    pub ssh_private_key: Option<String>,
    /// 私钥落盘路径
    pub ssh_key_path: PathBuf,
    /// 远程主机连接配置
    pub remote: RemoteConfig,
    /// 部署命令配置
    pub deploy: DeployConfig,
}

/// 远程主机配置
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub host: String,
    pub user: String,
    /// ssh 客户端程序
    pub ssh_bin: String,
    /// ConnectTimeout（秒）
    pub connect_timeout_secs: u64,
}

/// 部署命令配置
#[derive(Clone, Debug)]
pub struct DeployConfig {
    /// 远程主机上部署工具的路径
    pub tool_path: String,
    /// 远程临时目录，仓库 clone 到这里
    pub work_dir: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "garzahive.com".to_string(),
            user: "root".to_string(),
            ssh_bin: "ssh".to_string(),
            connect_timeout_secs: 30,
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            tool_path: "/root/.fly/bin/flyctl".to_string(),
            work_dir: "/tmp".to_string(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            ssh_private_key: None,
            ssh_key_path: PathBuf::from("/root/.ssh/id_rsa"),
            remote: RemoteConfig::default(),
            deploy: DeployConfig::default(),
        }
    }
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = parse_var("PORT").unwrap_or(defaults.port);

        let ssh_private_key = non_empty_var("SSH_PRIVATE_KEY");
        let ssh_key_path = non_empty_var("SSH_KEY_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.ssh_key_path);

        let remote = RemoteConfig {
            host: non_empty_var("REMOTE_HOST").unwrap_or(defaults.remote.host),
            user: non_empty_var("REMOTE_USER").unwrap_or(defaults.remote.user),
            ssh_bin: non_empty_var("SSH_BIN").unwrap_or(defaults.remote.ssh_bin),
            connect_timeout_secs: parse_var("SSH_CONNECT_TIMEOUT")
                .unwrap_or(defaults.remote.connect_timeout_secs),
        };

        let deploy = DeployConfig {
            tool_path: non_empty_var("DEPLOY_TOOL").unwrap_or(defaults.deploy.tool_path),
            work_dir: non_empty_var("DEPLOY_WORK_DIR").unwrap_or(defaults.deploy.work_dir),
        };

        Self {
            port,
            ssh_private_key,
            ssh_key_path,
            remote,
            deploy,
        }
    }

    /// 构建 ssh 目标
    ///
    /// 只有私钥已经落盘时才显式传 `-i`，否则交给 ssh 自己的默认身份查找
    pub fn ssh_target(&self, key_installed: bool) -> SshTarget {
        SshTarget {
            program: self.remote.ssh_bin.clone(),
            user: self.remote.user.clone(),
            host: self.remote.host.clone(),
            connect_timeout_secs: self.remote.connect_timeout_secs,
            identity_file: key_installed.then(|| self.ssh_key_path.clone()),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// 常量
pub mod constants {
    /// 部署超时（秒）
    pub const DEPLOY_TIMEOUT_SECS: u64 = 600; // 10 分钟

    /// 任意命令执行超时（秒）
    pub const EXECUTE_TIMEOUT_SECS: u64 = 300;

    /// 未指定 region 时的默认值
    pub const DEFAULT_REGION: &str = "dfw";

    /// 服务标识
    pub const SERVICE_NAME: &str = "garza-orchestrator";

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
