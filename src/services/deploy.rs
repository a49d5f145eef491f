//! 部署服务模块
//!
//! 组装 /deploy/mcp 在远程主机上执行的命令：清理旧目录、clone 仓库、调用部署工具。
//! 用户提供的字段逐个做 shell 转义，远程 shell 只把它们当作普通单词。

use std::borrow::Cow;
use thiserror::Error;

use crate::config::DeployConfig;

/// 一次部署的参数（已校验）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub app_name: String,
    pub repo: String,
    pub region: String,
}

/// 部署参数校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// app_name 或 repo 缺失
    #[error("app_name and repo required")]
    MissingFields,
    /// app_name 不是单级目录名
    #[error("app_name must be a plain directory name, got '{0}'")]
    InvalidAppName(String),
    /// region 以 `-` 开头，会被部署工具当作选项
    #[error("region must not start with '-', got '{0}'")]
    InvalidRegion(String),
}

impl DeployPlan {
    /// 从请求字段构建部署计划
    ///
    /// 空字符串视为缺失；region 缺失时使用 `default_region`
    pub fn new(
        app_name: Option<String>,
        repo: Option<String>,
        region: Option<String>,
        default_region: &str,
    ) -> Result<Self, PlanError> {
        let app_name = app_name.filter(|s| !s.is_empty());
        let repo = repo.filter(|s| !s.is_empty());
        let (Some(app_name), Some(repo)) = (app_name, repo) else {
            return Err(PlanError::MissingFields);
        };

        // app_name 会被 rm -rf，不允许跳出工作目录，也不能被解析成选项
        if app_name == "."
            || app_name == ".."
            || app_name.contains('/')
            || app_name.starts_with('-')
        {
            return Err(PlanError::InvalidAppName(app_name));
        }

        let region = region
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_region.to_string());
        if region.starts_with('-') {
            return Err(PlanError::InvalidRegion(region));
        }

        Ok(Self {
            app_name,
            repo,
            region,
        })
    }

    /// 生成远程 shell 命令
    pub fn command(&self, config: &DeployConfig) -> String {
        let work_dir = quote(&config.work_dir);
        let app = quote(&self.app_name);
        let repo = quote(&self.repo);
        let region = quote(&self.region);
        let tool = quote(&config.tool_path);

        [
            format!("cd {} && rm -rf {}", work_dir, app),
            // `--` 之后 repo 只能是仓库地址，不会被 git 当作选项
            format!("git clone -- {} {}", repo, app),
            format!("cd {} && {} deploy --ha=false --region {}", app, tool, region),
        ]
        .join(" && ")
    }
}

fn quote(s: &str) -> Cow<'_, str> {
    shell_escape::unix::escape(Cow::Borrowed(s))
}
