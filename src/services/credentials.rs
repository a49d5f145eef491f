//! SSH 私钥初始化
//!
//! 进程启动时把 `SSH_PRIVATE_KEY` 写入本地文件，权限收紧为 0600。
//! 托管平台经常把多行环境变量压成一行，这里负责把 PEM 边界处的换行补回来。

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// 私钥初始化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInit {
    /// 私钥已写入
    Installed(PathBuf),
    /// 未提供私钥，后续 ssh 调用将在连接阶段失败
    Missing,
}

impl KeyInit {
    pub fn is_installed(&self) -> bool {
        matches!(self, KeyInit::Installed(_))
    }
}

/// 私钥初始化错误
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to create key directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write key file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to restrict permissions on {path}: {source}")]
    Permissions {
        path: PathBuf,
        source: std::io::Error,
    },
}

const BEGIN_PREFIX: &str = "-----BEGIN";
const END_PREFIX: &str = "-----END";
const DASHES: &str = "-----";

/// 恢复被压平的 PEM 私钥
///
/// 仅当文本包含 BEGIN 标记且没有任何换行时处理：在 BEGIN 行之后、END 行之前各插入一个换行。
/// 假定字符串中只有一把私钥。其他情况原样返回。
pub fn normalize_key(raw: &str) -> String {
    if !raw.contains(BEGIN_PREFIX) || raw.contains('\n') {
        return raw.to_string();
    }

    let Some(begin_start) = raw.find(BEGIN_PREFIX) else {
        return raw.to_string();
    };
    let Some(begin_close) = raw[begin_start + BEGIN_PREFIX.len()..].find(DASHES) else {
        return raw.to_string();
    };
    let begin_end = begin_start + BEGIN_PREFIX.len() + begin_close + DASHES.len();

    let end_start = raw.rfind(END_PREFIX).filter(|&i| i >= begin_end);

    let mut key = String::with_capacity(raw.len() + 2);
    key.push_str(&raw[..begin_end]);
    key.push('\n');
    match end_start {
        Some(end_start) => {
            key.push_str(&raw[begin_end..end_start]);
            key.push('\n');
            key.push_str(&raw[end_start..]);
        }
        None => key.push_str(&raw[begin_end..]),
    }
    key
}

/// 将私钥写入 `path`
///
/// 应在服务开始接收请求之前调用一次
pub fn install_key(key: Option<&str>, path: &Path) -> Result<KeyInit, CredentialError> {
    let Some(raw) = key.filter(|k| !k.is_empty()) else {
        warn!("No SSH_PRIVATE_KEY environment variable found");
        return Ok(KeyInit::Missing);
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| CredentialError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let key = normalize_key(raw);
    if key.len() != raw.len() {
        info!("Restored line breaks in flattened private key");
    }

    write_private(path, key.as_bytes()).map_err(|source| CredentialError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    // 文件可能在之前就存在且权限较宽，统一收紧
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|source| {
            CredentialError::Permissions {
                path: path.to_path_buf(),
                source,
            }
        })?;
    }

    info!(path = %path.display(), "SSH key initialized");
    Ok(KeyInit::Installed(path.to_path_buf()))
}

fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()
}
