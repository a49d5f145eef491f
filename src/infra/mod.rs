//! 基础设施模块
//!
//! 封装外部依赖（子进程、ssh 客户端）

pub mod command;
pub mod ssh;

pub use command::{CommandError, CommandRunner};
pub use ssh::{ExecError, RemoteExecutor, SshExecutor, SshTarget};
