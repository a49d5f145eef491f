//! 领域模型模块
//!
//! 纯数据结构，不依赖 axum/tokio

pub mod remote;

pub use remote::{
    DeployRequest, DeployResponse, DeployStatus, ExecOutput, ExecuteRequest, ExecuteResponse,
};
