//! 请求提取与中间件

pub mod json_body;

pub use json_body::JsonBody;
