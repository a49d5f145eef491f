//! JSON 请求体 Extractor
//!
//! 提供 `JsonBody<T>`，替代 `axum::Json` 作为请求体提取器：
//! 解析失败时返回 `{"error": "..."}` 的 400，而不是 axum 默认的纯文本拒绝响应

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON 请求体
///
/// # Example
///
/// ```ignore
/// async fn handler(JsonBody(req): JsonBody<ExecuteRequest>) -> impl IntoResponse {
///     // handler 逻辑...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::warn!(reason = %rejection.body_text(), "Rejected request body");
                Err(ApiError::bad_request(format!(
                    "Invalid JSON body: {}",
                    rejection.body_text()
                )))
            }
        }
    }
}
