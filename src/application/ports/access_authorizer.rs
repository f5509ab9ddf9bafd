//! Access Authorizer Port - 准入授权服务抽象
//!
//! 定义真实音色层级准入请求的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::access::EntitlementKey;

/// 准入请求错误
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 准入请求的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// 立即授予，携带 entitlement key
    Granted(EntitlementKey),
    /// 已登记到等待名单，本次未授予 key
    Waitlisted,
}

/// Access Authorizer Port
///
/// 一次性异步请求；调用方不重试、不加超时（传输层超时由适配器自理）
#[async_trait]
pub trait AccessAuthorizerPort: Send + Sync {
    /// 请求真实音色层级的准入
    async fn request_realistic_access(&self) -> Result<AccessDecision, AccessError>;
}
