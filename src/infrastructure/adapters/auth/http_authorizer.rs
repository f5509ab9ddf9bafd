//! HTTP Access Authorizer - 调用外部授权服务
//!
//! 实现 AccessAuthorizerPort trait，通过 HTTP 调用授权服务
//!
//! 外部授权 API:
//! POST {base_url}/api/features/realistic-voices/request
//! Response: {"entitlement_key": "..."} 或 {"entitlement_key": null}（等待名单）

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::{AccessAuthorizerPort, AccessDecision, AccessError};
use crate::domain::access::EntitlementKey;

/// 授权响应体 (JSON)
#[derive(Debug, Deserialize)]
struct AccessHttpResponse {
    /// 授予的 entitlement key；null 表示已登记等待名单
    entitlement_key: Option<String>,
}

/// HTTP 授权客户端配置
#[derive(Debug, Clone)]
pub struct HttpAccessAuthorizerConfig {
    /// 授权服务基础 URL
    pub base_url: String,
    /// 传输层超时（秒）；门本身不施加超时
    pub timeout_secs: u64,
}

impl Default for HttpAccessAuthorizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpAccessAuthorizerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 授权客户端
pub struct HttpAccessAuthorizer {
    client: Client,
    config: HttpAccessAuthorizerConfig,
}

impl HttpAccessAuthorizer {
    pub fn new(config: HttpAccessAuthorizerConfig) -> Result<Self, AccessError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AccessError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn with_default_config() -> Result<Self, AccessError> {
        Self::new(HttpAccessAuthorizerConfig::default())
    }

    fn request_url(&self) -> String {
        format!(
            "{}/api/features/realistic-voices/request",
            self.config.base_url
        )
    }
}

#[async_trait]
impl AccessAuthorizerPort for HttpAccessAuthorizer {
    async fn request_realistic_access(&self) -> Result<AccessDecision, AccessError> {
        tracing::debug!(url = %self.request_url(), "Sending realistic access request");

        let response = self
            .client
            .post(self.request_url())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AccessError::Timeout
                } else if e.is_connect() {
                    AccessError::NetworkError(format!(
                        "Cannot connect to authorization service: {}",
                        e
                    ))
                } else {
                    AccessError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AccessError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: AccessHttpResponse = response
            .json()
            .await
            .map_err(|e| AccessError::InvalidResponse(e.to_string()))?;

        match body.entitlement_key {
            Some(raw) => {
                let key = EntitlementKey::new(raw)
                    .map_err(|e| AccessError::InvalidResponse(e.to_string()))?;
                Ok(AccessDecision::Granted(key))
            }
            None => Ok(AccessDecision::Waitlisted),
        }
    }
}
