//! Fake Access Authorizer - 测试与演示用的授权方
//!
//! 按脚本解析准入请求，可配置延迟，并记录请求次数

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{AccessAuthorizerPort, AccessDecision, AccessError};
use crate::domain::access::EntitlementKey;

enum Resolution {
    Grant(String),
    Waitlist,
    Fail,
}

/// Fake Access Authorizer
pub struct FakeAccessAuthorizer {
    resolution: Resolution,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
}

impl FakeAccessAuthorizer {
    /// 解析为授予指定 key
    pub fn granting(key: impl Into<String>) -> Self {
        Self {
            resolution: Resolution::Grant(key.into()),
            delay: Mutex::new(Duration::from_millis(20)),
            calls: AtomicUsize::new(0),
        }
    }

    /// 解析为等待名单登记
    pub fn waitlisting() -> Self {
        Self {
            resolution: Resolution::Waitlist,
            delay: Mutex::new(Duration::from_millis(20)),
            calls: AtomicUsize::new(0),
        }
    }

    /// 解析为失败
    pub fn failing() -> Self {
        Self {
            resolution: Resolution::Fail,
            delay: Mutex::new(Duration::from_millis(20)),
            calls: AtomicUsize::new(0),
        }
    }

    /// 设置模拟解析延迟
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().expect("authorizer lock") = delay;
    }

    /// 已收到的请求次数（测试探针）
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccessAuthorizerPort for FakeAccessAuthorizer {
    async fn request_realistic_access(&self) -> Result<AccessDecision, AccessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().expect("authorizer lock");
        tokio::time::sleep(delay).await;

        match &self.resolution {
            Resolution::Grant(key) => {
                let key = EntitlementKey::new(key.clone())
                    .map_err(|e| AccessError::InvalidResponse(e.to_string()))?;
                tracing::debug!(key = %key, "FakeAccessAuthorizer: granting");
                Ok(AccessDecision::Granted(key))
            }
            Resolution::Waitlist => {
                tracing::debug!("FakeAccessAuthorizer: waitlisting");
                Ok(AccessDecision::Waitlisted)
            }
            Resolution::Fail => Err(AccessError::ServiceError(
                "scripted failure".to_string(),
            )),
        }
    }
}
