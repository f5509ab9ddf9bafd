//! Preference Store Port - 偏好持久化抽象
//!
//! 外部 key-value 存储：每语言的已选音色、entitlement key、
//! 真实层级开关位、准入请求已登记标志。
//! 存储本身不属于本子系统，控制器只读写

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::access::EntitlementKey;
use crate::domain::voice::{LanguageKey, VoiceKey};

/// 偏好存储错误
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

/// Preference Store Port
#[async_trait]
pub trait PreferenceStorePort: Send + Sync {
    /// 读取某语言的已选音色
    async fn selected_voice(&self, language: &LanguageKey)
        -> Result<Option<VoiceKey>, PreferenceError>;

    /// 写入某语言的已选音色
    async fn set_selected_voice(
        &self,
        language: &LanguageKey,
        key: &VoiceKey,
    ) -> Result<(), PreferenceError>;

    /// 读取已存的 entitlement key
    async fn entitlement_key(&self) -> Result<Option<EntitlementKey>, PreferenceError>;

    /// 持久化 entitlement key（跨会话保留）
    async fn set_entitlement_key(&self, key: &EntitlementKey) -> Result<(), PreferenceError>;

    /// 读取真实层级开关位
    async fn realistic_opt_in(&self) -> Result<bool, PreferenceError>;

    /// 写入真实层级开关位
    async fn set_realistic_opt_in(&self, value: bool) -> Result<(), PreferenceError>;

    /// 准入请求是否已被授权方登记过（等待名单语义）
    async fn access_requested(&self) -> Result<bool, PreferenceError>;

    /// 标记准入请求已登记
    async fn set_access_requested(&self, value: bool) -> Result<(), PreferenceError>;
}
