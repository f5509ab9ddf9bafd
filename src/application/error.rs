//! 应用层错误定义

use thiserror::Error;

use crate::application::ports::PreferenceError;

/// 应用层错误
///
/// 本子系统内没有致命错误：所有失败都降级为可见的空闲 UI 状态，
/// 错误仅在确实需要上抛时（如偏好写入失败）返回给调用方
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 音色不在当前目录内
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// 偏好存储错误
    #[error("Preference store error: {0}")]
    PreferenceError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl From<PreferenceError> for ApplicationError {
    fn from(err: PreferenceError) -> Self {
        Self::PreferenceError(err.to_string())
    }
}
