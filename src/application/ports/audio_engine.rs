//! Audio Engine Port - 外部音频引擎抽象
//!
//! 定义语音合成/试听引擎的抽象接口，具体实现在 infrastructure/adapters 层。
//! 引擎不提供播放完成事件，`is_sampling` 谓词是试听状态的唯一真相来源，
//! PlaybackSampler 据此轮询

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::voice::{LanguageKey, VoiceKey};

/// 音频引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Audio Engine Port
///
/// 外部音频引擎的窄接口；start/stop 失败均为非致命错误，
/// 调用方降级为 Idle 状态
#[async_trait]
pub trait AudioEnginePort: Send + Sync {
    /// 开始试听指定音色（引擎会隐式停掉其他正在试听的音色）
    async fn start_sample(&self, key: &VoiceKey) -> Result<(), EngineError>;

    /// 停止当前试听
    async fn stop_sample(&self) -> Result<(), EngineError>;

    /// 指定音色是否正在试听
    async fn is_sampling(&self, key: &VoiceKey) -> bool;

    /// 设置某语言的首选音色
    async fn set_preferred_voice(
        &self,
        key: &VoiceKey,
        language: &LanguageKey,
    ) -> Result<(), EngineError>;

    /// 引擎当前使用的音色
    async fn current_voice(&self) -> Option<VoiceKey>;

    /// 是否正在朗读文章
    async fn is_playing_article(&self) -> bool;

    /// 是否正在加载文章音频
    async fn is_loading_article(&self) -> bool;
}
