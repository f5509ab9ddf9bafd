//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（AudioEngine、AccessAuthorizer、
//!   PreferenceStore、FeatureFlag）
//! - gate: 真实层级准入门
//! - sampler: 试听轮询采样器
//! - controller: 音色选择编排与视图状态合成
//! - error: 应用层错误定义

pub mod controller;
pub mod error;
pub mod gate;
pub mod ports;
pub mod sampler;

pub use controller::{AccessNote, ViewSection, ViewState, VoiceRow, VoiceSelectionController};
pub use error::ApplicationError;
pub use gate::{FeatureAccessGate, GateSnapshot};
pub use ports::{
    AccessAuthorizerPort, AccessDecision, AccessError, AudioEnginePort, EngineError,
    FeatureFlagPort, PreferenceError, PreferenceStorePort, StaticFeatureFlags,
};
pub use sampler::{PlaybackSampler, PlaybackState, DEFAULT_POLL_INTERVAL};
