//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod access_authorizer;
mod audio_engine;
mod feature_flag;
mod preference_store;

pub use access_authorizer::{AccessAuthorizerPort, AccessDecision, AccessError};
pub use audio_engine::{AudioEnginePort, EngineError};
pub use feature_flag::{FeatureFlagPort, StaticFeatureFlags};
pub use preference_store::{PreferenceError, PreferenceStorePort};
