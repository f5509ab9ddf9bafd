//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Voice Context: 音色目录
//! - Access Context: 真实层级准入

pub mod access;
pub mod voice;
