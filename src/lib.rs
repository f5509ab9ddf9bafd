//! Lector - 文章朗读客户端的音色管理子系统
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Context: 音色目录（key、分类、语言、层级，确定性分组）
//! - Access Context: 真实层级准入（entitlement key + 纯函数状态推导）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（AudioEngine, AccessAuthorizer, PreferenceStore, FeatureFlag）
//! - Gate: 准入门（Locked/Waiting/Granted）
//! - Sampler: 试听轮询采样器（引擎谓词 + 固定间隔轮询）
//! - Controller: 音色选择编排与视图状态合成
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 授权客户端、Fake 引擎/授权方
//! - Memory: 内存偏好存储
//! - Persistence: Sled 偏好持久化

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
