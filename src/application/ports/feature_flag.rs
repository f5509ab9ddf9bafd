//! Feature Flag Port - 功能开关来源
//!
//! 每次目录查询读取一次，不在本子系统内持有

/// Feature Flag Port
pub trait FeatureFlagPort: Send + Sync {
    /// 真实音色层级是否对当前构建开放
    fn enable_realistic_voices(&self) -> bool;
}

/// 固定取值的开关（测试与演示用）
#[derive(Debug, Clone, Copy)]
pub struct StaticFeatureFlags {
    pub realistic_voices: bool,
}

impl FeatureFlagPort for StaticFeatureFlags {
    fn enable_realistic_voices(&self) -> bool {
        self.realistic_voices
    }
}
