//! Configuration Types

use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::FeatureFlagPort;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 采样器配置
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// 功能开关配置
    #[serde(default)]
    pub features: FeatureConfig,

    /// 授权服务配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 试听采样器配置
#[derive(Debug, Clone, Deserialize)]
pub struct SamplerConfig {
    /// 轮询间隔（秒）
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    2
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl SamplerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// 功能开关配置
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureConfig {
    /// 真实音色层级是否开放
    #[serde(default = "default_realistic_enabled")]
    pub enable_realistic_voices: bool,
}

fn default_realistic_enabled() -> bool {
    true
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            enable_realistic_voices: default_realistic_enabled(),
        }
    }
}

impl FeatureFlagPort for FeatureConfig {
    fn enable_realistic_voices(&self) -> bool {
        self.enable_realistic_voices
    }
}

/// 授权服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 授权服务基础 URL
    #[serde(default = "default_auth_url")]
    pub url: String,

    /// 传输层超时（秒）
    #[serde(default = "default_auth_timeout")]
    pub timeout_secs: u64,
}

fn default_auth_url() -> String {
    "http://localhost:6080".to_string()
}

fn default_auth_timeout() -> u64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: default_auth_url(),
            timeout_secs: default_auth_timeout(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 偏好数据库路径
    #[serde(default = "default_prefs_path")]
    pub prefs_path: String,
}

fn default_prefs_path() -> String {
    "data/prefs.sled".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefs_path: default_prefs_path(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.sampler.poll_interval_secs, 2);
        assert!(config.features.enable_realistic_voices);
        assert_eq!(config.auth.url, "http://localhost:6080");
        assert_eq!(config.storage.prefs_path, "data/prefs.sled");
    }

    #[test]
    fn test_poll_interval_duration() {
        let config = SamplerConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
    }
}
