//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `LECTOR_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `LECTOR_SAMPLER__POLL_INTERVAL_SECS=1`
/// - `LECTOR_FEATURES__ENABLE_REALISTIC_VOICES=false`
/// - `LECTOR_AUTH__URL=http://auth-server:6080`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("sampler.poll_interval_secs", 2)?
        .set_default("features.enable_realistic_voices", true)?
        .set_default("auth.url", "http://localhost:6080")?
        .set_default("auth.timeout_secs", 30)?
        .set_default("storage.prefs_path", "data/prefs.sled")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    builder = builder.add_source(
        Environment::with_prefix("LECTOR")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.sampler.poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Sampler poll interval cannot be 0".to_string(),
        ));
    }

    if config.auth.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Authorization service URL cannot be empty".to_string(),
        ));
    }

    if config.storage.prefs_path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Preference store path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Sampler Poll Interval: {}s", config.sampler.poll_interval_secs);
    tracing::info!(
        "Realistic Voices Enabled: {}",
        config.features.enable_realistic_voices
    );
    tracing::info!("Auth URL: {}", config.auth.url);
    tracing::info!("Auth Timeout: {}s", config.auth.timeout_secs);
    tracing::info!("Preference Store: {}", config.storage.prefs_path);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_passes_for_default_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_poll_interval() {
        let mut config = AppConfig::default();
        config.sampler.poll_interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_auth_url() {
        let mut config = AppConfig::default();
        config.auth.url = String::new();
        assert!(validate_config(&config).is_err());
    }
}
