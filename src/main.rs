//! Lector - 音色选择子系统演示
//!
//! 用 Fake 引擎/授权方 + Sled 偏好存储把子系统组装起来，
//! 走一遍完整交互：列目录 -> 试听 -> 开启真实层级 -> 选择音色

use std::sync::Arc;

use lector::application::VoiceSelectionController;
use lector::config::{load_config, print_config};
use lector::domain::voice::{LanguageKey, VoiceCatalog, VoiceKey};
use lector::infrastructure::adapters::{FakeAccessAuthorizer, FakeAudioEngine};
use lector::infrastructure::persistence::sled::SledPreferenceStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!("{},lector={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Lector - 音色选择子系统演示");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.storage.prefs_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 组装：外部协作者一律走端口
    let engine = Arc::new(FakeAudioEngine::new());
    let authorizer = Arc::new(FakeAccessAuthorizer::granting("demo-entitlement"));
    let prefs = SledPreferenceStore::open(&config.storage.prefs_path)
        .map_err(|e| anyhow::anyhow!("Failed to open preference store: {}", e))?
        .arc();
    let flags = Arc::new(config.features.clone());

    let language = LanguageKey::new("en").map_err(|e| anyhow::anyhow!(e))?;
    let controller = VoiceSelectionController::activate(
        VoiceCatalog::builtin(),
        language,
        engine,
        authorizer,
        prefs,
        flags,
        config.sampler.poll_interval(),
    )
    .await;

    // 标准目录
    for section in controller.visible_catalog() {
        tracing::info!(
            category = section.category.display_name(),
            voices = section.voices.len(),
            "Catalog section"
        );
    }

    // 试听一个音色，等一个轮询周期
    let aria = VoiceKey::new("en-US-aria").map_err(|e| anyhow::anyhow!(e))?;
    controller.toggle_sample(&aria).await;
    tokio::time::sleep(config.sampler.poll_interval()).await;
    tracing::info!(state = ?controller.playback_state(), "Playback after one poll");

    // 开启真实层级（触发异步准入请求）并等待解析
    controller.toggle_realistic(true).await;
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    tracing::info!(state = controller.access_state().as_str(), "Access after resolution");

    for section in controller.visible_catalog() {
        for voice in &section.voices {
            tracing::info!(voice_key = %voice.key(), name = voice.name(), "Realistic voice");
        }
    }

    // 提交选择并收尾
    if let Some(first) = controller
        .visible_catalog()
        .first()
        .and_then(|s| s.voices.first().map(|v| v.key().clone()))
    {
        controller.select_voice(&first).await?;
    }

    let view = controller.view_state().await;
    tracing::info!(
        realistic_toggle = view.realistic_toggle,
        sections = view.sections.len(),
        "Final view state"
    );

    controller.shutdown().await;
    Ok(())
}
