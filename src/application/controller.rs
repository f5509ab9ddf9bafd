//! Voice Selection Controller - 音色选择编排
//!
//! 组合目录、准入门与采样器：根据 (功能开关, 门状态, 用户开关) 选出
//! 可见的目录子集，把选择写入外部偏好，并向展示层合成视图状态。
//! 选择音色不影响试听状态

use std::sync::Arc;
use std::time::Duration;

use crate::application::error::ApplicationError;
use crate::application::gate::FeatureAccessGate;
use crate::application::ports::{
    AccessAuthorizerPort, AudioEnginePort, FeatureFlagPort, PreferenceStorePort,
};
use crate::application::sampler::{PlaybackSampler, PlaybackState};
use crate::domain::access::AccessState;
use crate::domain::voice::{CatalogSection, LanguageKey, VoiceCatalog, VoiceCategory, VoiceKey, VoiceTier};

/// 真实层级 UI 块的提示文案分支
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessNote {
    /// 已持有 key：展示用量限制提示
    RealisticLimit,
    /// 请求已登记：展示 "request received"
    RequestReceived,
    /// 默认：展示等待名单召集
    Waitlist,
}

/// 单行音色的展示状态
#[derive(Debug, Clone)]
pub struct VoiceRow {
    pub key: VoiceKey,
    pub name: String,
    /// 是该语言当前已选音色
    pub selected: bool,
    /// 正在试听（高亮 stop 图标）
    pub sampling: bool,
    /// 已选且引擎同时在播放与加载文章时显示 spinner
    pub loading: bool,
}

/// 一个展示分组
#[derive(Debug, Clone)]
pub struct ViewSection {
    pub category: VoiceCategory,
    pub rows: Vec<VoiceRow>,
}

/// 合成后的视图状态
#[derive(Debug, Clone)]
pub struct ViewState {
    /// 真实层级 UI 块是否出现（功能开关 && 语言为 en）
    pub realistic_block_visible: bool,
    /// 真实层级开关的当前位置
    pub realistic_toggle: bool,
    /// 准入请求在途，展示等待指示
    pub waiting_for_access: bool,
    pub access_note: Option<AccessNote>,
    pub sections: Vec<ViewSection>,
}

/// 音色选择控制器
///
/// 会话作用域：视图激活时构建，销毁时必须调用 `shutdown`
pub struct VoiceSelectionController {
    catalog: VoiceCatalog,
    language: LanguageKey,
    gate: FeatureAccessGate,
    sampler: PlaybackSampler,
    engine: Arc<dyn AudioEnginePort>,
    prefs: Arc<dyn PreferenceStorePort>,
    flags: Arc<dyn FeatureFlagPort>,
}

impl VoiceSelectionController {
    /// 视图激活：从偏好存储恢复门状态并搭建采样器
    pub async fn activate(
        catalog: VoiceCatalog,
        language: LanguageKey,
        engine: Arc<dyn AudioEnginePort>,
        authorizer: Arc<dyn AccessAuthorizerPort>,
        prefs: Arc<dyn PreferenceStorePort>,
        flags: Arc<dyn FeatureFlagPort>,
        poll_interval: Duration,
    ) -> Self {
        let gate = FeatureAccessGate::restore(authorizer, prefs.clone()).await;
        let sampler = PlaybackSampler::new(engine.clone(), poll_interval);

        tracing::debug!(language = %language, "VoiceSelectionController activated");

        Self {
            catalog,
            language,
            gate,
            sampler,
            engine,
            prefs,
            flags,
        }
    }

    /// 真实层级 UI 块是否出现
    fn realistic_block_visible(&self) -> bool {
        self.flags.enable_realistic_voices() && self.language.as_str() == "en"
    }

    /// 由 (功能开关, 门状态) 选出当前层级
    fn current_tier(&self) -> VoiceTier {
        if self.realistic_block_visible() && self.gate.state().is_granted() {
            VoiceTier::Realistic
        } else {
            VoiceTier::Standard
        }
    }

    /// 当前可见的目录子集，按分类稳定分组
    pub fn visible_catalog(&self) -> Vec<CatalogSection> {
        self.catalog.list_for(&self.language, self.current_tier())
    }

    /// 当前准入状态
    pub fn access_state(&self) -> AccessState {
        self.gate.state()
    }

    /// 当前试听状态
    pub fn playback_state(&self) -> PlaybackState {
        self.sampler.state()
    }

    /// 驱动真实层级开关（可能触发异步准入请求）
    pub async fn toggle_realistic(&self, value: bool) {
        self.gate.set_opt_in(value).await;
    }

    /// 切换某音色的试听
    pub async fn toggle_sample(&self, key: &VoiceKey) {
        self.sampler.toggle_sample(key).await;
    }

    /// 提交音色选择：写入外部偏好并转发给引擎；不影响试听状态
    pub async fn select_voice(&self, key: &VoiceKey) -> Result<(), ApplicationError> {
        let voice = self
            .catalog
            .find(key)
            .ok_or_else(|| ApplicationError::VoiceNotFound(key.to_string()))?;

        self.prefs.set_selected_voice(&self.language, key).await?;

        // 引擎侧转发尽力而为，偏好已落盘
        if let Err(e) = self.engine.set_preferred_voice(key, &self.language).await {
            tracing::warn!(voice_key = %key, error = %e, "Failed to forward preferred voice");
        }

        tracing::info!(
            voice_key = %key,
            name = %voice.name(),
            language = %self.language,
            "Voice selected"
        );
        Ok(())
    }

    /// 合成展示层需要的完整视图状态
    pub async fn view_state(&self) -> ViewState {
        let snapshot = self.gate.snapshot();
        let realistic_block_visible = self.realistic_block_visible();
        let waiting = snapshot.state.is_waiting();

        let access_note = if !realistic_block_visible {
            None
        } else if !waiting && snapshot.has_entitlement_key {
            Some(AccessNote::RealisticLimit)
        } else if snapshot.access_requested {
            Some(AccessNote::RequestReceived)
        } else {
            Some(AccessNote::Waitlist)
        };

        let selected = self
            .prefs
            .selected_voice(&self.language)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read selected voice");
                None
            });
        let sampling = self.sampler.state();
        let engine_busy =
            self.engine.is_playing_article().await && self.engine.is_loading_article().await;

        let sections = self
            .visible_catalog()
            .into_iter()
            .map(|section| ViewSection {
                category: section.category,
                rows: section
                    .voices
                    .iter()
                    .map(|voice| {
                        let is_selected = selected.as_ref() == Some(voice.key());
                        VoiceRow {
                            key: voice.key().clone(),
                            name: voice.name().to_string(),
                            selected: is_selected,
                            sampling: sampling.sampling_key() == Some(voice.key()),
                            loading: is_selected && engine_busy,
                        }
                    })
                    .collect(),
            })
            .collect();

        ViewState {
            realistic_block_visible,
            realistic_toggle: snapshot.opted_in,
            waiting_for_access: waiting,
            access_note,
            sections,
        }
    }

    /// 视图销毁：停掉在播样本、取消轮询与在途准入请求
    pub async fn shutdown(&self) {
        self.sampler.shutdown().await;
        self.gate.shutdown();
        tracing::debug!(language = %self.language, "VoiceSelectionController shut down");
    }
}
