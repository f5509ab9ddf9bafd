//! Fake Audio Engine - 测试与演示用的音频引擎
//!
//! 不产生真实声音；在内存中模拟 "同一时刻至多一个试听 key" 的引擎行为，
//! 并暴露探针（调用计数、当前在播 key、模拟播完）供测试断言

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{AudioEnginePort, EngineError};
use crate::domain::voice::{LanguageKey, VoiceKey};

#[derive(Default)]
struct EngineState {
    sampling: Option<VoiceKey>,
    preferred: HashMap<LanguageKey, VoiceKey>,
    current: Option<VoiceKey>,
    playing_article: bool,
    loading_article: bool,
}

/// Fake Audio Engine
pub struct FakeAudioEngine {
    state: Mutex<EngineState>,
    available: AtomicBool,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl FakeAudioEngine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EngineState::default()),
            available: AtomicBool::new(true),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// 模拟引擎不可用（start/stop 返回错误）
    pub fn set_available(&self, value: bool) {
        self.available.store(value, Ordering::SeqCst);
    }

    /// 模拟样本自然播完（引擎侧静默回到无试听）
    pub fn finish_sample(&self) {
        self.state.lock().expect("engine lock").sampling = None;
    }

    /// 模拟文章朗读的播放/加载状态
    pub fn set_article_state(&self, playing: bool, loading: bool) {
        let mut state = self.state.lock().expect("engine lock");
        state.playing_article = playing;
        state.loading_article = loading;
    }

    /// 当前在播的试听 key（测试探针）
    pub fn sampling_now(&self) -> Option<VoiceKey> {
        self.state.lock().expect("engine lock").sampling.clone()
    }

    /// 某语言当前的首选音色（测试探针）
    pub fn preferred_for(&self, language: &LanguageKey) -> Option<VoiceKey> {
        self.state
            .lock()
            .expect("engine lock")
            .preferred
            .get(language)
            .cloned()
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), EngineError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EngineError::Unavailable("fake engine offline".to_string()))
        }
    }
}

impl Default for FakeAudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioEnginePort for FakeAudioEngine {
    async fn start_sample(&self, key: &VoiceKey) -> Result<(), EngineError> {
        self.ensure_available()?;
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        // 隐式停掉其他正在试听的 key
        self.state.lock().expect("engine lock").sampling = Some(key.clone());
        tracing::debug!(voice_key = %key, "FakeAudioEngine: sample started");
        Ok(())
    }

    async fn stop_sample(&self) -> Result<(), EngineError> {
        self.ensure_available()?;
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().expect("engine lock").sampling = None;
        tracing::debug!("FakeAudioEngine: sample stopped");
        Ok(())
    }

    async fn is_sampling(&self, key: &VoiceKey) -> bool {
        if !self.available.load(Ordering::SeqCst) {
            return false;
        }
        self.state.lock().expect("engine lock").sampling.as_ref() == Some(key)
    }

    async fn set_preferred_voice(
        &self,
        key: &VoiceKey,
        language: &LanguageKey,
    ) -> Result<(), EngineError> {
        self.ensure_available()?;
        let mut state = self.state.lock().expect("engine lock");
        state.preferred.insert(language.clone(), key.clone());
        state.current = Some(key.clone());
        Ok(())
    }

    async fn current_voice(&self) -> Option<VoiceKey> {
        self.state.lock().expect("engine lock").current.clone()
    }

    async fn is_playing_article(&self) -> bool {
        self.state.lock().expect("engine lock").playing_article
    }

    async fn is_loading_article(&self) -> bool {
        self.state.lock().expect("engine lock").loading_article
    }
}
