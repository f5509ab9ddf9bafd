//! Playback Sampler - 音色试听驱动
//!
//! 引擎只暴露 "该 key 是否正在试听" 谓词，不推送完成事件，
//! 因此以固定间隔轮询来察觉自然播完，并使本地意图与引擎真相对齐。
//!
//! 不变量:
//! - 任意时刻至多一个 key 处于 Sampling
//! - 每个 Sampling 状态恰好对应一个存活的轮询循环；新试听启动前
//!   必须先取消旧循环，由代际计数 + 取消令牌双重判别过期轮询，
//!   过期轮询不得清掉新试听的高亮

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::AudioEnginePort;
use crate::domain::voice::VoiceKey;

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// 试听状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Sampling(VoiceKey),
}

impl PlaybackState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PlaybackState::Idle)
    }

    pub fn sampling_key(&self) -> Option<&VoiceKey> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Sampling(key) => Some(key),
        }
    }
}

struct SamplerInner {
    tracked: Option<VoiceKey>,
    /// 每次 toggle 递增；轮询循环携带启动时的代际，不一致即过期
    generation: u64,
    poll_cancel: Option<CancellationToken>,
}

/// 试听采样器
pub struct PlaybackSampler {
    engine: Arc<dyn AudioEnginePort>,
    poll_interval: Duration,
    inner: Arc<Mutex<SamplerInner>>,
}

impl PlaybackSampler {
    pub fn new(engine: Arc<dyn AudioEnginePort>, poll_interval: Duration) -> Self {
        Self {
            engine,
            poll_interval,
            inner: Arc::new(Mutex::new(SamplerInner {
                tracked: None,
                generation: 0,
                poll_cancel: None,
            })),
        }
    }

    pub fn with_default_interval(engine: Arc<dyn AudioEnginePort>) -> Self {
        Self::new(engine, DEFAULT_POLL_INTERVAL)
    }

    /// 当前试听状态
    pub fn state(&self) -> PlaybackState {
        let inner = self.inner.lock().expect("sampler lock");
        match &inner.tracked {
            Some(key) => PlaybackState::Sampling(key.clone()),
            None => PlaybackState::Idle,
        }
    }

    /// 切换某音色的试听
    ///
    /// 引擎报告该 key 正在试听 => 停止并回到 Idle；
    /// 否则启动该 key（引擎隐式停掉其他试听）并开始轮询。
    /// 引擎不可用按立即 Idle 降级，无高亮
    pub async fn toggle_sample(&self, key: &VoiceKey) {
        if self.engine.is_sampling(key).await {
            self.stop_tracking();
            if let Err(e) = self.engine.stop_sample().await {
                tracing::warn!(voice_key = %key, error = %e, "Failed to stop sample");
            }
            tracing::debug!(voice_key = %key, "Sample stopped");
            return;
        }

        // 接管试听：作废旧轮询，登记新代际
        let (generation, cancel) = {
            let mut inner = self.inner.lock().expect("sampler lock");
            inner.generation += 1;
            if let Some(old) = inner.poll_cancel.take() {
                old.cancel();
            }
            let token = CancellationToken::new();
            inner.poll_cancel = Some(token.clone());
            inner.tracked = Some(key.clone());
            (inner.generation, token)
        };

        if let Err(e) = self.engine.start_sample(key).await {
            tracing::warn!(voice_key = %key, error = %e, "Failed to start sample, staying idle");
            let mut inner = self.inner.lock().expect("sampler lock");
            if inner.generation == generation {
                inner.tracked = None;
                if let Some(token) = inner.poll_cancel.take() {
                    token.cancel();
                }
            }
            return;
        }

        tracing::debug!(voice_key = %key, generation = generation, "Sample started, polling");
        self.spawn_poll(key.clone(), generation, cancel);
    }

    /// 启动轮询循环，直到样本播完、被新试听接管或被取消
    fn spawn_poll(&self, key: VoiceKey, generation: u64, cancel: CancellationToken) {
        let engine = self.engine.clone();
        let inner = self.inner.clone();
        let interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // interval 的首个 tick 立即返回，先吞掉
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!(voice_key = %key, "Poll cancelled");
                        break;
                    }
                    _ = ticker.tick() => {}
                }

                let playing = engine.is_sampling(&key).await;

                let mut guard = inner.lock().expect("sampler lock");
                if guard.generation != generation {
                    // 新的 toggle 已接管试听，本循环退出且不触碰状态
                    break;
                }
                if playing {
                    continue;
                }
                if guard.tracked.as_ref() == Some(&key) {
                    guard.tracked = None;
                    guard.poll_cancel = None;
                    tracing::debug!(voice_key = %key, "Sample finished naturally");
                }
                break;
            }
        });
    }

    fn stop_tracking(&self) {
        let mut inner = self.inner.lock().expect("sampler lock");
        inner.generation += 1;
        inner.tracked = None;
        if let Some(token) = inner.poll_cancel.take() {
            token.cancel();
        }
    }

    /// 视图销毁：取消轮询并停掉在播样本，避免孤儿音频与残留定时器
    pub async fn shutdown(&self) {
        let was_sampling = {
            let mut inner = self.inner.lock().expect("sampler lock");
            inner.generation += 1;
            if let Some(token) = inner.poll_cancel.take() {
                token.cancel();
            }
            inner.tracked.take().is_some()
        };

        if was_sampling {
            if let Err(e) = self.engine.stop_sample().await {
                tracing::warn!(error = %e, "Failed to stop sample on teardown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    use crate::infrastructure::adapters::FakeAudioEngine;

    fn key(s: &str) -> VoiceKey {
        VoiceKey::new(s).unwrap()
    }

    fn sampler(engine: &Arc<FakeAudioEngine>) -> PlaybackSampler {
        PlaybackSampler::new(engine.clone() as Arc<dyn AudioEnginePort>, DEFAULT_POLL_INTERVAL)
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_starts_then_stops() {
        let engine = Arc::new(FakeAudioEngine::new());
        let sampler = sampler(&engine);
        let a = key("A");

        sampler.toggle_sample(&a).await;
        assert_eq!(sampler.state(), PlaybackState::Sampling(a.clone()));
        assert_eq!(engine.sampling_now(), Some(a.clone()));

        sampler.toggle_sample(&a).await;
        assert!(sampler.state().is_idle());
        assert_eq!(engine.sampling_now(), None);
        assert_eq!(engine.stop_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_keeps_state_while_playing() {
        let engine = Arc::new(FakeAudioEngine::new());
        let sampler = sampler(&engine);
        let a = key("A");

        sampler.toggle_sample(&a).await;
        // 多个轮询周期内引擎持续在播
        sleep(Duration::from_secs(7)).await;
        assert_eq!(sampler.state(), PlaybackState::Sampling(a));
    }

    #[tokio::test(start_paused = true)]
    async fn test_natural_completion_drives_idle() {
        let engine = Arc::new(FakeAudioEngine::new());
        let sampler = sampler(&engine);
        let a = key("A");

        sampler.toggle_sample(&a).await;
        engine.finish_sample();

        // 下一个轮询 tick 观察到 is_sampling == false
        sleep(Duration::from_secs(3)).await;
        assert!(sampler.state().is_idle());
        // 自然播完不触发 stop_sample
        assert_eq!(engine.stop_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_sample_supersedes_old_poll() {
        let engine = Arc::new(FakeAudioEngine::new());
        let sampler = sampler(&engine);
        let a = key("A");
        let b = key("B");

        sampler.toggle_sample(&a).await;
        sleep(Duration::from_secs(3)).await;
        assert_eq!(sampler.state(), PlaybackState::Sampling(a.clone()));

        // 启动 B，引擎隐式停掉 A；A 的过期轮询不得清掉 B 的状态
        sampler.toggle_sample(&b).await;
        assert_eq!(engine.sampling_now(), Some(b.clone()));

        sleep(Duration::from_secs(7)).await;
        assert_eq!(sampler.state(), PlaybackState::Sampling(b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_one_sampling() {
        let engine = Arc::new(FakeAudioEngine::new());
        let sampler = sampler(&engine);

        for name in ["A", "B", "C"] {
            sampler.toggle_sample(&key(name)).await;
            // 引擎侧与本地侧都只有一个在播 key
            assert_eq!(engine.sampling_now(), Some(key(name)));
            assert_eq!(sampler.state(), PlaybackState::Sampling(key(name)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_unavailable_degrades_to_idle() {
        let engine = Arc::new(FakeAudioEngine::new());
        engine.set_available(false);
        let sampler = sampler(&engine);

        sampler.toggle_sample(&key("A")).await;
        assert!(sampler.state().is_idle());

        // 没有轮询残留
        sleep(Duration::from_secs(5)).await;
        assert!(sampler.state().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_sample_and_poll() {
        let engine = Arc::new(FakeAudioEngine::new());
        let sampler = sampler(&engine);
        let a = key("A");

        sampler.toggle_sample(&a).await;
        sampler.shutdown().await;

        assert!(sampler.state().is_idle());
        assert_eq!(engine.sampling_now(), None);
        assert_eq!(engine.stop_calls(), 1);

        sleep(Duration::from_secs(5)).await;
        assert!(sampler.state().is_idle());
    }
}
