//! Feature Access Gate - 真实音色层级的准入门
//!
//! 状态机: Locked --(开启开关且无已存 key)--> Waiting --(解析)--> Granted / Locked
//!
//! 不变量:
//! - 每个开启沿最多发出一次准入请求；Waiting 期间再次开启不重复请求
//! - Granted 为会话内终态；关闭开关不丢弃已存 key，
//!   再次开启直接回到 Granted，零新请求
//! - 除 Waiting 瞬态外，状态一律由 (已存 key, 开关位) 纯函数重推导

use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::ports::{
    AccessAuthorizerPort, AccessDecision, PreferenceStorePort,
};
use crate::domain::access::{derive_access_state, AccessState, EntitlementKey};

/// 门的可见快照，供控制器合成视图状态
#[derive(Debug, Clone)]
pub struct GateSnapshot {
    pub state: AccessState,
    pub opted_in: bool,
    /// 是否已持有 entitlement key（与开关位无关）
    pub has_entitlement_key: bool,
    /// 授权方是否已登记过本用户的准入请求（等待名单语义）
    pub access_requested: bool,
}

struct GateInner {
    stored_key: Option<EntitlementKey>,
    opted_in: bool,
    waiting: bool,
    access_requested: bool,
    request_task: Option<JoinHandle<()>>,
}

/// 准入门
pub struct FeatureAccessGate {
    authorizer: Arc<dyn AccessAuthorizerPort>,
    prefs: Arc<dyn PreferenceStorePort>,
    inner: Arc<Mutex<GateInner>>,
    cancel: CancellationToken,
}

impl FeatureAccessGate {
    /// 从偏好存储恢复门状态（视图激活时调用）
    ///
    /// 初始开关位 = 持久化开关位 && 已存 key 存在；
    /// 存储读取失败按"无偏好"降级，不上抛
    pub async fn restore(
        authorizer: Arc<dyn AccessAuthorizerPort>,
        prefs: Arc<dyn PreferenceStorePort>,
    ) -> Self {
        let stored_key = prefs.entitlement_key().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read entitlement key, assuming none");
            None
        });
        let persisted_opt_in = prefs.realistic_opt_in().await.unwrap_or(false);
        let access_requested = prefs.access_requested().await.unwrap_or(false);

        let opted_in = persisted_opt_in && stored_key.is_some();

        tracing::debug!(
            has_key = stored_key.is_some(),
            opted_in = opted_in,
            access_requested = access_requested,
            "FeatureAccessGate restored"
        );

        Self {
            authorizer,
            prefs,
            inner: Arc::new(Mutex::new(GateInner {
                stored_key,
                opted_in,
                waiting: false,
                access_requested,
                request_task: None,
            })),
            cancel: CancellationToken::new(),
        }
    }

    /// 当前准入状态
    pub fn state(&self) -> AccessState {
        let inner = self.inner.lock().expect("gate lock");
        if inner.waiting {
            AccessState::Waiting
        } else {
            derive_access_state(inner.stored_key.as_ref(), inner.opted_in)
        }
    }

    /// 可见快照
    pub fn snapshot(&self) -> GateSnapshot {
        let inner = self.inner.lock().expect("gate lock");
        let state = if inner.waiting {
            AccessState::Waiting
        } else {
            derive_access_state(inner.stored_key.as_ref(), inner.opted_in)
        };
        GateSnapshot {
            state,
            opted_in: inner.opted_in,
            has_entitlement_key: inner.stored_key.is_some(),
            access_requested: inner.access_requested,
        }
    }

    /// 驱动用户开关
    ///
    /// - 开启且已持有 key: 直接 Granted，跳过 Waiting
    /// - 开启且无 key: 进入 Waiting，发出唯一一次准入请求
    /// - 开启且已在 Waiting: no-op
    /// - 关闭: 回到 Locked，但保留已存 key
    pub async fn set_opt_in(&self, value: bool) {
        if !value {
            {
                let mut inner = self.inner.lock().expect("gate lock");
                inner.opted_in = false;
            }
            self.persist_opt_in(false).await;
            tracing::debug!("Realistic voices opted out, entitlement key retained");
            return;
        }

        let needs_request = {
            let mut inner = self.inner.lock().expect("gate lock");
            if inner.waiting {
                tracing::debug!("Opt-in while already waiting, ignoring");
                return;
            }
            inner.opted_in = true;
            if inner.stored_key.is_some() {
                false
            } else {
                inner.waiting = true;
                true
            }
        };

        self.persist_opt_in(true).await;

        if !needs_request {
            tracing::debug!("Opt-in with stored entitlement key, granted directly");
            return;
        }

        self.spawn_request();
    }

    /// 发出准入请求（每个开启沿恰好一次）
    fn spawn_request(&self) {
        let request_id = Uuid::new_v4();
        let authorizer = self.authorizer.clone();
        let prefs = self.prefs.clone();
        let inner = self.inner.clone();
        let cancel = self.cancel.child_token();

        tracing::info!(request_id = %request_id, "Requesting realistic voice access");

        let task = tokio::spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(request_id = %request_id, "Access request cancelled");
                    return;
                }
                result = authorizer.request_realistic_access() => result,
            };

            match result {
                Ok(AccessDecision::Granted(key)) => {
                    if let Err(e) = prefs.set_entitlement_key(&key).await {
                        tracing::warn!(error = %e, "Failed to persist entitlement key");
                    }
                    let mut guard = inner.lock().expect("gate lock");
                    guard.stored_key = Some(key);
                    guard.waiting = false;
                    guard.request_task = None;
                    tracing::info!(request_id = %request_id, "Realistic voice access granted");
                }
                Ok(AccessDecision::Waitlisted) => {
                    if let Err(e) = prefs.set_access_requested(true).await {
                        tracing::warn!(error = %e, "Failed to persist access-requested flag");
                    }
                    if let Err(e) = prefs.set_realistic_opt_in(false).await {
                        tracing::warn!(error = %e, "Failed to persist opt-in");
                    }
                    let mut guard = inner.lock().expect("gate lock");
                    guard.waiting = false;
                    guard.opted_in = false;
                    guard.access_requested = true;
                    guard.request_task = None;
                    tracing::info!(request_id = %request_id, "Placed on realistic voice waitlist");
                }
                Err(e) => {
                    let mut guard = inner.lock().expect("gate lock");
                    guard.waiting = false;
                    guard.opted_in = false;
                    guard.request_task = None;
                    tracing::warn!(
                        request_id = %request_id,
                        error = %e,
                        "Access request failed, gate back to locked"
                    );
                }
            }
        });

        let mut inner = self.inner.lock().expect("gate lock");
        inner.request_task = Some(task);
    }

    async fn persist_opt_in(&self, value: bool) {
        if let Err(e) = self.prefs.set_realistic_opt_in(value).await {
            tracing::warn!(error = %e, "Failed to persist opt-in");
        }
    }

    /// 视图销毁：取消在途请求，迟到的解析不得再改动状态
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let mut inner = self.inner.lock().expect("gate lock");
        if let Some(task) = inner.request_task.take() {
            task.abort();
        }
        inner.waiting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Duration};

    use crate::application::ports::{AccessError, PreferenceError};
    use crate::domain::voice::{LanguageKey, VoiceKey};

    /// 可编程授权方：记录请求次数
    enum Script {
        Grant(&'static str),
        Waitlist,
        Fail,
    }

    struct ScriptedAuthorizer {
        script: Script,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedAuthorizer {
        fn new(script: Script) -> Self {
            Self {
                script,
                delay: Duration::from_millis(10),
                calls: AtomicUsize::new(0),
            }
        }

        fn granting(key: &'static str) -> Self {
            Self::new(Script::Grant(key))
        }

        fn waitlisting() -> Self {
            Self::new(Script::Waitlist)
        }

        fn failing() -> Self {
            Self::new(Script::Fail)
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AccessAuthorizerPort for ScriptedAuthorizer {
        async fn request_realistic_access(&self) -> Result<AccessDecision, AccessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            sleep(self.delay).await;
            match self.script {
                Script::Grant(key) => {
                    Ok(AccessDecision::Granted(EntitlementKey::new(key).unwrap()))
                }
                Script::Waitlist => Ok(AccessDecision::Waitlisted),
                Script::Fail => Err(AccessError::ServiceError("boom".to_string())),
            }
        }
    }

    /// 内存偏好存根
    #[derive(Default)]
    struct PrefsStub {
        inner: Mutex<PrefsState>,
    }

    #[derive(Default)]
    struct PrefsState {
        entitlement: Option<EntitlementKey>,
        opt_in: bool,
        requested: bool,
    }

    #[async_trait]
    impl PreferenceStorePort for PrefsStub {
        async fn selected_voice(
            &self,
            _language: &LanguageKey,
        ) -> Result<Option<VoiceKey>, PreferenceError> {
            Ok(None)
        }

        async fn set_selected_voice(
            &self,
            _language: &LanguageKey,
            _key: &VoiceKey,
        ) -> Result<(), PreferenceError> {
            Ok(())
        }

        async fn entitlement_key(&self) -> Result<Option<EntitlementKey>, PreferenceError> {
            Ok(self.inner.lock().unwrap().entitlement.clone())
        }

        async fn set_entitlement_key(&self, key: &EntitlementKey) -> Result<(), PreferenceError> {
            self.inner.lock().unwrap().entitlement = Some(key.clone());
            Ok(())
        }

        async fn realistic_opt_in(&self) -> Result<bool, PreferenceError> {
            Ok(self.inner.lock().unwrap().opt_in)
        }

        async fn set_realistic_opt_in(&self, value: bool) -> Result<(), PreferenceError> {
            self.inner.lock().unwrap().opt_in = value;
            Ok(())
        }

        async fn access_requested(&self) -> Result<bool, PreferenceError> {
            Ok(self.inner.lock().unwrap().requested)
        }

        async fn set_access_requested(&self, value: bool) -> Result<(), PreferenceError> {
            self.inner.lock().unwrap().requested = value;
            Ok(())
        }
    }

    async fn settle() {
        sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_opt_in_without_key_waits_then_grants() {
        let authorizer = Arc::new(ScriptedAuthorizer::granting("K1"));
        let prefs = Arc::new(PrefsStub::default());
        let gate = FeatureAccessGate::restore(authorizer.clone(), prefs.clone()).await;

        assert_eq!(gate.state(), AccessState::Locked);

        gate.set_opt_in(true).await;
        assert_eq!(gate.state(), AccessState::Waiting);

        settle().await;
        assert_eq!(
            gate.state(),
            AccessState::Granted(EntitlementKey::new("K1").unwrap())
        );
        assert_eq!(authorizer.call_count(), 1);
        // key 已持久化
        assert!(prefs.entitlement_key().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_double_opt_in_while_waiting_issues_one_request() {
        let authorizer = Arc::new(ScriptedAuthorizer::granting("K1"));
        let prefs = Arc::new(PrefsStub::default());
        let gate = FeatureAccessGate::restore(authorizer.clone(), prefs).await;

        gate.set_opt_in(true).await;
        gate.set_opt_in(true).await;
        assert_eq!(gate.state(), AccessState::Waiting);

        settle().await;
        assert_eq!(authorizer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_opt_out_keeps_key_and_reentry_is_free() {
        let authorizer = Arc::new(ScriptedAuthorizer::granting("K1"));
        let prefs = Arc::new(PrefsStub::default());
        let gate = FeatureAccessGate::restore(authorizer.clone(), prefs.clone()).await;

        gate.set_opt_in(true).await;
        settle().await;
        assert!(gate.state().is_granted());

        gate.set_opt_in(false).await;
        assert_eq!(gate.state(), AccessState::Locked);
        // key 仍在存储内
        assert!(prefs.entitlement_key().await.unwrap().is_some());

        gate.set_opt_in(true).await;
        assert!(gate.state().is_granted());
        // 重新进入 Granted 零新请求
        assert_eq!(authorizer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_stored_key_skips_waiting() {
        let authorizer = Arc::new(ScriptedAuthorizer::granting("K1"));
        let prefs = Arc::new(PrefsStub::default());
        prefs
            .set_entitlement_key(&EntitlementKey::new("K0").unwrap())
            .await
            .unwrap();

        let gate = FeatureAccessGate::restore(authorizer.clone(), prefs).await;
        gate.set_opt_in(true).await;

        assert_eq!(
            gate.state(),
            AccessState::Granted(EntitlementKey::new("K0").unwrap())
        );
        assert_eq!(authorizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_waitlisted_returns_to_locked_and_marks_requested() {
        let authorizer = Arc::new(ScriptedAuthorizer::waitlisting());
        let prefs = Arc::new(PrefsStub::default());
        let gate = FeatureAccessGate::restore(authorizer, prefs.clone()).await;

        gate.set_opt_in(true).await;
        settle().await;

        assert_eq!(gate.state(), AccessState::Locked);
        assert!(gate.snapshot().access_requested);
        assert!(prefs.access_requested().await.unwrap());
    }

    #[tokio::test]
    async fn test_request_failure_returns_to_locked() {
        let authorizer = Arc::new(ScriptedAuthorizer::failing());
        let prefs = Arc::new(PrefsStub::default());
        let gate = FeatureAccessGate::restore(authorizer, prefs).await;

        gate.set_opt_in(true).await;
        settle().await;

        assert_eq!(gate.state(), AccessState::Locked);
        assert!(!gate.snapshot().access_requested);
    }

    #[tokio::test]
    async fn test_restore_with_persisted_key_and_opt_in() {
        let authorizer = Arc::new(ScriptedAuthorizer::granting("K1"));
        let prefs = Arc::new(PrefsStub::default());
        prefs
            .set_entitlement_key(&EntitlementKey::new("K9").unwrap())
            .await
            .unwrap();
        prefs.set_realistic_opt_in(true).await.unwrap();

        let gate = FeatureAccessGate::restore(authorizer.clone(), prefs).await;
        assert!(gate.state().is_granted());
        assert_eq!(authorizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_suppresses_late_resolution() {
        let authorizer = Arc::new(ScriptedAuthorizer::granting("K1"));
        let prefs = Arc::new(PrefsStub::default());
        let gate = FeatureAccessGate::restore(authorizer, prefs.clone()).await;

        gate.set_opt_in(true).await;
        gate.shutdown();
        settle().await;

        // 迟到的授予不得落盘
        assert!(prefs.entitlement_key().await.unwrap().is_none());
        assert_eq!(gate.state(), AccessState::Locked);
    }
}
