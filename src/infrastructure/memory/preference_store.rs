//! In-Memory Preference Store Implementation
//!
//! 测试与演示用；进程退出即丢失

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::{PreferenceError, PreferenceStorePort};
use crate::domain::access::EntitlementKey;
use crate::domain::voice::{LanguageKey, VoiceKey};

/// 内存偏好存储
pub struct InMemoryPreferenceStore {
    /// language -> 已选音色
    selected: DashMap<LanguageKey, VoiceKey>,
    entitlement: Mutex<Option<EntitlementKey>>,
    opt_in: AtomicBool,
    access_requested: AtomicBool,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self {
            selected: DashMap::new(),
            entitlement: Mutex::new(None),
            opt_in: AtomicBool::new(false),
            access_requested: AtomicBool::new(false),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceStorePort for InMemoryPreferenceStore {
    async fn selected_voice(
        &self,
        language: &LanguageKey,
    ) -> Result<Option<VoiceKey>, PreferenceError> {
        Ok(self.selected.get(language).map(|v| v.clone()))
    }

    async fn set_selected_voice(
        &self,
        language: &LanguageKey,
        key: &VoiceKey,
    ) -> Result<(), PreferenceError> {
        self.selected.insert(language.clone(), key.clone());
        Ok(())
    }

    async fn entitlement_key(&self) -> Result<Option<EntitlementKey>, PreferenceError> {
        Ok(self.entitlement.lock().expect("prefs lock").clone())
    }

    async fn set_entitlement_key(&self, key: &EntitlementKey) -> Result<(), PreferenceError> {
        *self.entitlement.lock().expect("prefs lock") = Some(key.clone());
        Ok(())
    }

    async fn realistic_opt_in(&self) -> Result<bool, PreferenceError> {
        Ok(self.opt_in.load(Ordering::SeqCst))
    }

    async fn set_realistic_opt_in(&self, value: bool) -> Result<(), PreferenceError> {
        self.opt_in.store(value, Ordering::SeqCst);
        Ok(())
    }

    async fn access_requested(&self) -> Result<bool, PreferenceError> {
        Ok(self.access_requested.load(Ordering::SeqCst))
    }

    async fn set_access_requested(&self, value: bool) -> Result<(), PreferenceError> {
        self.access_requested.store(value, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_selected_voice_per_language() {
        let store = InMemoryPreferenceStore::new();
        let en = LanguageKey::new("en").unwrap();
        let zh = LanguageKey::new("zh").unwrap();

        store
            .set_selected_voice(&en, &VoiceKey::new("en-US-aria").unwrap())
            .await
            .unwrap();

        assert!(store.selected_voice(&en).await.unwrap().is_some());
        assert!(store.selected_voice(&zh).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entitlement_roundtrip() {
        let store = InMemoryPreferenceStore::new();
        assert!(store.entitlement_key().await.unwrap().is_none());

        let key = EntitlementKey::new("K1").unwrap();
        store.set_entitlement_key(&key).await.unwrap();
        assert_eq!(store.entitlement_key().await.unwrap(), Some(key));
    }
}
