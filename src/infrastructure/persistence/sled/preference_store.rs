//! Sled-based Preference Store Implementation
//!
//! 持久化每语言已选音色与真实层级准入偏好（entitlement key 跨会话保留）

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{PreferenceError, PreferenceStorePort};
use crate::domain::access::EntitlementKey;
use crate::domain::voice::{LanguageKey, VoiceKey};

/// Sled 偏好存储配置
#[derive(Debug, Clone)]
pub struct SledPreferenceConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledPreferenceConfig {
    fn default() -> Self {
        Self {
            db_path: "data/prefs.sled".to_string(),
        }
    }
}

/// 每语言音色选择记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VoiceSelectionRecord {
    voice_key: String,
    updated_at: i64,
}

/// 真实层级准入记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AccessRecord {
    entitlement_key: Option<String>,
    opt_in: bool,
    access_requested: bool,
    granted_at: Option<i64>,
}

const ACCESS_KEY: &str = "access";

/// Sled 偏好存储
pub struct SledPreferenceStore {
    db: Db,
}

impl SledPreferenceStore {
    pub fn new(config: &SledPreferenceConfig) -> Result<Self, PreferenceError> {
        let db = sled::open(&config.db_path)
            .map_err(|e| PreferenceError::StorageError(e.to_string()))?;

        tracing::info!(db_path = %config.db_path, "SledPreferenceStore initialized");
        Ok(Self { db })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PreferenceError> {
        let config = SledPreferenceConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn voice_key_for(language: &LanguageKey) -> String {
        format!("voice:{}", language)
    }

    fn read_access(&self) -> Result<AccessRecord, PreferenceError> {
        match self
            .db
            .get(ACCESS_KEY)
            .map_err(|e| PreferenceError::StorageError(e.to_string()))?
        {
            Some(bytes) => bincode::deserialize(&bytes)
                .map_err(|e| PreferenceError::CorruptRecord(e.to_string())),
            None => Ok(AccessRecord::default()),
        }
    }

    fn write_access(&self, record: &AccessRecord) -> Result<(), PreferenceError> {
        let bytes = bincode::serialize(record)
            .map_err(|e| PreferenceError::StorageError(e.to_string()))?;
        self.db
            .insert(ACCESS_KEY, bytes)
            .map_err(|e| PreferenceError::StorageError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStorePort for SledPreferenceStore {
    async fn selected_voice(
        &self,
        language: &LanguageKey,
    ) -> Result<Option<VoiceKey>, PreferenceError> {
        let bytes = match self
            .db
            .get(Self::voice_key_for(language))
            .map_err(|e| PreferenceError::StorageError(e.to_string()))?
        {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let record: VoiceSelectionRecord = bincode::deserialize(&bytes)
            .map_err(|e| PreferenceError::CorruptRecord(e.to_string()))?;
        let key = VoiceKey::new(record.voice_key)
            .map_err(|e| PreferenceError::CorruptRecord(e.to_string()))?;
        Ok(Some(key))
    }

    async fn set_selected_voice(
        &self,
        language: &LanguageKey,
        key: &VoiceKey,
    ) -> Result<(), PreferenceError> {
        let record = VoiceSelectionRecord {
            voice_key: key.as_str().to_string(),
            updated_at: Utc::now().timestamp(),
        };
        let bytes = bincode::serialize(&record)
            .map_err(|e| PreferenceError::StorageError(e.to_string()))?;
        self.db
            .insert(Self::voice_key_for(language), bytes)
            .map_err(|e| PreferenceError::StorageError(e.to_string()))?;

        tracing::debug!(language = %language, voice_key = %key, "Selected voice persisted");
        Ok(())
    }

    async fn entitlement_key(&self) -> Result<Option<EntitlementKey>, PreferenceError> {
        let record = self.read_access()?;
        match record.entitlement_key {
            Some(raw) => {
                let key = EntitlementKey::new(raw)
                    .map_err(|e| PreferenceError::CorruptRecord(e.to_string()))?;
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    async fn set_entitlement_key(&self, key: &EntitlementKey) -> Result<(), PreferenceError> {
        let mut record = self.read_access()?;
        record.entitlement_key = Some(key.as_str().to_string());
        record.granted_at = Some(Utc::now().timestamp());
        self.write_access(&record)?;

        tracing::info!("Entitlement key persisted");
        Ok(())
    }

    async fn realistic_opt_in(&self) -> Result<bool, PreferenceError> {
        Ok(self.read_access()?.opt_in)
    }

    async fn set_realistic_opt_in(&self, value: bool) -> Result<(), PreferenceError> {
        let mut record = self.read_access()?;
        record.opt_in = value;
        self.write_access(&record)
    }

    async fn access_requested(&self) -> Result<bool, PreferenceError> {
        Ok(self.read_access()?.access_requested)
    }

    async fn set_access_requested(&self, value: bool) -> Result<(), PreferenceError> {
        let mut record = self.read_access()?;
        record.access_requested = value;
        self.write_access(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> SledPreferenceStore {
        SledPreferenceStore::open(dir.path().join("prefs.sled")).unwrap()
    }

    #[tokio::test]
    async fn test_selected_voice_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let en = LanguageKey::new("en").unwrap();
        let aria = VoiceKey::new("en-US-aria").unwrap();

        assert!(store.selected_voice(&en).await.unwrap().is_none());
        store.set_selected_voice(&en, &aria).await.unwrap();
        assert_eq!(store.selected_voice(&en).await.unwrap(), Some(aria));
    }

    #[tokio::test]
    async fn test_entitlement_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.sled");

        {
            let store = SledPreferenceStore::open(&path).unwrap();
            store
                .set_entitlement_key(&EntitlementKey::new("K1").unwrap())
                .await
                .unwrap();
            store.set_realistic_opt_in(true).await.unwrap();
        }

        let store = SledPreferenceStore::open(&path).unwrap();
        assert_eq!(
            store.entitlement_key().await.unwrap(),
            Some(EntitlementKey::new("K1").unwrap())
        );
        assert!(store.realistic_opt_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_access_flags_independent_of_key() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store.set_access_requested(true).await.unwrap();
        assert!(store.access_requested().await.unwrap());
        assert!(store.entitlement_key().await.unwrap().is_none());
    }
}
