//! Access Context - 真实音色层级的准入状态
//!
//! 状态不以可变标志存储，而是由 (已存 entitlement key, 用户开关) 纯函数
//! 重推导，外加一个显式的 Waiting 瞬态；进程恢复后据此重新同步，
//! 不会与持久化状态发散

use serde::{Deserialize, Serialize};

/// Entitlement key - 证明真实层级访问权的不透明令牌，跨会话持久化
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitlementKey(String);

impl EntitlementKey {
    pub fn new(key: impl Into<String>) -> Result<Self, &'static str> {
        let key = key.into();
        if key.is_empty() {
            return Err("entitlement key 不能为空");
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntitlementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 准入状态
///
/// 不变量:
/// - `Waiting` 仅可由 `Locked` 进入
/// - `Granted` 在会话内不会自动回退到 `Locked`（外部吊销不在范围内）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessState {
    /// 未获准入
    Locked,
    /// 准入请求已发出，等待解析
    Waiting,
    /// 已获准入，持有 entitlement key
    Granted(EntitlementKey),
}

impl AccessState {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessState::Granted(_))
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, AccessState::Waiting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessState::Locked => "locked",
            AccessState::Waiting => "waiting",
            AccessState::Granted(_) => "granted",
        }
    }
}

/// 由持久化输入重推导准入状态（不含 Waiting 瞬态）
///
/// 持有 key 且用户开启开关 => Granted；其余一律 Locked。
/// 关闭开关不丢弃已存 key，再次开启直接回到 Granted
pub fn derive_access_state(stored: Option<&EntitlementKey>, opted_in: bool) -> AccessState {
    match (stored, opted_in) {
        (Some(key), true) => AccessState::Granted(key.clone()),
        _ => AccessState::Locked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> EntitlementKey {
        EntitlementKey::new(s).unwrap()
    }

    #[test]
    fn test_derive_locked_without_key() {
        assert_eq!(derive_access_state(None, true), AccessState::Locked);
        assert_eq!(derive_access_state(None, false), AccessState::Locked);
    }

    #[test]
    fn test_derive_granted_requires_opt_in() {
        let k = key("K1");
        assert_eq!(
            derive_access_state(Some(&k), true),
            AccessState::Granted(k.clone())
        );
        // 关闭开关回到 Locked，但 key 仍由调用方持有
        assert_eq!(derive_access_state(Some(&k), false), AccessState::Locked);
    }

    #[test]
    fn test_entitlement_key_rejects_empty() {
        assert!(EntitlementKey::new("").is_err());
    }
}
