//! Access Context - 准入限界上下文
//!
//! 职责:
//! - Entitlement key 值对象
//! - 准入状态及其纯函数推导

mod state;

pub use state::{derive_access_state, AccessState, EntitlementKey};
