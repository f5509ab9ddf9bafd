//! Sled 持久化实现

mod preference_store;

pub use preference_store::{SledPreferenceConfig, SledPreferenceStore};
