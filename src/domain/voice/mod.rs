//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 音色元数据（key、展示名、分类、语言、层级）
//! - 按语言/层级的目录过滤与分组

mod catalog;
mod value_objects;

pub use catalog::{CatalogSection, Voice, VoiceCatalog};
pub use value_objects::{LanguageKey, VoiceCategory, VoiceKey, VoiceTier};
