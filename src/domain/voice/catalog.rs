//! Voice Context - 音色目录
//!
//! 不变量:
//! - 目录加载后只读，其他组件仅通过 VoiceKey 引用音色
//! - `list_for` 分组顺序由 `VoiceCategory::ALL` 决定，稳定且确定

use serde::{Deserialize, Serialize};

use super::{LanguageKey, VoiceCategory, VoiceKey, VoiceTier};

/// 可选音色条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    key: VoiceKey,
    name: String,
    category: VoiceCategory,
    language: LanguageKey,
    #[serde(default = "default_tier")]
    tier: VoiceTier,
}

fn default_tier() -> VoiceTier {
    VoiceTier::Standard
}

impl Voice {
    pub fn new(
        key: VoiceKey,
        name: impl Into<String>,
        category: VoiceCategory,
        language: LanguageKey,
        tier: VoiceTier,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            category,
            language,
            tier,
        }
    }

    pub fn key(&self) -> &VoiceKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> VoiceCategory {
        self.category
    }

    pub fn language(&self) -> &LanguageKey {
        &self.language
    }

    pub fn tier(&self) -> VoiceTier {
        self.tier
    }
}

/// 目录中的一个分组（分类 + 该分类下的音色）
#[derive(Debug, Clone)]
pub struct CatalogSection {
    pub category: VoiceCategory,
    pub voices: Vec<Voice>,
}

/// 音色目录
///
/// 纯数据 + 过滤，无副作用；语言/层级组合无匹配时返回空序列
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    /// 从 JSON 数组加载目录（宿主可替换内置目录）
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let voices: Vec<Voice> = serde_json::from_str(json)?;
        Ok(Self { voices })
    }

    /// 内置目录
    pub fn builtin() -> Self {
        let voice = |key: &str, name: &str, category: VoiceCategory, lang: &str, tier| {
            Voice::new(
                VoiceKey::new(key).expect("builtin key"),
                name,
                category,
                LanguageKey::new(lang).expect("builtin language"),
                tier,
            )
        };

        Self::new(vec![
            // 标准英文音色
            voice("en-US-aria", "Aria", VoiceCategory::EnUs, "en", VoiceTier::Standard),
            voice("en-US-guy", "Guy", VoiceCategory::EnUs, "en", VoiceTier::Standard),
            voice("en-US-jenny", "Jenny", VoiceCategory::EnUs, "en", VoiceTier::Standard),
            voice("en-GB-libby", "Libby", VoiceCategory::EnGb, "en", VoiceTier::Standard),
            voice("en-GB-ryan", "Ryan", VoiceCategory::EnGb, "en", VoiceTier::Standard),
            voice("en-AU-natasha", "Natasha", VoiceCategory::EnAu, "en", VoiceTier::Standard),
            voice("en-AU-william", "William", VoiceCategory::EnAu, "en", VoiceTier::Standard),
            voice("en-IN-neerja", "Neerja", VoiceCategory::EnIn, "en", VoiceTier::Standard),
            // 标准中文音色
            voice("zh-CN-xiaoxiao", "晓晓", VoiceCategory::ZhCn, "zh", VoiceTier::Standard),
            voice("zh-CN-yunxi", "云希", VoiceCategory::ZhCn, "zh", VoiceTier::Standard),
            voice("zh-TW-hsiaochen", "曉臻", VoiceCategory::ZhTw, "zh", VoiceTier::Standard),
            // 真实层级音色（固定在 en-US 分类）
            voice("ultra-larry", "Larry", VoiceCategory::EnUs, "en", VoiceTier::Realistic),
            voice("ultra-nova", "Nova", VoiceCategory::EnUs, "en", VoiceTier::Realistic),
            voice("ultra-stella", "Stella", VoiceCategory::EnUs, "en", VoiceTier::Realistic),
        ])
    }

    /// 按语言与层级列出音色，按固定分类顺序分组
    ///
    /// 真实层级限定在 `VoiceCategory::REALISTIC` 列出的分类内；
    /// 空分组不产出 section
    pub fn list_for(&self, language: &LanguageKey, tier: VoiceTier) -> Vec<CatalogSection> {
        let categories: &[VoiceCategory] = match tier {
            VoiceTier::Standard => VoiceCategory::ALL,
            VoiceTier::Realistic => VoiceCategory::REALISTIC,
        };

        categories
            .iter()
            .filter_map(|&category| {
                let voices: Vec<Voice> = self
                    .voices
                    .iter()
                    .filter(|v| {
                        v.category == category && v.language == *language && v.tier == tier
                    })
                    .cloned()
                    .collect();
                if voices.is_empty() {
                    None
                } else {
                    Some(CatalogSection { category, voices })
                }
            })
            .collect()
    }

    /// 按 key 查找音色
    pub fn find(&self, key: &VoiceKey) -> Option<&Voice> {
        self.voices.iter().find(|v| v.key == *key)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
