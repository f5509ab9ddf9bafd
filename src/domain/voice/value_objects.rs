//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};

/// 音色唯一标识（引擎侧的稳定 key）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceKey(String);

impl VoiceKey {
    pub fn new(key: impl Into<String>) -> Result<Self, &'static str> {
        let key = key.into();
        if key.is_empty() {
            return Err("音色 key 不能为空");
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语言标识（如 "en"、"zh"）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageKey(String);

impl LanguageKey {
    pub fn new(key: impl Into<String>) -> Result<Self, &'static str> {
        let key = key.into();
        if key.is_empty() {
            return Err("语言 key 不能为空");
        }
        Ok(Self(key.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LanguageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音色展示分类（locale 分组）
///
/// 枚举声明顺序即展示顺序，`list_for` 依赖该顺序保证分组稳定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoiceCategory {
    EnUs,
    EnGb,
    EnAu,
    EnIn,
    ZhCn,
    ZhTw,
}

impl VoiceCategory {
    /// 全部分类，按展示顺序
    pub const ALL: &'static [VoiceCategory] = &[
        VoiceCategory::EnUs,
        VoiceCategory::EnGb,
        VoiceCategory::EnAu,
        VoiceCategory::EnIn,
        VoiceCategory::ZhCn,
        VoiceCategory::ZhTw,
    ];

    /// 真实音色所在的固定分类
    pub const REALISTIC: &'static [VoiceCategory] = &[VoiceCategory::EnUs];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceCategory::EnUs => "en-US",
            VoiceCategory::EnGb => "en-GB",
            VoiceCategory::EnAu => "en-AU",
            VoiceCategory::EnIn => "en-IN",
            VoiceCategory::ZhCn => "zh-CN",
            VoiceCategory::ZhTw => "zh-TW",
        }
    }

    /// 展示名
    pub fn display_name(&self) -> &'static str {
        match self {
            VoiceCategory::EnUs => "English (US)",
            VoiceCategory::EnGb => "English (UK)",
            VoiceCategory::EnAu => "English (Australia)",
            VoiceCategory::EnIn => "English (India)",
            VoiceCategory::ZhCn => "中文（简体）",
            VoiceCategory::ZhTw => "中文（繁體）",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "en-US" => Some(VoiceCategory::EnUs),
            "en-GB" => Some(VoiceCategory::EnGb),
            "en-AU" => Some(VoiceCategory::EnAu),
            "en-IN" => Some(VoiceCategory::EnIn),
            "zh-CN" => Some(VoiceCategory::ZhCn),
            "zh-TW" => Some(VoiceCategory::ZhTw),
            _ => None,
        }
    }
}

/// 音色层级
///
/// `Realistic` 仅在 FeatureAccessGate 处于 Granted 时可选
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceTier {
    Standard,
    Realistic,
}

impl VoiceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceTier::Standard => "standard",
            VoiceTier::Realistic => "realistic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_key_rejects_empty() {
        assert!(VoiceKey::new("").is_err());
        assert!(VoiceKey::new("en-US-JennyNeural").is_ok());
    }

    #[test]
    fn test_language_key_normalized() {
        let lang = LanguageKey::new("EN").unwrap();
        assert_eq!(lang.as_str(), "en");
    }

    #[test]
    fn test_category_roundtrip() {
        for category in VoiceCategory::ALL {
            assert_eq!(VoiceCategory::from_str(category.as_str()), Some(*category));
        }
    }
}
