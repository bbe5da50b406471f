//! 言語定義
//!
//! - 送信用の言語タグ（インド22言語）
//! - 表示言語トグル（英語 / ヒンディー語）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 送信時に選択できる言語
pub const INDIAN_LANGUAGES: [&str; 22] = [
    "Assamese", "Bengali", "Bodo", "Dogri", "Gujarati", "Hindi", "Kannada",
    "Kashmiri", "Konkani", "Maithili", "Malayalam", "Manipuri", "Marathi",
    "Nepali", "Odia", "Punjabi", "Sanskrit", "Santali", "Sindhi", "Tamil",
    "Telugu", "Urdu",
];

/// 言語タグが一覧に含まれるか（大文字小文字無視）
pub fn is_supported_language(tag: &str) -> bool {
    let tag = tag.trim();
    INDIAN_LANGUAGES.iter().any(|l| l.eq_ignore_ascii_case(tag))
}

/// 結果の表示言語
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLanguage {
    #[default]
    English,
    Hindi,
}

impl DisplayLanguage {
    /// ペイロード内の言語別サブオブジェクトのキー
    pub fn payload_key(self) -> &'static str {
        match self {
            DisplayLanguage::English => "english",
            DisplayLanguage::Hindi => "otherLanguage",
        }
    }

    /// もう一方の言語
    pub fn other(self) -> Self {
        match self {
            DisplayLanguage::English => DisplayLanguage::Hindi,
            DisplayLanguage::Hindi => DisplayLanguage::English,
        }
    }

    /// ペイロードの `language` から初期表示言語を推定
    ///
    /// "hind" を含めばHindi、それ以外はEnglish
    pub fn infer(raw: &Value) -> Self {
        match raw.get("language").and_then(Value::as_str) {
            Some(lang) if lang.to_lowercase().contains("hind") => DisplayLanguage::Hindi,
            _ => DisplayLanguage::English,
        }
    }
}

impl std::str::FromStr for DisplayLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(DisplayLanguage::English),
            "hi" | "hindi" => Ok(DisplayLanguage::Hindi),
            other => Err(Error::UnknownValue(other.to_string())),
        }
    }
}

impl std::fmt::Display for DisplayLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayLanguage::English => write!(f, "english"),
            DisplayLanguage::Hindi => write!(f, "hindi"),
        }
    }
}
