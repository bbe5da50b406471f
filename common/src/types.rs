//! 診断結果の型定義
//!
//! CLIとテストで共有される型:
//! - RegionMark: 画像上の注目点（表示領域に対する%座標）
//! - HealthStatus: 健康状態（4値）
//! - AnalysisResult: 正規化済みの診断結果（表示用の固定形）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 注目点。x, y は表示領域に対する割合（0〜100）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionMark {
    pub x: f64,
    pub y: f64,
}

/// 健康状態
///
/// アップストリームは真偽値・文字列・欠落のいずれかで返してくるため、
/// ここで4値に揃える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Diseased,
    #[default]
    Unknown,
}

impl HealthStatus {
    /// 生のステータス値から変換
    ///
    /// - `true` → Diseased, `false` → Healthy
    /// - "healthy" / "warning" / "diseased"（大文字小文字無視）
    /// - それ以外・欠落 → Unknown
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(true)) => HealthStatus::Diseased,
            Some(Value::Bool(false)) => HealthStatus::Healthy,
            Some(Value::String(s)) => s.parse().unwrap_or(HealthStatus::Unknown),
            _ => HealthStatus::Unknown,
        }
    }

    /// 病気検出表示にするか（Unknownは非検出扱い）
    pub fn is_detected(self) -> bool {
        self == HealthStatus::Diseased
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Diseased => "diseased",
            HealthStatus::Unknown => "unknown",
        }
    }

    /// 表示ラベル
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "健康",
            HealthStatus::Warning => "要注意",
            HealthStatus::Diseased => "病気検出",
            HealthStatus::Unknown => "不明",
        }
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "healthy" => Ok(HealthStatus::Healthy),
            "warning" => Ok(HealthStatus::Warning),
            "diseased" => Ok(HealthStatus::Diseased),
            "unknown" => Ok(HealthStatus::Unknown),
            other => Err(Error::UnknownValue(other.to_string())),
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 栽培ケア情報（欠落はNone → 表示時に "N/A"）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareFields {
    pub watering: Option<String>,
    pub sunlight: Option<String>,
    pub temperature: Option<String>,
    pub fertilizer: Option<String>,
}

impl CareFields {
    /// (ラベル, 値) の組。欠落は "N/A"
    pub fn rows(&self) -> [(&'static str, &str); 4] {
        fn na(v: &Option<String>) -> &str {
            v.as_deref().unwrap_or("N/A")
        }
        [
            ("Watering", na(&self.watering)),
            ("Sunlight", na(&self.sunlight)),
            ("Temperature", na(&self.temperature)),
            ("Fertilizer", na(&self.fertilizer)),
        ]
    }
}

/// 正規化済みの診断結果
///
/// 文字列・リストは欠落時も空で埋まる（absentにはならない）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    pub disease_title: String,
    pub localized_disease_name: String,
    pub plant_name: String,
    pub health_status: HealthStatus,
    /// health_status から導出（Diseasedのみtrue）
    pub status_detected: bool,
    pub raw_disease_code: String,
    pub image_url: String,
    pub observed_at: String,
    pub description: String,
    pub prevention_items: Vec<String>,
    pub treatment_items: Vec<String>,
    pub care_fields: CareFields,
    pub region_tips: Vec<String>,
}

impl AnalysisResult {
    const IMMEDIATE_PER_LIST: usize = 3;

    /// 直ちに行う対策: 治療の先頭3件 + 予防の先頭3件
    pub fn immediate_actions(&self) -> Vec<&str> {
        self.treatment_items
            .iter()
            .take(Self::IMMEDIATE_PER_LIST)
            .chain(self.prevention_items.iter().take(Self::IMMEDIATE_PER_LIST))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_health_status_from_bool() {
        assert_eq!(HealthStatus::from_value(Some(&json!(true))), HealthStatus::Diseased);
        assert_eq!(HealthStatus::from_value(Some(&json!(false))), HealthStatus::Healthy);
    }

    #[test]
    fn test_health_status_from_string() {
        assert_eq!(HealthStatus::from_value(Some(&json!("Warning"))), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_value(Some(&json!(" diseased "))), HealthStatus::Diseased);
        assert_eq!(HealthStatus::from_value(Some(&json!("maybe"))), HealthStatus::Unknown);
    }

    #[test]
    fn test_health_status_missing_or_other() {
        assert_eq!(HealthStatus::from_value(None), HealthStatus::Unknown);
        assert_eq!(HealthStatus::from_value(Some(&json!(1))), HealthStatus::Unknown);
        assert!(!HealthStatus::Unknown.is_detected());
        assert!(HealthStatus::Diseased.is_detected());
    }

    #[test]
    fn test_health_status_serde_lowercase() {
        let s = serde_json::to_string(&HealthStatus::Warning).unwrap();
        assert_eq!(s, "\"warning\"");
    }

    #[test]
    fn test_immediate_actions() {
        let result = AnalysisResult {
            treatment_items: vec!["t1".into(), "t2".into(), "t3".into(), "t4".into()],
            prevention_items: vec!["p1".into()],
            ..Default::default()
        };
        assert_eq!(result.immediate_actions(), vec!["t1", "t2", "t3", "p1"]);
    }

    #[test]
    fn test_care_rows_na() {
        let care = CareFields {
            watering: Some("毎日".into()),
            ..Default::default()
        };
        let rows = care.rows();
        assert_eq!(rows[0], ("Watering", "毎日"));
        assert_eq!(rows[1], ("Sunlight", "N/A"));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let value = serde_json::to_value(AnalysisResult::default()).unwrap();
        assert!(value.get("diseaseTitle").is_some());
        assert!(value.get("statusDetected").is_some());
        assert!(value.get("careFields").is_some());
    }
}
