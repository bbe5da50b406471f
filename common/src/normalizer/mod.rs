//! 診断結果の正規化モジュール
//!
//! 推論エンドポイントの返すJSONは形が一定しない。このモジュールだけが
//! 生ペイロードの形を知っており、表示用の固定形 `AnalysisResult` に揃える。
//!
//! ## 言語依存フィールドの解決順
//! 1. 選択言語のサブオブジェクト（`english` / `otherLanguage`）
//! 2. もう一方の言語のサブオブジェクト
//! 3. トップレベルのフィールド
//! 4. デフォルト値
//!
//! 変換して空になる値（空文字・空配列・文字列でない説明文）は欠落と同じ扱い。
//! どんな入力でもpanicしない。

pub mod text;
pub mod timestamp;

use crate::language::DisplayLanguage;
use crate::types::{AnalysisResult, CareFields, HealthStatus};
use serde_json::Value;

pub use text::{split_lines, to_list};
pub use timestamp::{format_timestamp, format_timestamp_in, UNKNOWN_TIMESTAMP};

pub const UNKNOWN_DISEASE: &str = "Unknown Disease";
pub const UNKNOWN_PLANT: &str = "Unknown Plant";

const TIMESTAMP_KEYS: [&str; 4] = ["_ts", "ts", "timestamp", "time"];

/// 生ペイロードを正規化
///
/// # Arguments
/// * `raw` - エンドポイントの応答JSON（オブジェクト以外は `{}` と同じ扱い）
/// * `lang` - 表示言語
pub fn normalize(raw: &Value, lang: DisplayLanguage) -> AnalysisResult {
    let health_status = HealthStatus::from_value(raw.get("status"));

    AnalysisResult {
        disease_title: first_text(raw, &["diseaseTitle", "diseaseName"])
            .unwrap_or(UNKNOWN_DISEASE)
            .to_string(),
        localized_disease_name: localized_text(raw, lang, "diseaseName"),
        plant_name: first_text(raw, &["plant", "plantName"])
            .unwrap_or(UNKNOWN_PLANT)
            .to_string(),
        health_status,
        status_detected: health_status.is_detected(),
        raw_disease_code: first_text(raw, &["rawDisease", "raw_disease"])
            .unwrap_or_default()
            .to_string(),
        image_url: first_text(raw, &["imageUrl", "image"])
            .unwrap_or_default()
            .to_string(),
        observed_at: observed_at(raw),
        description: localized_text(raw, lang, "description"),
        prevention_items: localized_list(raw, lang, "prevention"),
        treatment_items: localized_list(raw, lang, "treatments"),
        care_fields: care_fields(raw.get("care")),
        region_tips: first_list(keyed(raw, &["regionTips", "tips"])),
    }
}

fn as_text(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

fn keyed<'a>(raw: &'a Value, keys: &[&str]) -> Vec<&'a Value> {
    keys.iter().filter_map(|k| raw.get(*k)).collect()
}

/// 候補キーのうち最初の非空文字列
fn first_text<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().filter_map(|k| raw.get(*k)).find_map(as_text)
}

/// 変換後に空でない最初のリスト
fn first_list(candidates: Vec<&Value>) -> Vec<String> {
    candidates
        .into_iter()
        .map(|v| to_list(Some(v)))
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}

/// 言語依存フィールドの候補を解決順に並べる
fn localized<'a>(raw: &'a Value, lang: DisplayLanguage, key: &str) -> Vec<&'a Value> {
    [lang, lang.other()]
        .iter()
        .filter_map(|l| raw.get(l.payload_key()))
        .filter_map(|sub| sub.get(key))
        .chain(raw.get(key))
        .collect()
}

// 候補は変換結果で判定する（空配列や数値の説明文は次の候補へ）
fn localized_text(raw: &Value, lang: DisplayLanguage, key: &str) -> String {
    localized(raw, lang, key)
        .into_iter()
        .find_map(as_text)
        .unwrap_or_default()
        .to_string()
}

fn localized_list(raw: &Value, lang: DisplayLanguage, key: &str) -> Vec<String> {
    first_list(localized(raw, lang, key))
}

/// 日時として読める最初のキー
fn observed_at(raw: &Value) -> String {
    keyed(raw, &TIMESTAMP_KEYS)
        .into_iter()
        .map(|v| format_timestamp(Some(v)))
        .find(|s| s != UNKNOWN_TIMESTAMP)
        .unwrap_or_else(|| UNKNOWN_TIMESTAMP.to_string())
}

fn care_fields(care: Option<&Value>) -> CareFields {
    let field = |key: &str| -> Option<String> {
        match care?.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };

    CareFields {
        watering: field("watering"),
        sunlight: field("sunlight"),
        temperature: field("temperature"),
        fertilizer: field("fertilizer"),
    }
}
