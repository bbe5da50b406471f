//! タイムスタンプの表示用整形
//!
//! 数値（または数値文字列）を受け取り、1e12 を超えればミリ秒、
//! それ以外は秒として扱う。現在時刻は参照しない。

use chrono::{Local, TimeZone};
use serde_json::Value;

/// 不明時の表示
pub const UNKNOWN_TIMESTAMP: &str = "Unknown";

const MILLIS_THRESHOLD: f64 = 1e12;
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// ローカルタイムゾーンで整形
pub fn format_timestamp(value: Option<&Value>) -> String {
    format_timestamp_in(value, &Local)
}

/// 指定タイムゾーンで整形（欠落・0・非数値・範囲外は "Unknown"）
pub fn format_timestamp_in<Tz>(value: Option<&Value>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    epoch_millis(value)
        .and_then(|ms| tz.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_TIMESTAMP.to_string())
}

/// 値をエポックミリ秒に変換
fn epoch_millis(value: Option<&Value>) -> Option<i64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !n.is_finite() || n == 0.0 {
        return None;
    }

    let millis = if n > MILLIS_THRESHOLD { n } else { n * 1000.0 };
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(millis.round() as i64)
}
