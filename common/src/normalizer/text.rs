//! テキスト → 箇条書きリスト変換

use regex::Regex;
use serde_json::Value;

/// 1行分の先頭の箇条書き記号（- / •）と前後の空白を除去
pub fn strip_bullet(line: &str) -> &str {
    lazy_static::lazy_static! {
        static ref BULLET_RE: Regex = Regex::new(r"^\s*[-•]\s*").unwrap();
    }

    match BULLET_RE.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// 改行区切りテキストをリストに変換
///
/// `\r?\n` で分割し、先頭の記号を除去、空行は捨てる。
///
/// # Examples
/// `"- a\n• b\n\nc"` → `["a", "b", "c"]`
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| strip_bullet(line.strip_suffix('\r').unwrap_or(line)))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// JSON値をリストに変換
///
/// 文字列は `split_lines`、文字列配列は各要素を同様に整形。
/// それ以外は空リスト。
pub fn to_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(text)) => split_lines(text),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(split_lines)
            .collect(),
        _ => Vec::new(),
    }
}
