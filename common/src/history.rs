//! 診断履歴（純粋ロジック）
//!
//! 新しい順に並び、`HISTORY_CAPACITY` 件を超えた古いものから捨てる。
//! 永続化はCLI側の `HistoryStore` が担当する。

use crate::error::{Error, Result};
use crate::language::DisplayLanguage;
use crate::normalizer::normalize;
use crate::types::{AnalysisResult, HealthStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 履歴の上限件数
pub const HISTORY_CAPACITY: usize = 200;

/// 履歴エントリ
///
/// 表示言語を後から切り替えられるよう、正規化前の生ペイロードを保持する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub item: Value,
    #[serde(rename = "seenAt")]
    pub seen_at: String,
}

impl HistoryEntry {
    pub fn new(item: Value, seen_at: impl Into<String>) -> Self {
        Self { item, seen_at: seen_at.into() }
    }

    /// 指定言語で正規化
    pub fn normalized(&self, lang: DisplayLanguage) -> AnalysisResult {
        normalize(&self.item, lang)
    }

    /// 健康状態（言語に依存しない）
    pub fn status(&self) -> HealthStatus {
        HealthStatus::from_value(self.item.get("status"))
    }

    pub fn plant_name(&self) -> String {
        self.normalized(DisplayLanguage::English).plant_name
    }
}

/// 状態フィルタ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(HealthStatus),
}

impl StatusFilter {
    pub fn matches(self, status: HealthStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(expected) => expected == status,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<HealthStatus>().map(StatusFilter::Only)
    }
}

/// 状態別の件数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthCounts {
    pub healthy: usize,
    pub warning: usize,
    pub diseased: usize,
    pub unknown: usize,
}

impl HealthCounts {
    pub fn total(&self) -> usize {
        self.healthy + self.warning + self.diseased + self.unknown
    }
}

/// 履歴ログ（新しい順）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のエントリ列から作成（上限を超えた分は捨てる）
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }

    /// 先頭に追加して上限で切り詰める
    pub fn push_front(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// 指定位置を削除（残りの順序は保持）
    pub fn remove(&mut self, index: usize) -> Option<HistoryEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 植物名（部分一致・大文字小文字無視）と状態で絞り込み
    ///
    /// # Returns
    /// (元のインデックス, エントリ) の列
    pub fn search(&self, term: &str, filter: StatusFilter) -> Vec<(usize, &HistoryEntry)> {
        let term = term.trim().to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| filter.matches(e.status()))
            .filter(|(_, e)| term.is_empty() || e.plant_name().to_lowercase().contains(&term))
            .collect()
    }

    pub fn health_counts(&self) -> HealthCounts {
        self.entries.iter().fold(HealthCounts::default(), |mut acc, e| {
            match e.status() {
                HealthStatus::Healthy => acc.healthy += 1,
                HealthStatus::Warning => acc.warning += 1,
                HealthStatus::Diseased => acc.diseased += 1,
                HealthStatus::Unknown => acc.unknown += 1,
            }
            acc
        })
    }
}
