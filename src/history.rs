//! 診断履歴の永続化
//!
//! `analyze_history` キーに履歴全体を1回の書き込みで保存する。
//! 読み込みに失敗した場合は空の履歴として扱う。

use crate::error::{PlantScanError, Result};
use crate::storage::{Storage, ANALYZE_HISTORY};
use chrono::{SecondsFormat, Utc};
use log::info;
use plant_scan_common::{HistoryEntry, HistoryLog};
use serde_json::Value;
use std::sync::Arc;

pub struct HistoryStore {
    storage: Arc<Storage>,
}

impl HistoryStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// 現在の履歴（新しい順）
    pub fn load(&self) -> HistoryLog {
        self.storage.get_or_default(&ANALYZE_HISTORY)
    }

    /// 生ペイロードを現在時刻付きで先頭に追加
    pub fn save(&self, raw: Value) -> Result<HistoryEntry> {
        let seen_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.save_at(raw, seen_at)
    }

    /// 時刻を指定して追加
    pub fn save_at(&self, raw: Value, seen_at: impl Into<String>) -> Result<HistoryEntry> {
        let entry = HistoryEntry::new(raw, seen_at);
        let len = self.storage.update_key(&ANALYZE_HISTORY, |log| {
            log.push_front(entry.clone());
            Ok(log.len())
        })?;
        info!("saved to history ({} entries)", len);
        Ok(entry)
    }

    /// 指定位置を削除
    pub fn delete(&self, index: usize) -> Result<HistoryEntry> {
        self.storage.update_key(&ANALYZE_HISTORY, |log| {
            let len = log.len();
            log.remove(index)
                .ok_or(PlantScanError::HistoryIndexOutOfRange { index, len })
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.delete(&ANALYZE_HISTORY)
    }
}
