//! 永続ストレージ（型付きリポジトリ）
//!
//! ブラウザのlocalStorage相当を1つのJSONファイルで持つ。
//! 呼び出し側は生のキー・文字列に触れず、`StorageKey<T>` 経由でのみ読み書きする。
//!
//! - 読み込み失敗・型不一致 → 警告ログを出してデフォルト扱い
//! - 書き込みは書き手ごとの一時ファイル + rename で置き換える
//! - 読み込み→変更→書き込みは `update_key` でロック内にまとめる

use crate::error::Result;
use log::{debug, warn};
use plant_scan_common::HistoryLog;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// 型付きキー
#[derive(Debug)]
pub struct StorageKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StorageKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, _marker: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// 認証トークン
pub const TOKEN: StorageKey<String> = StorageKey::new("token");
/// ログインユーザーID
pub const USER_ID: StorageKey<String> = StorageKey::new("userId");
/// 最後に送信した言語
pub const PREFERRED_LANGUAGE: StorageKey<String> = StorageKey::new("preferredLanguage");
/// 診断履歴（最大200件）
pub const ANALYZE_HISTORY: StorageKey<HistoryLog> = StorageKey::new("analyze_history");
/// 最後に表示した生ペイロード（再起動後の再表示用）
pub const ANALYZE_DATA: StorageKey<Value> = StorageKey::new("analyzeData");

type Entries = BTreeMap<String, Value>;

/// JSONファイルに裏打ちされたキーバリューストア
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Storage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 値を取得（欠落・解析失敗はNone）
    pub fn get<T: DeserializeOwned>(&self, key: &StorageKey<T>) -> Option<T> {
        let value = self.read_entries().remove(key.name)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("stored value for {} has unexpected shape, ignoring: {}", key.name, e);
                None
            }
        }
    }

    /// 値を取得（欠落・解析失敗はデフォルト）
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &StorageKey<T>) -> T {
        self.get(key).unwrap_or_default()
    }

    pub fn set<T: Serialize>(&self, key: &StorageKey<T>, value: &T) -> Result<()> {
        let encoded = serde_json::to_value(value)?;
        self.update(|entries| {
            entries.insert(key.name.to_string(), encoded);
        })?;
        debug!("storage updated: {}", key.name);
        Ok(())
    }

    /// ロックを保持したまま値を読み、変更して書き戻す
    ///
    /// 解析できない値はデフォルトから始める。`apply` がErrを返した場合は書き込まない。
    pub fn update_key<T, R>(
        &self,
        key: &StorageKey<T>,
        apply: impl FnOnce(&mut T) -> Result<R>,
    ) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let _guard = self.lock();
        let mut entries = self.read_entries();
        let mut value = entries
            .remove(key.name)
            .and_then(|v| match serde_json::from_value(v) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("stored value for {} has unexpected shape, resetting: {}", key.name, e);
                    None
                }
            })
            .unwrap_or_default();

        let output = apply(&mut value)?;
        entries.insert(key.name.to_string(), serde_json::to_value(&value)?);
        self.write_entries(&entries)?;
        debug!("storage updated: {}", key.name);
        Ok(output)
    }

    pub fn delete<T>(&self, key: &StorageKey<T>) -> Result<()> {
        self.update(|entries| {
            entries.remove(key.name);
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(&self, apply: impl FnOnce(&mut Entries)) -> Result<()> {
        let _guard = self.lock();
        let mut entries = self.read_entries();
        apply(&mut entries);
        self.write_entries(&entries)
    }

    fn read_entries(&self) -> Entries {
        if !self.path.exists() {
            return Entries::new();
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                warn!("storage unreadable, using empty state: {}: {}", self.path.display(), e);
                return Entries::new();
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("storage corrupted, using empty state: {}: {}", self.path.display(), e);
                Entries::new()
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        // 同じディレクトリに書き手ごとの一時ファイルを作り、書き終えてから置き換える
        let mut tmp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(&mut tmp);
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
