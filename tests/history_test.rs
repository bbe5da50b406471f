//! 履歴ストアのテスト
//!
//! 上限・順序・削除・破損ファイル時の挙動を検証

use plant_scan_rust::error::PlantScanError;
use plant_scan_rust::history::HistoryStore;
use plant_scan_rust::storage::Storage;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn store(dir: &tempfile::TempDir) -> HistoryStore {
    HistoryStore::new(Arc::new(Storage::open(dir.path().join("storage.json"))))
}

/// 201件保存すると新しい200件が新しい順に残る
#[test]
fn test_capacity_201() {
    let dir = tempdir().expect("Failed to create temp dir");
    let history = store(&dir);

    for n in 0..201 {
        history
            .save_at(json!({"plant": format!("p{}", n)}), format!("2024-01-01T00:00:{:03}Z", n))
            .expect("保存失敗");
    }

    let log = history.load();
    assert_eq!(log.len(), 200);
    assert_eq!(log.get(0).unwrap().item["plant"], "p200");
    assert_eq!(log.get(199).unwrap().item["plant"], "p1");
}

/// 先頭を削除しても残りの順序は保たれる
#[test]
fn test_delete_first_keeps_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let history = store(&dir);
    for n in 0..5 {
        history.save_at(json!({"plant": n}), "t").unwrap();
    }

    let removed = history.delete(0).unwrap();
    assert_eq!(removed.item["plant"], 4);

    let plants: Vec<_> = history.load().entries().iter().map(|e| e.item["plant"].clone()).collect();
    assert_eq!(plants, vec![json!(3), json!(2), json!(1), json!(0)]);
}

/// 範囲外の削除はエラー
#[test]
fn test_delete_out_of_range() {
    let dir = tempdir().expect("Failed to create temp dir");
    let history = store(&dir);
    history.save_at(json!({}), "t").unwrap();

    let err = history.delete(3).unwrap_err();
    assert!(matches!(err, PlantScanError::HistoryIndexOutOfRange { index: 3, len: 1 }));
}

/// 保存時刻はRFC3339
#[test]
fn test_save_stamps_time() {
    let dir = tempdir().expect("Failed to create temp dir");
    let history = store(&dir);
    let entry = history.save(json!({"plant": "Okra"})).unwrap();

    assert!(chrono::DateTime::parse_from_rfc3339(&entry.seen_at).is_ok());
    assert_eq!(history.load().get(0).unwrap().seen_at, entry.seen_at);
}

/// 永続化形式は {item, seenAt} の配列
#[test]
fn test_persisted_shape() {
    let dir = tempdir().expect("Failed to create temp dir");
    let history = store(&dir);
    history.save_at(json!({"plant": "Okra"}), "2024-05-01T10:00:00.000Z").unwrap();

    let content = std::fs::read_to_string(dir.path().join("storage.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        value["analyze_history"],
        json!([{"item": {"plant": "Okra"}, "seenAt": "2024-05-01T10:00:00.000Z"}])
    );
}

/// 壊れたファイルは空の履歴として扱い、保存で復旧する
#[test]
fn test_corrupted_storage() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("storage.json"), "{ not json").unwrap();

    let history = store(&dir);
    assert!(history.load().is_empty());

    history.save_at(json!({"plant": "Okra"}), "t").unwrap();
    assert_eq!(history.load().len(), 1);
}

/// 全件削除
#[test]
fn test_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    let history = store(&dir);
    history.save_at(json!({}), "t").unwrap();
    history.clear().unwrap();
    assert!(history.load().is_empty());
}

/// 同じストレージへの並行保存でも件数が失われない
#[test]
fn test_concurrent_saves_keep_every_entry() {
    let dir = tempdir().expect("Failed to create temp dir");
    let storage = Arc::new(Storage::open(dir.path().join("storage.json")));
    storage
        .set(&plant_scan_rust::storage::TOKEN, &"t".to_string())
        .expect("保存失敗");

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let history = HistoryStore::new(storage.clone());
            std::thread::spawn(move || {
                for m in 0..5 {
                    history
                        .save_at(json!({"plant": format!("p{}-{}", n, m)}), "t")
                        .expect("保存失敗");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(HistoryStore::new(storage.clone()).load().len(), 40);
    assert_eq!(storage.get(&plant_scan_rust::storage::TOKEN).as_deref(), Some("t"));
}
