//! エラーケーステスト
//!
//! 各種エラーの分類と表示を検証

use plant_scan_rust::capture;
use plant_scan_rust::error::{ErrorCategory, PlantScanError};
use std::path::Path;
use tempfile::tempdir;

/// 存在しない画像ファイル
#[test]
fn test_upload_nonexistent_file() {
    let err = capture::upload_file(Path::new("/nonexistent/path/12345.png")).unwrap_err();
    assert!(matches!(err, PlantScanError::FileNotFound(_)));
    assert_eq!(err.category(), ErrorCategory::Input);
}

/// 画像でないファイル
#[test]
fn test_upload_text_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    let err = capture::upload_file(&path).unwrap_err();
    assert!(matches!(err, PlantScanError::InvalidImage(_)));
}

/// エラー分類
#[test]
fn test_error_categories() {
    let cases = vec![
        (PlantScanError::CameraUnavailable("x".into()), ErrorCategory::Device),
        (PlantScanError::CameraPermissionDenied("x".into()), ErrorCategory::Device),
        (PlantScanError::ServerStatus { status: 500, body: String::new() }, ErrorCategory::Network),
        (PlantScanError::MalformedResponse("x".into()), ErrorCategory::Network),
        (PlantScanError::Timeout(10), ErrorCategory::Network),
        (PlantScanError::LanguageRequired, ErrorCategory::Input),
        (PlantScanError::MissingImage, ErrorCategory::Input),
        (
            PlantScanError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
            ErrorCategory::Storage,
        ),
    ];
    for (err, category) in cases {
        assert_eq!(err.category(), category, "{}", err);
    }
}

/// PlantScanErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PlantScanError::Config("テスト設定エラー".to_string()),
        PlantScanError::FileNotFound("leaf.jpg".to_string()),
        PlantScanError::LanguageRequired,
        PlantScanError::Cancelled,
        PlantScanError::Timeout(120),
        PlantScanError::HistoryIndexOutOfRange { index: 5, len: 2 },
    ];

    for err in errors {
        let msg = format!("{}", err);
        assert!(!msg.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 共通ライブラリのエラーは透過的に表示
#[test]
fn test_common_error_transparent() {
    let common = plant_scan_common::Error::InvalidBounds { width: 0.0, height: 0.0 };
    let expected = common.to_string();
    let err: PlantScanError = common.into();
    assert_eq!(err.to_string(), expected);
}
