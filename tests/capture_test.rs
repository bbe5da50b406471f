//! 画像取得のテスト
//!
//! アップロード・カメラ・注目点・撮り直しを検証

mod support;

use plant_scan_common::{DisplayBounds, RegionMark};
use plant_scan_rust::capture::{
    self, CameraDevice, CameraFacing, CaptureSession, CaptureSource, CapturedImage, ImageFormat,
};
use plant_scan_rust::error::{PlantScanError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use support::png_bytes;
use tempfile::tempdir;

struct StubCamera {
    frame: Vec<u8>,
    fail_open: bool,
    closes: Arc<AtomicUsize>,
}

impl CameraDevice for StubCamera {
    fn open(&mut self, facing: CameraFacing) -> Result<()> {
        assert_eq!(facing, CameraFacing::Back);
        if self.fail_open {
            return Err(PlantScanError::CameraPermissionDenied("denied".into()));
        }
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<Vec<u8>> {
        Ok(self.frame.clone())
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn stub(closes: &Arc<AtomicUsize>) -> Box<StubCamera> {
    Box::new(StubCamera { frame: png_bytes(320, 240), fail_open: false, closes: closes.clone() })
}

/// ファイルアップロード
#[test]
fn test_upload_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("leaf.png");
    std::fs::write(&path, png_bytes(30, 20)).unwrap();

    let image = capture::upload_file(&path).expect("読み込み失敗");
    assert_eq!(image.format(), ImageFormat::Png);
    assert_eq!(image.source(), CaptureSource::Upload);
    assert_eq!(image.dimensions(), (30, 20));
}

/// JPEGも受け付ける
#[test]
fn test_upload_jpeg() {
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb([200, 10, 10]));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();

    let image = CapturedImage::from_bytes(buf.into_inner(), CaptureSource::Upload).unwrap();
    assert_eq!(image.format(), ImageFormat::Jpeg);
    assert_eq!(image.format().mime_type(), "image/jpeg");
    assert_eq!(image.file_name(), "plant.jpg");
}

/// 存在しないファイル
#[test]
fn test_upload_missing_file() {
    let missing = std::path::Path::new("/nonexistent/leaf-12345.png");
    let err = capture::upload_file(missing).unwrap_err();
    assert!(matches!(err, PlantScanError::FileNotFound(_)));
}

/// カメラ撮影: 背面カメラ、撮影後にストリーム停止
#[test]
fn test_camera_capture_stops_stream() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut session = CaptureSession::new();
    session.open_camera(stub(&closes)).unwrap();
    assert!(session.has_live_stream());

    let image = session.capture().unwrap();
    assert_eq!(image.source(), CaptureSource::Camera);
    assert_eq!(image.dimensions(), (320, 240));
    assert!(!session.has_live_stream());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

/// 新しいストリームを開くと前のものは停止
#[test]
fn test_reopen_stops_previous() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let mut session = CaptureSession::new();

    session.open_camera(stub(&first)).unwrap();
    session.open_camera(stub(&second)).unwrap();
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);

    drop(session);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

/// 権限拒否は報告され、ストリームは残らない
#[test]
fn test_camera_permission_denied() {
    let closes = Arc::new(AtomicUsize::new(0));
    let camera = Box::new(StubCamera { frame: Vec::new(), fail_open: true, closes });
    let mut session = CaptureSession::new();

    let err = session.open_camera(camera).unwrap_err();
    assert!(matches!(err, PlantScanError::CameraPermissionDenied(_)));
    assert!(!session.has_live_stream());
    assert!(matches!(session.capture(), Err(PlantScanError::CameraUnavailable(_))));
}

/// 中央タップは50/50（表示サイズによらない）
#[test]
fn test_center_tap_any_size() {
    let mut session = CaptureSession::new();
    session.upload(CapturedImage::from_bytes(png_bytes(10, 10), CaptureSource::Upload).unwrap());

    for (w, h) in [(640.0, 480.0), (333.0, 777.0), (1.0, 1.0)] {
        let mark = session.record_tap(w / 2.0, h / 2.0, &DisplayBounds::sized(w, h)).unwrap();
        assert!((mark.x - 50.0).abs() < 1e-9);
        assert!((mark.y - 50.0).abs() < 1e-9);
    }
    assert_eq!(session.marks().len(), 3);
}

/// 撮り直しで画像と注目点を破棄、新しい画像では注目点は空から
#[test]
fn test_retake_and_new_image() {
    let mut session = CaptureSession::new();
    session.upload(CapturedImage::from_bytes(png_bytes(10, 10), CaptureSource::Upload).unwrap());
    session.record_tap(1.0, 2.0, &DisplayBounds::sized(10.0, 10.0)).unwrap();
    assert_eq!(session.marks(), &[RegionMark { x: 10.0, y: 20.0 }]);

    session.retake();
    assert!(session.image().is_none());
    assert!(session.marks().is_empty());

    session.upload(CapturedImage::from_bytes(png_bytes(12, 12), CaptureSource::Upload).unwrap());
    assert!(session.marks().is_empty());
}
