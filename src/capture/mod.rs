//! 画像取得モジュール
//!
//! カメラ撮影またはファイルアップロードで1枚の静止画を得る。
//! セッションが持つ画像は常に高々1枚で、撮り直しで注目点ごと破棄する。

pub mod camera;

use crate::error::{PlantScanError, Result};
use base64::Engine;
use log::{debug, info};
use plant_scan_common::{DisplayBounds, RegionAnnotator, RegionMark};
use std::io::Cursor;
use std::path::Path;

pub use camera::{CameraDevice, CameraFacing, CameraStream, CommandCamera};

/// アップロード可能な最大サイズ
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// 対応画像形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
}

impl ImageFormat {
    fn from_detected(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::WebP => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::WebP => "webp",
        }
    }
}

/// 画像の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    Camera,
    Upload,
}

/// 送信待ちの静止画
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    data: Vec<u8>,
    format: ImageFormat,
    source: CaptureSource,
    width: u32,
    height: u32,
}

impl CapturedImage {
    /// バイト列から作成（形式は内容から判定）
    pub fn from_bytes(data: Vec<u8>, source: CaptureSource) -> Result<Self> {
        if data.is_empty() {
            return Err(PlantScanError::InvalidImage("空のデータです".into()));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(PlantScanError::InvalidImage(format!(
                "サイズが大きすぎます: {} bytes（上限 {} bytes）",
                data.len(),
                MAX_IMAGE_BYTES
            )));
        }

        let reader = image::ImageReader::new(Cursor::new(data.as_slice()))
            .with_guessed_format()
            .map_err(|e| PlantScanError::InvalidImage(e.to_string()))?;
        let format = reader
            .format()
            .and_then(ImageFormat::from_detected)
            .ok_or_else(|| PlantScanError::InvalidImage("未対応の画像形式です（JPEG/PNG/WebP）".into()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| PlantScanError::InvalidImage(e.to_string()))?;

        debug!("image decoded: {:?} {}x{} ({} bytes)", format, width, height, data.len());
        Ok(Self { data, format, source, width, height })
    }

    /// `data:image/...;base64,` 形式のURLから作成
    pub fn from_data_url(url: &str) -> Result<Self> {
        let payload = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, b64)| b64)
            .ok_or_else(|| PlantScanError::InvalidImage("data URLではありません".into()))?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| PlantScanError::InvalidImage(format!("base64: {}", e)))?;
        Self::from_bytes(data, CaptureSource::Upload)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn source(&self) -> CaptureSource {
        self.source
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 送信時のファイル名
    pub fn file_name(&self) -> String {
        format!("plant.{}", self.format.extension())
    }
}

/// ファイルを読み込んで画像を作成（カメラを使わない経路）
pub fn upload_file(path: &Path) -> Result<CapturedImage> {
    if !path.exists() {
        return Err(PlantScanError::FileNotFound(path.display().to_string()));
    }
    let data = std::fs::read(path)?;
    CapturedImage::from_bytes(data, CaptureSource::Upload)
}

/// 1回のスキャン操作の状態
///
/// カメラストリーム・画像・注目点をまとめて持つ。
#[derive(Default)]
pub struct CaptureSession {
    stream: Option<CameraStream>,
    image: Option<CapturedImage>,
    annotator: RegionAnnotator,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 背面カメラを起動（既存のストリームは停止）
    pub fn open_camera(&mut self, device: Box<dyn CameraDevice>) -> Result<()> {
        self.stop_camera();
        self.stream = Some(CameraStream::open(device, CameraFacing::Back)?);
        Ok(())
    }

    pub fn stop_camera(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }

    pub fn has_live_stream(&self) -> bool {
        self.stream.as_ref().is_some_and(CameraStream::is_active)
    }

    /// 現在のフレームを撮影してストリームを止める
    pub fn capture(&mut self) -> Result<&CapturedImage> {
        let stream = self
            .stream
            .take()
            .ok_or_else(|| PlantScanError::CameraUnavailable("カメラが起動していません".into()))?;
        let image = stream.capture_frame()?;
        Ok(self.set_image(image))
    }

    /// アップロード画像を採用（カメラは停止）
    pub fn upload(&mut self, image: CapturedImage) -> &CapturedImage {
        self.stop_camera();
        self.set_image(image)
    }

    fn set_image(&mut self, image: CapturedImage) -> &CapturedImage {
        self.annotator.clear();
        info!("image captured from {:?}", image.source());
        self.image.insert(image)
    }

    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    /// 表示中の画像上のタップを記録
    pub fn record_tap(
        &mut self,
        click_x: f64,
        click_y: f64,
        bounds: &DisplayBounds,
    ) -> Result<RegionMark> {
        if self.image.is_none() {
            return Err(PlantScanError::MissingImage);
        }
        Ok(self.annotator.record_tap(click_x, click_y, bounds)?)
    }

    /// %座標をそのまま注目点として追加
    pub fn record_percent(&mut self, x: f64, y: f64) -> Result<RegionMark> {
        if self.image.is_none() {
            return Err(PlantScanError::MissingImage);
        }
        Ok(self.annotator.push_percent(x, y)?)
    }

    pub fn marks(&self) -> &[RegionMark] {
        self.annotator.marks()
    }

    /// 撮り直し: 画像と注目点をすべて破棄
    pub fn retake(&mut self) {
        self.stop_camera();
        self.image = None;
        self.annotator.clear();
    }
}
