//! テスト用の共通部品

#![allow(dead_code)]

use plant_scan_rust::capture::{CaptureSource, CapturedImage};
use plant_scan_rust::error::Result;
use plant_scan_rust::submission::{AnalysisRequest, AnalysisTransport, TransportResponse};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// 指定サイズのPNG画像バイト列
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 160, 60]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).expect("PNG encode");
    buf.into_inner()
}

pub fn sample_image() -> CapturedImage {
    CapturedImage::from_bytes(png_bytes(64, 48), CaptureSource::Upload).expect("sample image")
}

/// 呼び出し回数と送信内容を記録する送信手段
pub struct CountingTransport {
    pub calls: AtomicUsize,
    pub status: u16,
    pub body: String,
    pub delay: Duration,
    pub last_fields: Mutex<Vec<(&'static str, String)>>,
}

impl CountingTransport {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            status,
            body: body.into(),
            delay: Duration::ZERO,
            last_fields: Mutex::new(Vec::new()),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AnalysisTransport for CountingTransport {
    async fn send(&self, request: &AnalysisRequest) -> Result<TransportResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fields = request.form_fields()?;
        {
            let mut last = self.last_fields.lock().unwrap();
            *last = fields;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(TransportResponse { status: self.status, body: self.body.clone() })
    }
}
