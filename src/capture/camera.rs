//! カメラデバイス
//!
//! 外部の撮影コマンド（libcamera-still, fswebcam 等）を呼び出して1フレーム得る。
//! ストリームは `CameraStream` が所有し、撮影後またはDrop時に必ず停止する。

use super::{CaptureSource, CapturedImage};
use crate::error::{PlantScanError, Result};
use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

/// カメラの向き
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    /// 背面（環境側）
    Back,
    Front,
}

impl CameraFacing {
    pub fn as_str(self) -> &'static str {
        match self {
            CameraFacing::Back => "back",
            CameraFacing::Front => "front",
        }
    }
}

/// カメラデバイスの抽象
pub trait CameraDevice: Send {
    /// ストリームを開始
    fn open(&mut self, facing: CameraFacing) -> Result<()>;
    /// 現在のフレームをエンコード済みバイト列で取得
    fn grab_frame(&mut self) -> Result<Vec<u8>>;
    /// ストリームを停止（冪等）
    fn close(&mut self);
}

/// 起動中のカメラストリーム
pub struct CameraStream {
    device: Box<dyn CameraDevice>,
    active: bool,
}

impl CameraStream {
    /// カメラを開く。権限拒否・デバイスなしはエラーとして返す
    pub fn open(mut device: Box<dyn CameraDevice>, facing: CameraFacing) -> Result<Self> {
        device.open(facing)?;
        info!("camera stream started ({})", facing.as_str());
        Ok(Self { device, active: true })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 1フレーム撮影してストリームを停止
    pub fn capture_frame(mut self) -> Result<CapturedImage> {
        let frame = self.device.grab_frame();
        self.stop();
        CapturedImage::from_bytes(frame?, CaptureSource::Camera)
    }

    pub fn stop(&mut self) {
        if self.active {
            self.device.close();
            self.active = false;
            info!("camera stream stopped");
        }
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 外部コマンドで撮影するカメラ
///
/// `argv` 中の `{output}` は出力ファイルパス、`{facing}` は back/front に置換される。
pub struct CommandCamera {
    argv: Vec<String>,
    facing: Option<CameraFacing>,
    output: PathBuf,
}

impl CommandCamera {
    pub fn new(argv: Vec<String>) -> Self {
        let output = std::env::temp_dir().join(format!("plant-scan-{}.img", std::process::id()));
        Self { argv, facing: None, output }
    }

    fn expand_args(&self, facing: CameraFacing) -> Vec<String> {
        let output = self.output.display().to_string();
        self.argv
            .iter()
            .skip(1)
            .map(|a| a.replace("{output}", &output).replace("{facing}", facing.as_str()))
            .collect()
    }
}

impl CameraDevice for CommandCamera {
    fn open(&mut self, facing: CameraFacing) -> Result<()> {
        if self.facing.is_some() {
            return Err(PlantScanError::CameraBusy);
        }
        if self.argv.is_empty() {
            return Err(PlantScanError::CameraUnavailable(
                "撮影コマンドが未設定です。`plant-scan config --set-camera-command` で設定してください".into(),
            ));
        }
        self.facing = Some(facing);
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<Vec<u8>> {
        let facing = self
            .facing
            .ok_or_else(|| PlantScanError::CameraUnavailable("カメラが起動していません".into()))?;
        let program = &self.argv[0];
        let args = self.expand_args(facing);
        debug!("running capture command: {} {:?}", program, args);

        let output = Command::new(program).args(&args).output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => PlantScanError::CameraUnavailable(format!("{}: {}", program, e)),
            ErrorKind::PermissionDenied => {
                PlantScanError::CameraPermissionDenied(format!("{}: {}", program, e))
            }
            _ => PlantScanError::CaptureFailed(e.to_string()),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlantScanError::CaptureFailed(format!(
                "撮影コマンド失敗 (code {:?}): {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        // {output} を使わないコマンドは標準出力に画像を書く
        if self.argv.iter().any(|a| a.contains("{output}")) {
            let data = std::fs::read(&self.output)
                .map_err(|e| PlantScanError::CaptureFailed(format!("出力ファイルを読めません: {}", e)))?;
            Ok(data)
        } else {
            Ok(output.stdout)
        }
    }

    fn close(&mut self) {
        self.facing = None;
        if self.output.exists() {
            if let Err(e) = std::fs::remove_file(&self.output) {
                warn!("failed to remove capture file {}: {}", self.output.display(), e);
            }
        }
    }
}
