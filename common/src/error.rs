//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// 表示領域のサイズが0以下、または有限でない
    #[error("Invalid display bounds: {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },

    #[error("Unknown value: {0}")]
    UnknownValue(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
