//! plant-scan-rust
//!
//! 植物の画像を撮影/読み込み、注目点を付けて推論エンドポイントへ送り、
//! 結果を正規化して表示・履歴保存する。

pub mod auth;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod report;
pub mod storage;
pub mod submission;
