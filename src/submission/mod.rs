//! 解析リクエスト送信モジュール
//!
//! 画像・注目点・言語を1つのリクエストにまとめ、ちょうど1回送信する。
//!
//! ## 処理フロー
//! 1. 入力チェック（画像なし・言語未選択なら通信しない）
//! 2. 同時送信の禁止（1クライアントにつき1件）
//! 3. 言語設定の保存
//! 4. 擬似プログレス開始 → 送信（タイムアウト・キャンセル付き）
//! 5. ステータス・JSONの検証、成功時は生ペイロードを返す

pub mod progress;
pub mod transport;

use crate::capture::CapturedImage;
use crate::error::{PlantScanError, Result};
use crate::storage::{Storage, ANALYZE_DATA, PREFERRED_LANGUAGE};
use log::{info, warn};
use plant_scan_common::RegionMark;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub use progress::{next_progress, ProgressSettings, ProgressTicker};
pub use transport::{AnalysisTransport, HttpTransport, MockTransport, TransportResponse};

/// 1回分の送信内容
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    image: CapturedImage,
    regions: Vec<RegionMark>,
    language: String,
    user_id: Option<String>,
}

impl AnalysisRequest {
    pub fn new(
        image: CapturedImage,
        regions: Vec<RegionMark>,
        language: impl Into<String>,
        user_id: Option<String>,
    ) -> Self {
        Self { image, regions, language: language.into(), user_id }
    }

    pub fn image(&self) -> &CapturedImage {
        &self.image
    }

    pub fn regions(&self) -> &[RegionMark] {
        &self.regions
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// 画像以外のフォームフィールド（areas, language, userId）
    ///
    /// userId が無い場合は空文字を送る。
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            ("areas", serde_json::to_string(&self.regions)?),
            ("language", self.language.clone()),
            ("userId", self.user_id.clone().unwrap_or_default()),
        ])
    }
}

/// 送信中フラグを確実に戻すためのガード
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 送信クライアント
pub struct SubmissionClient<T> {
    transport: T,
    storage: Arc<Storage>,
    progress: ProgressSettings,
    timeout: Duration,
    in_flight: AtomicBool,
}

impl<T: AnalysisTransport> SubmissionClient<T> {
    pub fn new(transport: T, storage: Arc<Storage>) -> Self {
        Self {
            transport,
            storage,
            progress: ProgressSettings::default(),
            timeout: Duration::from_secs(120),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress(mut self, progress: ProgressSettings) -> Self {
        self.progress = progress;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// 送信（キャンセルなし）
    pub async fn submit<F>(
        &self,
        image: Option<CapturedImage>,
        regions: Vec<RegionMark>,
        language: &str,
        user_id: Option<String>,
        on_progress: F,
    ) -> Result<Value>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let never = std::future::pending();
        self.submit_with_cancel(image, regions, language, user_id, on_progress, never)
            .await
    }

    /// 送信（`cancel` が先に完了したら `Cancelled`）
    ///
    /// # Returns
    /// 成功時はエンドポイントの応答JSONをそのまま返す
    pub async fn submit_with_cancel<F, C>(
        &self,
        image: Option<CapturedImage>,
        regions: Vec<RegionMark>,
        language: &str,
        user_id: Option<String>,
        on_progress: F,
        cancel: C,
    ) -> Result<Value>
    where
        F: Fn(u8) + Send + Sync + 'static,
        C: Future<Output = ()>,
    {
        let image = image.ok_or(PlantScanError::MissingImage)?;
        let language = language.trim();
        if language.is_empty() {
            return Err(PlantScanError::LanguageRequired);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PlantScanError::SubmissionInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        if let Err(e) = self.storage.set(&PREFERRED_LANGUAGE, &language.to_string()) {
            warn!("failed to persist preferred language: {}", e);
        }

        let request = AnalysisRequest::new(image, regions, language, user_id);
        info!("submitting analysis (language={}, regions={})", language, request.regions().len());

        let ticker = ProgressTicker::start(self.progress, Arc::new(on_progress));
        let call = tokio::time::timeout(self.timeout, self.transport.send(&request));

        let response = tokio::select! {
            biased;
            _ = cancel => {
                info!("analysis cancelled");
                return Err(PlantScanError::Cancelled);
            }
            result = call => match result {
                Ok(response) => response?,
                Err(_) => {
                    warn!("analysis timed out after {}s", self.timeout.as_secs());
                    return Err(PlantScanError::Timeout(self.timeout.as_secs()));
                }
            },
        };

        let payload = parse_response(response)?;
        ticker.finish();

        if let Err(e) = self.storage.set(&ANALYZE_DATA, &payload) {
            warn!("failed to persist analysis data: {}", e);
        }
        info!("analysis completed");
        Ok(payload)
    }
}

/// 応答の検証: 2xx以外はサーバーエラー、JSONでなければ不正応答
pub fn parse_response(response: TransportResponse) -> Result<Value> {
    if !response.is_success() {
        return Err(PlantScanError::ServerStatus { status: response.status, body: response.body });
    }
    serde_json::from_str(&response.body)
        .map_err(|e| PlantScanError::MalformedResponse(e.to_string()))
}
