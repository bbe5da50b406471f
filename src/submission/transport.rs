//! 推論エンドポイントへの送信手段

use super::AnalysisRequest;
use crate::error::Result;
use log::debug;
use reqwest::multipart::{Form, Part};
use serde_json::json;
use std::future::Future;
use std::time::Duration;

/// HTTP応答（ステータスと本文のみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 送信手段の抽象
pub trait AnalysisTransport: Send + Sync {
    /// リクエストを1回送る
    fn send(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<TransportResponse>> + Send;
}

/// multipart/form-data でPOSTする実装
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), endpoint: endpoint.into() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AnalysisTransport for HttpTransport {
    async fn send(&self, request: &AnalysisRequest) -> Result<TransportResponse> {
        let image = request.image();
        let image_part = Part::bytes(image.data().to_vec())
            .file_name(image.file_name())
            .mime_str(image.format().mime_type())?;

        let mut form = Form::new().part("image", image_part);
        for (name, value) in request.form_fields()? {
            form = form.text(name, value);
        }

        debug!("posting analysis request to {} ({} bytes)", self.endpoint, image.data().len());
        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

/// ネットワークを使わないデモ応答
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    pub delay: Duration,
}

impl MockTransport {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// デモ用の固定ペイロード
    pub fn demo_payload(language: &str) -> serde_json::Value {
        json!({
            "plant": "Tomato",
            "diseaseTitle": "Early Blight",
            "diseaseName": "Early Blight",
            "rawDisease": "Tomato___Early_blight",
            "status": true,
            "language": language,
            "english": {
                "diseaseName": "Early Blight",
                "description": "Fungal disease causing concentric brown rings on older leaves.",
                "prevention": concat!(
                    "- Rotate crops every season\n",
                    "- Water at the base of the plant\n",
                    "- Remove infected debris"
                ),
                "treatments": concat!(
                    "- Prune affected leaves\n",
                    "- Apply a copper-based fungicide\n",
                    "- Mulch around the stem"
                )
            },
            "otherLanguage": {
                "diseaseName": "अगेती झुलसा",
                "description": "पुरानी पत्तियों पर भूरे छल्ले बनाने वाला फफूंद रोग।",
                "prevention": "- फसल चक्र अपनाएं\n- जड़ के पास पानी दें",
                "treatments": "- संक्रमित पत्तियां हटाएं\n- तांबा आधारित फफूंदनाशक छिड़कें"
            },
            "care": {
                "watering": "Keep soil evenly moist",
                "sunlight": "6-8 hours of direct sun"
            },
            "regionTips": ["Avoid overhead irrigation during monsoon"]
        })
    }
}

impl AnalysisTransport for MockTransport {
    async fn send(&self, request: &AnalysisRequest) -> Result<TransportResponse> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut payload = Self::demo_payload(request.language());
        payload["ts"] = json!(chrono::Utc::now().timestamp());
        Ok(TransportResponse { status: 200, body: payload.to_string() })
    }
}
