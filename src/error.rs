use thiserror::Error;

/// エラーの分類（ユーザーへの案内の出し分け用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// カメラ・画像デバイス
    Device,
    /// 通信・サーバー
    Network,
    /// 入力不備
    Input,
    /// 永続化
    Storage,
}

#[derive(Error, Debug)]
pub enum PlantScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カメラへのアクセスが拒否されました: {0}")]
    CameraPermissionDenied(String),

    #[error("カメラが利用できません: {0}")]
    CameraUnavailable(String),

    #[error("カメラは既に使用中です")]
    CameraBusy,

    #[error("撮影に失敗しました: {0}")]
    CaptureFailed(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像を読み込めません: {0}")]
    InvalidImage(String),

    #[error("画像が選択されていません。撮影またはアップロードしてください")]
    MissingImage,

    #[error("言語を選択してください")]
    LanguageRequired,

    #[error("既に解析中です")]
    SubmissionInFlight,

    #[error("通信エラー: {0}")]
    Network(String),

    #[error("タイムアウトしました（{0}秒）")]
    Timeout(u64),

    #[error("解析をキャンセルしました")]
    Cancelled,

    #[error("Server Error: {status} {body}")]
    ServerStatus { status: u16, body: String },

    #[error("サーバー応答を解析できません: {0}")]
    MalformedResponse(String),

    #[error("認証エラー: {0}")]
    Auth(String),

    #[error("履歴番号が範囲外です: {index}（{len}件）")]
    HistoryIndexOutOfRange { index: usize, len: usize },

    #[error("解析データがありません。先にスキャンしてください")]
    NoAnalysisData,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] plant_scan_common::Error),
}

impl PlantScanError {
    pub fn category(&self) -> ErrorCategory {
        use PlantScanError::*;
        match self {
            CameraPermissionDenied(_) | CameraUnavailable(_) | CameraBusy | CaptureFailed(_) => {
                ErrorCategory::Device
            }
            Network(_) | Timeout(_) | ServerStatus { .. } | MalformedResponse(_) | Auth(_) => {
                ErrorCategory::Network
            }
            Io(_) | JsonParse(_) | Config(_) => ErrorCategory::Storage,
            FileNotFound(_) | InvalidImage(_) | MissingImage | LanguageRequired
            | SubmissionInFlight | Cancelled | HistoryIndexOutOfRange { .. } | NoAnalysisData
            | Common(_) => ErrorCategory::Input,
        }
    }
}

impl From<reqwest::Error> for PlantScanError {
    fn from(e: reqwest::Error) -> Self {
        PlantScanError::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlantScanError>;
