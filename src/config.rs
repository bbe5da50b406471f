use crate::error::{PlantScanError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://clg-plant-backend.vercel.app/gemini/id";
pub const DEFAULT_AUTH_BASE: &str = "https://clg-plant-backend.vercel.app";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 推論エンドポイント
    pub endpoint_url: String,
    /// 認証APIのベースURL（/login, /register）
    pub auth_base_url: String,
    pub timeout_seconds: u64,
    pub progress_interval_ms: u64,
    pub progress_step: u8,
    /// 応答前の進捗の上限（100未満）
    pub progress_cap: u8,
    /// 撮影コマンド。`{output}` が出力先パスに置換される
    pub camera_command: Option<Vec<String>>,
    /// 保存先JSON（省略時はデータディレクトリ）
    pub storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PlantScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("plant-scan").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT.into(),
            auth_base_url: DEFAULT_AUTH_BASE.into(),
            timeout_seconds: 120,
            progress_interval_ms: 100,
            progress_step: 5,
            progress_cap: 90,
            camera_command: None,
            storage_path: None,
        }
    }

    /// 推論エンドポイント（環境変数を優先）
    pub fn endpoint(&self) -> String {
        std::env::var("PLANT_SCAN_ENDPOINT").unwrap_or_else(|_| self.endpoint_url.clone())
    }

    /// 認証APIのベースURL（環境変数を優先）
    pub fn auth_base(&self) -> String {
        std::env::var("PLANT_SCAN_AUTH_URL").unwrap_or_else(|_| self.auth_base_url.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    /// 保存先JSONのパス
    pub fn storage_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.storage_path {
            return Ok(path.clone());
        }
        let data = dirs::data_dir()
            .ok_or_else(|| PlantScanError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("plant-scan").join("storage.json"))
    }

    pub fn set_endpoint(&mut self, url: String) -> Result<()> {
        self.endpoint_url = url;
        self.save()
    }

    pub fn set_camera_command(&mut self, command: &str) -> Result<()> {
        let argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        if argv.is_empty() {
            return Err(PlantScanError::Config("撮影コマンドが空です".into()));
        }
        self.camera_command = Some(argv);
        self.save()
    }
}
