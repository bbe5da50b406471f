use clap::{Parser, Subcommand};
use plant_scan_common::{DisplayLanguage, StatusFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plant-scan")]
#[command(about = "植物の健康診断スキャン・履歴管理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を撮影/読み込みして診断
    Scan {
        /// 画像ファイル（省略時はカメラ）
        #[arg(short, long, conflicts_with = "camera")]
        image: Option<PathBuf>,

        /// カメラで撮影
        #[arg(short, long)]
        camera: bool,

        /// 送信言語（省略時は対話選択）
        #[arg(short, long)]
        language: Option<String>,

        /// 注目点 "x,y"（複数可。--display 指定時はピクセル、無指定時は%）
        #[arg(short, long, value_name = "X,Y")]
        tap: Vec<TapPoint>,

        /// 表示領域サイズ "WxH"（ピクセル）
        #[arg(long, value_name = "WxH")]
        display: Option<DisplaySize>,

        /// 結果を履歴に保存
        #[arg(short, long)]
        save: bool,

        /// 送信先 (remote/mock)
        #[arg(long, default_value = "remote")]
        backend: Backend,

        /// 表示言語 (english/hindi)。省略時は応答から推定
        #[arg(long)]
        show_lang: Option<DisplayLanguage>,
    },

    /// 直近の診断結果を表示
    Show {
        /// 表示言語 (english/hindi)
        #[arg(long)]
        lang: Option<DisplayLanguage>,

        /// 正規化済みJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 診断履歴
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// ログイン
    Login {
        /// メールアドレス
        #[arg(long)]
        email: String,

        /// パスワード（省略時は入力プロンプト）
        #[arg(long)]
        password: Option<String>,
    },

    /// 新規登録
    Register {
        /// 名前
        #[arg(long)]
        name: String,

        /// メールアドレス
        #[arg(long)]
        email: String,

        /// パスワード（省略時は入力プロンプト）
        #[arg(long)]
        password: Option<String>,
    },

    /// ログアウト
    Logout,

    /// 送信可能な言語の一覧
    Languages,

    /// 設定を表示/編集
    Config {
        /// 推論エンドポイントを設定
        #[arg(long)]
        set_endpoint: Option<String>,

        /// 撮影コマンドを設定（例: "libcamera-still -n -o {output}"）
        #[arg(long)]
        set_camera_command: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// 一覧（新しい順）
    List {
        /// 植物名で検索
        #[arg(short, long)]
        search: Option<String>,

        /// 状態で絞り込み (all/healthy/warning/diseased/unknown)
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },

    /// 1件を表示
    Show {
        /// 履歴番号
        index: usize,

        /// 表示言語 (english/hindi)
        #[arg(long)]
        lang: Option<DisplayLanguage>,
    },

    /// 直近の診断結果を履歴に保存
    Save,

    /// 1件を削除
    Delete {
        /// 履歴番号
        index: usize,
    },

    /// 全件削除
    Clear {
        /// 確認を省略
        #[arg(short, long)]
        yes: bool,
    },
}

/// 送信先
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Remote,
    Mock,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote" | "http" => Ok(Backend::Remote),
            "mock" | "demo" => Ok(Backend::Mock),
            _ => Err(format!("Unknown backend: {}. Use remote or mock", s)),
        }
    }
}

/// タップ位置 "x,y"
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapPoint {
    pub x: f64,
    pub y: f64,
}

impl std::str::FromStr for TapPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("Invalid tap: {}. Use x,y", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| format!("Invalid tap: {}: {}", s, e))
        };
        Ok(TapPoint { x: parse(x)?, y: parse(y)? })
    }
}

/// 表示領域 "WxH"
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl std::str::FromStr for DisplaySize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .to_lowercase()
            .split_once('x')
            .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
            .ok_or_else(|| format!("Invalid display size: {}. Use WxH", s))?;
        let parse = |v: &str| {
            v.parse::<f64>()
                .map_err(|e| format!("Invalid display size: {}: {}", s, e))
        };
        Ok(DisplaySize { width: parse(&w)?, height: parse(&h)? })
    }
}
