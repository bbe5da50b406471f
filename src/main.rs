use anyhow::Context;
use clap::Parser;
use dialoguer::{Confirm, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use plant_scan_common::{
    is_supported_language, normalize, DisplayBounds, DisplayLanguage, INDIAN_LANGUAGES,
};
use cli::{Backend, Cli, Commands, HistoryAction};
use config::Config;
use error::PlantScanError;
use history::HistoryStore;
use plant_scan_rust::{auth, capture, cli, config, error, history, report, storage, submission};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use storage::Storage;
use submission::{
    AnalysisTransport, HttpTransport, MockTransport, ProgressSettings, SubmissionClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = Config::load().context("設定ファイルを読み込めません")?;
    let storage = Arc::new(Storage::open(config.storage_file()?));

    match cli.command {
        Commands::Scan { image, camera, language, tap, display, save, backend, show_lang } => {
            println!("📸 plant-scan - スキャン\n");

            // 1. 画像取得
            println!("[1/3] 画像を取得中...");
            let mut session = capture::CaptureSession::new();
            match image {
                Some(path) if !camera => {
                    let img = capture::upload_file(&path)
                        .with_context(|| format!("画像を読み込めません: {}", path.display()))?;
                    session.upload(img);
                }
                _ => {
                    let argv = config.camera_command.clone().unwrap_or_default();
                    session.open_camera(Box::new(capture::CommandCamera::new(argv)))?;
                    session.capture()?;
                }
            }
            let captured = session.image().cloned().ok_or(PlantScanError::MissingImage)?;
            let (width, height) = captured.dimensions();
            println!("✔ 画像を取得: {}x{} ({})\n", width, height, captured.format().extension());

            let bounds = display.map(|d| DisplayBounds::sized(d.width, d.height));
            for point in &tap {
                let mark = match &bounds {
                    Some(b) => session.record_tap(point.x, point.y, b)?,
                    None => session.record_percent(point.x, point.y)?,
                };
                println!("  注目点: ({:.1}%, {:.1}%)", mark.x, mark.y);
            }

            // 2. 送信
            let language = match language {
                Some(l) => l,
                None => select_language(&storage)?,
            };
            if !is_supported_language(&language) {
                println!("⚠ 一覧にない言語です: {}", language);
            }
            println!("[2/3] AI解析中...（{}）", language);

            let user_id = storage.get(&storage::USER_ID);
            let regions = session.marks().to_vec();
            let payload = match backend {
                Backend::Remote => {
                    let transport = HttpTransport::new(config.endpoint());
                    submit_with_bar(
                        transport, &storage, &config, captured, regions, &language, user_id,
                    )
                    .await?
                }
                Backend::Mock => {
                    let transport = MockTransport::with_delay(Duration::from_millis(1500));
                    submit_with_bar(
                        transport, &storage, &config, captured, regions, &language, user_id,
                    )
                    .await?
                }
            };
            println!("✔ 解析完了\n");

            // 3. 表示・保存
            println!("[3/3] 結果");
            let lang = show_lang.unwrap_or_else(|| DisplayLanguage::infer(&payload));
            println!("{}", report::render_result(&normalize(&payload, lang), lang));

            if save {
                HistoryStore::new(storage.clone()).save(payload)?;
                println!("✔ 履歴に保存しました");
            }
        }

        Commands::Show { lang, json } => {
            let payload: Value = storage
                .get(&storage::ANALYZE_DATA)
                .ok_or(PlantScanError::NoAnalysisData)?;
            let lang = lang.unwrap_or_else(|| DisplayLanguage::infer(&payload));
            let result = normalize(&payload, lang);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", report::render_result(&result, lang));
            }
        }

        Commands::History { action } => {
            let store = HistoryStore::new(storage.clone());
            match action {
                HistoryAction::List { search, status } => {
                    let log = store.load();
                    if log.is_empty() {
                        println!("履歴はありません");
                    } else {
                        println!("{}", report::render_counts(&log.health_counts()));
                        for (index, entry) in log.search(search.as_deref().unwrap_or(""), status) {
                            println!("{}", report::render_history_line(index, entry));
                        }
                    }
                }
                HistoryAction::Show { index, lang } => {
                    let log = store.load();
                    let entry = log
                        .get(index)
                        .ok_or(PlantScanError::HistoryIndexOutOfRange { index, len: log.len() })?;
                    let lang = lang.unwrap_or_else(|| DisplayLanguage::infer(&entry.item));
                    println!("保存日時: {}\n", entry.seen_at);
                    println!("{}", report::render_result(&entry.normalized(lang), lang));
                }
                HistoryAction::Save => {
                    let payload: Value =
                        storage.get(&storage::ANALYZE_DATA).ok_or(PlantScanError::NoAnalysisData)?;
                    store.save(payload)?;
                    println!("✔ 履歴に保存しました");
                }
                HistoryAction::Delete { index } => {
                    let removed = store.delete(index)?;
                    println!("✔ 削除しました: {}", removed.plant_name());
                }
                HistoryAction::Clear { yes } => {
                    let confirmed = yes
                        || Confirm::new()
                            .with_prompt("履歴をすべて削除しますか？")
                            .default(false)
                            .interact()?;
                    if confirmed {
                        store.clear()?;
                        println!("✔ 履歴を削除しました");
                    }
                }
            }
        }

        Commands::Login { email, password } => {
            let password = read_password(password)?;
            let client = auth::AuthClient::new(config.auth_base(), storage.clone());
            let session = client.login(&email, &password).await?;
            println!("✅ ログインしました（ユーザーID: {}）", session.user_id);
        }

        Commands::Register { name, email, password } => {
            let password = read_password(password)?;
            let client = auth::AuthClient::new(config.auth_base(), storage.clone());
            let session = client.register(&name, &email, &password).await?;
            println!("✅ 登録しました（ユーザーID: {}）", session.user_id);
        }

        Commands::Logout => {
            auth::logout(&storage)?;
            println!("✔ ログアウトしました");
        }

        Commands::Languages => {
            let preferred = storage.get(&storage::PREFERRED_LANGUAGE);
            for lang in INDIAN_LANGUAGES {
                let mark = if preferred.as_deref() == Some(lang) { "*" } else { " " };
                println!("{} {}", mark, lang);
            }
        }

        Commands::Config { set_endpoint, set_camera_command, show } => {
            let mut config = config;

            if let Some(url) = set_endpoint {
                config.set_endpoint(url)?;
                println!("✔ エンドポイントを設定しました");
            }

            if let Some(command) = set_camera_command {
                config.set_camera_command(&command)?;
                println!("✔ 撮影コマンドを設定しました");
            }

            if show {
                println!("設定:");
                println!("  エンドポイント: {}", config.endpoint());
                println!("  認証API: {}", config.auth_base());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!(
                    "  撮影コマンド: {}",
                    config
                        .camera_command
                        .as_ref()
                        .map(|c| c.join(" "))
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  保存先: {}", storage.path().display());
                println!(
                    "  ログイン: {}",
                    if storage.get(&storage::TOKEN).is_some() { "済み" } else { "未ログイン" }
                );
            }
        }
    }

    Ok(())
}

fn init_logger(verbose: bool) {
    // RUST_LOG があればそちらを優先
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// 送信言語を対話選択（前回の言語を初期値にする）
fn select_language(storage: &Storage) -> anyhow::Result<String> {
    let preferred = storage.get(&storage::PREFERRED_LANGUAGE);
    let default = preferred
        .as_deref()
        .and_then(|p| INDIAN_LANGUAGES.iter().position(|l| l.eq_ignore_ascii_case(p)))
        .unwrap_or(0);
    let index = Select::new()
        .with_prompt("言語を選択")
        .items(&INDIAN_LANGUAGES)
        .default(default)
        .interact()?;
    Ok(INDIAN_LANGUAGES[index].to_string())
}

fn read_password(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => Ok(Password::new().with_prompt("パスワード").interact()?),
    }
}

/// プログレスバー付きで送信（Ctrl+Cでキャンセル）
async fn submit_with_bar<T: AnalysisTransport>(
    transport: T,
    storage: &Arc<Storage>,
    config: &Config,
    image: capture::CapturedImage,
    regions: Vec<plant_scan_common::RegionMark>,
    language: &str,
    user_id: Option<String>,
) -> error::Result<Value> {
    let client = SubmissionClient::new(transport, storage.clone())
        .with_timeout(config.timeout())
        .with_progress(ProgressSettings::from_config(config));

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("  [{bar:40.green/white}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    let sink = bar.clone();
    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let result = client
        .submit_with_cancel(
            Some(image),
            regions,
            language,
            user_id,
            move |v| sink.set_position(v as u64),
            cancel,
        )
        .await;
    bar.finish_and_clear();
    result
}
