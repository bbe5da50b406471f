//! 擬似プログレス
//!
//! 実際の転送量とは無関係に、一定間隔で値を進めて上限（100未満）で止める。
//! 応答が届いたら100にする。表示用のみ。

use crate::config::Config;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// 進捗の進め方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSettings {
    pub interval: Duration,
    pub step: u8,
    pub cap: u8,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self { interval: Duration::from_millis(100), step: 5, cap: 90 }
    }
}

impl ProgressSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: Duration::from_millis(config.progress_interval_ms.max(1)),
            step: config.progress_step.max(1),
            cap: config.progress_cap,
        }
    }
}

/// 1ティック分進めた値（上限は99以下に丸める）
pub fn next_progress(current: u8, step: u8, cap: u8) -> u8 {
    let cap = cap.min(99);
    if current >= cap {
        current
    } else {
        current.saturating_add(step).min(cap)
    }
}

type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// 進捗ティッカー
///
/// 値の更新とコールバック呼び出しは同じロック内で行うため、
/// 通知される値は単調増加になる。
pub struct ProgressTicker {
    state: Arc<Mutex<u8>>,
    on_progress: ProgressCallback,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// ティッカーを開始（tokioランタイム内で呼ぶこと）
    pub fn start(settings: ProgressSettings, on_progress: ProgressCallback) -> Self {
        let state = Arc::new(Mutex::new(0u8));
        let task_state = state.clone();
        let task_callback = on_progress.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(settings.interval);
            // 初回は即時に完了するので読み捨てる
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut current = task_state.lock().unwrap_or_else(|p| p.into_inner());
                let next = next_progress(*current, settings.step, settings.cap);
                if next == *current {
                    break;
                }
                *current = next;
                task_callback(next);
            }
        });

        Self { state, on_progress, handle }
    }

    pub fn value(&self) -> u8 {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// 応答到着: 100にして停止
    pub fn finish(self) {
        self.handle.abort();
        let mut current = self.state.lock().unwrap_or_else(|p| p.into_inner());
        *current = 100;
        (self.on_progress)(100);
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_progress_steps_to_cap() {
        let mut value = 0;
        let mut seen = Vec::new();
        for _ in 0..30 {
            value = next_progress(value, 5, 90);
            seen.push(value);
        }
        assert_eq!(seen[0], 5);
        assert_eq!(*seen.last().unwrap(), 90);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_cap_below_hundred() {
        assert_eq!(next_progress(95, 10, 100), 99);
        assert_eq!(next_progress(99, 10, 100), 99);
        assert_eq!(next_progress(250, 10, 90), 250);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_monotonic_and_finishes_at_100() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let ticker = ProgressTicker::start(
            ProgressSettings::default(),
            Arc::new(move |v: u8| sink.lock().unwrap().push(v)),
        );

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(ticker.value(), 90);
        ticker.finish();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen.last().unwrap(), 100);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(seen[..seen.len() - 1].iter().all(|v| *v <= 90));
    }
}
