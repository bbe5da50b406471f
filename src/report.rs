//! 診断結果のテキスト表示

use plant_scan_common::{AnalysisResult, DisplayLanguage, HealthCounts, HistoryEntry};
use std::fmt;

/// 診断結果の表示（`Display` で整形）
pub struct ResultReport<'a> {
    pub result: &'a AnalysisResult,
    pub lang: DisplayLanguage,
}

impl fmt::Display for ResultReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let status = if result.status_detected {
            "⚠ Disease Detected"
        } else {
            "✔ No Disease Detected"
        };

        writeln!(f, "🌿 {}  [{}]", result.disease_title, status)?;
        let localized = &result.localized_disease_name;
        if !localized.is_empty() && *localized != result.disease_title {
            writeln!(f, "   {}", localized)?;
        }
        writeln!(f, "  植物: {}", result.plant_name)?;
        writeln!(f, "  状態: {} ({})", result.health_status.label(), result.health_status)?;
        if !result.raw_disease_code.is_empty() {
            writeln!(f, "  コード: {}", result.raw_disease_code)?;
        }
        writeln!(f, "  観測日時: {}", result.observed_at)?;
        writeln!(f, "  表示言語: {}", self.lang)?;

        if !result.description.is_empty() {
            writeln!(f, "\n説明:\n  {}", result.description)?;
        }

        let immediate = result.immediate_actions();
        if !immediate.is_empty() {
            writeln!(f, "\n直ちに行う対策:")?;
            for action in immediate {
                writeln!(f, "  • {}", action)?;
            }
        }

        write_list(f, "治療", &result.treatment_items)?;
        write_list(f, "予防", &result.prevention_items)?;

        writeln!(f, "\nケア:")?;
        for (label, value) in result.care_fields.rows() {
            writeln!(f, "  {:<12} {}", label, value)?;
        }

        write_list(f, "地域のヒント", &result.region_tips)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, title: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "\n{}:", title)?;
    for (i, item) in items.iter().enumerate() {
        writeln!(f, "  {}. {}", i + 1, item)?;
    }
    Ok(())
}

/// 診断結果を表示用テキストに整形
pub fn render_result(result: &AnalysisResult, lang: DisplayLanguage) -> String {
    ResultReport { result, lang }.to_string()
}

/// 履歴一覧の1行
pub fn render_history_line(index: usize, entry: &HistoryEntry) -> String {
    let result = entry.normalized(DisplayLanguage::English);
    format!(
        "[{:>3}] {:<8} {:<20} {:<24} {}",
        index,
        result.health_status.label(),
        result.plant_name,
        result.disease_title,
        entry.seen_at
    )
}

/// 状態別件数
pub fn render_counts(counts: &HealthCounts) -> String {
    format!(
        "健康 {} / 要注意 {} / 病気 {} / 不明 {}（計 {}件）",
        counts.healthy,
        counts.warning,
        counts.diseased,
        counts.unknown,
        counts.total()
    )
}
