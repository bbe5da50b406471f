//! Plant Scan Common Library
//!
//! CLIとテストで共有される型・正規化ロジック。IOは持たない。

pub mod error;
pub mod types;
pub mod language;
pub mod region;
pub mod normalizer;
pub mod history;

pub use error::{Error, Result};
pub use types::{AnalysisResult, CareFields, HealthStatus, RegionMark};
pub use language::{DisplayLanguage, INDIAN_LANGUAGES, is_supported_language};
pub use region::{DisplayBounds, RegionAnnotator};
pub use normalizer::normalize;
pub use history::{HealthCounts, HistoryEntry, HistoryLog, StatusFilter, HISTORY_CAPACITY};
