//! 注目点（RegionMark）の記録
//!
//! クリック位置（ピクセル）を表示領域に対する割合に変換して保持する。
//! 個別の取り消しはなく、撮り直し時に `clear` で全消去する。

use crate::error::{Error, Result};
use crate::types::RegionMark;

/// 画像の表示領域（ピクセル）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayBounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// 原点(0,0)の表示領域
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) && self.left.is_finite() && self.top.is_finite() {
            Ok(())
        } else {
            Err(Error::InvalidBounds { width: self.width, height: self.height })
        }
    }
}

impl RegionMark {
    /// クリック位置から注目点を作成（0〜100にクランプ）
    ///
    /// # Arguments
    /// * `click_x`, `click_y` - クリック位置（ピクセル）
    /// * `bounds` - 画像の表示領域
    ///
    /// # Returns
    /// 表示領域のサイズが不正なら `Error::InvalidBounds`
    pub fn from_click(click_x: f64, click_y: f64, bounds: &DisplayBounds) -> Result<Self> {
        bounds.validate()?;
        let to_percent = |offset: f64, size: f64| ((offset / size) * 100.0).clamp(0.0, 100.0);
        let x = to_percent(click_x - bounds.left, bounds.width);
        let y = to_percent(click_y - bounds.top, bounds.height);
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidBounds { width: bounds.width, height: bounds.height });
        }
        Ok(Self { x, y })
    }
}

/// 注目点の記録（追加順を保持、上限なし）
#[derive(Debug, Clone, Default)]
pub struct RegionAnnotator {
    marks: Vec<RegionMark>,
}

impl RegionAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// タップを記録して追加した注目点を返す
    pub fn record_tap(
        &mut self,
        click_x: f64,
        click_y: f64,
        bounds: &DisplayBounds,
    ) -> Result<RegionMark> {
        let mark = RegionMark::from_click(click_x, click_y, bounds)?;
        self.marks.push(mark);
        Ok(mark)
    }

    /// 既に%座標になっている注目点を追加（範囲外は0〜100に丸める）
    pub fn push_percent(&mut self, x: f64, y: f64) -> Result<RegionMark> {
        self.record_tap(x, y, &DisplayBounds::sized(100.0, 100.0))
    }

    pub fn marks(&self) -> &[RegionMark] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// 全消去
    pub fn clear(&mut self) {
        self.marks.clear();
    }
}
