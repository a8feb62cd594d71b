use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::data::{finite_min_max, ValueDimension};
use super::datasource::{same_source, SharedSource};
use super::image::SharedGrid;

pub type SharedRange = Arc<RwLock<DataRange1D>>;

pub fn shared_range(range: DataRange1D) -> SharedRange {
    Arc::new(RwLock::new(range))
}

/// A bound is either computed from the data or pinned to a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundSetting {
    #[default]
    Auto,
    Value(f64),
}

impl BoundSetting {
    pub fn is_auto(&self) -> bool {
        matches!(self, BoundSetting::Auto)
    }
}

impl From<f64> for BoundSetting {
    fn from(v: f64) -> Self {
        BoundSetting::Value(v)
    }
}

/// Expands a constant value to the enclosing power-of-ten interval.
///
/// Positive `v` maps to `[10^floor(log10 v), 10^ceil(log10 v)]`, negative `v`
/// mirrors that, and anything in `(-1, 1)` maps to `[-1, 1]`. Exact powers of
/// ten get the decade above (or below, for negatives) so the span is never zero.
pub fn bracket_constant(v: f64) -> (f64, f64) {
    if !v.is_finite() || v.abs() < 1.0 {
        return (-1.0, 1.0);
    }
    let mag = v.abs().log10();
    let lo = 10f64.powf(mag.floor());
    let mut hi = 10f64.powf(mag.ceil());
    if hi <= lo {
        hi = lo * 10.0;
    }
    if v > 0.0 {
        (lo, hi)
    } else {
        (-hi, -lo)
    }
}

/// Auto-scaling 1D bounds over any number of data sources.
pub struct DataRange1D {
    sources: Vec<SharedSource>,
    source_revisions: Vec<u64>,
    low_setting: BoundSetting,
    high_setting: BoundSetting,
    low: f64,
    high: f64,
    revision: u64,
}

impl Default for DataRange1D {
    fn default() -> Self {
        Self {
            sources: vec![],
            source_revisions: vec![],
            low_setting: BoundSetting::Auto,
            high_setting: BoundSetting::Auto,
            low: f64::NEG_INFINITY,
            high: f64::INFINITY,
            revision: 0,
        }
    }
}

impl DataRange1D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(low: f64, high: f64) -> Self {
        let mut r = Self::default();
        r.set_bounds(low, high);
        r
    }

    pub fn from_sources(sources: impl IntoIterator<Item = SharedSource>) -> Self {
        let mut r = Self::default();
        for s in sources {
            r.sources.push(s);
        }
        r.refresh();
        r
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    pub fn low_setting(&self) -> BoundSetting {
        self.low_setting
    }

    pub fn high_setting(&self) -> BoundSetting {
        self.high_setting
    }

    /// Increases every time the effective bounds change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn sources(&self) -> &[SharedSource] {
        &self.sources
    }

    pub fn add(&mut self, source: SharedSource) {
        if self.sources.iter().any(|s| same_source(s, &source)) {
            return;
        }
        self.sources.push(source);
        self.refresh();
    }

    pub fn remove(&mut self, source: &SharedSource) {
        let before = self.sources.len();
        self.sources.retain(|s| !same_source(s, source));
        if self.sources.len() != before {
            self.refresh();
        }
    }

    pub fn set_low(&mut self, low: f64) {
        self.set_low_setting(BoundSetting::Value(low));
    }

    pub fn set_high(&mut self, high: f64) {
        self.set_high_setting(BoundSetting::Value(high));
    }

    pub fn set_low_setting(&mut self, setting: BoundSetting) {
        self.low_setting = setting;
        self.refresh();
    }

    pub fn set_high_setting(&mut self, setting: BoundSetting) {
        self.high_setting = setting;
        self.refresh();
    }

    /// Pins both bounds at once, with a single change notification.
    pub fn set_bounds(&mut self, low: f64, high: f64) {
        self.low_setting = BoundSetting::Value(low);
        self.high_setting = BoundSetting::Value(high);
        self.refresh();
    }

    /// Returns both bounds to auto-scaling.
    pub fn reset(&mut self) {
        self.low_setting = BoundSetting::Auto;
        self.high_setting = BoundSetting::Auto;
        self.refresh();
    }

    /// Refreshes only when a registered source changed since the last refresh.
    /// Returns whether the effective bounds moved.
    pub fn update(&mut self) -> bool {
        let stale = self.sources.len() != self.source_revisions.len()
            || self
                .sources
                .iter()
                .zip(&self.source_revisions)
                .any(|(s, &rev)| s.read().revision() != rev);
        if !stale {
            return false;
        }
        let before = self.revision;
        self.refresh();
        self.revision != before
    }

    /// Recomputes the effective bounds from the settings and the current data.
    pub fn refresh(&mut self) {
        self.source_revisions = self.sources.iter().map(|s| s.read().revision()).collect();

        let mut data_bounds: Option<(f64, f64)> = None;
        for source in &self.sources {
            let s = source.read();
            if s.value_dimension() != ValueDimension::Scalar || s.get_size() == 0 {
                continue;
            }
            let found = match s.get_data_mask() {
                Ok((data, mask)) => finite_min_max(&data, Some(&mask)),
                Err(_) => s.get_bounds(),
            };
            if let Some((lo, hi)) = found {
                data_bounds = Some(match data_bounds {
                    Some((a, b)) => (a.min(lo), b.max(hi)),
                    None => (lo, hi),
                });
            }
        }

        let (mut low, mut high) = match data_bounds {
            Some((lo, hi)) if lo == hi && self.low_setting.is_auto() && self.high_setting.is_auto() => {
                bracket_constant(lo)
            }
            Some(b) => b,
            None => (f64::NEG_INFINITY, f64::INFINITY),
        };

        if let BoundSetting::Value(v) = self.low_setting {
            low = v;
        }
        if let BoundSetting::Value(v) = self.high_setting {
            high = v;
        }

        if low > high {
            match (self.low_setting, self.high_setting) {
                (BoundSetting::Value(_), BoundSetting::Auto) => high = low,
                (BoundSetting::Auto, BoundSetting::Value(_)) => low = high,
                _ => {
                    warn!(low, high, "data range: inverted bounds, swapping");
                    std::mem::swap(&mut low, &mut high);
                }
            }
        }

        if low != self.low || high != self.high {
            self.low = low;
            self.high = high;
            self.revision += 1;
            debug!(low, high, revision = self.revision, "data range refreshed");
        }
    }

    /// Inclusive membership test against the effective bounds.
    pub fn contains(&self, v: f64) -> bool {
        v >= self.low && v <= self.high
    }

    /// Values within `[low, high]`, in their original order.
    pub fn clip_data(&self, data: &[f64]) -> Vec<f64> {
        data.iter().copied().filter(|&v| self.contains(v)).collect()
    }

    /// Same-length mask marking the in-range values.
    pub fn mask_data(&self, data: &[f64]) -> Vec<bool> {
        data.iter().map(|&v| self.contains(v)).collect()
    }

    /// First and last index of in-range values. The data need not be sorted,
    /// so this scans the mask rather than bisecting.
    pub fn bound_data(&self, data: &[f64]) -> Option<(usize, usize)> {
        let mask = self.mask_data(data);
        let first = mask.iter().position(|&m| m)?;
        let last = mask.iter().rposition(|&m| m)?;
        Some((first, last))
    }
}

/// Pair of 1D ranges over the x and y coordinates of grid sources.
pub struct DataRange2D {
    x_range: SharedRange,
    y_range: SharedRange,
    sources: Vec<SharedGrid>,
}

impl Default for DataRange2D {
    fn default() -> Self {
        Self {
            x_range: shared_range(DataRange1D::new()),
            y_range: shared_range(DataRange1D::new()),
            sources: vec![],
        }
    }
}

impl DataRange2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x_range(&self) -> &SharedRange {
        &self.x_range
    }

    pub fn y_range(&self) -> &SharedRange {
        &self.y_range
    }

    pub fn add(&mut self, grid: SharedGrid) {
        if self.sources.iter().any(|g| Arc::ptr_eq(g, &grid)) {
            return;
        }
        {
            let g = grid.read();
            self.x_range.write().add(g.xdata().clone());
            self.y_range.write().add(g.ydata().clone());
        }
        self.sources.push(grid);
    }

    pub fn remove(&mut self, grid: &SharedGrid) {
        let Some(pos) = self.sources.iter().position(|g| Arc::ptr_eq(g, grid)) else {
            return;
        };
        let removed = self.sources.remove(pos);
        let g = removed.read();
        self.x_range.write().remove(g.xdata());
        self.y_range.write().remove(g.ydata());
    }

    /// (xlow, ylow)
    pub fn low(&self) -> (f64, f64) {
        (self.x_range.read().low(), self.y_range.read().low())
    }

    /// (xhigh, yhigh)
    pub fn high(&self) -> (f64, f64) {
        (self.x_range.read().high(), self.y_range.read().high())
    }

    pub fn set_bounds(&mut self, low: (f64, f64), high: (f64, f64)) {
        self.x_range.write().set_bounds(low.0, high.0);
        self.y_range.write().set_bounds(low.1, high.1);
    }

    pub fn reset(&mut self) {
        self.x_range.write().reset();
        self.y_range.write().reset();
    }

    pub fn update(&mut self) -> bool {
        let x = self.x_range.write().update();
        let y = self.y_range.write().update();
        x || y
    }

    pub fn revisions(&self) -> (u64, u64) {
        (self.x_range.read().revision(), self.y_range.read().revision())
    }
}
