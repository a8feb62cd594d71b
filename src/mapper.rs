//! Data-space to screen-space mappers.

use std::str::FromStr;
use std::sync::Arc;

use glam::DVec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::data_types::{DataRange2D, GridDataSource, SharedRange};
use crate::error::{PlotError, PlotResult};

pub type SharedMapper = Arc<RwLock<dyn Mapper>>;

pub fn shared_mapper<M: Mapper + 'static>(mapper: M) -> SharedMapper {
    Arc::new(RwLock::new(mapper))
}

/// Bidirectional 1D transform between a data range and a screen interval.
///
/// The scale is cached; it is recomputed on the first call after the range's
/// bounds or the screen interval changed.
pub trait Mapper: Send + Sync {
    fn kind(&self) -> ScaleKind;

    fn range(&self) -> &SharedRange;

    fn set_range(&mut self, range: SharedRange);

    /// (low_pos, high_pos). Swap them to flip the screen direction.
    fn screen_bounds(&self) -> (f64, f64);

    fn set_screen_bounds(&mut self, low_pos: f64, high_pos: f64);

    fn map_screen(&mut self, data: &[f64]) -> PlotResult<Vec<f64>>;

    fn map_data(&mut self, screen: f64) -> PlotResult<f64>;

    fn map_screen_value(&mut self, value: f64) -> PlotResult<f64> {
        let mapped = self.map_screen(&[value])?;
        mapped
            .first()
            .copied()
            .ok_or_else(|| PlotError::Domain("mapper returned no value".into()))
    }

    /// Revalidates the scale and returns the mapping revision, which moves
    /// whenever the mapping itself changes.
    fn sync(&mut self) -> u64;

    fn is_cache_valid(&self) -> bool;
}

/// Scale selection by name, as in `plot(.., index_scale = "log")`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    #[default]
    Linear,
    Log,
    Polar,
}

impl ScaleKind {
    pub fn build(self, range: SharedRange) -> SharedMapper {
        match self {
            ScaleKind::Linear => shared_mapper(LinearMapper::new(range)),
            ScaleKind::Log => shared_mapper(LogMapper::new(range)),
            ScaleKind::Polar => shared_mapper(PolarMapper::new(range)),
        }
    }
}

impl FromStr for ScaleKind {
    type Err = PlotError;

    fn from_str(s: &str) -> PlotResult<Self> {
        match s {
            "linear" => Ok(ScaleKind::Linear),
            "log" => Ok(ScaleKind::Log),
            "polar" => Ok(ScaleKind::Polar),
            other => Err(PlotError::Config(format!("unknown scale '{}'", other))),
        }
    }
}

/// State common to every 1D mapper: the bound range, the screen interval and
/// the validity bookkeeping for the cached scale.
struct ScaleState {
    range: SharedRange,
    low_pos: f64,
    high_pos: f64,
    cache_valid: bool,
    range_revision: Option<u64>,
    revision: u64,
}

impl ScaleState {
    fn new(range: SharedRange) -> Self {
        Self {
            range,
            low_pos: 0.0,
            high_pos: 1.0,
            cache_valid: false,
            range_revision: None,
            revision: 0,
        }
    }

    fn invalidate(&mut self) {
        self.cache_valid = false;
        self.revision += 1;
    }

    /// Pulls source changes into the range and invalidates the scale if the
    /// range moved. Returns the current bounds.
    fn check_range(&mut self) -> (f64, f64) {
        let mut r = self.range.write();
        r.update();
        if self.range_revision != Some(r.revision()) {
            self.range_revision = Some(r.revision());
            self.cache_valid = false;
            self.revision += 1;
        }
        r.bounds()
    }

    fn set_screen_bounds(&mut self, low_pos: f64, high_pos: f64) {
        if self.low_pos != low_pos || self.high_pos != high_pos {
            self.low_pos = low_pos;
            self.high_pos = high_pos;
            self.invalidate();
        }
    }

    fn set_range(&mut self, range: SharedRange) {
        self.range = range;
        self.range_revision = None;
        self.invalidate();
    }
}

/// `screen = (data - range.low) * scale + low_pos`
pub struct LinearMapper {
    state: ScaleState,
    /// Screen units per data unit.
    scale: f64,
    data_low: f64,
    null_screen_range: bool,
    null_data_range: bool,
}

impl LinearMapper {
    pub fn new(range: SharedRange) -> Self {
        Self {
            state: ScaleState::new(range),
            scale: 1.0,
            data_low: 0.0,
            null_screen_range: false,
            null_data_range: false,
        }
    }

    pub fn with_screen_bounds(range: SharedRange, low_pos: f64, high_pos: f64) -> Self {
        let mut m = Self::new(range);
        m.set_screen_bounds(low_pos, high_pos);
        m
    }

    /// Screen units per data unit, after revalidation.
    pub fn scale(&mut self) -> f64 {
        self.compute_scale();
        self.scale
    }

    fn compute_scale(&mut self) {
        let (low, high) = self.state.check_range();
        if self.state.cache_valid {
            return;
        }
        let screen_range = self.state.high_pos - self.state.low_pos;
        let data_range = high - low;
        self.data_low = low;
        self.null_screen_range = screen_range == 0.0;
        self.null_data_range = data_range == 0.0 || !data_range.is_finite();
        if !self.null_data_range {
            self.scale = screen_range / data_range;
        }
        self.state.cache_valid = true;
    }
}

impl Mapper for LinearMapper {
    fn kind(&self) -> ScaleKind {
        ScaleKind::Linear
    }

    fn range(&self) -> &SharedRange {
        &self.state.range
    }

    fn set_range(&mut self, range: SharedRange) {
        self.state.set_range(range);
    }

    fn screen_bounds(&self) -> (f64, f64) {
        (self.state.low_pos, self.state.high_pos)
    }

    fn set_screen_bounds(&mut self, low_pos: f64, high_pos: f64) {
        self.state.set_screen_bounds(low_pos, high_pos);
    }

    fn map_screen(&mut self, data: &[f64]) -> PlotResult<Vec<f64>> {
        self.compute_scale();
        let low_pos = self.state.low_pos;
        if self.null_data_range {
            return Ok(vec![low_pos; data.len()]);
        }
        Ok(data
            .iter()
            .map(|&x| (x - self.data_low) * self.scale + low_pos)
            .collect())
    }

    fn map_data(&mut self, screen: f64) -> PlotResult<f64> {
        self.compute_scale();
        if self.null_screen_range || self.null_data_range {
            return Ok(self.data_low);
        }
        Ok((screen - self.state.low_pos) / self.scale + self.data_low)
    }

    fn sync(&mut self) -> u64 {
        self.compute_scale();
        self.state.revision
    }

    fn is_cache_valid(&self) -> bool {
        self.state.cache_valid
    }
}

/// Logarithmic mapper: linear interpolation in `ln(data)`.
pub struct LogMapper {
    state: ScaleState,
    log_low: f64,
    log_span: f64,
    data_low: f64,
    null_screen_range: bool,
    null_data_range: bool,
    /// Set when the range itself contains non-positive bounds.
    domain_error: Option<String>,
}

impl LogMapper {
    pub fn new(range: SharedRange) -> Self {
        Self {
            state: ScaleState::new(range),
            log_low: 0.0,
            log_span: 1.0,
            data_low: 1.0,
            null_screen_range: false,
            null_data_range: false,
            domain_error: None,
        }
    }

    pub fn with_screen_bounds(range: SharedRange, low_pos: f64, high_pos: f64) -> Self {
        let mut m = Self::new(range);
        m.set_screen_bounds(low_pos, high_pos);
        m
    }

    fn compute_scale(&mut self) {
        let (low, high) = self.state.check_range();
        if self.state.cache_valid {
            return;
        }
        self.data_low = low;
        self.null_screen_range = self.state.high_pos == self.state.low_pos;
        self.null_data_range = high == low || !(high - low).is_finite();
        self.domain_error = None;
        if !self.null_data_range {
            if low <= 0.0 || high <= 0.0 {
                self.domain_error = Some(format!(
                    "log scale requires a positive range, got [{}, {}]",
                    low, high
                ));
            } else {
                self.log_low = low.ln();
                self.log_span = high.ln() - self.log_low;
            }
        }
        self.state.cache_valid = true;
    }

    fn check_domain(&self) -> PlotResult<()> {
        match &self.domain_error {
            Some(msg) => Err(PlotError::Domain(msg.clone())),
            None => Ok(()),
        }
    }
}

impl Mapper for LogMapper {
    fn kind(&self) -> ScaleKind {
        ScaleKind::Log
    }

    fn range(&self) -> &SharedRange {
        &self.state.range
    }

    fn set_range(&mut self, range: SharedRange) {
        self.state.set_range(range);
    }

    fn screen_bounds(&self) -> (f64, f64) {
        (self.state.low_pos, self.state.high_pos)
    }

    fn set_screen_bounds(&mut self, low_pos: f64, high_pos: f64) {
        self.state.set_screen_bounds(low_pos, high_pos);
    }

    fn map_screen(&mut self, data: &[f64]) -> PlotResult<Vec<f64>> {
        self.compute_scale();
        if let Some(bad) = data.iter().find(|v| **v <= 0.0) {
            return Err(PlotError::Domain(format!(
                "cannot map non-positive value {} on a log scale",
                bad
            )));
        }
        let low_pos = self.state.low_pos;
        if self.null_data_range {
            return Ok(vec![low_pos; data.len()]);
        }
        self.check_domain()?;
        let screen_span = self.state.high_pos - low_pos;
        Ok(data
            .iter()
            .map(|&x| (x.ln() - self.log_low) / self.log_span * screen_span + low_pos)
            .collect())
    }

    fn map_data(&mut self, screen: f64) -> PlotResult<f64> {
        self.compute_scale();
        if self.null_screen_range || self.null_data_range {
            return Ok(self.data_low);
        }
        self.check_domain()?;
        let screen_span = self.state.high_pos - self.state.low_pos;
        Ok(((screen - self.state.low_pos) / screen_span * self.log_span + self.log_low).exp())
    }

    fn sync(&mut self) -> u64 {
        self.compute_scale();
        self.state.revision
    }

    fn is_cache_valid(&self) -> bool {
        self.state.cache_valid
    }
}

/// Radial mapper: maps a radius linearly onto a screen distance measured from
/// `low_pos`, and places (r, theta) pairs around a center.
pub struct PolarMapper {
    inner: LinearMapper,
}

impl PolarMapper {
    pub fn new(range: SharedRange) -> Self {
        Self {
            inner: LinearMapper::new(range),
        }
    }

    /// Screen position of the polar point `(r, theta)` (theta in radians)
    /// around `center`.
    pub fn map_screen_polar(&mut self, r: &[f64], theta: &[f64], center: DVec2) -> PlotResult<Vec<DVec2>> {
        if r.len() != theta.len() {
            return Err(PlotError::Shape {
                expected: vec![r.len()],
                actual: vec![theta.len()],
            });
        }
        let low_pos = self.inner.screen_bounds().0;
        let radii = self.inner.map_screen(r)?;
        Ok(radii
            .iter()
            .zip(theta)
            .map(|(&rad, &t)| center + DVec2::new(t.cos(), t.sin()) * (rad - low_pos))
            .collect())
    }
}

impl Mapper for PolarMapper {
    fn kind(&self) -> ScaleKind {
        ScaleKind::Polar
    }

    fn range(&self) -> &SharedRange {
        self.inner.range()
    }

    fn set_range(&mut self, range: SharedRange) {
        self.inner.set_range(range);
    }

    fn screen_bounds(&self) -> (f64, f64) {
        self.inner.screen_bounds()
    }

    fn set_screen_bounds(&mut self, low_pos: f64, high_pos: f64) {
        self.inner.set_screen_bounds(low_pos, high_pos);
    }

    fn map_screen(&mut self, data: &[f64]) -> PlotResult<Vec<f64>> {
        self.inner.map_screen(data)
    }

    fn map_data(&mut self, screen: f64) -> PlotResult<f64> {
        self.inner.map_data(screen)
    }

    fn sync(&mut self) -> u64 {
        self.inner.sync()
    }

    fn is_cache_valid(&self) -> bool {
        self.inner.is_cache_valid()
    }
}

pub type SharedRange2D = Arc<RwLock<DataRange2D>>;
pub type SharedGridMapper = Arc<RwLock<GridMapper>>;

/// 2D mapper composed of independent x and y linear mappers over a `DataRange2D`.
pub struct GridMapper {
    range: SharedRange2D,
    x_mapper: LinearMapper,
    y_mapper: LinearMapper,
}

impl GridMapper {
    pub fn new(range: SharedRange2D) -> Self {
        let (xr, yr) = {
            let r = range.read();
            (r.x_range().clone(), r.y_range().clone())
        };
        Self {
            range,
            x_mapper: LinearMapper::new(xr),
            y_mapper: LinearMapper::new(yr),
        }
    }

    pub fn range(&self) -> &SharedRange2D {
        &self.range
    }

    /// Screen rectangle given as x and y intervals; pass `y_low_pos > y_high_pos`
    /// for a top-left origin.
    pub fn set_screen_bounds(&mut self, x: (f64, f64), y: (f64, f64)) {
        self.x_mapper.set_screen_bounds(x.0, x.1);
        self.y_mapper.set_screen_bounds(y.0, y.1);
    }

    pub fn screen_bounds(&self) -> ((f64, f64), (f64, f64)) {
        (self.x_mapper.screen_bounds(), self.y_mapper.screen_bounds())
    }

    pub fn map_screen(&mut self, points: &[DVec2]) -> PlotResult<Vec<DVec2>> {
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        let sx = self.x_mapper.map_screen(&xs)?;
        let sy = self.y_mapper.map_screen(&ys)?;
        Ok(sx.into_iter().zip(sy).map(|(x, y)| DVec2::new(x, y)).collect())
    }

    pub fn map_data(&mut self, screen: DVec2) -> PlotResult<DVec2> {
        Ok(DVec2::new(
            self.x_mapper.map_data(screen.x)?,
            self.y_mapper.map_data(screen.y)?,
        ))
    }

    /// (x_index, y_index) of the image cell under `screen`, for an image of
    /// `width` × `height` cells spanning the grid's coordinate extent.
    pub fn map_index(&mut self, screen: DVec2, grid: &GridDataSource, width: usize, height: usize) -> Option<(usize, usize)> {
        let data = self.map_data(screen).ok()?;
        let ((x0, y0), (x1, y1)) = grid.get_bounds()?;
        let cell = |v: f64, lo: f64, hi: f64, n: usize| -> Option<usize> {
            if n == 0 || v < lo || v > hi {
                return None;
            }
            if hi == lo {
                return Some(0);
            }
            let i = ((v - lo) / (hi - lo) * n as f64).floor() as usize;
            Some(i.min(n - 1))
        };
        Some((cell(data.x, x0, x1, width)?, cell(data.y, y0, y1, height)?))
    }

    /// Combined revision of both axis mappings.
    pub fn sync(&mut self) -> (u64, u64) {
        (self.x_mapper.sync(), self.y_mapper.sync())
    }
}
