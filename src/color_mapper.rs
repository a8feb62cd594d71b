//! Value-to-color lookup tables over a shared data range.

use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data_types::SharedRange;
use crate::error::{PlotError, PlotResult};
use crate::style::Color;

pub type SharedColorMapper = Arc<RwLock<ColorMapper>>;

pub const DEFAULT_STEPS: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    Gray,
    Jet,
    Hot,
    Cool,
    Viridis,
}

impl Palette {
    /// Control points (position in [0, 1], rgb) interpolated into the table.
    fn control_points(self) -> &'static [(f32, [f32; 3])] {
        match self {
            Palette::Gray => &[(0.0, [0.0, 0.0, 0.0]), (1.0, [1.0, 1.0, 1.0])],
            Palette::Jet => &[
                (0.0, [0.0, 0.0, 0.5]),
                (0.11, [0.0, 0.0, 1.0]),
                (0.125, [0.0, 0.0, 1.0]),
                (0.34, [0.0, 1.0, 1.0]),
                (0.65, [1.0, 1.0, 0.0]),
                (0.89, [1.0, 0.0, 0.0]),
                (1.0, [0.5, 0.0, 0.0]),
            ],
            Palette::Hot => &[
                (0.0, [0.0416, 0.0, 0.0]),
                (0.365, [1.0, 0.0, 0.0]),
                (0.746, [1.0, 1.0, 0.0]),
                (1.0, [1.0, 1.0, 1.0]),
            ],
            Palette::Cool => &[(0.0, [0.0, 1.0, 1.0]), (1.0, [1.0, 0.0, 1.0])],
            Palette::Viridis => &[
                (0.0, [0.267, 0.005, 0.329]),
                (0.111, [0.283, 0.141, 0.458]),
                (0.222, [0.254, 0.265, 0.530]),
                (0.333, [0.207, 0.372, 0.553]),
                (0.444, [0.164, 0.471, 0.558]),
                (0.555, [0.128, 0.567, 0.551]),
                (0.666, [0.135, 0.659, 0.518]),
                (0.777, [0.267, 0.749, 0.441]),
                (0.888, [0.478, 0.821, 0.318]),
                (1.0, [0.993, 0.906, 0.144]),
            ],
        }
    }

    /// Samples the palette at `steps` evenly spaced positions.
    pub fn build_lut(self, steps: usize) -> Vec<Color> {
        let points = self.control_points();
        (0..steps)
            .map(|i| {
                let t = if steps > 1 { i as f32 / (steps - 1) as f32 } else { 0.0 };
                let upper = points.iter().position(|(p, _)| *p >= t).unwrap_or(points.len() - 1);
                if upper == 0 {
                    let [r, g, b] = points[0].1;
                    return Color::rgb(r, g, b);
                }
                let (p0, c0) = points[upper - 1];
                let (p1, c1) = points[upper];
                let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
                let lerp = |a: f32, b: f32| a + (b - a) * f;
                Color::rgb(lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2]))
            })
            .collect()
    }
}

impl FromStr for Palette {
    type Err = PlotError;

    fn from_str(s: &str) -> PlotResult<Self> {
        match s {
            "gray" | "grey" => Ok(Palette::Gray),
            "jet" => Ok(Palette::Jet),
            "hot" => Ok(Palette::Hot),
            "cool" => Ok(Palette::Cool),
            "viridis" => Ok(Palette::Viridis),
            other => Err(PlotError::Config(format!("unknown colormap '{}'", other))),
        }
    }
}

/// Maps scalar values to colors through `range`. Values outside the range are
/// clamped to the end colors; NaN maps to transparent.
pub struct ColorMapper {
    palette: Palette,
    lut: Vec<Color>,
    range: SharedRange,
    revision: u64,
}

impl ColorMapper {
    pub fn new(palette: Palette, range: SharedRange) -> Self {
        Self::with_steps(palette, range, DEFAULT_STEPS)
    }

    pub fn with_steps(palette: Palette, range: SharedRange, steps: usize) -> Self {
        Self {
            palette,
            lut: palette.build_lut(steps.max(1)),
            range,
            revision: 0,
        }
    }

    pub fn from_name(name: &str, range: SharedRange) -> PlotResult<Self> {
        Ok(Self::new(name.parse()?, range))
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn steps(&self) -> usize {
        self.lut.len()
    }

    pub fn set_steps(&mut self, steps: usize) {
        self.lut = self.palette.build_lut(steps.max(1));
        self.revision += 1;
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.lut = palette.build_lut(self.lut.len());
        self.revision += 1;
    }

    pub fn range(&self) -> &SharedRange {
        &self.range
    }

    pub fn set_range(&mut self, range: SharedRange) {
        self.range = range;
        self.revision += 1;
    }

    /// (own revision, range revision), after pulling any source changes into the range.
    pub fn revisions(&self) -> [u64; 2] {
        let mut r = self.range.write();
        r.update();
        [self.revision, r.revision()]
    }

    fn bounds(&self) -> (f64, f64) {
        let mut r = self.range.write();
        r.update();
        r.bounds()
    }

    fn lookup(&self, v: f64, low: f64, high: f64) -> Color {
        if v.is_nan() {
            return Color::TRANSPARENT;
        }
        let n = self.lut.len();
        let span = high - low;
        let t = if span > 0.0 && span.is_finite() { (v - low) / span } else { 0.0 };
        let idx = ((t * n as f64).floor().max(0.0) as usize).min(n - 1);
        self.lut[idx]
    }

    pub fn map_value(&self, v: f64) -> Color {
        let (low, high) = self.bounds();
        self.lookup(v, low, high)
    }

    pub fn map_screen(&self, values: &[f64]) -> Vec<Color> {
        let (low, high) = self.bounds();
        values.iter().map(|&v| self.lookup(v, low, high)).collect()
    }

    /// RGBA8 pixels for a row-major scalar field, mapped row by row in parallel.
    pub fn map_uint8(&self, values: &[f64], width: usize) -> Vec<[u8; 4]> {
        if width == 0 {
            return vec![];
        }
        let (low, high) = self.bounds();
        values
            .par_chunks(width)
            .flat_map_iter(|row| row.iter().map(move |&v| self.lookup(v, low, high).to_rgba8()))
            .collect()
    }
}
