//! Index/value projection shared by the XY renderers.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::data_types::SharedRange;
use crate::error::{PlotError, PlotResult};
use crate::mapper::SharedMapper;
use crate::rendering::Rect;

/// Which screen axis carries the index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Index along x, value along y.
    #[default]
    H,
    /// Index along y, value along x.
    V,
}

#[derive(Clone)]
pub struct PlotTransform {
    pub index_mapper: SharedMapper,
    pub value_mapper: SharedMapper,
    pub orientation: Orientation,
}

impl PlotTransform {
    pub fn new(index_mapper: SharedMapper, value_mapper: SharedMapper) -> Self {
        Self {
            index_mapper,
            value_mapper,
            orientation: Orientation::H,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn index_range(&self) -> SharedRange {
        self.index_mapper.read().range().clone()
    }

    pub fn value_range(&self) -> SharedRange {
        self.value_mapper.read().range().clone()
    }

    fn to_screen(&self, i: f64, v: f64) -> DVec2 {
        match self.orientation {
            Orientation::H => DVec2::new(i, v),
            Orientation::V => DVec2::new(v, i),
        }
    }

    /// Projects parallel index/value arrays into screen points.
    pub fn map_screen(&self, index: &[f64], value: &[f64]) -> PlotResult<Vec<DVec2>> {
        if index.len() != value.len() {
            return Err(PlotError::Shape {
                expected: vec![index.len()],
                actual: vec![value.len()],
            });
        }
        let si = self.index_mapper.write().map_screen(index)?;
        let sv = self.value_mapper.write().map_screen(value)?;
        Ok(si.into_iter().zip(sv).map(|(i, v)| self.to_screen(i, v)).collect())
    }

    pub fn map_screen_point(&self, index: f64, value: f64) -> PlotResult<DVec2> {
        let i = self.index_mapper.write().map_screen_value(index)?;
        let v = self.value_mapper.write().map_screen_value(value)?;
        Ok(self.to_screen(i, v))
    }

    /// Pixel offset of `d_index` pixels along the increasing-index screen
    /// direction and `d_value` along the increasing-value one.
    pub fn screen_offset(&self, d_index: f64, d_value: f64) -> DVec2 {
        let sign = |m: &SharedMapper| {
            let (lo, hi) = m.read().screen_bounds();
            if hi < lo {
                -1.0
            } else {
                1.0
            }
        };
        self.to_screen(d_index * sign(&self.index_mapper), d_value * sign(&self.value_mapper))
    }

    /// (index, value) under a screen point.
    pub fn map_data(&self, screen: DVec2) -> PlotResult<(f64, f64)> {
        let (si, sv) = match self.orientation {
            Orientation::H => (screen.x, screen.y),
            Orientation::V => (screen.y, screen.x),
        };
        let i = self.index_mapper.write().map_data(si)?;
        let v = self.value_mapper.write().map_data(sv)?;
        Ok((i, v))
    }

    /// Screen-space extent spanned by both mappers.
    pub fn screen_rect(&self) -> Rect {
        let (i0, i1) = self.index_mapper.read().screen_bounds();
        let (v0, v1) = self.value_mapper.read().screen_bounds();
        Rect::from_corners(self.to_screen(i0, v0), self.to_screen(i1, v1))
    }

    /// Mapping revisions of (index, value), revalidating both mappers.
    pub fn sync(&self) -> [u64; 2] {
        [self.index_mapper.write().sync(), self.value_mapper.write().sync()]
    }
}
