use std::sync::Arc;

use parking_lot::RwLock;

use super::data::{finite_min_max, SortOrder, ValueDimension};
use super::datasource::{shared_source, ArrayDataSource, DataSource, SharedSource};
use crate::error::{PlotError, PlotResult};

pub type SharedImage = Arc<RwLock<ImageData>>;
pub type SharedGrid = Arc<RwLock<GridDataSource>>;

/// Row-major 2D grid of values. `value_depth` is 1 for scalar fields and 3 or 4
/// for RGB/RGBA images (components in `[0, 255]`).
#[derive(Clone, Debug, Default)]
pub struct ImageData {
    data: Vec<f64>,
    width: usize,
    height: usize,
    value_depth: usize,
    mask: Option<Vec<bool>>,
    revision: u64,
}

impl ImageData {
    /// Scalar field with `height` rows of `width` values.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> PlotResult<Self> {
        Self::with_depth(width, height, 1, data)
    }

    pub fn with_depth(width: usize, height: usize, value_depth: usize, data: Vec<f64>) -> PlotResult<Self> {
        if !matches!(value_depth, 1 | 3 | 4) {
            return Err(PlotError::Config(format!(
                "image value depth must be 1, 3 or 4, got {}",
                value_depth
            )));
        }
        if data.len() != width * height * value_depth {
            return Err(PlotError::Shape {
                expected: vec![height, width, value_depth],
                actual: vec![data.len()],
            });
        }
        Ok(Self {
            data,
            width,
            height,
            value_depth,
            mask: None,
            revision: 0,
        })
    }

    /// Builds a scalar field from rows of equal length.
    pub fn from_rows(rows: &[Vec<f64>]) -> PlotResult<Self> {
        let width = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(PlotError::Shape {
                expected: vec![rows.len(), width],
                actual: vec![rows.len(), bad.len()],
            });
        }
        Self::new(width, rows.len(), rows.concat())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn value_depth(&self) -> usize {
        self.value_depth
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Scalar value at (row, col), or the first component of a color pixel.
    pub fn get_value(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get((row * self.width + col) * self.value_depth).copied()
    }

    /// All components of the pixel at (row, col).
    pub fn get_pixel(&self, row: usize, col: usize) -> Option<&[f64]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let start = (row * self.width + col) * self.value_depth;
        self.data.get(start..start + self.value_depth)
    }

    /// Replaces the grid, possibly with a new shape. Any mask is dropped.
    pub fn set_image(&mut self, width: usize, height: usize, data: Vec<f64>) -> PlotResult<()> {
        let revision = self.revision + 1;
        *self = Self::with_depth(width, height, self.value_depth.max(1), data)?;
        self.revision = revision;
        Ok(())
    }

    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref()
    }
}

impl DataSource for ImageData {
    fn value_dimension(&self) -> ValueDimension {
        if self.value_depth == 1 {
            ValueDimension::Scalar
        } else {
            ValueDimension::Image
        }
    }

    fn sort_order(&self) -> SortOrder {
        SortOrder::None
    }

    fn get_data(&self) -> Vec<f64> {
        self.data.clone()
    }

    fn get_data_mask(&self) -> PlotResult<(Vec<f64>, Vec<bool>)> {
        let mask = self
            .mask
            .clone()
            .unwrap_or_else(|| vec![true; self.width * self.height]);
        Ok((self.data.clone(), mask))
    }

    fn set_data(&mut self, data: Vec<f64>) -> PlotResult<()> {
        if data.len() != self.data.len() {
            return Err(PlotError::Shape {
                expected: vec![self.height, self.width, self.value_depth],
                actual: vec![data.len()],
            });
        }
        self.data = data;
        self.revision += 1;
        Ok(())
    }

    fn set_mask(&mut self, mask: Vec<bool>) -> PlotResult<()> {
        if mask.len() != self.width * self.height {
            return Err(PlotError::Shape {
                expected: vec![self.height, self.width],
                actual: vec![mask.len()],
            });
        }
        self.mask = Some(mask);
        self.revision += 1;
        Ok(())
    }

    fn remove_mask(&mut self) -> PlotResult<()> {
        self.mask = None;
        self.revision += 1;
        Ok(())
    }

    fn is_masked(&self) -> bool {
        self.mask.is_some()
    }

    fn get_size(&self) -> usize {
        self.width * self.height
    }

    fn get_bounds(&self) -> Option<(f64, f64)> {
        if self.value_depth != 1 {
            return finite_min_max(&self.data, None);
        }
        finite_min_max(&self.data, self.mask.as_deref())
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// 2D index made of independent x and y coordinate arrays.
pub struct GridDataSource {
    xdata: SharedSource,
    ydata: SharedSource,
    revision: u64,
}

impl GridDataSource {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, sort_order: (SortOrder, SortOrder)) -> Self {
        Self {
            xdata: shared_source(ArrayDataSource::with_sort_order(xs, sort_order.0)),
            ydata: shared_source(ArrayDataSource::with_sort_order(ys, sort_order.1)),
            revision: 0,
        }
    }

    pub fn xdata(&self) -> &SharedSource {
        &self.xdata
    }

    pub fn ydata(&self) -> &SharedSource {
        &self.ydata
    }

    pub fn xs(&self) -> Vec<f64> {
        self.xdata.read().get_data()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.ydata.read().get_data()
    }

    pub fn set_data(&mut self, xs: Vec<f64>, ys: Vec<f64>) -> PlotResult<()> {
        self.xdata.write().set_data(xs)?;
        self.ydata.write().set_data(ys)?;
        self.revision += 1;
        Ok(())
    }

    /// Combined revision of the grid and both coordinate arrays.
    pub fn revision(&self) -> u64 {
        self.revision + self.xdata.read().revision() + self.ydata.read().revision()
    }

    /// ((xmin, ymin), (xmax, ymax))
    pub fn get_bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let (x0, x1) = self.xdata.read().get_bounds()?;
        let (y0, y1) = self.ydata.read().get_bounds()?;
        Some(((x0, y0), (x1, y1)))
    }
}
