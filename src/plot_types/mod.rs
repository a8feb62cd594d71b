// Plot types module

pub mod contour_line;
pub mod contour_poly;
pub mod image;
pub mod line;
pub mod polygon;
pub mod quiver;
pub mod scatter;

pub use contour_line::{ContourLinePlot, StageCounts};
pub use contour_poly::ContourPolyPlot;
pub use image::{CMapImagePlot, ImagePlot, InspectImage, PixelReport};
pub use line::LinePlot;
pub use polygon::PolygonPlot;
pub use quiver::QuiverPlot;
pub use scatter::{ColormappedScatterPlot, ScatterPlot};

use std::sync::Arc;

use glam::DVec2;
use parking_lot::RwLock;
use tracing::warn;

use crate::data_types::{DataSource, SharedGrid, SharedImage, SharedSource};
use crate::error::PlotResult;
use crate::mapper::SharedGridMapper;
use crate::rendering::{GraphicsContext, Rect};
use crate::transform::PlotTransform;

pub type SharedRenderer = Arc<RwLock<dyn PlotRenderer>>;

/// Trait for rendering plot types
pub trait PlotRenderer: Send + Sync {
    /// Short type name, as accepted by `Plot::plot`.
    fn kind(&self) -> &'static str;

    /// Brings every cache stage up to date, upstream stages first.
    fn ensure_rendered(&mut self) -> PlotResult<()>;

    /// Paints from the caches. Call `ensure_rendered` first; a stale cache is
    /// drawn as it is.
    fn draw(&self, gc: &mut dyn GraphicsContext);

    fn render(&mut self, gc: &mut dyn GraphicsContext) -> PlotResult<()> {
        self.ensure_rendered()?;
        self.draw(gc);
        Ok(())
    }

    /// 1D data sources this renderer reads, used to deregister them from
    /// ranges when the renderer is removed.
    fn sources(&self) -> Vec<SharedSource>;
}

pub(crate) fn revisions_of(sources: &[&SharedSource]) -> Vec<u64> {
    sources.iter().map(|s| s.read().revision()).collect()
}

/// Reads an index/value pair into per-element data points. Elements that are
/// masked or non-finite come back as `None`. A length mismatch is logged and
/// yields no points at all.
pub(crate) fn read_xy(index: &SharedSource, value: &SharedSource, renderer: &'static str) -> Vec<Option<DVec2>> {
    let (idx, imask) = match index.read().get_data_mask() {
        Ok(d) => d,
        Err(e) => {
            warn!(renderer, error = %e, "cannot read index data");
            return vec![];
        }
    };
    let (val, vmask) = match value.read().get_data_mask() {
        Ok(d) => d,
        Err(e) => {
            warn!(renderer, error = %e, "cannot read value data");
            return vec![];
        }
    };
    if idx.len() != val.len() {
        warn!(
            renderer,
            index_len = idx.len(),
            value_len = val.len(),
            "index and value lengths differ, nothing will be drawn"
        );
        return vec![];
    }
    idx.iter()
        .zip(&val)
        .enumerate()
        .map(|(i, (&x, &y))| {
            let usable = imask.get(i).copied().unwrap_or(true)
                && vmask.get(i).copied().unwrap_or(true)
                && x.is_finite()
                && y.is_finite();
            usable.then(|| DVec2::new(x, y))
        })
        .collect()
}

/// Splits at missing points into contiguous runs.
pub(crate) fn split_runs(points: &[Option<DVec2>]) -> Vec<Vec<DVec2>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for p in points {
        match p {
            Some(p) => current.push(*p),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Maps data-space (index, value) points through the transform.
pub(crate) fn map_points(transform: &PlotTransform, points: &[DVec2]) -> PlotResult<Vec<DVec2>> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().map(|p| (p.x, p.y)).unzip();
    transform.map_screen(&xs, &ys)
}

/// Inputs shared by every renderer over a 2D grid: the value image, its
/// coordinate grid and the mapper placing it on screen.
#[derive(Clone)]
pub struct GridBase {
    pub value: SharedImage,
    pub index: SharedGrid,
    pub index_mapper: SharedGridMapper,
}

impl GridBase {
    pub fn new(value: SharedImage, index: SharedGrid, index_mapper: SharedGridMapper) -> Self {
        Self {
            value,
            index,
            index_mapper,
        }
    }

    pub fn value_revision(&self) -> u64 {
        self.value.read().revision()
    }

    pub fn index_revision(&self) -> u64 {
        self.index.read().revision()
    }

    /// Mapping revisions of both axes.
    pub fn mapper_revisions(&self) -> [u64; 2] {
        let (x, y) = self.index_mapper.write().sync();
        [x, y]
    }

    /// True when the y axis grows downward on screen from the data low end,
    /// i.e. the first image row must be drawn at the bottom.
    pub fn y_flipped(&self) -> bool {
        let (_, (y0, y1)) = self.index_mapper.read().screen_bounds();
        y0 > y1
    }

    /// Node coordinates for a `width` × `height` field. Coordinate arrays one
    /// longer than the field are cell edges and are reduced to centers.
    /// `None` when the grid does not fit the field.
    pub fn node_coords(&self, width: usize, height: usize) -> Option<(Vec<f64>, Vec<f64>)> {
        let grid = self.index.read();
        let fit = |c: Vec<f64>, n: usize| -> Option<Vec<f64>> {
            if c.len() == n {
                Some(c)
            } else if c.len() == n + 1 {
                Some(c.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect())
            } else {
                None
            }
        };
        let xs = fit(grid.xs(), width);
        let ys = fit(grid.ys(), height);
        match (xs, ys) {
            (Some(xs), Some(ys)) => Some((xs, ys)),
            _ => {
                warn!(width, height, "grid coordinates do not match the value shape");
                None
            }
        }
    }

    /// Screen rectangle covered by the grid's coordinate extent.
    pub fn screen_rect(&self) -> PlotResult<Option<Rect>> {
        let Some(((x0, y0), (x1, y1))) = self.index.read().get_bounds() else {
            return Ok(None);
        };
        let corners = self
            .index_mapper
            .write()
            .map_screen(&[DVec2::new(x0, y0), DVec2::new(x1, y1)])?;
        Ok(Some(Rect::from_corners(corners[0], corners[1])))
    }

    /// Finite (min, max) of the unmasked values.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.value.read().get_bounds()
    }

    /// Values (masked entries as NaN) with node coordinates, ready for
    /// contouring. `None` for color images or a grid that does not fit.
    pub fn scalar_field(&self) -> Option<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        let (mut values, width, height) = {
            let image = self.value.read();
            if image.value_depth() != 1 {
                warn!(depth = image.value_depth(), "contouring needs scalar data");
                return None;
            }
            let mut values = image.values().to_vec();
            if let Some(mask) = image.mask() {
                for (v, keep) in values.iter_mut().zip(mask) {
                    if !keep {
                        *v = f64::NAN;
                    }
                }
            }
            (values, image.width(), image.height())
        };
        let (xs, ys) = self.node_coords(width, height)?;
        values.truncate(width * height);
        Some((values, xs, ys))
    }

    pub fn map_polyline(&self, points: &[DVec2]) -> PlotResult<Vec<DVec2>> {
        self.index_mapper.write().map_screen(points)
    }
}
