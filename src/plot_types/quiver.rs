use std::sync::Arc;

use glam::DVec2;
use parking_lot::RwLock;
use tracing::warn;

use super::{map_points, read_xy, revisions_of, PlotRenderer};
use crate::data_types::{DataSource, MultiArrayDataSource, QuiverPlotConfig, SharedSource};
use crate::error::PlotResult;
use crate::render_cache::{RevisionWatch, Stage};
use crate::rendering::{stroke_all, GraphicsContext, Path};
use crate::transform::PlotTransform;

pub type SharedVectors = Arc<RwLock<MultiArrayDataSource>>;

const HEAD_ANGLE: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Arrow per (index, value) point. Vector components are screen-pixel lengths.
pub struct QuiverPlot {
    index: SharedSource,
    value: SharedSource,
    vectors: SharedVectors,
    pub transform: PlotTransform,
    config: QuiverPlotConfig,
    /// (data point, vector) pairs inside both ranges.
    points: Stage<Vec<(DVec2, [f64; 2])>>,
    /// Shaft and head paths.
    screen: Stage<Vec<Path>>,
    source_watch: RevisionWatch,
    mapper_watch: RevisionWatch,
}

impl QuiverPlot {
    pub fn new(index: SharedSource, value: SharedSource, vectors: SharedVectors, transform: PlotTransform) -> Self {
        Self {
            index,
            value,
            vectors,
            transform,
            config: QuiverPlotConfig::default(),
            points: Stage::default(),
            screen: Stage::default(),
            source_watch: RevisionWatch::new(),
            mapper_watch: RevisionWatch::new(),
        }
    }

    pub fn with_config(mut self, config: QuiverPlotConfig) -> Self {
        self.config = config;
        self
    }

    /// The arrowhead is part of the cached geometry.
    pub fn set_arrow_size(&mut self, size: f64) {
        if size != self.config.arrow_size {
            self.config.arrow_size = size;
            self.screen.invalidate();
        }
    }

    pub fn screen_paths(&self) -> &[Path] {
        self.screen.get()
    }

    fn gather(&self) -> Vec<(DVec2, [f64; 2])> {
        let points = read_xy(&self.index, &self.value, "quiver");
        let vectors = self.vectors.read();
        if vectors.vectors().len() != points.len() {
            warn!(
                index_len = points.len(),
                vector_len = vectors.vectors().len(),
                "quiver vectors do not match the points, nothing will be drawn"
            );
            return vec![];
        }
        let index_range = self.transform.index_range();
        let value_range = self.transform.value_range();
        let (ir, vr) = (index_range.read(), value_range.read());
        points
            .iter()
            .zip(vectors.vectors())
            .filter_map(|(p, v)| {
                let p = (*p)?;
                let inside = ir.contains(p.x) && vr.contains(p.y);
                inside.then_some((p, *v))
            })
            .collect()
    }

    fn arrow(&self, start: DVec2, offset: DVec2) -> Option<[Path; 2]> {
        let length = offset.length();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        let end = start + offset;
        let unit = offset / length;
        let left = end + HEAD_ANGLE * (unit.perp() - unit) * self.config.arrow_size;
        let right = end + HEAD_ANGLE * (-unit.perp() - unit) * self.config.arrow_size;
        Some([Path::segment(start, end), Path::polyline(vec![left, end, right])])
    }
}

impl PlotRenderer for QuiverPlot {
    fn kind(&self) -> &'static str {
        "quiver"
    }

    fn ensure_rendered(&mut self) -> PlotResult<()> {
        let mapper_revs = self.transform.sync();
        let mut upstream = revisions_of(&[&self.index, &self.value]);
        upstream.push(self.vectors.read().revision());
        upstream.push(self.transform.index_range().read().revision());
        upstream.push(self.transform.value_range().read().revision());
        if self.source_watch.changed(&upstream) {
            self.points.invalidate();
        }
        if self.mapper_watch.changed(&mapper_revs) {
            self.screen.invalidate();
        }
        if !self.points.is_valid() {
            self.screen.invalidate();
            let gathered = self.gather();
            self.points.set(gathered);
        }
        if !self.screen.is_valid() {
            let starts: Vec<DVec2> = self.points.get().iter().map(|(p, _)| *p).collect();
            let starts = map_points(&self.transform, &starts)?;
            let mut paths = Vec::with_capacity(starts.len() * 2);
            for (start, (_, [u, v])) in starts.iter().zip(self.points.get()) {
                let offset = self.transform.screen_offset(*u, *v);
                if let Some(arrow) = self.arrow(*start, offset) {
                    paths.extend(arrow);
                }
            }
            self.screen.set(paths);
        }
        Ok(())
    }

    fn draw(&self, gc: &mut dyn GraphicsContext) {
        gc.save_state();
        gc.clip_to_rect(self.transform.screen_rect());
        gc.set_stroke_color(self.config.line_color);
        gc.set_line_width(self.config.line_width);
        stroke_all(gc, self.screen.get());
        gc.restore_state();
    }

    fn sources(&self) -> Vec<SharedSource> {
        vec![self.index.clone(), self.value.clone()]
    }
}
