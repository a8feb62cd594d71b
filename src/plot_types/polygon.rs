use glam::DVec2;

use super::{map_points, read_xy, revisions_of, PlotRenderer};
use crate::data_types::{PolygonPlotConfig, SharedSource};
use crate::error::PlotResult;
use crate::render_cache::{RevisionWatch, Stage};
use crate::rendering::{GraphicsContext, Path};
use crate::transform::PlotTransform;

/// Closed polygon through the (index, value) vertices, filled and outlined.
pub struct PolygonPlot {
    index: SharedSource,
    value: SharedSource,
    pub transform: PlotTransform,
    config: PolygonPlotConfig,
    vertices: Stage<Vec<DVec2>>,
    screen: Stage<Path>,
    source_watch: RevisionWatch,
    mapper_watch: RevisionWatch,
}

impl PolygonPlot {
    pub fn new(index: SharedSource, value: SharedSource, transform: PlotTransform) -> Self {
        Self {
            index,
            value,
            transform,
            config: PolygonPlotConfig::default(),
            vertices: Stage::default(),
            screen: Stage::default(),
            source_watch: RevisionWatch::new(),
            mapper_watch: RevisionWatch::new(),
        }
    }

    pub fn with_config(mut self, config: PolygonPlotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PolygonPlotConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PolygonPlotConfig) {
        self.config = config;
    }

    pub fn screen_path(&self) -> &Path {
        self.screen.get()
    }
}

impl PlotRenderer for PolygonPlot {
    fn kind(&self) -> &'static str {
        "polygon"
    }

    fn ensure_rendered(&mut self) -> PlotResult<()> {
        if self.source_watch.changed(&revisions_of(&[&self.index, &self.value])) {
            self.vertices.invalidate();
        }
        if self.mapper_watch.changed(&self.transform.sync()) {
            self.screen.invalidate();
        }
        if !self.vertices.is_valid() {
            self.screen.invalidate();
            let points = read_xy(&self.index, &self.value, "polygon");
            self.vertices.set(points.into_iter().flatten().collect());
        }
        if !self.screen.is_valid() {
            let mapped = map_points(&self.transform, self.vertices.get())?;
            self.screen.set(Path::polygon(mapped));
        }
        Ok(())
    }

    fn draw(&self, gc: &mut dyn GraphicsContext) {
        let path = self.screen.get();
        if path.points.len() < 3 {
            return;
        }
        gc.save_state();
        gc.clip_to_rect(self.transform.screen_rect());
        gc.set_alpha(self.config.alpha);
        if !self.config.face_color.is_transparent() {
            gc.set_fill_color(self.config.face_color);
            gc.fill_path(path);
        }
        if !self.config.edge_color.is_transparent() {
            gc.set_stroke_color(self.config.edge_color);
            gc.set_line_width(self.config.edge_width);
            gc.set_line_dash(self.config.edge_style.pattern());
            gc.stroke_path(path);
        }
        gc.restore_state();
    }

    fn sources(&self) -> Vec<SharedSource> {
        vec![self.index.clone(), self.value.clone()]
    }
}
