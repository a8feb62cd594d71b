use glam::DVec2;

use super::{map_points, read_xy, revisions_of, split_runs, PlotRenderer};
use crate::data_types::{LinePlotConfig, LineRenderStyle, SharedSource};
use crate::error::PlotResult;
use crate::render_cache::{RevisionWatch, Stage};
use crate::rendering::{stroke_all, GraphicsContext, Path};
use crate::transform::PlotTransform;

/// Line plot type
pub struct LinePlot {
    index: SharedSource,
    value: SharedSource,
    pub transform: PlotTransform,
    config: LinePlotConfig,
    /// Contiguous runs of usable data points.
    runs: Stage<Vec<Vec<DVec2>>>,
    /// Styled polylines in screen space.
    screen: Stage<Vec<Path>>,
    source_watch: RevisionWatch,
    mapper_watch: RevisionWatch,
}

impl LinePlot {
    pub fn new(index: SharedSource, value: SharedSource, transform: PlotTransform) -> Self {
        Self {
            index,
            value,
            transform,
            config: LinePlotConfig::default(),
            runs: Stage::default(),
            screen: Stage::default(),
            source_watch: RevisionWatch::new(),
            mapper_watch: RevisionWatch::new(),
        }
    }

    pub fn with_config(mut self, config: LinePlotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LinePlotConfig {
        &self.config
    }

    /// Replaces the style. Only a render-style change touches the geometry.
    pub fn set_config(&mut self, config: LinePlotConfig) {
        if config.render_style != self.config.render_style {
            self.screen.invalidate();
        }
        self.config = config;
    }

    pub fn set_render_style(&mut self, style: LineRenderStyle) {
        if style != self.config.render_style {
            self.config.render_style = style;
            self.screen.invalidate();
        }
    }

    pub fn index(&self) -> &SharedSource {
        &self.index
    }

    pub fn value(&self) -> &SharedSource {
        &self.value
    }

    pub fn set_index(&mut self, index: SharedSource) {
        self.index = index;
        self.source_watch.reset();
    }

    pub fn set_value(&mut self, value: SharedSource) {
        self.value = value;
        self.source_watch.reset();
    }

    pub fn runs(&self) -> &[Vec<DVec2>] {
        self.runs.get()
    }

    pub fn screen_paths(&self) -> &[Path] {
        self.screen.get()
    }

    pub fn is_cache_valid(&self) -> bool {
        self.runs.is_valid() && self.screen.is_valid()
    }

    fn styled(&self, run: &[DVec2]) -> Vec<Vec<DVec2>> {
        match self.config.render_style {
            LineRenderStyle::ConnectedPoints => vec![run.to_vec()],
            LineRenderStyle::Hold => run
                .windows(2)
                .map(|w| vec![w[0], DVec2::new(w[1].x, w[0].y)])
                .collect(),
            LineRenderStyle::ConnectedHold => {
                let mut out = Vec::with_capacity(run.len() * 2);
                for (i, p) in run.iter().enumerate() {
                    if i > 0 {
                        out.push(DVec2::new(p.x, run[i - 1].y));
                    }
                    out.push(*p);
                }
                vec![out]
            }
        }
    }
}

impl PlotRenderer for LinePlot {
    fn kind(&self) -> &'static str {
        "line"
    }

    fn ensure_rendered(&mut self) -> PlotResult<()> {
        if self.source_watch.changed(&revisions_of(&[&self.index, &self.value])) {
            self.runs.invalidate();
        }
        if self.mapper_watch.changed(&self.transform.sync()) {
            self.screen.invalidate();
        }
        if !self.runs.is_valid() {
            self.screen.invalidate();
            let points = read_xy(&self.index, &self.value, "line");
            self.runs.set(split_runs(&points));
        }
        if !self.screen.is_valid() {
            let mut paths = Vec::new();
            for run in self.runs.get() {
                for piece in self.styled(run) {
                    paths.push(Path::polyline(map_points(&self.transform, &piece)?));
                }
            }
            self.screen.set(paths);
        }
        Ok(())
    }

    fn draw(&self, gc: &mut dyn GraphicsContext) {
        gc.save_state();
        gc.clip_to_rect(self.transform.screen_rect());
        gc.set_alpha(self.config.alpha);
        gc.set_stroke_color(self.config.color);
        gc.set_line_width(self.config.line_width);
        gc.set_line_dash(self.config.line_style.pattern());
        stroke_all(gc, self.screen.get());
        gc.restore_state();
    }

    fn sources(&self) -> Vec<SharedSource> {
        vec![self.index.clone(), self.value.clone()]
    }
}
