use std::f64::consts::TAU;

use glam::DVec2;
use tracing::warn;

use super::{map_points, read_xy, revisions_of, PlotRenderer};
use crate::color_mapper::SharedColorMapper;
use crate::data_types::{ScatterPlotConfig, SharedSource};
use crate::error::PlotResult;
use crate::render_cache::{RevisionWatch, Stage};
use crate::rendering::{DrawMode, GraphicsContext, Path};
use crate::style::{Color, MarkerKind};
use crate::transform::PlotTransform;

const CIRCLE_SEGMENTS: usize = 16;

fn circle(center: DVec2, radius: f64) -> Path {
    Path::polygon(
        (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let a = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                center + DVec2::new(a.cos(), a.sin()) * radius
            })
            .collect(),
    )
}

/// Device-space outline of one marker of extent `size` centered on `c`.
pub fn marker_paths(kind: MarkerKind, c: DVec2, size: f64) -> (Vec<Path>, DrawMode) {
    let h = size / 2.0;
    let at = |dx: f64, dy: f64| c + DVec2::new(dx, dy);
    match kind {
        MarkerKind::Square => (
            vec![Path::polygon(vec![at(-h, -h), at(h, -h), at(h, h), at(-h, h)])],
            DrawMode::FillStroke,
        ),
        MarkerKind::Circle => (vec![circle(c, h)], DrawMode::FillStroke),
        // Screen y grows downward.
        MarkerKind::Triangle => (
            vec![Path::polygon(vec![at(0.0, -h), at(h, h), at(-h, h)])],
            DrawMode::FillStroke,
        ),
        MarkerKind::InvertedTriangle => (
            vec![Path::polygon(vec![at(0.0, h), at(-h, -h), at(h, -h)])],
            DrawMode::FillStroke,
        ),
        MarkerKind::Diamond => (
            vec![Path::polygon(vec![at(0.0, -h), at(h, 0.0), at(0.0, h), at(-h, 0.0)])],
            DrawMode::FillStroke,
        ),
        MarkerKind::Cross => (
            vec![Path::segment(at(-h, -h), at(h, h)), Path::segment(at(-h, h), at(h, -h))],
            DrawMode::Stroke,
        ),
        MarkerKind::Plus => (
            vec![Path::segment(at(-h, 0.0), at(h, 0.0)), Path::segment(at(0.0, -h), at(0.0, h))],
            DrawMode::Stroke,
        ),
        MarkerKind::Dot => (vec![circle(c, (h / 2.0).max(1.0))], DrawMode::Fill),
        MarkerKind::Pixel => (
            vec![Path::polygon(vec![at(0.0, 0.0), at(1.0, 0.0), at(1.0, 1.0), at(0.0, 1.0)])],
            DrawMode::Fill,
        ),
    }
}

/// Scatter plot type
pub struct ScatterPlot {
    index: SharedSource,
    value: SharedSource,
    pub transform: PlotTransform,
    config: ScatterPlotConfig,
    /// (source position, data point) of every point inside both ranges.
    points: Stage<Vec<(usize, DVec2)>>,
    screen: Stage<Vec<DVec2>>,
    source_watch: RevisionWatch,
    mapper_watch: RevisionWatch,
}

impl ScatterPlot {
    pub fn new(index: SharedSource, value: SharedSource, transform: PlotTransform) -> Self {
        Self {
            index,
            value,
            transform,
            config: ScatterPlotConfig::default(),
            points: Stage::default(),
            screen: Stage::default(),
            source_watch: RevisionWatch::new(),
            mapper_watch: RevisionWatch::new(),
        }
    }

    pub fn with_config(mut self, config: ScatterPlotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScatterPlotConfig {
        &self.config
    }

    /// Marker style is read at draw time, so no cache is touched.
    pub fn set_config(&mut self, config: ScatterPlotConfig) {
        self.config = config;
    }

    pub fn set_index(&mut self, index: SharedSource) {
        self.index = index;
        self.source_watch.reset();
    }

    pub fn set_value(&mut self, value: SharedSource) {
        self.value = value;
        self.source_watch.reset();
    }

    /// Data points that survived culling.
    pub fn data_points(&self) -> Vec<DVec2> {
        self.points.get().iter().map(|(_, p)| *p).collect()
    }

    pub fn screen_points(&self) -> &[DVec2] {
        self.screen.get()
    }

    fn gather(&self) -> Vec<(usize, DVec2)> {
        let points = read_xy(&self.index, &self.value, "scatter");
        let xs: Vec<f64> = points.iter().map(|p| p.map_or(f64::NAN, |p| p.x)).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.map_or(f64::NAN, |p| p.y)).collect();
        let in_index = self.transform.index_range().read().mask_data(&xs);
        let in_value = self.transform.value_range().read().mask_data(&ys);
        points
            .into_iter()
            .enumerate()
            .filter_map(|(i, p)| p.filter(|_| in_index[i] && in_value[i]).map(|p| (i, p)))
            .collect()
    }

    fn draw_markers(&self, gc: &mut dyn GraphicsContext, fills: Option<&[Color]>) {
        gc.save_state();
        gc.clip_to_rect(self.transform.screen_rect());
        gc.set_alpha(self.config.alpha);
        gc.set_stroke_color(self.config.outline_color);
        gc.set_line_width(self.config.line_width);
        gc.set_fill_color(self.config.color);
        for (i, p) in self.screen.get().iter().enumerate() {
            if let Some(fill) = fills.and_then(|f| f.get(i)) {
                gc.set_fill_color(*fill);
            }
            let (paths, mode) = marker_paths(self.config.marker, *p, self.config.marker_size);
            for path in &paths {
                gc.draw_path(path, mode);
            }
        }
        gc.restore_state();
    }
}

impl PlotRenderer for ScatterPlot {
    fn kind(&self) -> &'static str {
        "scatter"
    }

    fn ensure_rendered(&mut self) -> PlotResult<()> {
        // Syncing the mappers also pulls source changes into the ranges.
        let mapper_revs = self.transform.sync();
        let mut upstream = revisions_of(&[&self.index, &self.value]);
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
            let data: Vec<DVec2> = self.points.get().iter().map(|(_, p)| *p).collect();
            let mapped = map_points(&self.transform, &data)?;
            self.screen.set(mapped);
        }
        Ok(())
    }

    fn draw(&self, gc: &mut dyn GraphicsContext) {
        self.draw_markers(gc, None);
    }

    fn sources(&self) -> Vec<SharedSource> {
        vec![self.index.clone(), self.value.clone()]
    }
}

/// Scatter plot whose marker fill comes from a third data source through a
/// color mapper.
pub struct ColormappedScatterPlot {
    scatter: ScatterPlot,
    color_data: SharedSource,
    color_mapper: SharedColorMapper,
    colors: Stage<Vec<Color>>,
    color_watch: RevisionWatch,
}

impl ColormappedScatterPlot {
    pub fn new(
        index: SharedSource,
        value: SharedSource,
        color_data: SharedSource,
        color_mapper: SharedColorMapper,
        transform: PlotTransform,
    ) -> Self {
        Self {
            scatter: ScatterPlot::new(index, value, transform),
            color_data,
            color_mapper,
            colors: Stage::default(),
            color_watch: RevisionWatch::new(),
        }
    }

    pub fn scatter(&self) -> &ScatterPlot {
        &self.scatter
    }

    pub fn set_config(&mut self, config: ScatterPlotConfig) {
        self.scatter.set_config(config);
    }

    pub fn set_color_mapper(&mut self, mapper: SharedColorMapper) {
        self.color_mapper = mapper;
        self.color_watch.reset();
    }

    /// Fill color of each drawn marker, in screen-point order.
    pub fn colors(&self) -> &[Color] {
        self.colors.get()
    }
}

impl PlotRenderer for ColormappedScatterPlot {
    fn kind(&self) -> &'static str {
        "cmap_scatter"
    }

    fn ensure_rendered(&mut self) -> PlotResult<()> {
        self.scatter.ensure_rendered()?;
        let mut upstream = vec![self.color_data.read().revision(), self.scatter.points.recomputes()];
        upstream.extend(self.color_mapper.read().revisions());
        if self.color_watch.changed(&upstream) {
            self.colors.invalidate();
        }
        if !self.colors.is_valid() {
            let data = self.color_data.read().get_data();
            let index_len = self.scatter.index.read().get_size();
            if data.len() < index_len {
                warn!(
                    color_len = data.len(),
                    index_len,
                    "color data shorter than index, missing colors are transparent"
                );
            }
            let picked: Vec<f64> = self
                .scatter
                .points
                .get()
                .iter()
                .map(|(i, _)| data.get(*i).copied().unwrap_or(f64::NAN))
                .collect();
            let colors = self.color_mapper.read().map_screen(&picked);
            self.colors.set(colors);
        }
        Ok(())
    }

    fn draw(&self, gc: &mut dyn GraphicsContext) {
        self.scatter.draw_markers(gc, Some(self.colors.get()));
    }

    fn sources(&self) -> Vec<SharedSource> {
        let mut s = self.scatter.sources();
        s.push(self.color_data.clone());
        s
    }
}
