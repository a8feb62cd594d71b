use glam::DVec2;

use super::{GridBase, PlotRenderer};
use crate::color_mapper::SharedColorMapper;
use crate::contour::{resolve_levels, trace_levels, ScalarField, Trace};
use crate::data_types::{ContourConfig, Levels, LineStyles, SharedSource};
use crate::error::PlotResult;
use crate::render_cache::{RevisionWatch, Stage};
use crate::rendering::{stroke_all, GraphicsContext, Path, Rect};
use crate::style::{Color, LineDash, StyleValue};

/// Recompute counters of each cache stage of a contour renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub levels: u64,
    pub widths: u64,
    pub styles: u64,
    pub colors: u64,
    pub geometry: u64,
    pub screen: u64,
}

/// Levels for the current value bounds; empty when there is no finite data.
pub(super) fn compute_levels(base: &GridBase, levels: &Levels) -> Vec<f64> {
    match levels {
        Levels::Explicit(_) => resolve_levels(levels, f64::NAN, f64::NAN),
        _ => match base.value_bounds() {
            Some((low, high)) => resolve_levels(levels, low, high),
            None => vec![],
        },
    }
}

/// Revisions of the placement on screen: grid coordinates plus both mapper axes.
pub(super) fn placement_revisions(base: &GridBase) -> Vec<u64> {
    let mut revs = vec![base.index_revision()];
    revs.extend(base.mapper_revisions());
    revs
}

/// Contour lines of a scalar field, one set of traces per level.
///
/// Levels, widths, dash styles, colors, data-space traces and screen traces
/// are cached in separate stages. Changing a style only recomputes that style.
pub struct ContourLinePlot {
    pub base: GridBase,
    color_mapper: Option<SharedColorMapper>,
    config: ContourConfig,
    levels: Stage<Vec<f64>>,
    widths: Stage<Vec<f64>>,
    styles: Stage<Vec<LineDash>>,
    colors: Stage<Vec<Color>>,
    traces: Stage<Vec<Vec<Trace>>>,
    screen: Stage<Vec<Vec<Path>>>,
    rect: Stage<Option<Rect>>,
    level_watch: RevisionWatch,
    trace_watch: RevisionWatch,
    color_watch: RevisionWatch,
    placement_watch: RevisionWatch,
}

impl ContourLinePlot {
    pub fn new(base: GridBase) -> Self {
        Self {
            base,
            color_mapper: None,
            config: ContourConfig::default(),
            levels: Stage::default(),
            widths: Stage::default(),
            styles: Stage::default(),
            colors: Stage::default(),
            traces: Stage::default(),
            screen: Stage::default(),
            rect: Stage::default(),
            level_watch: RevisionWatch::new(),
            trace_watch: RevisionWatch::new(),
            color_watch: RevisionWatch::new(),
            placement_watch: RevisionWatch::new(),
        }
    }

    pub fn with_config(mut self, config: ContourConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_color_mapper(mut self, mapper: SharedColorMapper) -> Self {
        self.color_mapper = Some(mapper);
        self
    }

    pub fn config(&self) -> &ContourConfig {
        &self.config
    }

    pub fn set_levels(&mut self, levels: Levels) {
        self.config.levels = levels;
        self.levels.invalidate();
    }

    pub fn set_widths(&mut self, widths: StyleValue<f64>) {
        self.config.widths = widths;
        self.widths.invalidate();
    }

    pub fn set_styles(&mut self, styles: LineStyles) {
        self.config.styles = styles;
        self.styles.invalidate();
    }

    pub fn set_positive_style(&mut self, style: LineDash) {
        self.config.positive_style = style;
        self.styles.invalidate();
    }

    pub fn set_negative_style(&mut self, style: LineDash) {
        self.config.negative_style = style;
        self.styles.invalidate();
    }

    pub fn set_colors(&mut self, colors: StyleValue<Color>) {
        self.config.colors = colors;
        self.colors.invalidate();
    }

    pub fn color_mapper(&self) -> Option<&SharedColorMapper> {
        self.color_mapper.as_ref()
    }

    pub fn set_color_mapper(&mut self, mapper: Option<SharedColorMapper>) {
        self.color_mapper = mapper;
        self.color_watch.reset();
        self.colors.invalidate();
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.config.alpha = alpha;
    }

    pub fn levels(&self) -> &[f64] {
        self.levels.get()
    }

    pub fn widths(&self) -> &[f64] {
        self.widths.get()
    }

    pub fn styles(&self) -> &[LineDash] {
        self.styles.get()
    }

    pub fn colors(&self) -> &[Color] {
        self.colors.get()
    }

    /// Data-space traces, indexed like `levels`.
    pub fn traces(&self) -> &[Vec<Trace>] {
        self.traces.get()
    }

    pub fn screen_traces(&self) -> &[Vec<Path>] {
        self.screen.get()
    }

    pub fn stage_counts(&self) -> StageCounts {
        StageCounts {
            levels: self.levels.recomputes(),
            widths: self.widths.recomputes(),
            styles: self.styles.recomputes(),
            colors: self.colors.recomputes(),
            geometry: self.traces.recomputes(),
            screen: self.screen.recomputes(),
        }
    }

    fn compute_styles(&self) -> Vec<LineDash> {
        let levels = self.levels.get();
        match &self.config.styles {
            LineStyles::Signed => levels
                .iter()
                .map(|l| {
                    if *l < 0.0 {
                        self.config.negative_style
                    } else {
                        self.config.positive_style
                    }
                })
                .collect(),
            LineStyles::Uniform(dash) => vec![*dash; levels.len()],
            LineStyles::Cycle(dashes) => StyleValue::Cycle(dashes.clone()).expand(levels.len(), &LineDash::Solid),
        }
    }

    fn compute_colors(&self) -> Vec<Color> {
        let levels = self.levels.get();
        match &self.color_mapper {
            Some(mapper) => mapper.read().map_screen(levels),
            None => self.config.colors.expand(levels.len(), &Color::BLACK),
        }
    }

    fn compute_traces(&self) -> PlotResult<Vec<Vec<Trace>>> {
        let levels = self.levels.get();
        let Some((values, xs, ys)) = self.base.scalar_field() else {
            return Ok(vec![Vec::new(); levels.len()]);
        };
        let field = ScalarField::new(&values, &xs, &ys)?;
        Ok(trace_levels(&field, levels))
    }

    fn compute_screen(&self) -> PlotResult<Vec<Vec<Path>>> {
        let mut out = Vec::with_capacity(self.traces.get().len());
        for traces in self.traces.get() {
            let mut paths = Vec::with_capacity(traces.len());
            for trace in traces {
                let points: Vec<DVec2> = self.base.map_polyline(&trace.points)?;
                paths.push(if trace.closed {
                    Path::polygon(points)
                } else {
                    Path::polyline(points)
                });
            }
            out.push(paths);
        }
        Ok(out)
    }
}

impl PlotRenderer for ContourLinePlot {
    fn kind(&self) -> &'static str {
        "contour_line"
    }

    fn ensure_rendered(&mut self) -> PlotResult<()> {
        let value_rev = self.base.value_revision();
        if self.level_watch.changed(&[value_rev]) {
            self.levels.invalidate();
        }
        if self.trace_watch.changed(&[value_rev, self.base.index_revision()]) {
            self.traces.invalidate();
        }
        if let Some(mapper) = &self.color_mapper {
            let revs = mapper.read().revisions();
            if self.color_watch.changed(&revs) {
                self.colors.invalidate();
            }
        }
        if self.placement_watch.changed(&placement_revisions(&self.base)) {
            self.screen.invalidate();
            self.rect.invalidate();
        }

        if !self.levels.is_valid() {
            let levels = compute_levels(&self.base, &self.config.levels);
            self.levels.set(levels);
            self.widths.invalidate();
            self.styles.invalidate();
            self.colors.invalidate();
            self.traces.invalidate();
        }
        if !self.widths.is_valid() {
            let widths = self.config.widths.expand(self.levels.get().len(), &1.0);
            self.widths.set(widths);
        }
        if !self.styles.is_valid() {
            let styles = self.compute_styles();
            self.styles.set(styles);
        }
        if !self.colors.is_valid() {
            let colors = self.compute_colors();
            self.colors.set(colors);
        }
        if !self.traces.is_valid() {
            let traces = self.compute_traces()?;
            self.traces.set(traces);
            self.screen.invalidate();
        }
        if !self.screen.is_valid() {
            let screen = self.compute_screen()?;
            self.screen.set(screen);
        }
        let base = &self.base;
        self.rect.try_ensure("contour_rect", || base.screen_rect())?;
        Ok(())
    }

    fn draw(&self, gc: &mut dyn GraphicsContext) {
        gc.save_state();
        if let Some(rect) = *self.rect.get() {
            gc.clip_to_rect(rect);
        }
        gc.set_alpha(self.config.alpha);
        let (widths, styles, colors) = (self.widths.get(), self.styles.get(), self.colors.get());
        for (i, paths) in self.screen.get().iter().enumerate() {
            gc.set_stroke_color(colors.get(i).copied().unwrap_or(Color::BLACK));
            gc.set_line_width(widths.get(i).copied().unwrap_or(1.0));
            gc.set_line_dash(styles.get(i).copied().unwrap_or_default().pattern());
            stroke_all(gc, paths);
        }
        gc.restore_state();
    }

    fn sources(&self) -> Vec<SharedSource> {
        let grid = self.base.index.read();
        vec![grid.xdata().clone(), grid.ydata().clone()]
    }
}
