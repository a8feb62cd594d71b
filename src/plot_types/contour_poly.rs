use glam::DVec2;

use super::contour_line::{compute_levels, placement_revisions, StageCounts};
use super::{GridBase, PlotRenderer};
use crate::color_mapper::SharedColorMapper;
use crate::contour::{band_polygons_for_levels, ScalarField};
use crate::data_types::{ContourConfig, Levels, SharedSource};
use crate::error::PlotResult;
use crate::render_cache::{RevisionWatch, Stage};
use crate::rendering::{GraphicsContext, Path, Rect};
use crate::style::{Color, StyleValue};

/// Filled bands between consecutive contour levels.
pub struct ContourPolyPlot {
    pub base: GridBase,
    color_mapper: Option<SharedColorMapper>,
    config: ContourConfig,
    levels: Stage<Vec<f64>>,
    /// One color per band.
    colors: Stage<Vec<Color>>,
    polygons: Stage<Vec<Vec<Vec<DVec2>>>>,
    screen: Stage<Vec<Vec<Path>>>,
    rect: Stage<Option<Rect>>,
    level_watch: RevisionWatch,
    polygon_watch: RevisionWatch,
    color_watch: RevisionWatch,
    placement_watch: RevisionWatch,
}

impl ContourPolyPlot {
    pub fn new(base: GridBase) -> Self {
        Self {
            base,
            color_mapper: None,
            config: ContourConfig::default(),
            levels: Stage::default(),
            colors: Stage::default(),
            polygons: Stage::default(),
            screen: Stage::default(),
            rect: Stage::default(),
            level_watch: RevisionWatch::new(),
            polygon_watch: RevisionWatch::new(),
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

    pub fn set_colors(&mut self, colors: StyleValue<Color>) {
        self.config.colors = colors;
        self.colors.invalidate();
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

    pub fn colors(&self) -> &[Color] {
        self.colors.get()
    }

    /// Data-space polygons per band; band `i` lies between levels `i` and `i + 1`.
    pub fn polygons(&self) -> &[Vec<Vec<DVec2>>] {
        self.polygons.get()
    }

    pub fn screen_polygons(&self) -> &[Vec<Path>] {
        self.screen.get()
    }

    pub fn stage_counts(&self) -> StageCounts {
        StageCounts {
            levels: self.levels.recomputes(),
            colors: self.colors.recomputes(),
            geometry: self.polygons.recomputes(),
            screen: self.screen.recomputes(),
            ..StageCounts::default()
        }
    }

    fn compute_colors(&self) -> Vec<Color> {
        let levels = self.levels.get();
        let bands = levels.len().saturating_sub(1);
        match &self.color_mapper {
            Some(mapper) => {
                let mids: Vec<f64> = levels.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
                mapper.read().map_screen(&mids)
            }
            None => self.config.colors.expand(bands, &Color::BLACK),
        }
    }

    fn compute_polygons(&self) -> PlotResult<Vec<Vec<Vec<DVec2>>>> {
        let levels = self.levels.get();
        let Some((values, xs, ys)) = self.base.scalar_field() else {
            return Ok(vec![Vec::new(); levels.len().saturating_sub(1)]);
        };
        let field = ScalarField::new(&values, &xs, &ys)?;
        Ok(band_polygons_for_levels(&field, levels))
    }

    fn compute_screen(&self) -> PlotResult<Vec<Vec<Path>>> {
        self.polygons
            .get()
            .iter()
            .map(|band| {
                band.iter()
                    .map(|poly| self.base.map_polyline(poly).map(Path::polygon))
                    .collect::<PlotResult<Vec<Path>>>()
            })
            .collect()
    }
}

impl PlotRenderer for ContourPolyPlot {
    fn kind(&self) -> &'static str {
        "contour_poly"
    }

    fn ensure_rendered(&mut self) -> PlotResult<()> {
        let value_rev = self.base.value_revision();
        if self.level_watch.changed(&[value_rev]) {
            self.levels.invalidate();
        }
        if self.polygon_watch.changed(&[value_rev, self.base.index_revision()]) {
            self.polygons.invalidate();
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
            self.colors.invalidate();
            self.polygons.invalidate();
        }
        if !self.colors.is_valid() {
            let colors = self.compute_colors();
            self.colors.set(colors);
        }
        if !self.polygons.is_valid() {
            let polygons = self.compute_polygons()?;
            self.polygons.set(polygons);
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
        let colors = self.colors.get();
        for (i, band) in self.screen.get().iter().enumerate() {
            gc.set_fill_color(colors.get(i).copied().unwrap_or(Color::BLACK));
            for path in band.iter().filter(|p| p.points.len() >= 3) {
                gc.fill_path(path);
            }
        }
        gc.restore_state();
    }

    fn sources(&self) -> Vec<SharedSource> {
        let grid = self.base.index.read();
        vec![grid.xdata().clone(), grid.ydata().clone()]
    }
}
