use glam::DVec2;
use tracing::warn;

use super::{GridBase, PlotRenderer};
use crate::color_mapper::SharedColorMapper;
use crate::data_types::{ImageData, ImagePlotConfig, SharedSource};
use crate::error::PlotResult;
use crate::render_cache::{RevisionWatch, Stage};
use crate::rendering::{GraphicsContext, PixelBuffer, Rect};
use crate::style::Color;

/// A pixel buffer together with the row order it was laid out in.
#[derive(Clone, Debug, Default)]
pub struct MappedImage {
    pub buffer: PixelBuffer,
    /// Data row 0 is the bottom buffer row.
    pub flipped: bool,
}

impl MappedImage {
    /// Color of the pixel at data (column, row).
    pub fn color_at(&self, col: usize, row: usize) -> Option<[u8; 4]> {
        let height = self.buffer.height();
        if row >= height {
            return None;
        }
        let buffer_row = if self.flipped { height - 1 - row } else { row };
        self.buffer.get(col, buffer_row)
    }
}

/// What an inspector sees under a screen point.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelReport {
    pub x_index: usize,
    pub y_index: usize,
    /// Scalar value, for colormapped images.
    pub data_value: Option<f64>,
    pub color: [u8; 4],
}

/// Image renderers that can report the pixel under a screen point.
pub trait InspectImage {
    fn inspect(&self, screen: DVec2) -> Option<PixelReport>;
}

/// Lays out per-row pixels top-down, reversing the data rows when flipped.
fn layout(width: usize, height: usize, mut rows: Vec<[u8; 4]>, flipped: bool) -> PixelBuffer {
    if flipped && width > 0 {
        let reversed: Vec<[u8; 4]> = rows.chunks(width).rev().flatten().copied().collect();
        rows = reversed;
    }
    PixelBuffer::from_pixels(width, height, rows).unwrap_or_default()
}

fn rgb_pixels(image: &ImageData) -> Vec<[u8; 4]> {
    let depth = image.value_depth();
    let q = |v: f64| v.clamp(0.0, 255.0).round() as u8;
    image
        .values()
        .chunks(depth)
        .map(|px| match px {
            [r, g, b, a] => [q(*r), q(*g), q(*b), q(*a)],
            [r, g, b] => [q(*r), q(*g), q(*b), 255],
            [v] => [q(*v), q(*v), q(*v), 255],
            _ => [0, 0, 0, 0],
        })
        .collect()
}

fn inspect_base(base: &GridBase, mapped: &MappedImage, screen: DVec2, scalar: bool) -> Option<PixelReport> {
    let (width, height) = {
        let image = base.value.read();
        (image.width(), image.height())
    };
    let (x_index, y_index) = {
        let grid = base.index.read();
        base.index_mapper.write().map_index(screen, &grid, width, height)?
    };
    let data_value = if scalar {
        base.value.read().get_value(y_index, x_index)
    } else {
        None
    };
    Some(PixelReport {
        x_index,
        y_index,
        data_value,
        color: mapped.color_at(x_index, y_index)?,
    })
}

fn draw_mapped(gc: &mut dyn GraphicsContext, mapped: &MappedImage, rect: Option<Rect>, alpha: f32) {
    let Some(rect) = rect else {
        return;
    };
    if mapped.buffer.is_empty() {
        return;
    }
    gc.save_state();
    gc.clip_to_rect(rect);
    gc.set_alpha(alpha);
    gc.draw_image(&mapped.buffer, rect);
    gc.restore_state();
}

/// RGB or RGBA image drawn as is.
pub struct ImagePlot {
    pub base: GridBase,
    config: ImagePlotConfig,
    image: Stage<MappedImage>,
    rect: Stage<Option<Rect>>,
    image_watch: RevisionWatch,
    rect_watch: RevisionWatch,
}

impl ImagePlot {
    pub fn new(base: GridBase) -> Self {
        Self {
            base,
            config: ImagePlotConfig::default(),
            image: Stage::default(),
            rect: Stage::default(),
            image_watch: RevisionWatch::new(),
            rect_watch: RevisionWatch::new(),
        }
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.config.alpha = alpha;
    }

    pub fn mapped_image(&self) -> &MappedImage {
        self.image.get()
    }

    pub fn screen_rect(&self) -> Option<Rect> {
        *self.rect.get()
    }
}

impl PlotRenderer for ImagePlot {
    fn kind(&self) -> &'static str {
        "img"
    }

    fn ensure_rendered(&mut self) -> PlotResult<()> {
        let flipped = self.base.y_flipped();
        if self.image_watch.changed(&[self.base.value_revision(), flipped as u64]) {
            self.image.invalidate();
        }
        let mut placement = vec![self.base.index_revision()];
        placement.extend(self.base.mapper_revisions());
        if self.rect_watch.changed(&placement) {
            self.rect.invalidate();
        }
        let value = self.base.value.clone();
        self.image.ensure("image", || {
            let image = value.read();
            MappedImage {
                buffer: layout(image.width(), image.height(), rgb_pixels(&image), flipped),
                flipped,
            }
        });
        let base = &self.base;
        self.rect.try_ensure("image_rect", || base.screen_rect())?;
        Ok(())
    }

    fn draw(&self, gc: &mut dyn GraphicsContext) {
        draw_mapped(gc, self.image.get(), *self.rect.get(), self.config.alpha);
    }

    fn sources(&self) -> Vec<SharedSource> {
        let grid = self.base.index.read();
        vec![grid.xdata().clone(), grid.ydata().clone()]
    }
}

impl InspectImage for ImagePlot {
    fn inspect(&self, screen: DVec2) -> Option<PixelReport> {
        inspect_base(&self.base, self.image.get(), screen, false)
    }
}

/// Scalar field drawn through a color mapper, with optional value selection.
///
/// Pixels outside the selection, or masked in the source, are faded toward
/// `fade_background` by `fade_alpha`.
pub struct CMapImagePlot {
    pub base: GridBase,
    color_mapper: SharedColorMapper,
    config: ImagePlotConfig,
    selection: Option<(f64, f64)>,
    mapped: Stage<MappedImage>,
    rect: Stage<Option<Rect>>,
    mapped_watch: RevisionWatch,
    rect_watch: RevisionWatch,
}

impl CMapImagePlot {
    pub fn new(base: GridBase, color_mapper: SharedColorMapper) -> Self {
        Self {
            base,
            color_mapper,
            config: ImagePlotConfig::default(),
            selection: None,
            mapped: Stage::default(),
            rect: Stage::default(),
            mapped_watch: RevisionWatch::new(),
            rect_watch: RevisionWatch::new(),
        }
    }

    pub fn color_mapper(&self) -> &SharedColorMapper {
        &self.color_mapper
    }

    pub fn set_color_mapper(&mut self, mapper: SharedColorMapper) {
        self.color_mapper = mapper;
        self.mapped_watch.reset();
    }

    pub fn config(&self) -> &ImagePlotConfig {
        &self.config
    }

    /// Fade settings feed the mapped image; alpha only affects drawing.
    pub fn set_config(&mut self, config: ImagePlotConfig) {
        if config.fade_alpha != self.config.fade_alpha || config.fade_background != self.config.fade_background {
            self.mapped.invalidate();
        }
        self.config = config;
    }

    pub fn selection(&self) -> Option<(f64, f64)> {
        self.selection
    }

    /// Selects the values in `[low, high]`, or clears the selection.
    pub fn set_value_selection(&mut self, selection: Option<(f64, f64)>) {
        if selection != self.selection {
            self.selection = selection;
            self.mapped.invalidate();
        }
    }

    pub fn mapped_image(&self) -> &MappedImage {
        self.mapped.get()
    }

    pub fn is_mapped_image_valid(&self) -> bool {
        self.mapped.is_valid()
    }

    pub fn mapped_image_recomputes(&self) -> u64 {
        self.mapped.recomputes()
    }

    pub fn screen_rect(&self) -> Option<Rect> {
        *self.rect.get()
    }

    fn compute_mapped(&self, flipped: bool) -> MappedImage {
        let image = self.base.value.read();
        if image.value_depth() != 1 {
            warn!(depth = image.value_depth(), "colormapped image needs scalar data");
            return MappedImage::default();
        }
        let width = image.width();
        let mut pixels = self.color_mapper.read().map_uint8(image.values(), width);

        let mask = image.mask();
        if self.selection.is_some() || mask.is_some() {
            let bg = self.config.fade_background.to_rgba8();
            let fade = self.config.fade_alpha;
            for (i, (px, v)) in pixels.iter_mut().zip(image.values()).enumerate() {
                let masked = mask.is_some_and(|m| !m.get(i).copied().unwrap_or(true));
                let deselected = self.selection.is_some_and(|(lo, hi)| !(*v >= lo && *v <= hi));
                if masked || deselected {
                    for c in 0..3 {
                        let blended = fade * (px[c] as f32 - bg[c] as f32) + bg[c] as f32;
                        px[c] = blended.clamp(0.0, 255.0).round() as u8;
                    }
                }
            }
        }

        MappedImage {
            buffer: layout(width, image.height(), pixels, flipped),
            flipped,
        }
    }

    /// Color the mapper assigns to a value, before any fading.
    pub fn map_color(&self, value: f64) -> Color {
        self.color_mapper.read().map_value(value)
    }
}

impl PlotRenderer for CMapImagePlot {
    fn kind(&self) -> &'static str {
        "cmap_img"
    }

    fn ensure_rendered(&mut self) -> PlotResult<()> {
        let flipped = self.base.y_flipped();
        let mut upstream = vec![self.base.value_revision(), flipped as u64];
        upstream.extend(self.color_mapper.read().revisions());
        if self.mapped_watch.changed(&upstream) {
            self.mapped.invalidate();
        }
        let mut placement = vec![self.base.index_revision()];
        placement.extend(self.base.mapper_revisions());
        if self.rect_watch.changed(&placement) {
            self.rect.invalidate();
        }
        if !self.mapped.is_valid() {
            let mapped = self.compute_mapped(flipped);
            self.mapped.set(mapped);
        }
        let base = &self.base;
        self.rect.try_ensure("image_rect", || base.screen_rect())?;
        Ok(())
    }

    fn draw(&self, gc: &mut dyn GraphicsContext) {
        draw_mapped(gc, self.mapped.get(), *self.rect.get(), self.config.alpha);
    }

    fn sources(&self) -> Vec<SharedSource> {
        let grid = self.base.index.read();
        vec![grid.xdata().clone(), grid.ydata().clone()]
    }
}

impl InspectImage for CMapImagePlot {
    fn inspect(&self, screen: DVec2) -> Option<PixelReport> {
        inspect_base(&self.base, self.mapped.get(), screen, true)
    }
}
