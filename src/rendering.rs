//! Drawing backend abstraction and the in-memory backends.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::style::Color;

/// Axis-aligned screen rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: DVec2,
    pub size: DVec2,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: DVec2::new(x, y),
            size: DVec2::new(width, height),
        }
    }

    /// Normalized rectangle spanning two corners in any order.
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            origin: min,
            size: max - min,
        }
    }

    pub fn min(&self) -> DVec2 {
        self.origin
    }

    pub fn max(&self) -> DVec2 {
        self.origin + self.size
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    pub fn contains(&self, p: DVec2) -> bool {
        let max = self.max();
        p.x >= self.origin.x && p.x <= max.x && p.y >= self.origin.y && p.y <= max.y
    }

    pub fn corners(&self) -> [DVec2; 4] {
        let (min, max) = (self.min(), self.max());
        [min, DVec2::new(max.x, min.y), max, DVec2::new(min.x, max.y)]
    }
}

/// A device-space path: an open polyline or a closed polygon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    pub points: Vec<DVec2>,
    pub closed: bool,
}

impl Path {
    pub fn polyline(points: Vec<DVec2>) -> Self {
        Self { points, closed: false }
    }

    pub fn polygon(points: Vec<DVec2>) -> Self {
        Self { points, closed: true }
    }

    pub fn segment(a: DVec2, b: DVec2) -> Self {
        Self::polyline(vec![a, b])
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Fill,
    Stroke,
    FillStroke,
}

/// Minimal drawing surface the renderers paint onto. Coordinates are device
/// pixels.
pub trait GraphicsContext {
    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);
    fn set_line_dash(&mut self, pattern: &[f64]);
    fn set_alpha(&mut self, alpha: f32);
    fn clip_to_rect(&mut self, rect: Rect);
    fn stroke_path(&mut self, path: &Path);
    fn fill_path(&mut self, path: &Path);

    fn draw_path(&mut self, path: &Path, mode: DrawMode) {
        match mode {
            DrawMode::Fill => self.fill_path(path),
            DrawMode::Stroke => self.stroke_path(path),
            DrawMode::FillStroke => {
                self.fill_path(path);
                self.stroke_path(path);
            }
        }
    }

    /// Draws `image` scaled into `rect`.
    fn draw_image(&mut self, image: &PixelBuffer, rect: Rect);
}

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    SaveState,
    RestoreState,
    StrokeColor(Color),
    FillColor(Color),
    LineWidth(f64),
    LineDash(Vec<f64>),
    Alpha(f32),
    Clip(Rect),
    Stroke(Path),
    Fill(Path),
    Image { width: usize, height: usize, rect: Rect },
}

/// Backend that records every call. Used by tests and by export code that
/// wants the primitives rather than pixels.
#[derive(Clone, Debug, Default)]
pub struct RecordingContext {
    pub commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn strokes(&self) -> impl Iterator<Item = &Path> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Stroke(p) => Some(p),
            _ => None,
        })
    }

    pub fn fills(&self) -> impl Iterator<Item = &Path> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Fill(p) => Some(p),
            _ => None,
        })
    }

    pub fn images(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
            .count()
    }
}

impl GraphicsContext for RecordingContext {
    fn save_state(&mut self) {
        self.commands.push(DrawCommand::SaveState);
    }

    fn restore_state(&mut self) {
        self.commands.push(DrawCommand::RestoreState);
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::StrokeColor(color));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.commands.push(DrawCommand::LineDash(pattern.to_vec()));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Alpha(alpha));
    }

    fn clip_to_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clip(rect));
    }

    fn stroke_path(&mut self, path: &Path) {
        self.commands.push(DrawCommand::Stroke(path.clone()));
    }

    fn fill_path(&mut self, path: &Path) {
        self.commands.push(DrawCommand::Fill(path.clone()));
    }

    fn draw_image(&mut self, image: &PixelBuffer, rect: Rect) {
        self.commands.push(DrawCommand::Image {
            width: image.width(),
            height: image.height(),
            rect,
        });
    }
}

/// Row-major RGBA8 pixel buffer, row 0 at the top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 4]>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width * height],
        }
    }

    /// Wraps already-computed rows; `None` if the pixel count does not match.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<[u8; 4]>) -> Option<Self> {
        (pixels.len() == width * height).then_some(Self { width, height, pixels })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    pub fn set(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = rgba;
        }
    }

    /// Flat RGBA bytes, suitable for an image encoder or a texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Strokes every path with the current state. Empty paths are skipped.
pub fn stroke_all<'a>(gc: &mut dyn GraphicsContext, paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        if path.points.len() >= 2 {
            gc.stroke_path(path);
        }
    }
}
