use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::events::{ModifierKey, Modifiers, MouseButton, PointerEvent, Tool, ToolResponse};
use super::zoom_history::{ZoomBounds, ZoomHistory, ZoomState};
use crate::error::PlotResult;
use crate::rendering::{DrawMode, GraphicsContext, Path, Rect};
use crate::style::Color;
use crate::transform::{Orientation, PlotTransform};
use crate::view_controller::ViewController;

/// Box selection over both axes, or a range across one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    #[default]
    Box,
    Range,
}

/// Axis a range selection applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomAxis {
    #[default]
    Index,
    Value,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Normal,
    Selecting,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectingZoomConfig {
    pub tool_mode: ToolMode,
    pub axis: ZoomAxis,
    /// Start a selection without holding `always_on_modifier`.
    pub always_on: bool,
    pub always_on_modifier: ModifierKey,
    /// `None` disables drag selection.
    pub drag_button: Option<MouseButton>,
    /// Selections whose |dx| + |dy| is smaller than this are treated as clicks.
    pub minimum_screen_delta: f64,
    pub color: Color,
    /// Replaces the alpha of `color` for the fill.
    pub alpha: f32,
    pub border_color: Color,
    pub border_size: f64,
}

impl Default for SelectingZoomConfig {
    fn default() -> Self {
        Self {
            tool_mode: ToolMode::Box,
            axis: ZoomAxis::Index,
            always_on: false,
            always_on_modifier: ModifierKey::Control,
            drag_button: Some(MouseButton::Left),
            minimum_screen_delta: 10.0,
            color: Color::from_rgb8(135, 206, 250),
            alpha: 0.4,
            border_color: Color::from_rgb8(30, 144, 255),
            border_size: 1.0,
        }
    }
}

/// Pointer state machine of a drag selection.
#[derive(Clone, Debug, Default)]
pub struct SelectionGesture {
    state: SelectionState,
    start: Option<DVec2>,
    end: Option<DVec2>,
}

impl SelectionGesture {
    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        self.state == SelectionState::Selecting
    }

    pub fn start(&self) -> Option<DVec2> {
        self.start
    }

    pub fn end(&self) -> Option<DVec2> {
        self.end
    }

    pub fn begin(&mut self, position: DVec2) {
        self.state = SelectionState::Selecting;
        self.start = Some(position);
        self.end = Some(position);
    }

    pub fn update(&mut self, position: DVec2) {
        if self.is_selecting() {
            self.end = Some(position);
        }
    }

    /// Ends the gesture at `position`, returning (start, end).
    pub fn finish(&mut self, position: DVec2) -> Option<(DVec2, DVec2)> {
        let start = self.start?;
        self.cancel();
        Some((start, position))
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

/// Draws the provisional selection.
#[derive(Clone, Debug, Default)]
pub struct ZoomOverlay;

impl ZoomOverlay {
    pub fn draw(
        &self,
        gc: &mut dyn GraphicsContext,
        config: &SelectingZoomConfig,
        gesture: &SelectionGesture,
        transform: &PlotTransform,
    ) {
        let (Some(start), Some(end)) = (gesture.start(), gesture.end()) else {
            return;
        };
        if !gesture.is_selecting() {
            return;
        }
        let bounds = transform.screen_rect();
        let rect = match config.tool_mode {
            ToolMode::Box => Rect::from_corners(start, end),
            ToolMode::Range => {
                let along_x = matches!(
                    (config.axis, transform.orientation),
                    (ZoomAxis::Index, Orientation::H) | (ZoomAxis::Value, Orientation::V)
                );
                if along_x {
                    Rect::from_corners(DVec2::new(start.x, bounds.min().y), DVec2::new(end.x, bounds.max().y))
                } else {
                    Rect::from_corners(DVec2::new(bounds.min().x, start.y), DVec2::new(bounds.max().x, end.y))
                }
            }
        };
        let path = Path::polygon(rect.corners().to_vec());
        gc.save_state();
        gc.clip_to_rect(bounds);
        gc.set_line_width(config.border_size);
        gc.set_stroke_color(config.border_color);
        if config.color.is_transparent() {
            gc.draw_path(&path, DrawMode::Stroke);
        } else {
            gc.set_fill_color(config.color.alpha(config.alpha));
            gc.draw_path(&path, DrawMode::FillStroke);
        }
        gc.restore_state();
    }
}

/// Zoom to a box or range dragged out with the pointer.
///
/// The overlay and the gesture are separate pieces; this type routes events
/// to the gesture, paints through the overlay, and commits the resulting
/// zoom to the ranges and its history.
pub struct SelectingZoom {
    pub transform: PlotTransform,
    config: SelectingZoomConfig,
    gesture: SelectionGesture,
    overlay: ZoomOverlay,
    history: ZoomHistory,
}

impl SelectingZoom {
    pub fn new(transform: PlotTransform) -> Self {
        Self {
            transform,
            config: SelectingZoomConfig::default(),
            gesture: SelectionGesture::default(),
            overlay: ZoomOverlay,
            history: ZoomHistory::new(),
        }
    }

    pub fn with_config(mut self, config: SelectingZoomConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SelectingZoomConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SelectingZoomConfig {
        &mut self.config
    }

    pub fn state(&self) -> SelectionState {
        self.gesture.state()
    }

    pub fn gesture(&self) -> &SelectionGesture {
        &self.gesture
    }

    pub fn history(&self) -> &ZoomHistory {
        &self.history
    }

    pub fn undo(&mut self) -> bool {
        self.history.revert(&self.transform)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&self.transform)
    }

    /// Back to the view before the first zoom.
    pub fn reset(&mut self) {
        self.gesture.cancel();
        self.history.reset(&self.transform);
    }

    /// Paints the selection while one is in progress.
    pub fn overlay(&self, gc: &mut dyn GraphicsContext) {
        self.overlay.draw(gc, &self.config, &self.gesture, &self.transform);
    }

    fn is_enabling(&self, button: MouseButton, modifiers: &Modifiers) -> bool {
        let enabled = self.config.always_on || modifiers.is_down(self.config.always_on_modifier);
        enabled && self.config.drag_button == Some(button)
    }

    fn end_select(&mut self, position: DVec2) -> PlotResult<ToolResponse> {
        let Some((start, end)) = self.gesture.finish(position) else {
            return Ok(ToolResponse::Handled);
        };
        let delta = end - start;
        if delta.x.abs() + delta.y.abs() < self.config.minimum_screen_delta {
            debug!(dx = delta.x, dy = delta.y, "selection below minimum delta, ignored");
            return Ok(ToolResponse::Redraw);
        }

        let (index, value) = ViewController::screen_box_to_data(&self.transform, start, end)?;
        let prev = ZoomBounds::of(&self.transform);
        let next = match (self.config.tool_mode, self.config.axis) {
            (ToolMode::Box, _) => ZoomBounds { index, value },
            (ToolMode::Range, ZoomAxis::Index) => ZoomBounds { index, ..prev },
            (ToolMode::Range, ZoomAxis::Value) => ZoomBounds { value, ..prev },
        };
        let state = ZoomState::new(prev, next);
        state.apply(&self.transform);
        self.history.push(state);
        debug!(?next, "zoomed to selection");
        Ok(ToolResponse::Redraw)
    }
}

impl Tool for SelectingZoom {
    fn dispatch(&mut self, event: &PointerEvent) -> PlotResult<ToolResponse> {
        match (self.gesture.state(), event) {
            (
                SelectionState::Normal,
                PointerEvent::Down {
                    position,
                    button,
                    modifiers,
                },
            ) => {
                if !self.is_enabling(*button, modifiers) {
                    return Ok(ToolResponse::Ignored);
                }
                self.gesture.begin(*position);
                Ok(ToolResponse::Redraw)
            }
            (SelectionState::Selecting, PointerEvent::Move { position }) => {
                self.gesture.update(*position);
                Ok(ToolResponse::Redraw)
            }
            (SelectionState::Selecting, PointerEvent::Up { position, button }) => {
                if self.config.drag_button != Some(*button) {
                    return Ok(ToolResponse::Ignored);
                }
                self.end_select(*position)
            }
            (SelectionState::Selecting, PointerEvent::Leave) => {
                self.gesture.cancel();
                Ok(ToolResponse::Redraw)
            }
            _ => Ok(ToolResponse::Ignored),
        }
    }
}
