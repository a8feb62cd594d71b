use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::events::{MouseButton, PointerEvent, Tool, ToolResponse};
use super::zoom_history::{ZoomBounds, ZoomHistory, ZoomState};
use crate::error::PlotResult;
use crate::transform::{Orientation, PlotTransform};
use crate::view_controller::ViewController;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragZoomConfig {
    pub drag_button: MouseButton,
    /// 1.0 zooms 5% per 10 pixels of drag.
    pub speed: f64,
    /// Zoom both axes by the vertical motion only.
    pub maintain_aspect_ratio: bool,
}

impl Default for DragZoomConfig {
    fn default() -> Self {
        Self {
            drag_button: MouseButton::Left,
            speed: 1.0,
            maintain_aspect_ratio: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct DragAnchor {
    /// (index, value) under the press point.
    data: (f64, f64),
    previous: DVec2,
    start_bounds: ZoomBounds,
}

/// Continuous zoom driven by drag distance, about the point where the drag
/// started. The whole drag becomes one history entry.
pub struct DragZoom {
    pub transform: PlotTransform,
    config: DragZoomConfig,
    anchor: Option<DragAnchor>,
    /// View before the first drag; zooming out stops there.
    original: Option<ZoomBounds>,
    history: ZoomHistory,
}

impl DragZoom {
    pub fn new(transform: PlotTransform) -> Self {
        Self {
            transform,
            config: DragZoomConfig::default(),
            anchor: None,
            original: None,
            history: ZoomHistory::new(),
        }
    }

    pub fn with_config(mut self, config: DragZoomConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DragZoomConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
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

    /// Back to the original view; the next drag captures a new one.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.history.reset(&self.transform);
        if let Some(original) = self.original.take() {
            original.apply_to(&self.transform);
        }
    }

    fn start(&mut self, position: DVec2) -> PlotResult<()> {
        let bounds = ZoomBounds::of(&self.transform);
        self.original.get_or_insert(bounds);
        self.anchor = Some(DragAnchor {
            data: self.transform.map_data(position)?,
            previous: position,
            start_bounds: bounds,
        });
        Ok(())
    }

    fn drag(&mut self, position: DVec2) -> ToolResponse {
        let (Some(anchor), Some(original)) = (self.anchor, self.original) else {
            return ToolResponse::Ignored;
        };
        let speed = self.config.speed;
        let zoom_y = ViewController::drag_zoom_factor(anchor.previous.y, position.y, speed);
        let zoom_x = if self.config.maintain_aspect_ratio {
            zoom_y
        } else {
            ViewController::drag_zoom_factor(anchor.previous.x, position.x, speed)
        };
        let (index_zoom, value_zoom) = match self.transform.orientation {
            Orientation::H => (zoom_x, zoom_y),
            Orientation::V => (zoom_y, zoom_x),
        };

        let current = ZoomBounds::of(&self.transform);
        let next = ZoomBounds {
            index: ViewController::zoom_bounds_at(current.index, anchor.data.0, index_zoom),
            value: ViewController::zoom_bounds_at(current.value, anchor.data.1, value_zoom),
        };
        if ViewController::zoom_limit_reached(original.index, next.index)
            || ViewController::zoom_limit_reached(original.value, next.value)
        {
            return ToolResponse::Handled;
        }
        next.apply_to(&self.transform);
        if let Some(a) = self.anchor.as_mut() {
            a.previous = position;
        }
        ToolResponse::Redraw
    }

    fn finish(&mut self) -> ToolResponse {
        let Some(anchor) = self.anchor.take() else {
            return ToolResponse::Ignored;
        };
        let end = ZoomBounds::of(&self.transform);
        if end != anchor.start_bounds {
            self.history.push(ZoomState::new(anchor.start_bounds, end));
            debug!(?end, "drag zoom committed");
        }
        ToolResponse::Handled
    }
}

impl Tool for DragZoom {
    fn dispatch(&mut self, event: &PointerEvent) -> PlotResult<ToolResponse> {
        match event {
            PointerEvent::Down { position, button, .. } if *button == self.config.drag_button && !self.is_dragging() => {
                self.start(*position)?;
                Ok(ToolResponse::Handled)
            }
            PointerEvent::Move { position } if self.is_dragging() => Ok(self.drag(*position)),
            PointerEvent::Up { button, .. } if *button == self.config.drag_button => Ok(self.finish()),
            PointerEvent::Leave => Ok(self.finish()),
            _ => Ok(ToolResponse::Ignored),
        }
    }
}
