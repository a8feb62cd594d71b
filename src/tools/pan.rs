use glam::DVec2;

use super::events::{MouseButton, PointerEvent, Tool, ToolResponse};
use crate::error::PlotResult;
use crate::transform::{Orientation, PlotTransform};
use crate::view_controller::ViewController;

/// Drags the view: both ranges follow the pointer.
pub struct PanTool {
    pub transform: PlotTransform,
    pub drag_button: MouseButton,
    last: Option<DVec2>,
}

impl PanTool {
    pub fn new(transform: PlotTransform) -> Self {
        Self {
            transform,
            drag_button: MouseButton::Left,
            last: None,
        }
    }

    pub fn is_panning(&self) -> bool {
        self.last.is_some()
    }

    fn pan(&mut self, position: DVec2) -> PlotResult<ToolResponse> {
        let Some(last) = self.last.replace(position) else {
            return Ok(ToolResponse::Ignored);
        };
        let delta = position - last;
        let (d_index, d_value) = match self.transform.orientation {
            Orientation::H => (delta.x, delta.y),
            Orientation::V => (delta.y, delta.x),
        };
        ViewController::pan_mapper(&mut *self.transform.index_mapper.write(), d_index)?;
        ViewController::pan_mapper(&mut *self.transform.value_mapper.write(), d_value)?;
        Ok(ToolResponse::Redraw)
    }
}

impl Tool for PanTool {
    fn dispatch(&mut self, event: &PointerEvent) -> PlotResult<ToolResponse> {
        match event {
            PointerEvent::Down { position, button, .. } if *button == self.drag_button => {
                self.last = Some(*position);
                Ok(ToolResponse::Handled)
            }
            PointerEvent::Move { position } if self.is_panning() => self.pan(*position),
            PointerEvent::Up { button, .. } if *button == self.drag_button && self.is_panning() => {
                self.last = None;
                Ok(ToolResponse::Handled)
            }
            PointerEvent::Leave if self.is_panning() => {
                self.last = None;
                Ok(ToolResponse::Handled)
            }
            _ => Ok(ToolResponse::Ignored),
        }
    }
}
