use std::sync::Arc;

use parking_lot::RwLock;

use super::events::{PointerEvent, Tool, ToolResponse};
use crate::error::PlotResult;
use crate::plot_types::{InspectImage, PixelReport};

/// Reports the image pixel under the pointer.
pub struct ImageInspectorTool<R: InspectImage> {
    image: Arc<RwLock<R>>,
    last: Option<PixelReport>,
}

impl<R: InspectImage> ImageInspectorTool<R> {
    pub fn new(image: Arc<RwLock<R>>) -> Self {
        Self { image, last: None }
    }

    /// Pixel under the last pointer position; `None` outside the image.
    pub fn report(&self) -> Option<&PixelReport> {
        self.last.as_ref()
    }
}

impl<R: InspectImage> Tool for ImageInspectorTool<R> {
    fn dispatch(&mut self, event: &PointerEvent) -> PlotResult<ToolResponse> {
        let report = match event {
            PointerEvent::Move { position } => self.image.read().inspect(*position),
            PointerEvent::Leave => None,
            _ => return Ok(ToolResponse::Ignored),
        };
        if report == self.last {
            return Ok(ToolResponse::Handled);
        }
        self.last = report;
        Ok(ToolResponse::Redraw)
    }
}
