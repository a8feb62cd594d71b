//! Interactive tools: pointer events in, range changes out.

pub mod drag_zoom;
pub mod events;
pub mod inspector;
pub mod pan;
pub mod selecting_zoom;
pub mod zoom_history;

pub use drag_zoom::{DragZoom, DragZoomConfig};
pub use events::{ModifierKey, Modifiers, MouseButton, PointerEvent, Tool, ToolResponse};
pub use inspector::ImageInspectorTool;
pub use pan::PanTool;
pub use selecting_zoom::{
    SelectingZoom, SelectingZoomConfig, SelectionGesture, SelectionState, ToolMode, ZoomAxis, ZoomOverlay,
};
pub use zoom_history::{ZoomBounds, ZoomHistory, ZoomState};
