use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::PlotResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys held during an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn is_down(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Shift => self.shift,
            ModifierKey::Control => self.control,
            ModifierKey::Alt => self.alt,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKey {
    Shift,
    #[default]
    Control,
    Alt,
}

/// Pointer input in screen coordinates, as delivered by the host toolkit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down {
        position: DVec2,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: DVec2,
    },
    Up {
        position: DVec2,
        button: MouseButton,
    },
    /// The pointer left the component, or another tool took ownership.
    Leave,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64, button: MouseButton) -> Self {
        PointerEvent::Down {
            position: DVec2::new(x, y),
            button,
            modifiers: Modifiers::default(),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        PointerEvent::Move {
            position: DVec2::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64, button: MouseButton) -> Self {
        PointerEvent::Up {
            position: DVec2::new(x, y),
            button,
        }
    }

    pub fn position(&self) -> Option<DVec2> {
        match self {
            PointerEvent::Down { position, .. } | PointerEvent::Move { position } | PointerEvent::Up { position, .. } => {
                Some(*position)
            }
            PointerEvent::Leave => None,
        }
    }
}

/// Outcome of dispatching an event to a tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolResponse {
    Ignored,
    Handled,
    /// Handled, and the component needs repainting.
    Redraw,
}

impl ToolResponse {
    pub fn is_handled(&self) -> bool {
        !matches!(self, ToolResponse::Ignored)
    }
}

/// An interactive tool driven by pointer events.
pub trait Tool {
    fn dispatch(&mut self, event: &PointerEvent) -> PlotResult<ToolResponse>;
}
