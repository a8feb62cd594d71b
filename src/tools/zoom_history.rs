use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transform::PlotTransform;

/// Index and value bounds of a view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub index: (f64, f64),
    pub value: (f64, f64),
}

impl ZoomBounds {
    /// Current bounds of the transform's ranges.
    pub fn of(transform: &PlotTransform) -> Self {
        Self {
            index: transform.index_range().read().bounds(),
            value: transform.value_range().read().bounds(),
        }
    }

    /// Sets both ranges to these bounds.
    pub fn apply_to(&self, transform: &PlotTransform) {
        transform.index_range().write().set_bounds(self.index.0, self.index.1);
        transform.value_range().write().set_bounds(self.value.0, self.value.1);
    }
}

/// One committed zoom: the view before and after.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    pub prev: ZoomBounds,
    pub next: ZoomBounds,
}

impl ZoomState {
    pub fn new(prev: ZoomBounds, next: ZoomBounds) -> Self {
        Self { prev, next }
    }

    pub fn apply(&self, transform: &PlotTransform) {
        self.next.apply_to(transform);
    }

    pub fn revert(&self, transform: &PlotTransform) {
        self.prev.apply_to(transform);
    }
}

/// Undo/redo stack of zoom states.
///
/// `position` counts the states currently applied; states past it can be
/// redone until a new state is pushed.
#[derive(Clone, Debug, Default)]
pub struct ZoomHistory {
    states: Vec<ZoomState>,
    position: usize,
}

impl ZoomHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an already-applied state, dropping anything that could have
    /// been redone.
    pub fn push(&mut self, state: ZoomState) {
        self.states.truncate(self.position);
        self.states.push(state);
        self.position = self.states.len();
    }

    /// Undoes the most recent applied state. Returns false when there is none.
    pub fn revert(&mut self, transform: &PlotTransform) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        self.states[self.position].revert(transform);
        debug!(position = self.position, "zoom reverted");
        true
    }

    /// Re-applies the next undone state. Returns false when there is none.
    pub fn redo(&mut self, transform: &PlotTransform) -> bool {
        let Some(state) = self.states.get(self.position) else {
            return false;
        };
        state.apply(transform);
        self.position += 1;
        debug!(position = self.position, "zoom redone");
        true
    }

    /// Returns to the view before the first state and clears the history.
    pub fn reset(&mut self, transform: &PlotTransform) {
        if let Some(first) = self.states.first() {
            first.revert(transform);
        }
        self.states.clear();
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.states.len()
    }

    pub fn states(&self) -> &[ZoomState] {
        &self.states
    }
}
