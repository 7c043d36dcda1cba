//! Input model: tools, the placement brush, mouse buttons, and the gesture
//! state machine.
//!
//! `Tool` and `Brush` capture what a primary click should do. `InputState`
//! is the gesture tracked between pointer-down and pointer-up.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{Cell, Point};
use crate::doc::{EntityRef, LayerKind, Rotation};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select the topmost entity and drag objects (default).
    #[default]
    Move,
    /// Stamp the current brush into the clicked cell.
    Place,
    /// Turn the topmost entity a quarter turn clockwise.
    Rotate,
    /// Remove the topmost entity.
    Delete,
}

impl Tool {
    /// Whether a primary click with this tool mutates the document.
    #[must_use]
    pub fn is_editing(self) -> bool {
        matches!(self, Self::Place | Self::Rotate | Self::Delete)
    }
}

/// What the place tool stamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brush {
    /// Target layer.
    pub layer: LayerKind,
    /// Asset reference; nothing is placed while empty.
    pub asset: String,
    pub rotation: Rotation,
}

impl Default for Brush {
    fn default() -> Self {
        Self { layer: LayerKind::Tiles, asset: String::new(), rotation: Rotation::Deg0 }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Persistent UI state.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    pub brush: Brush,
}

/// Gesture in progress.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// Waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the view.
    Panning {
        /// Screen-space position of the previous pointer event.
        last: Point,
    },
    /// Moving an object by whole cells.
    Dragging {
        entity: EntityRef,
        /// Snapped cell under the pointer when the drag started.
        anchor: Cell,
        /// Object cell when the drag started.
        origin: Cell,
    },
}
