//! Input delivered to the engine by the UI shell.
//!
//! Gesture recognition happens outside the engine; these are the already
//! recognized, discrete events with screen coordinates.

use serde::{Deserialize, Serialize};

use crate::types::EmplacementId;

/// A recognized touch gesture in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GestureEvent {
    /// First contact went down.
    PointerDown { x: f64, y: f64 },
    /// Primary contact moved; `pointers` is the number of active contacts.
    PointerMove { x: f64, y: f64, pointers: u8 },
    /// A contact was lifted.
    PointerUp,
    /// A two-finger pinch started.
    ScaleBegin,
    /// Incremental pinch step around a focus point.
    Scale {
        focus_x: f64,
        focus_y: f64,
        factor: f64,
    },
    /// The pinch ended.
    ScaleEnd,
    /// Single tap: select an emplacement or designate a target.
    Tap { x: f64, y: f64 },
    /// Double tap: place an emplacement.
    DoubleTap { x: f64, y: f64 },
}

/// All operator actions the engine reacts to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineCommand {
    /// A touch gesture.
    Gesture { gesture: GestureEvent },
    /// The viewport was resized.
    Resize { width: f64, height: f64 },
    /// Delete the currently selected emplacement.
    DeleteSelected,
    /// Delete a specific emplacement.
    DeleteEmplacement { id: EmplacementId },
    /// Remove all emplacements, the target and the solution.
    Reset,
}

impl From<GestureEvent> for EngineCommand {
    fn from(gesture: GestureEvent) -> Self {
        EngineCommand::Gesture { gesture }
    }
}
