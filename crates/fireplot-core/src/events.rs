//! Feedback emitted by the engine for the UI shell (toasts, sounds).

use serde::{Deserialize, Serialize};

use crate::types::EmplacementId;

/// Outcome of an operator action worth surfacing to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Feedback {
    /// A new emplacement was placed.
    EmplacementPlaced {
        id: EmplacementId,
        elevation: f64,
        has_elevation_data: bool,
    },
    /// Placement rejected: the registry is full.
    LimitReached { capacity: usize },
    /// An emplacement was selected by tapping on it.
    EmplacementSelected { id: EmplacementId },
    /// An emplacement was deleted.
    EmplacementRemoved { id: EmplacementId },
    /// A firing solution was computed.
    SolutionReady { id: EmplacementId },
    /// The target lies beyond the range of every emplacement.
    OutOfRange,
    /// A target was tapped while no emplacement exists.
    NoEmplacement,
    /// The tap landed outside the map.
    OutsideMap,
    /// Everything was cleared.
    Reset,
}
