//! Participant records as accepted from inbound snapshots.

use std::collections::BTreeMap;

/// Full physical and display state of one participant at one instant.
///
/// Every snapshot carries a complete replacement; nothing is patched.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticipantState {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub speed: f64,
    pub acceleration: f64,
    /// Heading angle as reported by the server.
    pub heading: f64,
    pub mood: String,
}

/// One connected participant.
#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    /// Server-assigned identifier, stable for the lifetime of a connection.
    pub id: String,
    pub display_name: String,
    /// Presence palette slot in `0..=9`.
    pub color_index: u8,
    pub state: ParticipantState,
}

impl Participant {
    /// Position in origin-relative world units.
    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        (self.state.x, self.state.y)
    }
}

/// Every participant connected as of one broadcast, keyed by id.
pub type Snapshot = BTreeMap<String, Participant>;
