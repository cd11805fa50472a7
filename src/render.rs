//! Presence rendering: view model in, display facts out.
//!
//! DESIGN
//! ======
//! [`derive_display`] is a pure function called synchronously after every
//! view-model change. There is no smoothing between snapshots: cursors jump
//! to each new position.
//!
//! Mood is a proximity-gated reveal. A remote participant's mood is shown
//! only while their distance to the local participant is strictly below the
//! proximity radius. Without a local entry there is no distance, so nobody's
//! mood is shown.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt;

use crate::net::connection::ConnectionStatus;
use crate::sample::Viewport;
use crate::state::{Participant, ViewModel};

pub const DEFAULT_PROXIMITY_RADIUS: f64 = 100.0;

/// Presence palette, indexed by `Participant::color_index`.
pub const PALETTE: [&str; 10] = [
    "#1E90FF", "#9B59B6", "#00CED1", "#2ECC71", "#E67E22", "#E74C3C", "#F1C40F", "#95A5A6", "#D87093", "#3CB371",
];

const FALLBACK_COLOR: &str = "#8A8178";

/// Hex colour for a palette slot; out-of-range slots get a neutral grey.
#[must_use]
pub fn palette_hex(color_index: u8) -> &'static str {
    PALETTE
        .get(usize::from(color_index))
        .copied()
        .unwrap_or(FALLBACK_COLOR)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayConfig {
    /// Screen position of the shared origin.
    pub origin: (f64, f64),
    /// Mood is revealed for remotes strictly closer than this.
    pub proximity_radius: f64,
}

impl DisplayConfig {
    #[must_use]
    pub fn new(viewport: Viewport, proximity_radius: f64) -> Self {
        Self { origin: viewport.center(), proximity_radius }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new(Viewport::default(), DEFAULT_PROXIMITY_RADIUS)
    }
}

/// Display facts for one cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorView {
    pub id: String,
    pub display_name: String,
    pub color_index: u8,
    pub color: &'static str,
    pub screen_x: f64,
    pub screen_y: f64,
    /// Distance to the local participant. `None` for the local cursor itself
    /// and whenever the local participant is unknown.
    pub distance: Option<f64>,
    /// Revealed mood, if the display policy allows it.
    pub mood: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderModel {
    pub status: ConnectionStatus,
    pub local: Option<CursorView>,
    /// Remote cursors in participant-id order.
    pub remotes: Vec<CursorView>,
}

impl RenderModel {
    /// Remote cursor by participant id.
    #[must_use]
    pub fn remote(&self, id: &str) -> Option<&CursorView> {
        self.remotes.iter().find(|c| c.id == id)
    }
}

/// Derive everything the presence view draws from the current view model.
#[must_use]
pub fn derive_display(view: &ViewModel, config: &DisplayConfig, status: ConnectionStatus) -> RenderModel {
    let local = view.local();

    let remotes = view
        .remotes()
        .map(|remote| {
            let distance = local.map(|me| euclidean(me, remote));
            let mood = distance
                .filter(|d| *d < config.proximity_radius)
                .map(|_| remote.state.mood.clone());
            cursor_view(remote, config, distance, mood)
        })
        .collect();

    RenderModel {
        status,
        local: local.map(|me| cursor_view(me, config, None, Some(me.state.mood.clone()))),
        remotes,
    }
}

fn euclidean(a: &Participant, b: &Participant) -> f64 {
    let dx = b.state.x - a.state.x;
    let dy = b.state.y - a.state.y;
    (dx * dx + dy * dy).sqrt()
}

fn cursor_view(p: &Participant, config: &DisplayConfig, distance: Option<f64>, mood: Option<String>) -> CursorView {
    CursorView {
        id: p.id.clone(),
        display_name: p.display_name.clone(),
        color_index: p.color_index,
        color: palette_hex(p.color_index),
        screen_x: p.state.x + config.origin.0,
        screen_y: p.state.y + config.origin.1,
        distance,
        mood,
    }
}

impl fmt::Display for RenderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {} remote(s)", self.status, self.remotes.len())?;
        if let Some(me) = &self.local {
            writeln!(f, "  * {} (you) {} at ({:.0}, {:.0})", me.display_name, me.color, me.screen_x, me.screen_y)?;
        }
        for cursor in &self.remotes {
            write!(f, "  - {} {} at ({:.0}, {:.0})", cursor.display_name, cursor.color, cursor.screen_x, cursor.screen_y)?;
            if let Some(d) = cursor.distance {
                write!(f, " dist {d:.1}")?;
            }
            if let Some(mood) = &cursor.mood {
                write!(f, " mood {mood}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
