//! Live cursor presence client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Participants share pointer position and a mood over one websocket. Local
//! pointer samples are throttled into `update_position` messages; the server
//! answers with full snapshots of every participant, which are validated,
//! swapped wholesale into a view model, and rendered with proximity-gated
//! mood reveal.
//!
//! Data flow: `sample` → `throttle` → `net::outbound` → websocket →
//! `net::inbound` → `state` → `render`. `session` ties the pieces together
//! and `net::connection` drives it.

pub mod config;
pub mod net;
pub mod render;
pub mod sample;
pub mod session;
pub mod state;
pub mod throttle;
