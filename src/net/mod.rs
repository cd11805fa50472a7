//! Networking modules for the presence protocol.
//!
//! SYSTEM CONTEXT
//! ==============
//! `outbound` encodes local position updates, `inbound` validates snapshot
//! broadcasts, and `connection` owns the websocket lifecycle that moves text
//! between the two and the session core.

pub mod connection;
pub mod inbound;
pub mod outbound;
