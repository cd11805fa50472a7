//! Client-side projection of the shared presence room.
//!
//! SYSTEM CONTEXT
//! ==============
//! `participant` defines the validated per-participant records, and `view`
//! holds the view model that every accepted snapshot replaces wholesale.

pub mod participant;
pub mod view;

pub use participant::{Participant, ParticipantState, Snapshot};
pub use view::{SelfIdentity, ViewModel};
