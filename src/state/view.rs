//! View model and snapshot reconciliation.
//!
//! DESIGN
//! ======
//! Snapshots are total, so reconciliation is a wholesale swap of the
//! participant map: anyone missing from the latest snapshot is gone. There is
//! no diffing and no staleness check; the transport delivers in order and the
//! last snapshot received wins.
//!
//! The local participant stays in the map (proximity needs its position) and
//! is filtered out of [`ViewModel::remotes`] by id.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use super::participant::{Participant, Snapshot};

/// How this connection recognises its own entry in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelfIdentity {
    /// The participant id is known up front.
    Id(String),
    /// Only the display name used to connect is known; the id is resolved from
    /// each snapshot when exactly one participant carries that name.
    DisplayName(String),
}

/// Local projection of the room. Written only by [`ViewModel::reconcile`] and
/// [`ViewModel::clear`]; the renderer reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewModel {
    identity: SelfIdentity,
    self_id: Option<String>,
    participants: Snapshot,
}

impl ViewModel {
    #[must_use]
    pub fn new(identity: SelfIdentity) -> Self {
        let self_id = match &identity {
            SelfIdentity::Id(id) => Some(id.clone()),
            SelfIdentity::DisplayName(_) => None,
        };
        Self { identity, self_id, participants: Snapshot::new() }
    }

    #[must_use]
    pub fn self_id(&self) -> Option<&str> {
        self.self_id.as_deref()
    }

    #[must_use]
    pub fn identity(&self) -> &SelfIdentity {
        &self.identity
    }

    #[must_use]
    pub fn participants(&self) -> &Snapshot {
        &self.participants
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Replace the participant set with `snapshot`.
    pub fn reconcile(&mut self, snapshot: Snapshot) {
        if let SelfIdentity::DisplayName(name) = &self.identity {
            self.self_id = resolve_by_name(&snapshot, name);
        }
        self.participants = snapshot;
    }

    /// The local participant's entry, if the latest snapshot contained it.
    #[must_use]
    pub fn local(&self) -> Option<&Participant> {
        self.self_id
            .as_deref()
            .and_then(|id| self.participants.get(id))
    }

    /// Every participant other than the local one, in id order.
    pub fn remotes(&self) -> impl Iterator<Item = &Participant> {
        let self_id = self.self_id.as_deref();
        self.participants
            .values()
            .filter(move |p| Some(p.id.as_str()) != self_id)
    }

    /// Forget every participant, as on disconnect.
    pub fn clear(&mut self) {
        self.participants.clear();
        if matches!(self.identity, SelfIdentity::DisplayName(_)) {
            self.self_id = None;
        }
    }
}

fn resolve_by_name(snapshot: &Snapshot, name: &str) -> Option<String> {
    let mut matches = snapshot.values().filter(|p| p.display_name == name);
    let first = matches.next()?;
    if matches.next().is_some() {
        tracing::debug!(display_name = %name, "display name is shared; self id left unresolved");
        return None;
    }
    Some(first.id.clone())
}
