//! Single-writer presence session.
//!
//! DESIGN
//! ======
//! `Session` is the whole client-side protocol core behind one owner: local
//! samples go through the throttle into outbound messages, inbound text is
//! validated and reconciled into the view model, and rendering is a pure
//! read. The websocket driver calls into it from one task, so no locking is
//! involved.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here fails outward. Rejected inbound messages are logged at debug
//! and leave the view model untouched; non-finite samples are zeroed.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::net::connection::ConnectionStatus;
use crate::net::inbound;
use crate::net::outbound::{self, OutboundKind, OutboundMessage};
use crate::render::{self, DisplayConfig, RenderModel};
use crate::sample::LocalSample;
use crate::state::{SelfIdentity, ViewModel};
use crate::throttle::Throttle;

#[derive(Debug)]
pub struct Session {
    view: ViewModel,
    throttle: Throttle<LocalSample>,
    display: DisplayConfig,
    status: ConnectionStatus,
    delta_ms: u64,
}

impl Session {
    #[must_use]
    pub fn new(config: &ClientConfig, identity: SelfIdentity) -> Self {
        Self {
            view: ViewModel::new(identity),
            throttle: Throttle::new(config.throttle_interval),
            display: config.display(),
            status: ConnectionStatus::Uninstantiated,
            delta_ms: config.throttle_ms(),
        }
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Record a transport status change. Leaving `Open` drops any pending
    /// outbound sample.
    pub fn set_status(&mut self, status: ConnectionStatus) {
        if self.status != status {
            tracing::debug!(from = %self.status, to = %status, "connection status changed");
            self.status = status;
        }
        if status != ConnectionStatus::Open {
            self.throttle.cancel();
        }
    }

    #[must_use]
    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Feed a local sample into the throttle. Ignored unless the connection is open.
    pub fn on_sample(&mut self, sample: LocalSample, now: Instant) {
        if self.status != ConnectionStatus::Open {
            tracing::trace!(status = %self.status, "dropping sample while not open");
            return;
        }
        self.throttle.push(sample.sanitized(), now);
    }

    /// When the next outbound message becomes due, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    /// Encode the throttled sample if its deadline has passed.
    pub fn on_tick(&mut self, now: Instant) -> Option<OutboundMessage> {
        let sample = self.throttle.poll(now)?;
        Some(outbound::encode(OutboundKind::UpdatePosition, &sample, self.delta_ms))
    }

    /// Encode the throttled sample now, ahead of its deadline. Used once the
    /// local input has ended so the final position is not lost.
    pub fn flush(&mut self) -> Option<OutboundMessage> {
        let sample = self.throttle.flush()?;
        Some(outbound::encode(OutboundKind::UpdatePosition, &sample, self.delta_ms))
    }

    /// Validate and reconcile one inbound text message.
    ///
    /// Returns `true` when the view model was replaced.
    pub fn on_message(&mut self, text: &str) -> bool {
        match inbound::validate_text(text) {
            Ok(snapshot) => {
                tracing::trace!(participants = snapshot.len(), "snapshot accepted");
                self.view.reconcile(snapshot);
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "discarding inbound message");
                false
            }
        }
    }

    /// Tear down after the transport closed: cancel pending output and forget
    /// every participant.
    pub fn on_disconnect(&mut self) {
        self.view.clear();
        self.set_status(ConnectionStatus::Closed);
    }

    #[must_use]
    pub fn render(&self) -> RenderModel {
        render::derive_display(&self.view, &self.display, self.status)
    }
}
