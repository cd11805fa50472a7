//! Outbound message encoding.
//!
//! The only message this client originates is `update_position`, carrying
//! the latest throttled pointer sample and the throttle interval as `delta`.
//! `delta` is a configured constant, not a measured elapsed time; receivers
//! may use it for extrapolation but the client attaches no meaning to it.

#[cfg(test)]
#[path = "outbound_test.rs"]
mod outbound_test;

use serde::{Serialize, Serializer};

use crate::sample::{LocalSample, finite_or_zero};

/// Logical outbound message type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundKind {
    UpdatePosition,
}

impl OutboundKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdatePosition => "update_position",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionPayload {
    #[serde(serialize_with = "serialize_coordinate")]
    pub x: f64,
    #[serde(serialize_with = "serialize_coordinate")]
    pub y: f64,
    /// Throttle interval in milliseconds.
    pub delta: u64,
}

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Whole-number coordinates go out as JSON integers (`12`, not `12.0`); the
/// server decodes `x` and `y` into integer fields.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_coordinate<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        #[allow(clippy::cast_possible_truncation)]
        let whole = *value as i64;
        serializer.serialize_i64(whole)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Typed outbound envelope: `{"type": ..., "payload": {...}}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub kind: OutboundKind,
    pub payload: PositionPayload,
}

impl OutboundMessage {
    /// Render as JSON text for the transport.
    #[must_use]
    pub fn to_text(&self) -> String {
        // Every field is a plain number or fixed tag, so serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Encode a throttled sample. Non-finite coordinates are sent as `0`.
#[must_use]
pub fn encode(kind: OutboundKind, sample: &LocalSample, delta_ms: u64) -> OutboundMessage {
    OutboundMessage {
        kind,
        payload: PositionPayload { x: finite_or_zero(sample.x), y: finite_or_zero(sample.y), delta: delta_ms },
    }
}
