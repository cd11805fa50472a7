//! Inbound snapshot validation.
//!
//! DESIGN
//! ======
//! Every inbound message is checked field by field against the snapshot
//! schema before anything reaches the view model. Validation is
//! all-or-nothing: one bad record rejects the whole message, so a partial
//! snapshot can never be reconciled. Errors name the offending field path for
//! debug logging; callers drop the message and keep their previous state.
//!
//! Wire shape:
//!
//! ```text
//! {"type": "state", "payload": {
//!     "<id>": {"username": "..", "color": 0..9, "mood": "..",
//!              "state": {"x", "y", "vx", "vy", "spd", "acc", "ang"}}}}
//! ```

#[cfg(test)]
#[path = "inbound_test.rs"]
mod inbound_test;

use serde_json::{Map, Value};

use crate::state::{Participant, ParticipantState, Snapshot};

/// Envelope tags that carry a full participant snapshot.
pub const SNAPSHOT_TYPES: &[&str] = &["state", "broadcast"];

/// Highest valid presence palette index.
pub const MAX_COLOR_INDEX: i64 = 9;

/// Reason an inbound message was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{0}` is not an object")]
    NotAnObject(String),
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("field `{field}` must be {expected}")]
    WrongType { field: String, expected: &'static str },
    #[error("field `{field}` out of range: {value}")]
    OutOfRange { field: String, value: i64 },
    #[error("unknown message type `{0}`")]
    UnknownType(String),
}

/// Parse and validate JSON text.
///
/// # Errors
///
/// Returns [`ValidationError::Json`] for malformed text and any schema error
/// from [`validate_value`].
pub fn validate_text(text: &str) -> Result<Snapshot, ValidationError> {
    let value = serde_json::from_str::<Value>(text)?;
    validate_value(&value)
}

/// Validate an already-decoded message against the snapshot schema.
///
/// # Errors
///
/// Returns the first schema violation found.
pub fn validate_value(value: &Value) -> Result<Snapshot, ValidationError> {
    let envelope = value
        .as_object()
        .ok_or_else(|| ValidationError::NotAnObject("message".to_owned()))?;

    let kind = require_str(envelope, "type", "")?;
    if !SNAPSHOT_TYPES.contains(&kind) {
        return Err(ValidationError::UnknownType(kind.to_owned()));
    }

    let payload = require_object(envelope, "payload", "")?;
    let mut snapshot = Snapshot::new();
    for (id, record) in payload {
        let participant = parse_participant(id, record)?;
        snapshot.insert(id.clone(), participant);
    }
    Ok(snapshot)
}

fn parse_participant(id: &str, record: &Value) -> Result<Participant, ValidationError> {
    let path = format!("payload.{id}");
    let record = record
        .as_object()
        .ok_or_else(|| ValidationError::NotAnObject(path.clone()))?;

    let display_name = require_str(record, "username", &path)?.to_owned();
    let color_index = require_color(record, &path)?;
    let mood = require_str(record, "mood", &path)?.to_owned();

    let state_path = format!("{path}.state");
    let state = require_object(record, "state", &path)?;
    let number = |key: &str| require_number(state, key, &state_path);

    Ok(Participant {
        id: id.to_owned(),
        display_name,
        color_index,
        state: ParticipantState {
            x: number("x")?,
            y: number("y")?,
            vx: number("vx")?,
            vy: number("vy")?,
            speed: number("spd")?,
            acceleration: number("acc")?,
            heading: number("ang")?,
            mood,
        },
    })
}

fn field_path(parent: &str, key: &str) -> String {
    if parent.is_empty() { key.to_owned() } else { format!("{parent}.{key}") }
}

fn require<'a>(obj: &'a Map<String, Value>, key: &str, parent: &str) -> Result<&'a Value, ValidationError> {
    obj.get(key)
        .ok_or_else(|| ValidationError::MissingField(field_path(parent, key)))
}

fn require_str<'a>(obj: &'a Map<String, Value>, key: &str, parent: &str) -> Result<&'a str, ValidationError> {
    require(obj, key, parent)?
        .as_str()
        .ok_or_else(|| ValidationError::WrongType { field: field_path(parent, key), expected: "a string" })
}

fn require_object<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    require(obj, key, parent)?
        .as_object()
        .ok_or_else(|| ValidationError::WrongType { field: field_path(parent, key), expected: "an object" })
}

fn require_number(obj: &Map<String, Value>, key: &str, parent: &str) -> Result<f64, ValidationError> {
    require(obj, key, parent)?
        .as_f64()
        .ok_or_else(|| ValidationError::WrongType { field: field_path(parent, key), expected: "a number" })
}

fn require_color(obj: &Map<String, Value>, parent: &str) -> Result<u8, ValidationError> {
    let field = field_path(parent, "color");
    let value = number_as_i64(require(obj, "color", parent)?)
        .ok_or_else(|| ValidationError::WrongType { field: field.clone(), expected: "an integer" })?;
    if !(0..=MAX_COLOR_INDEX).contains(&value) {
        return Err(ValidationError::OutOfRange { field, value });
    }
    u8::try_from(value).map_err(|_| ValidationError::OutOfRange { field, value })
}

fn number_as_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .and_then(|v| {
                if (i64::MIN as f64..=i64::MAX as f64).contains(&v) {
                    #[allow(clippy::cast_possible_truncation)]
                    let n = v as i64;
                    Some(n)
                } else {
                    None
                }
            })
    })
}
