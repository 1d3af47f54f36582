//! Inbound frame decoding.
//!
//! [`decode`] turns one raw text frame into a [`ServerMessage`]. A frame that
//! cannot be decoded is reported as a [`DecodeError`] and dropped by the
//! caller; it is never retried. [`DecodeMonitor`] tracks consecutive failures
//! so that a stream of garbage can be surfaced as a connectivity problem.

use thiserror::Error;

use crate::protocol::ServerMessage;

/// Why a frame could not be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame is not a JSON object with a string `type` field.
    #[error("frame has no message type")]
    MissingType,
    /// The `type` field names a message this client does not understand.
    #[error("unknown message type `{0}`")]
    UnknownType(String),
    /// The frame is not valid JSON, or its fields do not match the message type.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

impl DecodeError {
    /// Returns `true` for failures that suggest a broken stream rather than a
    /// newer server speaking a larger vocabulary.
    pub fn is_corruption(&self) -> bool {
        !matches!(self, Self::UnknownType(_))
    }
}

/// Decode one inbound text frame.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing why the frame was rejected.
pub fn decode(frame: &str) -> Result<ServerMessage, DecodeError> {
    serde_json::from_str::<ServerMessage>(frame).map_err(|err| classify(frame, &err))
}

fn classify(frame: &str, err: &serde_json::Error) -> DecodeError {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(frame) else {
        return DecodeError::Malformed(err.to_string());
    };
    let Some(kind) = value.get("type").and_then(serde_json::Value::as_str) else {
        return DecodeError::MissingType;
    };
    let message = err.to_string();
    if message.starts_with(&format!("unknown variant `{kind}`")) {
        DecodeError::UnknownType(kind.to_string())
    } else {
        DecodeError::Malformed(message)
    }
}

/// Counts consecutive decode failures.
#[derive(Debug, Clone)]
pub struct DecodeMonitor {
    threshold: u32,
    consecutive: u32,
}

impl DecodeMonitor {
    /// Create a monitor that trips after `threshold` consecutive corrupt frames.
    ///
    /// A threshold of `0` is treated as `1`.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive: 0,
        }
    }

    /// Record a successfully decoded frame.
    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    /// Record a failed frame. Returns `true` exactly once per streak, when the
    /// streak reaches the threshold.
    pub fn record_failure(&mut self, err: &DecodeError) -> bool {
        if !err.is_corruption() {
            return false;
        }
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive == self.threshold
    }

    /// Current streak length.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive
    }

    /// Forget the current streak.
    pub fn reset(&mut self) {
        self.consecutive = 0;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::protocol::CountdownRole;

    #[test]
    fn decodes_countdown() {
        let msg = decode(r#"{"type":"COUNTDOWN","role":"bat","seconds":10}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Countdown {
                role: CountdownRole::Bat,
                seconds: 10
            }
        );
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            decode("not json at all"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn missing_type_is_reported() {
        assert_eq!(decode(r#"{"msg":"hi"}"#), Err(DecodeError::MissingType));
        assert_eq!(decode("[1,2,3]"), Err(DecodeError::MissingType));
    }

    #[test]
    fn unknown_type_is_reported() {
        assert_eq!(
            decode(r#"{"type":"CONFETTI"}"#),
            Err(DecodeError::UnknownType("CONFETTI".to_string()))
        );
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let err = decode(r#"{"type":"COUNTDOWN","role":"bat","seconds":"ten"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn monitor_trips_once_per_streak() {
        let mut monitor = DecodeMonitor::new(3);
        let bad = DecodeError::Malformed("x".into());
        assert!(!monitor.record_failure(&bad));
        assert!(!monitor.record_failure(&bad));
        assert!(monitor.record_failure(&bad));
        assert!(!monitor.record_failure(&bad));
        monitor.record_success();
        assert_eq!(monitor.consecutive_failures(), 0);
    }

    #[test]
    fn monitor_ignores_unknown_types() {
        let mut monitor = DecodeMonitor::new(1);
        assert!(!monitor.record_failure(&DecodeError::UnknownType("NEW".into())));
        assert!(monitor.record_failure(&DecodeError::MissingType));
    }
}
