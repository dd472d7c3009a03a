//! Wire message catalog and dispatch rules for the streaming channel.
//!
//! Frames are flat JSON objects with a `type` discriminator and a `data`
//! payload; outbound frames flatten extra fields next to `type` (PING
//! carries none). Unknown types and malformed frames never fault the
//! client.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::models::SeatDelta;
use crate::store::SeatStoreHandle;

pub const SEAT_UPDATE: &str = "SEAT_UPDATE";
pub const SEATS_UPDATE: &str = "SEATS_UPDATE";
pub const PING: &str = "PING";
pub const PONG: &str = "PONG";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    msg_type: String,
    #[serde(default)]
    data: Value,
}

/// Decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    SeatUpdate(SeatDelta),
    SeatsUpdate(Vec<SeatDelta>),
    Pong,
    /// Forward compatibility: types this client does not know yet.
    Unknown { msg_type: String },
}

pub fn decode(text: &str) -> Result<ServerMessage, SyncError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    let message = match envelope.msg_type.as_str() {
        SEAT_UPDATE => ServerMessage::SeatUpdate(serde_json::from_value(envelope.data)?),
        SEATS_UPDATE => ServerMessage::SeatsUpdate(serde_json::from_value(envelope.data)?),
        PONG => ServerMessage::Pong,
        _ => ServerMessage::Unknown {
            msg_type: envelope.msg_type,
        },
    };
    Ok(message)
}

/// Apply one inbound frame to the store. A malformed frame is logged and
/// discarded; it never reaches the connection layer.
pub fn dispatch(store: &SeatStoreHandle, text: &str) {
    match decode(text) {
        Ok(ServerMessage::SeatUpdate(delta)) => store.apply_update(&delta),
        Ok(ServerMessage::SeatsUpdate(deltas)) => store.apply_batch(&deltas),
        // Heartbeat acknowledgment, accepted and discarded.
        Ok(ServerMessage::Pong) => {}
        Ok(ServerMessage::Unknown { msg_type }) => {
            debug!(%msg_type, "unknown message type ignored");
        }
        Err(e) => warn!(error = %e, "discarding malformed frame"),
    }
}

/// Encode an outbound frame: the `type` tag with any payload fields
/// flattened alongside it.
pub fn client_frame(msg_type: &str, payload: Option<&Value>) -> String {
    let mut frame = serde_json::Map::new();
    frame.insert("type".to_string(), Value::String(msg_type.to_string()));
    if let Some(Value::Object(fields)) = payload {
        for (key, value) in fields {
            frame.insert(key.clone(), value.clone());
        }
    }
    Value::Object(frame).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Seat, SeatStatus, ShowSession};
    use chrono::Utc;

    #[test]
    fn decodes_single_seat_update() {
        let message = decode(
            r#"{"type":"SEAT_UPDATE","sessionId":"s1","data":{"seatId":"A1","status":"LOCKED","lockedBy":"user_1"}}"#,
        )
        .unwrap();

        match message {
            ServerMessage::SeatUpdate(delta) => {
                assert_eq!(delta.seat_id, "A1");
                assert_eq!(delta.status, SeatStatus::Locked);
                assert_eq!(delta.locked_by.as_deref(), Some("user_1"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn decodes_batch_update() {
        let message = decode(
            r#"{"type":"SEATS_UPDATE","data":[
                {"seatId":"A1","status":"AVAILABLE"},
                {"seatId":"A2","status":"BOOKED"}
            ]}"#,
        )
        .unwrap();

        match message {
            ServerMessage::SeatsUpdate(deltas) => {
                assert_eq!(deltas.len(), 2);
                assert!(deltas[0].locked_by.is_none());
                assert_eq!(deltas[1].status, SeatStatus::Booked);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn decodes_pong_without_data() {
        assert_eq!(decode(r#"{"type":"PONG"}"#).unwrap(), ServerMessage::Pong);
    }

    #[test]
    fn unknown_types_are_preserved_not_errors() {
        let message = decode(r#"{"type":"SESSION_CLOSED","data":{"reason":"ended"}}"#).unwrap();
        assert_eq!(
            message,
            ServerMessage::Unknown {
                msg_type: "SESSION_CLOSED".to_string()
            }
        );
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(decode("not json at all").is_err());
        assert!(decode(r#"{"data":{}}"#).is_err());
        // Known type with a payload of the wrong shape.
        assert!(decode(r#"{"type":"SEAT_UPDATE","data":{"seatId":42}}"#).is_err());
    }

    #[test]
    fn ping_frame_is_flat() {
        assert_eq!(client_frame(PING, None), r#"{"type":"PING"}"#);
    }

    #[test]
    fn client_frame_flattens_payload_fields() {
        let frame = client_frame(
            "SUBSCRIBE",
            Some(&serde_json::json!({"sessionId": "s2"})),
        );
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "SUBSCRIBE");
        assert_eq!(value["sessionId"], "s2");
    }

    #[test]
    fn dispatch_applies_updates_and_survives_garbage() {
        let store = SeatStoreHandle::new("me");
        store.load_snapshot(ShowSession {
            id: "s1".to_string(),
            movie_title: "Dune".to_string(),
            movie_poster: String::new(),
            theater: "Hall 1".to_string(),
            start_time: Utc::now(),
            end_time: Utc::now(),
            total_seats: 1,
            seats: vec![Seat {
                id: "A1".to_string(),
                row: "A".to_string(),
                number: 1,
                status: SeatStatus::Available,
                locked_by: None,
                price: 9.0,
            }],
        });

        dispatch(&store, "garbage");
        dispatch(
            &store,
            r#"{"type":"SEAT_UPDATE","data":{"seatId":"A1","status":"BOOKED"}}"#,
        );
        dispatch(&store, r#"{"type":"WHO_KNOWS","data":null}"#);

        assert_eq!(
            store.with(|s| s.seat("A1").map(|seat| seat.status)),
            Some(SeatStatus::Booked)
        );
    }
}
