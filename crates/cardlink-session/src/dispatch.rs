use cardlink_record::{CardRecord, CodecError, MessageKind};

use crate::event::DataEvent;

/// Result of classifying and decoding one reassembled frame.
pub struct Dispatched {
    pub event: DataEvent,
    /// Set when a data-bearing frame failed to decode; the event still
    /// carries the raw text.
    pub decode_error: Option<CodecError>,
}

/// Classify a frame and decode its record when it carries one.
///
/// Frames outside the known kinds (status echoes and the like) pass through
/// with the raw text only, no decode attempted. A decode failure is reported
/// per-frame; it never poisons the buffer or the connection.
pub fn dispatch(raw: String) -> Dispatched {
    let kind = MessageKind::classify(&raw);

    if !kind.is_data_bearing() {
        return Dispatched {
            event: DataEvent {
                raw,
                kind,
                record: None,
            },
            decode_error: None,
        };
    }

    match CardRecord::decode(&raw) {
        Ok(record) => Dispatched {
            event: DataEvent {
                raw,
                kind,
                record: Some(record),
            },
            decode_error: None,
        },
        Err(err) => Dispatched {
            event: DataEvent {
                raw,
                kind,
                record: None,
            },
            decode_error: Some(err),
        },
    }
}
