use cardlink_record::{CardRecord, MessageKind};
use serde::Serialize;

/// Notifications the session pushes toward its owner.
///
/// The owner receives these from the channel returned by
/// [`crate::Session::new`]; the session never reports through any other
/// path, and never lets a transport or decode fault escape as a panic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// Human-readable connection state change or error.
    Status(String),
    /// A complete reassembled frame, classified and decoded when possible.
    Data(DataEvent),
}

/// One reassembled frame as delivered to the owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataEvent {
    /// The raw frame text, terminator included.
    pub raw: String,
    /// Kind derived from the frame's leading label field.
    pub kind: MessageKind,
    /// The decoded record, present only for data-bearing kinds that decoded
    /// cleanly.
    pub record: Option<CardRecord>,
}
