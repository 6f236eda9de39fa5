//! Textual card-record codec and message classification.
//!
//! The card reader speaks a `;`-delimited ASCII protocol: every data frame
//! carries a leading kind label followed by the fixed
//! `UID;<uid>;INFO;<info>;VALUE;<value>` layout and the `;#` terminator.
//! This crate owns that wire format — [`CardRecord`] encode/decode and the
//! [`MessageKind`] label lookup — and nothing about transport or framing.

pub mod error;
pub mod message;
pub mod record;

pub use error::{CodecError, Result};
pub use message::{
    MessageKind, CARD_RECOGNIZED_EVENT, READ_DATA_COMMAND, READ_DATA_RESPONSE, WRITE_DATA_COMMAND,
    WRITE_DATA_RESPONSE,
};
pub use record::CardRecord;
