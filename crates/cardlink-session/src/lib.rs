//! Connection lifecycle and message dispatch for the cardlink reader link.
//!
//! This is the "just works" layer. A [`Session`] owns one serial connection,
//! reassembles the chunked byte stream into frames, classifies and decodes
//! them, and pushes [`SessionEvent`]s over a plain `mpsc` channel. Transport
//! faults never escape as errors or panics; they arrive as status events.

pub mod dispatch;
pub mod event;
pub mod session;

pub use cardlink_transport::available_ports;
pub use dispatch::{dispatch, Dispatched};
pub use event::{DataEvent, SessionEvent};
pub use session::{LinkState, Session};
