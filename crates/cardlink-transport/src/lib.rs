//! Serial byte-stream transport for the cardlink card reader link.
//!
//! This is the lowest layer of cardlink. It wraps the `serialport` crate
//! behind the [`LinkStream`] seam: an open connection that can be cloned so
//! one half feeds the reader loop while the other takes writes. Everything
//! above (framing, record codec, session) is transport-agnostic.

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use serial::{available_ports, SerialLink};
pub use traits::LinkStream;
