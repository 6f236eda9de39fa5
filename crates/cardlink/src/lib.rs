//! Value-card reader link over serial.
//!
//! cardlink exchanges small account-style records (uid, free-text note,
//! signed balance) with a microcontroller-attached card reader. The serial
//! hardware delivers data in small arbitrary chunks, so the heart of the
//! crate is reassembling application frames from partial deliveries before
//! parsing them.
//!
//! # Crate Structure
//!
//! - [`transport`] — Serial byte-stream abstraction over `serialport`
//! - [`frame`] — Terminator-delimited frame reassembly
//! - [`record`] — Card-record codec and message classification
//! - [`session`] — Connection lifecycle and dispatch (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use cardlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use cardlink_frame::*;
}

/// Re-export record codec types.
pub mod record {
    pub use cardlink_record::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use cardlink_session::*;
}
