//! Terminator-delimited frame reassembly for chunked serial input.
//!
//! This is the core value-add layer of cardlink. The serial link delivers
//! data in small, arbitrarily-sized chunks; [`FrameBuffer`] absorbs them and
//! emits one complete frame per `;#` terminator occurrence. No partial
//! deliveries, no buffer management in user code.

pub mod buffer;
pub mod error;

pub use buffer::{FrameBuffer, FrameConfig, OverflowPolicy, DEFAULT_MAX_FRAME, TERMINATOR};
pub use error::{FrameError, Result};
