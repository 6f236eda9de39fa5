use bytes::BytesMut;
use tracing::trace;

use crate::error::{FrameError, Result};

/// End-of-frame marker for `;`-delimited messages.
pub const TERMINATOR: &str = ";#";

/// Default cap on bytes accumulated while waiting for a terminator: 8 KiB.
pub const DEFAULT_MAX_FRAME: usize = 8 * 1024;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// What to do when accumulated input exceeds [`FrameConfig::max_frame_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Drop everything accumulated so far and start over.
    Reset,
    /// Refuse the incoming chunk and keep the accumulation as-is.
    Reject,
}

/// Configuration for frame reassembly.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum accumulated size in bytes. Default: 8 KiB.
    pub max_frame_size: usize,
    /// Policy applied when the cap is exceeded. Default: [`OverflowPolicy::Reset`].
    pub overflow: OverflowPolicy,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME,
            overflow: OverflowPolicy::Reset,
        }
    }
}

/// Reassembles terminator-delimited frames from arbitrarily chunked input.
///
/// The serial hardware delivers a message in small reads, so one logical
/// frame arrives as any number of partial chunks. Chunks accumulate until
/// the `;#` terminator shows up, then the whole accumulation is emitted as
/// one frame string and the buffer clears. At most one frame is in flight
/// at a time; chunks of two frames must not interleave.
pub struct FrameBuffer {
    buf: BytesMut,
    config: FrameConfig,
}

impl FrameBuffer {
    /// Create a frame buffer with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a frame buffer with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Append one chunk; returns a complete frame once the terminator is seen.
    ///
    /// The emitted frame is the entire accumulation including the terminator.
    /// Bytes trailing the terminator inside the same chunk are folded into
    /// the frame and discarded with the clear; the device speaks one message
    /// per exchange. Non-UTF-8 bytes are replaced on emit.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<Option<String>> {
        let size = self.buf.len() + chunk.len();
        if size > self.config.max_frame_size {
            if self.config.overflow == OverflowPolicy::Reset {
                self.buf.clear();
            }
            return Err(FrameError::Overflow {
                size,
                max: self.config.max_frame_size,
            });
        }

        // The terminator may straddle a chunk boundary; resume the scan one
        // byte before the new data.
        let scan_from = self.buf.len().saturating_sub(1);
        self.buf.extend_from_slice(chunk);

        if contains_terminator(&self.buf[scan_from..]) {
            let frame = String::from_utf8_lossy(&self.buf).into_owned();
            self.buf.clear();
            trace!(len = frame.len(), "frame reassembled");
            return Ok(Some(frame));
        }

        Ok(None)
    }

    /// Bytes accumulated so far without a terminator.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes accumulated so far.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial accumulation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Current reassembly configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_terminator(haystack: &[u8]) -> bool {
    haystack
        .windows(TERMINATOR.len())
        .any(|w| w == TERMINATOR.as_bytes())
}
