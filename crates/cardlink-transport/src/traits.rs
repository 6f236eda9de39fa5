use std::io::{Read, Write};

use crate::error::Result;

/// A connected byte stream the session can read from and write to.
///
/// The serial port is the production implementation ([`crate::SerialLink`]);
/// tests drive the session over an in-memory socket pair instead.
pub trait LinkStream: Read + Write + Send {
    /// Clone the underlying handle so reads and writes can proceed
    /// independently (the reader thread takes the clone).
    fn try_clone_stream(&self) -> Result<Box<dyn LinkStream>>;
}
