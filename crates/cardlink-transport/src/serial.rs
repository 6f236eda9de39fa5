use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::LinkStream;

/// An open serial connection to the card reader.
///
/// Reads time out after [`SerialLink::READ_TIMEOUT`] so a reader loop can
/// poll a shutdown flag between deliveries; the hardware hands over at most
/// a few dozen bytes per read regardless.
pub struct SerialLink {
    inner: Box<dyn SerialPort>,
    port_name: String,
    baud_rate: u32,
}

impl SerialLink {
    /// Read timeout applied to the underlying port.
    pub const READ_TIMEOUT: Duration = Duration::from_millis(50);

    /// Open a serial port at the given baud rate (blocking).
    ///
    /// An empty port identifier is rejected before touching the OS.
    pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
        if port.is_empty() {
            return Err(TransportError::NoPortSelected);
        }

        let inner = serialport::new(port, baud_rate)
            .timeout(Self::READ_TIMEOUT)
            .open()
            .map_err(|source| TransportError::Open {
                port: port.to_string(),
                source,
            })?;

        debug!(port, baud_rate, "opened serial port");

        Ok(Self {
            inner,
            port_name: port.to_string(),
            baud_rate,
        })
    }

    /// The port identifier this link was opened on.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// The baud rate this link was opened at.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl Read for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl LinkStream for SerialLink {
    fn try_clone_stream(&self) -> Result<Box<dyn LinkStream>> {
        let cloned = self.inner.try_clone()?;
        Ok(Box::new(Self {
            inner: cloned,
            port_name: self.port_name.clone(),
            baud_rate: self.baud_rate,
        }))
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("port", &self.port_name)
            .field("baud_rate", &self.baud_rate)
            .finish()
    }
}

/// Enumerate the serial port identifiers visible to the OS at call time.
///
/// No caching; the set changes as devices are plugged and unplugged.
pub fn available_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    debug!(count = ports.len(), "enumerated serial ports");
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_empty_port() {
        let result = SerialLink::open("", 9600);
        assert!(matches!(result, Err(TransportError::NoPortSelected)));
    }

    #[test]
    fn open_missing_port_fails_with_open_error() {
        let result = SerialLink::open("/dev/cardlink-does-not-exist", 9600);
        match result {
            Err(TransportError::Open { port, .. }) => {
                assert_eq!(port, "/dev/cardlink-does-not-exist");
            }
            other => panic!("expected Open error, got {other:?}"),
        }
    }

    #[test]
    fn no_port_selected_message_names_the_com_port() {
        let msg = TransportError::NoPortSelected.to_string();
        assert!(msg.contains("No Com Port"));
    }

    #[test]
    fn enumeration_does_not_fail() {
        // The list may be empty on a headless machine; the call itself
        // must still succeed.
        let ports = available_ports().expect("enumeration should succeed");
        for name in ports {
            assert!(!name.is_empty());
        }
    }
}
