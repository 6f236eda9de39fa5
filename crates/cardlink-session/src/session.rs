use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use cardlink_frame::{FrameBuffer, FrameConfig};
use cardlink_record::{CardRecord, READ_DATA_COMMAND};
use cardlink_transport::{LinkStream, SerialLink, TransportError};
use tracing::{info, trace, warn};

use crate::dispatch::dispatch;
use crate::event::SessionEvent;

/// Reads are sized to the hardware's delivery cap of a few dozen bytes.
const READ_CHUNK_SIZE: usize = 64;

/// Connection state, owned exclusively by the session.
///
/// `Error` is informational: it records that the last transport operation
/// failed, but every operation remains attemptable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connected,
    Error,
}

/// Owns one serial connection to the card reader.
///
/// The session holds the write half of the link and runs a reader thread
/// over a cloned handle; the thread owns the [`FrameBuffer`] outright, so no
/// two deliveries can ever race on the accumulation. Every transport fault
/// is caught here and converted into a [`SessionEvent::Status`] — nothing
/// propagates to the owner as a panic or an error return.
pub struct Session {
    writer: Option<Box<dyn LinkStream>>,
    state: Arc<Mutex<LinkState>>,
    shutdown: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    frame_config: FrameConfig,
    events: Sender<SessionEvent>,
}

impl Session {
    /// Create a session and the channel its notifications arrive on.
    pub fn new() -> (Self, Receiver<SessionEvent>) {
        Self::with_config(FrameConfig::default())
    }

    /// Create a session with explicit frame-reassembly configuration.
    pub fn with_config(frame_config: FrameConfig) -> (Self, Receiver<SessionEvent>) {
        let (events, receiver) = channel();
        let session = Self {
            writer: None,
            state: Arc::new(Mutex::new(LinkState::Disconnected)),
            shutdown: Arc::new(AtomicBool::new(false)),
            reader: None,
            frame_config,
            events,
        };
        (session, receiver)
    }

    /// Open the named serial port and start delivering frames.
    ///
    /// On success the state becomes [`LinkState::Connected`] and a status
    /// notification names the port and baud rate. An empty port identifier
    /// or an open failure is reported as an error status instead.
    pub fn connect(&mut self, port: &str, baud_rate: u32) {
        match SerialLink::open(port, baud_rate) {
            Ok(link) => {
                let status = format!("Connected to ComPort: {port} Baudrate: {baud_rate}");
                self.attach(Box::new(link), status);
            }
            Err(err @ TransportError::NoPortSelected) => {
                // No port was touched; the state stays where it was.
                self.notify_status(format!("Error: {err}"));
            }
            Err(err) => {
                self.store_state(LinkState::Error);
                self.notify_status(format!("Error: {err}"));
            }
        }
    }

    /// Attach an already-open byte stream.
    ///
    /// This is the seam [`connect`](Self::connect) goes through; tests and
    /// alternative transports can hand in any [`LinkStream`] directly. A
    /// previous connection is quietly torn down first.
    pub fn attach(&mut self, stream: Box<dyn LinkStream>, status: impl Into<String>) {
        self.teardown();

        match stream.try_clone_stream() {
            Ok(read_half) => {
                let shutdown = Arc::new(AtomicBool::new(false));
                let handle = spawn_reader(
                    read_half,
                    self.frame_config.clone(),
                    self.events.clone(),
                    Arc::clone(&shutdown),
                    Arc::clone(&self.state),
                );
                self.writer = Some(stream);
                self.shutdown = shutdown;
                self.reader = Some(handle);
                self.store_state(LinkState::Connected);
                self.notify_status(status.into());
            }
            Err(err) => {
                self.store_state(LinkState::Error);
                self.notify_status(format!("Error: {err}"));
            }
        }
    }

    /// Close the connection.
    ///
    /// Reports `"Error: Not connected!"` when nothing is open.
    pub fn disconnect(&mut self) {
        if self.writer.is_none() {
            self.notify_status("Error: Not connected!");
            return;
        }

        self.teardown();
        self.store_state(LinkState::Disconnected);
        self.notify_status("Not connected");
    }

    /// Write a payload's UTF-8 bytes to the link. No acknowledgement, no
    /// retry; a failure flips the state to [`LinkState::Error`] and is
    /// reported as a status notification.
    pub fn send(&mut self, payload: &str) {
        let Some(writer) = self.writer.as_mut() else {
            self.notify_status("Error: Not connected!");
            return;
        };

        match writer
            .write_all(payload.as_bytes())
            .and_then(|()| writer.flush())
        {
            Ok(()) => trace!(len = payload.len(), "payload written"),
            Err(err) => {
                self.store_state(LinkState::Error);
                self.notify_status(format!("Error: {err}"));
            }
        }
    }

    /// Encode a record and send it as a write command.
    pub fn send_record(&mut self, record: &CardRecord) {
        self.send(&record.encode());
    }

    /// Ask the reader for the card currently on it.
    pub fn request_read(&mut self) {
        self.send(READ_DATA_COMMAND);
    }

    /// True iff the state is [`LinkState::Connected`] and a live write
    /// handle exists.
    pub fn is_connected(&self) -> bool {
        self.writer.is_some() && self.state() == LinkState::Connected
    }

    /// Current connection state.
    pub fn state(&self) -> LinkState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(LinkState::Error)
    }

    /// Stop the reader thread and drop the write half, quietly.
    fn teardown(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.writer = None;
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }

    fn store_state(&self, value: LinkState) {
        if let Ok(mut state) = self.state.lock() {
            *state = value;
        }
    }

    fn notify_status(&self, message: impl Into<String>) {
        let message = message.into();
        info!(status = %message, "session status");
        let _ = self.events.send(SessionEvent::Status(message));
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn spawn_reader(
    mut stream: Box<dyn LinkStream>,
    frame_config: FrameConfig,
    events: Sender<SessionEvent>,
    shutdown: Arc<AtomicBool>,
    state: Arc<Mutex<LinkState>>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut buffer = FrameBuffer::with_config(frame_config);
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            let read = match stream.read(&mut chunk) {
                Ok(0) => {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    warn!("link closed by the other end");
                    if let Ok(mut s) = state.lock() {
                        *s = LinkState::Error;
                    }
                    let _ = events.send(SessionEvent::Status("Error: connection closed".into()));
                    break;
                }
                Ok(n) => n,
                // Timeout ticks let the loop observe the shutdown flag.
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) =>
                {
                    continue;
                }
                Err(err) => {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    warn!(error = %err, "read failed");
                    if let Ok(mut s) = state.lock() {
                        *s = LinkState::Error;
                    }
                    let _ = events.send(SessionEvent::Status(format!("Error: {err}")));
                    break;
                }
            };

            match buffer.push_chunk(&chunk[..read]) {
                Ok(Some(frame)) => {
                    let dispatched = dispatch(frame);
                    if let Some(err) = dispatched.decode_error {
                        let _ = events.send(SessionEvent::Status(format!("Error: {err}")));
                    }
                    let _ = events.send(SessionEvent::Data(dispatched.event));
                }
                Ok(None) => {}
                Err(err) => {
                    // Frame-level faults are per-delivery; keep reading.
                    let _ = events.send(SessionEvent::Status(format!("Error: {err}")));
                }
            }
        }
    })
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::{Read, Write};
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    use cardlink_record::MessageKind;
    use cardlink_transport::Result as TransportResult;

    use super::*;
    use crate::event::DataEvent;

    const RECV_TIMEOUT: Duration = Duration::from_secs(2);

    /// In-memory duplex stream standing in for the serial port.
    struct PipeLink(UnixStream);

    impl PipeLink {
        /// Returns the session-side link and the "device" end of the pipe.
        fn pair() -> (PipeLink, UnixStream) {
            let (ours, device) = UnixStream::pair().expect("socket pair");
            ours.set_read_timeout(Some(Duration::from_millis(20)))
                .expect("read timeout");
            device
                .set_read_timeout(Some(Duration::from_secs(2)))
                .expect("device read timeout");
            (PipeLink(ours), device)
        }
    }

    impl Read for PipeLink {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Write for PipeLink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.0.flush()
        }
    }

    impl LinkStream for PipeLink {
        fn try_clone_stream(&self) -> TransportResult<Box<dyn LinkStream>> {
            Ok(Box::new(PipeLink(self.0.try_clone()?)))
        }
    }

    fn next_data(receiver: &Receiver<SessionEvent>) -> DataEvent {
        loop {
            match receiver.recv_timeout(RECV_TIMEOUT).expect("event") {
                SessionEvent::Data(event) => return event,
                SessionEvent::Status(_) => continue,
            }
        }
    }

    fn next_status(receiver: &Receiver<SessionEvent>) -> String {
        loop {
            match receiver.recv_timeout(RECV_TIMEOUT).expect("event") {
                SessionEvent::Status(message) => return message,
                SessionEvent::Data(_) => continue,
            }
        }
    }

    #[test]
    fn reassembles_chunked_device_writes_into_one_data_event() {
        let (link, mut device) = PipeLink::pair();
        let (mut session, events) = Session::new();
        session.attach(Box::new(link), "attached");
        assert_eq!(next_status(&events), "attached");
        assert!(session.is_connected());

        device.write_all(b"readDataResponse;UID;A1").unwrap();
        device.write_all(b"B2;INFO;note;VALUE;1").unwrap();
        device.write_all(b"50;#").unwrap();

        let data = next_data(&events);
        assert_eq!(data.raw, "readDataResponse;UID;A1B2;INFO;note;VALUE;150;#");
        assert_eq!(data.kind, MessageKind::ReadDataResponse);
        assert_eq!(data.record, Some(CardRecord::new("A1B2", "note", 150)));
    }

    #[test]
    fn request_read_writes_the_bare_terminator_command() {
        let (link, mut device) = PipeLink::pair();
        let (mut session, events) = Session::new();
        session.attach(Box::new(link), "attached");
        assert_eq!(next_status(&events), "attached");

        session.request_read();

        let mut buf = [0u8; 16];
        device.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"readDataCommand#");
    }

    #[test]
    fn send_record_writes_the_encoded_command() {
        let (link, mut device) = PipeLink::pair();
        let (mut session, events) = Session::new();
        session.attach(Box::new(link), "attached");
        assert_eq!(next_status(&events), "attached");

        session.send_record(&CardRecord::new("X", "Y", -5));

        let expected = b"writeDataCommand;UID;X;INFO;Y;VALUE;-5;#";
        let mut buf = vec![0u8; expected.len()];
        device.read_exact(&mut buf).unwrap();
        assert_eq!(buf, expected);
    }

    #[test]
    fn decode_failure_surfaces_error_status_and_raw_data() {
        let (link, mut device) = PipeLink::pair();
        let (mut session, events) = Session::new();
        session.attach(Box::new(link), "attached");
        assert_eq!(next_status(&events), "attached");

        device.write_all(b"writeDataResponse;short;#").unwrap();

        let status = next_status(&events);
        assert!(status.starts_with("Error:"), "got {status:?}");

        let data = next_data(&events);
        assert_eq!(data.kind, MessageKind::WriteDataResponse);
        assert!(data.record.is_none());

        // The pipeline stays usable for the next frame.
        device
            .write_all(b"readDataResponse;UID;A;INFO;B;VALUE;7;#")
            .unwrap();
        let data = next_data(&events);
        assert_eq!(data.record, Some(CardRecord::new("A", "B", 7)));
    }

    #[test]
    fn unrecognized_frames_pass_through_as_raw_text() {
        let (link, mut device) = PipeLink::pair();
        let (mut session, events) = Session::new();
        session.attach(Box::new(link), "attached");
        assert_eq!(next_status(&events), "attached");

        device.write_all(b"card reader ready;#").unwrap();

        let data = next_data(&events);
        assert_eq!(data.kind, MessageKind::Unrecognized);
        assert_eq!(data.raw, "card reader ready;#");
        assert!(data.record.is_none());
    }

    #[test]
    fn connect_with_empty_port_reports_no_com_port_and_stays_disconnected() {
        let (mut session, events) = Session::new();
        session.connect("", 9600);

        let status = next_status(&events);
        assert!(status.contains("No Com Port"), "got {status:?}");
        assert_eq!(session.state(), LinkState::Disconnected);
        assert!(!session.is_connected());
    }

    #[test]
    fn connect_to_missing_port_reports_error_state() {
        let (mut session, events) = Session::new();
        session.connect("/dev/cardlink-does-not-exist", 9600);

        let status = next_status(&events);
        assert!(status.starts_with("Error:"), "got {status:?}");
        assert_eq!(session.state(), LinkState::Error);
        assert!(!session.is_connected());
    }

    #[test]
    fn disconnect_when_closed_reports_not_connected_error() {
        let (mut session, events) = Session::new();
        session.disconnect();
        assert_eq!(next_status(&events), "Error: Not connected!");
        assert_eq!(session.state(), LinkState::Disconnected);
    }

    #[test]
    fn send_when_closed_reports_not_connected_error() {
        let (mut session, events) = Session::new();
        session.send("readDataCommand#");
        assert_eq!(next_status(&events), "Error: Not connected!");
    }

    #[test]
    fn disconnect_after_attach_returns_to_disconnected() {
        let (link, _device) = PipeLink::pair();
        let (mut session, events) = Session::new();
        session.attach(Box::new(link), "attached");
        assert_eq!(next_status(&events), "attached");
        assert!(session.is_connected());

        session.disconnect();
        assert_eq!(session.state(), LinkState::Disconnected);
        assert!(!session.is_connected());

        // Drain until the close status shows up; the reader may have slipped
        // in a connection-closed error first.
        loop {
            let status = next_status(&events);
            if status == "Not connected" {
                break;
            }
        }
    }

    #[test]
    fn device_hangup_surfaces_connection_closed() {
        let (link, device) = PipeLink::pair();
        let (mut session, events) = Session::new();
        session.attach(Box::new(link), "attached");
        assert_eq!(next_status(&events), "attached");

        drop(device);

        let status = next_status(&events);
        assert_eq!(status, "Error: connection closed");
        assert_eq!(session.state(), LinkState::Error);
    }

    #[test]
    fn oversized_accumulation_reports_overflow_and_recovers() {
        use cardlink_frame::OverflowPolicy;

        let config = FrameConfig {
            max_frame_size: 16,
            overflow: OverflowPolicy::Reset,
        };
        let (link, mut device) = PipeLink::pair();
        let (mut session, events) = Session::with_config(config);
        session.attach(Box::new(link), "attached");
        assert_eq!(next_status(&events), "attached");

        device.write_all(b"this-runs-well-past-the-cap").unwrap();
        let status = next_status(&events);
        assert!(status.contains("without a terminator"), "got {status:?}");

        device.write_all(b"ok;#").unwrap();
        let data = next_data(&events);
        assert_eq!(data.raw, "ok;#");
    }
}
