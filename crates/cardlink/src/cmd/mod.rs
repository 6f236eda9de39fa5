use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use cardlink_session::{Session, SessionEvent};
use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, INTERNAL, TIMEOUT, TRANSPORT_ERROR, USAGE};
use crate::output::OutputFormat;

pub mod ports;
pub mod read;
pub mod version;
pub mod watch;
pub mod write;

/// Collaborator-level default; the core itself does not assume a rate.
pub const DEFAULT_BAUD: u32 = 9600;

const CONNECT_WAIT: Duration = Duration::from_secs(5);

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the serial ports visible on this machine.
    Ports(PortsArgs),
    /// Request the card currently on the reader and print it.
    Read(ReadArgs),
    /// Write a card record to the reader.
    Write(WriteArgs),
    /// Stream status and data events from the reader.
    Watch(WatchArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports(args) => ports::run(args, format),
        Command::Read(args) => read::run(args, format),
        Command::Write(args) => write::run(args, format),
        Command::Watch(args) => watch::run(args, format),
        Command::Version(args) => version::run(args, format),
    }
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Serial port to connect to.
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    pub baud: u32,
    /// Maximum time to wait for a response (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Serial port to connect to.
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    pub baud: u32,
    /// Card uid field (must not contain `;`).
    #[arg(long)]
    pub uid: String,
    /// Card information field (must not contain `;`).
    #[arg(long)]
    pub info: String,
    /// Card value.
    #[arg(long)]
    pub value: i64,
    /// Wait for the reader's write response and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the response when --wait is set.
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Serial port to connect to.
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    pub baud: u32,
    /// Exit after printing N data frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {}

/// Connect and consume the session's first status notification.
///
/// The session reports connect outcomes through its event channel rather
/// than a return value; a failed open leaves it disconnected.
pub fn connect_session(
    session: &mut Session,
    events: &Receiver<SessionEvent>,
    port: &str,
    baud: u32,
) -> CliResult<()> {
    session.connect(port, baud);
    match events.recv_timeout(CONNECT_WAIT) {
        Ok(SessionEvent::Status(message)) => {
            if session.is_connected() {
                tracing::debug!(status = %message, "connected");
                Ok(())
            } else {
                Err(CliError::new(TRANSPORT_ERROR, message))
            }
        }
        Ok(SessionEvent::Data(_)) => Ok(()),
        Err(RecvTimeoutError::Timeout) => {
            Err(CliError::new(TIMEOUT, "timed out waiting for connect status"))
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(CliError::new(INTERNAL, "session event channel closed"))
        }
    }
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}
