use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use cardlink_session::{DataEvent, Session, SessionEvent};

use crate::cmd::{connect_session, parse_duration, ReadArgs};
use crate::exit::{CliError, CliResult, DATA_INVALID, FAILURE, INTERNAL, SUCCESS, TIMEOUT};
use crate::output::{print_data, OutputFormat};

pub fn run(args: ReadArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;

    let (mut session, events) = Session::new();
    connect_session(&mut session, &events, &args.port, args.baud)?;

    session.request_read();

    let data = wait_for_data(&events, timeout)?;
    print_data(&data, format);
    Ok(SUCCESS)
}

/// Wait for the first data-bearing frame, skipping status chatter and
/// unrecognized echoes.
pub fn wait_for_data(
    events: &Receiver<SessionEvent>,
    timeout: Duration,
) -> CliResult<DataEvent> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(CliError::new(TIMEOUT, "timed out waiting for a response"));
        }

        match events.recv_timeout(remaining) {
            Ok(SessionEvent::Data(data)) if data.kind.is_data_bearing() => {
                if data.record.is_none() {
                    return Err(CliError::new(
                        DATA_INVALID,
                        format!("undecodable record frame: {}", data.raw),
                    ));
                }
                return Ok(data);
            }
            Ok(SessionEvent::Data(_)) => continue,
            Ok(SessionEvent::Status(message)) if message.starts_with("Error:") => {
                return Err(CliError::new(FAILURE, message));
            }
            Ok(SessionEvent::Status(_)) => continue,
            Err(RecvTimeoutError::Timeout) => {
                return Err(CliError::new(TIMEOUT, "timed out waiting for a response"));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(CliError::new(INTERNAL, "session event channel closed"));
            }
        }
    }
}
