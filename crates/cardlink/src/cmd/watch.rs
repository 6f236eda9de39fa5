use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use cardlink_session::{Session, SessionEvent};

use crate::cmd::{connect_session, WatchArgs};
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_event, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let (mut session, events) = Session::new();
    connect_session(&mut session, &events, &args.port, args.baud)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let event = match events.recv_timeout(POLL_INTERVAL) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        print_event(&event, format);

        if let SessionEvent::Data(_) = event {
            printed = printed.saturating_add(1);
            if let Some(count) = args.count {
                if printed >= count {
                    break;
                }
            }
        }
    }

    session.disconnect();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
