use cardlink_record::CardRecord;
use cardlink_session::Session;

use crate::cmd::read::wait_for_data;
use crate::cmd::{connect_session, parse_duration, WriteArgs};
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_data, OutputFormat};

pub fn run(args: WriteArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;

    // The wire format cannot escape its own delimiter.
    for (name, value) in [("--uid", &args.uid), ("--info", &args.info)] {
        if value.contains(';') {
            return Err(CliError::new(USAGE, format!("{name} must not contain ';'")));
        }
    }

    let (mut session, events) = Session::new();
    connect_session(&mut session, &events, &args.port, args.baud)?;

    let record = CardRecord::new(args.uid, args.info, args.value);
    tracing::info!(uid = %record.uid, value = record.card_value, "writing card record");
    session.send_record(&record);

    if args.wait {
        let data = wait_for_data(&events, timeout)?;
        print_data(&data, format);
    }

    Ok(SUCCESS)
}
