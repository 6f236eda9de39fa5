mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "cardlink", version, about = "Value-card reader link CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_subcommand() {
        let cli = Cli::try_parse_from(["cardlink", "read", "/dev/ttyUSB0", "--timeout", "3s"])
            .expect("read args should parse");
        match cli.command {
            Command::Read(args) => {
                assert_eq!(args.port, "/dev/ttyUSB0");
                assert_eq!(args.baud, 9600);
            }
            other => panic!("expected read, got {other:?}"),
        }
    }

    #[test]
    fn parses_write_subcommand() {
        let cli = Cli::try_parse_from([
            "cardlink",
            "write",
            "/dev/ttyUSB0",
            "--uid",
            "A1B2",
            "--info",
            "note",
            "--value",
            "-5",
            "--wait",
        ])
        .expect("write args should parse");
        match cli.command {
            Command::Write(args) => {
                assert_eq!(args.value, -5);
                assert!(args.wait);
            }
            other => panic!("expected write, got {other:?}"),
        }
    }

    #[test]
    fn write_requires_record_fields() {
        let err = Cli::try_parse_from(["cardlink", "write", "/dev/ttyUSB0"])
            .expect_err("missing record fields should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn parses_ports_subcommand() {
        let cli = Cli::try_parse_from(["cardlink", "ports", "--format", "json"])
            .expect("ports args should parse");
        assert!(matches!(cli.command, Command::Ports(_)));
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
