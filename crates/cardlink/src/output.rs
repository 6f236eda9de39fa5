use std::io::IsTerminal;

use cardlink_record::MessageKind;
use cardlink_session::{DataEvent, SessionEvent};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PortsOutput<'a> {
    ports: &'a [String],
}

pub fn print_ports(ports: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PortsOutput { ports };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT"]);
            for port in ports {
                table.add_row(vec![port.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for port in ports {
                println!("{port}");
            }
        }
    }
}

pub fn print_data(event: &DataEvent, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "UID", "INFO", "VALUE"]);
            match &event.record {
                Some(record) => {
                    table.add_row(vec![
                        kind_name(event.kind).to_string(),
                        record.uid.clone(),
                        record.information.clone(),
                        record.card_value.to_string(),
                    ]);
                }
                None => {
                    table.add_row(vec![
                        kind_name(event.kind).to_string(),
                        "-".to_string(),
                        event.raw.clone(),
                        "-".to_string(),
                    ]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => match &event.record {
            Some(record) => println!(
                "kind={} uid={} info={} value={}",
                kind_name(event.kind),
                record.uid,
                record.information,
                record.card_value
            ),
            None => println!("kind={} raw={}", kind_name(event.kind), event.raw),
        },
        OutputFormat::Raw => {
            println!("{}", event.raw);
        }
    }
}

pub fn print_event(event: &SessionEvent, format: OutputFormat) {
    match event {
        SessionEvent::Data(data) => print_data(data, format),
        SessionEvent::Status(message) => match format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table | OutputFormat::Pretty => println!("status: {message}"),
            OutputFormat::Raw => println!("{message}"),
        },
    }
}

pub fn kind_name(kind: MessageKind) -> &'static str {
    kind.label().unwrap_or("unrecognized")
}
