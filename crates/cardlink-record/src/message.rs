use serde::{Deserialize, Serialize};

/// Wire label of the read response frame.
pub const READ_DATA_RESPONSE: &str = "readDataResponse";
/// Wire label of the card-recognized event frame.
pub const CARD_RECOGNIZED_EVENT: &str = "cardRecognizedEvent";
/// Wire label of the write response frame.
pub const WRITE_DATA_RESPONSE: &str = "writeDataResponse";
/// Wire label of the outbound write command.
pub const WRITE_DATA_COMMAND: &str = "writeDataCommand";

/// The parameterless read request, sent verbatim.
///
/// This single command uses a bare `#` terminator, with no `;` before it;
/// the firmware expects exactly these bytes.
pub const READ_DATA_COMMAND: &str = "readDataCommand#";

/// Semantic kind of a frame, derived from its leading label field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    ReadDataCommand,
    WriteDataCommand,
    ReadDataResponse,
    CardRecognizedEvent,
    WriteDataResponse,
    Unrecognized,
}

impl MessageKind {
    /// Classify a frame by its first `;`-field.
    ///
    /// A trailing `#` on the label is tolerated so the bare-terminator read
    /// command classifies. Anything outside the fixed lookup is
    /// [`MessageKind::Unrecognized`]; a label substring appearing inside a
    /// later field never changes the kind.
    pub fn classify(frame: &str) -> Self {
        let label = frame.split(';').next().unwrap_or("");
        let label = label.strip_suffix('#').unwrap_or(label);
        match label {
            READ_DATA_RESPONSE => Self::ReadDataResponse,
            CARD_RECOGNIZED_EVENT => Self::CardRecognizedEvent,
            WRITE_DATA_RESPONSE => Self::WriteDataResponse,
            WRITE_DATA_COMMAND => Self::WriteDataCommand,
            "readDataCommand" => Self::ReadDataCommand,
            _ => Self::Unrecognized,
        }
    }

    /// True for the three inbound kinds that carry a card record.
    pub fn is_data_bearing(self) -> bool {
        matches!(
            self,
            Self::ReadDataResponse | Self::CardRecognizedEvent | Self::WriteDataResponse
        )
    }

    /// The wire label for this kind, if it has one.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::ReadDataResponse => Some(READ_DATA_RESPONSE),
            Self::CardRecognizedEvent => Some(CARD_RECOGNIZED_EVENT),
            Self::WriteDataResponse => Some(WRITE_DATA_RESPONSE),
            Self::WriteDataCommand => Some(WRITE_DATA_COMMAND),
            Self::ReadDataCommand => Some("readDataCommand"),
            Self::Unrecognized => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_the_three_inbound_kinds() {
        assert_eq!(
            MessageKind::classify("readDataResponse;UID;A;INFO;B;VALUE;1;#"),
            MessageKind::ReadDataResponse
        );
        assert_eq!(
            MessageKind::classify("cardRecognizedEvent;UID;A;INFO;B;VALUE;1;#"),
            MessageKind::CardRecognizedEvent
        );
        assert_eq!(
            MessageKind::classify("writeDataResponse;UID;A;INFO;B;VALUE;1;#"),
            MessageKind::WriteDataResponse
        );
    }

    #[test]
    fn classifies_outbound_commands() {
        assert_eq!(
            MessageKind::classify("writeDataCommand;UID;X;INFO;Y;VALUE;-5;#"),
            MessageKind::WriteDataCommand
        );
        assert_eq!(
            MessageKind::classify(READ_DATA_COMMAND),
            MessageKind::ReadDataCommand
        );
    }

    #[test]
    fn label_in_a_later_field_does_not_classify() {
        // The label parse keys on field 0 only; an embedded marker is inert.
        assert_eq!(
            MessageKind::classify("status;writeDataResponse happened;#"),
            MessageKind::Unrecognized
        );
        assert_eq!(
            MessageKind::classify("readDataResponse;UID;A;INFO;writeDataResponse;VALUE;1;#"),
            MessageKind::ReadDataResponse
        );
    }

    #[test]
    fn unknown_labels_are_unrecognized() {
        assert_eq!(MessageKind::classify(""), MessageKind::Unrecognized);
        assert_eq!(MessageKind::classify("ready;#"), MessageKind::Unrecognized);
        assert_eq!(
            MessageKind::classify("ReadDataResponse;UID;A;INFO;B;VALUE;1;#"),
            MessageKind::Unrecognized
        );
    }

    #[test]
    fn data_bearing_covers_exactly_the_inbound_kinds() {
        assert!(MessageKind::ReadDataResponse.is_data_bearing());
        assert!(MessageKind::CardRecognizedEvent.is_data_bearing());
        assert!(MessageKind::WriteDataResponse.is_data_bearing());
        assert!(!MessageKind::ReadDataCommand.is_data_bearing());
        assert!(!MessageKind::WriteDataCommand.is_data_bearing());
        assert!(!MessageKind::Unrecognized.is_data_bearing());
    }

    #[test]
    fn labels_round_trip_through_classify() {
        for kind in [
            MessageKind::ReadDataResponse,
            MessageKind::CardRecognizedEvent,
            MessageKind::WriteDataResponse,
            MessageKind::WriteDataCommand,
        ] {
            let label = kind.label().unwrap();
            assert_eq!(MessageKind::classify(&format!("{label};x;#")), kind);
        }
    }
}
