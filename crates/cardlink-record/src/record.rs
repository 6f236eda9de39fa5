use cardlink_frame::TERMINATOR;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};
use crate::message::WRITE_DATA_COMMAND;

/// One value card's state as the reader device reports it.
///
/// Immutable once constructed; mutations produce a new record. No range or
/// sign policy is applied to `card_value` here — the balance rules live with
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub uid: String,
    pub information: String,
    pub card_value: i64,
}

impl CardRecord {
    pub fn new(uid: impl Into<String>, information: impl Into<String>, card_value: i64) -> Self {
        Self {
            uid: uid.into(),
            information: information.into(),
            card_value,
        }
    }

    /// Decode a record from a `;`-delimited frame.
    ///
    /// Expected layout, zero-indexed:
    ///
    /// ```text
    /// field 0  response label
    /// field 1  "UID"      field 2  uid value
    /// field 3  "INFO"     field 4  information value
    /// field 5  "VALUE"    field 6  card value (base-10 signed integer)
    /// ```
    ///
    /// The label fields 1/3/5 are positional only; the firmware never varies
    /// them and they are not checked here.
    pub fn decode(frame: &str) -> Result<Self> {
        let fields: Vec<&str> = frame.split(';').collect();
        if fields.len() < 7 {
            return Err(CodecError::MissingFields {
                found: fields.len(),
            });
        }

        let card_value = fields[6].parse::<i64>().map_err(|source| CodecError::BadValue {
            text: fields[6].to_string(),
            source,
        })?;

        Ok(Self {
            uid: fields[2].to_string(),
            information: fields[4].to_string(),
            card_value,
        })
    }

    /// Encode this record as the write command the firmware expects:
    /// `writeDataCommand;UID;<uid>;INFO;<information>;VALUE;<value>;#`.
    ///
    /// `;` inside `uid` or `information` is not escaped and corrupts the
    /// frame; keep field values delimiter-free.
    pub fn encode(&self) -> String {
        format!(
            "{WRITE_DATA_COMMAND};UID;{};INFO;{};VALUE;{}{TERMINATOR}",
            self.uid, self.information, self.card_value
        )
    }
}
