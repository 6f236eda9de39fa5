/// Errors that can occur while decoding a card record frame.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The frame has fewer `;`-fields than the fixed record layout requires.
    #[error("record frame has {found} fields, expected at least 7")]
    MissingFields { found: usize },

    /// The value field is not a base-10 signed integer.
    #[error("card value {text:?} is not an integer: {source}")]
    BadValue {
        text: String,
        source: std::num::ParseIntError,
    },
}

pub type Result<T> = std::result::Result<T, CodecError>;
