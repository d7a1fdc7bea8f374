use std::string::FromUtf8Error;

use thiserror::Error;

/// Structural failure while reading a DER buffer.
///
/// Offsets are absolute positions in the buffer handed to [`crate::asn::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },
    #[error(
        "element at offset {offset} declares {declared} content bytes, only {available} available"
    )]
    LengthOverrun {
        offset: usize,
        declared: usize,
        available: usize,
    },
    #[error("unsupported length encoding at offset {offset}")]
    UnsupportedLength { offset: usize },
    #[error("tag number overflow at offset {offset}")]
    TagNumberOverflow { offset: usize },
    #[error("nesting too deep at offset {offset}")]
    TooDeep { offset: usize },
    #[error("trailing data after the top-level element at offset {offset}")]
    TrailingData { offset: usize },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot read signed file: {0}")]
    Parse(#[from] ParseError),
    #[error("no embedded content in PKCS#7 envelope")]
    EmptyContent,
    #[error("unexpected PKCS#7 structure: {0}")]
    MalformedEnvelope(String),
    #[error("embedded content is not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),
}

impl ExtractError {
    /// True when the bytes are not readable DER at all, as opposed to a
    /// readable envelope of the wrong shape.
    pub fn is_parse(&self) -> bool {
        matches!(self, ExtractError::Parse(_))
    }
}

pub(crate) fn malformed(msg: impl Into<String>) -> ExtractError {
    ExtractError::MalformedEnvelope(msg.into())
}
