use std::string::FromUtf8Error;

use pkcs7_extractor::ExtractError;
use thiserror::Error;

/// Coarse classification of a [`ResolveError`], for callers that pick a
/// message or a fallback without inspecting the error chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveErrorKind {
    Decode,
    Parse,
    EmptyContent,
    MalformedEnvelope,
    NotAnInvoice,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("Signed XML is not a FatturaPA invoice.")]
    NotAnInvoice,
}

impl ResolveError {
    pub fn kind(&self) -> ResolveErrorKind {
        match self {
            ResolveError::Base64(_) | ResolveError::InvalidUtf8(_) => ResolveErrorKind::Decode,
            ResolveError::Extract(err) => match err {
                ExtractError::Parse(_) => ResolveErrorKind::Parse,
                ExtractError::EmptyContent => ResolveErrorKind::EmptyContent,
                ExtractError::MalformedEnvelope(_) => ResolveErrorKind::MalformedEnvelope,
                ExtractError::InvalidUtf8(_) => ResolveErrorKind::Decode,
            },
            ResolveError::NotAnInvoice => ResolveErrorKind::NotAnInvoice,
        }
    }

    /// Short text suitable for the viewer's status line.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ResolveErrorKind::Decode => "Cannot decode the downloaded file.",
            ResolveErrorKind::Parse => "Cannot read signed file.",
            ResolveErrorKind::EmptyContent => "No embedded content in PKCS#7 envelope.",
            ResolveErrorKind::MalformedEnvelope => "Unsupported signed file structure.",
            ResolveErrorKind::NotAnInvoice => "Signed XML is not a FatturaPA invoice.",
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
