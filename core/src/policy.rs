//! Decides whether an intercepted download is an invoice worth previewing.
//!
//! Signed payloads are gated on MIME type and extension only, since their
//! content is binary until unwrapped. Plain XML is cheap to sniff, so the
//! invoice header marker is the final word there.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, ResolveError};
use crate::filename::{is_plain_xml, is_signed_xml_p7m};

pub const INVOICE_HEADER_MARKER: &str = "<FatturaElettronicaHeader";

pub const MIME_XML: &str = "application/xml";
pub const MIME_PKCS7: &str = "application/pkcs7-mime";
/// Some mail backends label legitimate invoice attachments with the generic
/// binary type, so it is accepted by default. See [`InterceptPolicy::strict`].
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

const DEFAULT_ALLOWED_MIME_TYPES: [&str; 3] = [MIME_XML, MIME_PKCS7, MIME_OCTET_STREAM];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptPolicy {
    /// Compared case-insensitively against the reported MIME type.
    pub allowed_mime_types: Vec<String>,
    pub invoice_marker: String,
}

impl Default for InterceptPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            invoice_marker: INVOICE_HEADER_MARKER.to_string(),
        }
    }
}

impl InterceptPolicy {
    /// Default policy without the `application/octet-stream` allowance.
    pub fn strict() -> Self {
        let mut policy = Self::default();
        policy
            .allowed_mime_types
            .retain(|m| !m.eq_ignore_ascii_case(MIME_OCTET_STREAM));
        policy
    }

    /// Load a policy from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_allowed_mime(&self, mime: &str) -> bool {
        !mime.is_empty()
            && self
                .allowed_mime_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(mime))
    }

    pub fn contains_invoice_marker(&self, text: &str) -> bool {
        text.contains(self.invoice_marker.as_str())
    }

    /// Content unwrapped from a signed file must carry the invoice marker.
    pub fn assert_invoice(&self, xml_content: &str) -> Result<(), ResolveError> {
        if self.contains_invoice_marker(xml_content) {
            Ok(())
        } else {
            Err(ResolveError::NotAnInvoice)
        }
    }

    /// `bytes` is only consulted for plain `*.xml` names; without it such a
    /// file is rejected.
    pub fn should_handle(&self, mime: &str, filename: &str, bytes: Option<&[u8]>) -> bool {
        if !self.is_allowed_mime(mime) {
            debug!("skipping {filename}: MIME type {mime:?} not allowed");
            return false;
        }
        if !is_allowed_extension(filename) {
            debug!("skipping {filename}: not an .xml or .xml.p7m name");
            return false;
        }
        if !requires_header_sniff(filename) {
            return true;
        }

        let Some(bytes) = bytes else {
            debug!("skipping {filename}: no bytes to sniff");
            return false;
        };
        let handled = self.contains_invoice_marker(&String::from_utf8_lossy(bytes));
        if !handled {
            debug!("skipping {filename}: no invoice header found");
        }
        handled
    }
}

pub fn is_allowed_mime(mime: &str) -> bool {
    InterceptPolicy::default().is_allowed_mime(mime)
}

pub fn is_allowed_extension(filename: &str) -> bool {
    is_plain_xml(filename) || is_signed_xml_p7m(filename)
}

/// Only plain XML is sniffed; PKCS#7 content is binary before extraction.
pub fn requires_header_sniff(filename: &str) -> bool {
    is_plain_xml(filename)
}

pub fn contains_fattura_header(text: &str) -> bool {
    InterceptPolicy::default().contains_invoice_marker(text)
}

/// [`InterceptPolicy::should_handle`] with the default policy.
pub fn should_handle_invoice(mime: &str, filename: &str, bytes: Option<&[u8]>) -> bool {
    InterceptPolicy::default().should_handle(mime, filename, bytes)
}
