//! The intercepted file and the message that carries it to the viewer.

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, ResolveError};
use crate::filename::{infer_filename, is_signed_xml_p7m};
use crate::payload::{decode_base64_to_bytes, encode_base64};
use crate::policy::InterceptPolicy;

/// A downloaded file as reported by its origin. The MIME type is advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceArtifact {
    pub raw_bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl InvoiceArtifact {
    pub fn new(
        raw_bytes: Vec<u8>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            raw_bytes,
            filename: filename.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_signed(&self) -> bool {
        is_signed_xml_p7m(&self.filename)
    }

    pub fn should_handle(&self, policy: &InterceptPolicy) -> bool {
        policy.should_handle(&self.mime_type, &self.filename, Some(&self.raw_bytes))
    }

    pub fn to_message(&self) -> XmlBytesMessage {
        XmlBytesMessage::from_bytes(&self.raw_bytes, Some(self.filename.clone()))
    }
}

/// Messages exchanged over the extension bus, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BusMessage {
    #[serde(rename = "XML_BYTES_B64")]
    XmlBytes(XmlBytesMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlBytesMessage {
    pub b64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl XmlBytesMessage {
    pub fn from_bytes(bytes: &[u8], filename: Option<String>) -> Self {
        Self {
            b64: encode_base64(bytes),
            filename,
        }
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, ResolveError> {
        decode_base64_to_bytes(&self.b64)
    }

    /// The carried filename, or [`crate::filename::DEFAULT_FILENAME`].
    pub fn display_filename(&self) -> &str {
        infer_filename(self.filename.as_deref())
    }

    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string(&BusMessage::XmlBytes(self.clone()))?)
    }

    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let BusMessage::XmlBytes(message) = serde_json::from_str(json)?;
        Ok(message)
    }
}
