//! Turns a base64 payload and its filename into previewable XML text.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pkcs7_extractor::extract_signed_content;

use crate::error::ResolveError;
use crate::filename::{is_signed_xml_p7m, normalize_signed_filename};
use crate::policy::InterceptPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPayload {
    pub xml_content: String,
    /// Name to offer the XML under; the `.p7m` suffix is gone for signed input.
    pub filename: String,
}

/// Standard alphabet, padded. ASCII whitespace (line-wrapped transport) is
/// ignored.
pub fn decode_base64_to_bytes(b64: &str) -> Result<Vec<u8>, ResolveError> {
    let compact: Cow<'_, str> = if b64.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(b64.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    } else {
        Cow::Borrowed(b64)
    };
    Ok(STANDARD.decode(compact.as_bytes())?)
}

pub fn decode_base64_to_text(b64: &str) -> Result<String, ResolveError> {
    Ok(String::from_utf8(decode_base64_to_bytes(b64)?)?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// [`InterceptPolicy::assert_invoice`] with the default marker.
pub fn assert_signed_invoice_xml(xml_content: &str) -> Result<(), ResolveError> {
    InterceptPolicy::default().assert_invoice(xml_content)
}

/// Signed (`*.xml.p7m`) input is unwrapped and must carry the invoice header;
/// anything else is decoded as UTF-8 text as is.
pub fn resolve_payload(b64: &str, filename: &str) -> Result<ResolvedPayload, ResolveError> {
    resolve_payload_with_policy(&InterceptPolicy::default(), b64, filename)
}

/// [`resolve_payload`] checking signed content against `policy`'s marker.
pub fn resolve_payload_with_policy(
    policy: &InterceptPolicy,
    b64: &str,
    filename: &str,
) -> Result<ResolvedPayload, ResolveError> {
    if is_signed_xml_p7m(filename) {
        let der = decode_base64_to_bytes(b64)?;
        let xml_content = extract_signed_content(&der)?;
        policy.assert_invoice(&xml_content)?;
        return Ok(ResolvedPayload {
            xml_content,
            filename: normalize_signed_filename(filename).to_string(),
        });
    }

    Ok(ResolvedPayload {
        xml_content: decode_base64_to_text(b64)?,
        filename: filename.to_string(),
    })
}
