//! FatturaPA invoice handling for the download viewer.
//!
//! Classifies intercepted downloads, unwraps signed `.xml.p7m` payloads via
//! [`pkcs7_extractor`] and works out which file the viewer's download
//! control should offer.

mod artifact;
mod download;
mod error;
pub mod filename;
mod payload;
pub mod policy;
mod viewer;

pub use artifact::{BusMessage, InvoiceArtifact, XmlBytesMessage};
pub use download::{
    get_download_state, DownloadArtifact, DownloadMode, DownloadState, DownloadStateInput,
    LABEL_P7M, LABEL_XML,
};
pub use error::{FormatError, ResolveError, ResolveErrorKind};
pub use filename::{infer_filename, is_signed_xml_p7m, normalize_signed_filename};
pub use payload::{
    assert_signed_invoice_xml, decode_base64_to_bytes, decode_base64_to_text, encode_base64,
    resolve_payload, resolve_payload_with_policy, ResolvedPayload,
};
pub use policy::{should_handle_invoice, InterceptPolicy};
pub use viewer::{ViewerOutcome, ViewerSession};
