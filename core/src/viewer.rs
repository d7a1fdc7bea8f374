use log::{debug, warn};

use crate::artifact::XmlBytesMessage;
use crate::download::{
    get_download_state, DownloadArtifact, DownloadMode, DownloadState, DownloadStateInput,
};
use crate::error::ResolveError;
use crate::filename::infer_filename;
use crate::payload::{decode_base64_to_bytes, resolve_payload_with_policy, ResolvedPayload};
use crate::policy::{InterceptPolicy, MIME_PKCS7, MIME_XML};

/// One viewing of one intercepted file.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    b64: String,
    filename: String,
    policy: InterceptPolicy,
}

#[derive(Debug)]
pub struct ViewerOutcome {
    pub payload: Result<ResolvedPayload, ResolveError>,
    pub download: DownloadState,
}

impl ViewerSession {
    pub fn new(b64: impl Into<String>, filename: Option<&str>) -> Self {
        Self {
            b64: b64.into(),
            filename: infer_filename(filename).to_string(),
            policy: InterceptPolicy::default(),
        }
    }

    pub fn from_message(message: XmlBytesMessage) -> Self {
        let filename = message.display_filename().to_string();
        Self {
            b64: message.b64,
            filename,
            policy: InterceptPolicy::default(),
        }
    }

    /// Use `policy`'s invoice marker when validating signed content.
    pub fn with_policy(mut self, policy: InterceptPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Resolve the payload and compute the download state for the result.
    /// The XML text is for an external renderer; nothing here parses it.
    pub fn load(&self) -> ViewerOutcome {
        match resolve_payload_with_policy(&self.policy, &self.b64, &self.filename) {
            Ok(payload) => {
                debug!(
                    "resolved {} as {} ({} bytes)",
                    self.filename,
                    payload.filename,
                    payload.xml_content.len()
                );
                let download = get_download_state(&DownloadStateInput {
                    xml_content: Some(&payload.xml_content),
                    original_filename: Some(&self.filename),
                    original_b64: Some(&self.b64),
                    had_error: false,
                });
                ViewerOutcome {
                    payload: Ok(payload),
                    download,
                }
            }
            Err(err) => {
                warn!(
                    "failed to resolve {} ({:?}): {}",
                    self.filename,
                    err.kind(),
                    err
                );
                let download = get_download_state(&DownloadStateInput {
                    xml_content: None,
                    original_filename: Some(&self.filename),
                    original_b64: Some(&self.b64),
                    had_error: true,
                });
                ViewerOutcome {
                    payload: Err(err),
                    download,
                }
            }
        }
    }

    /// The file behind the download control, or `None` when it is disabled.
    pub fn download_artifact(
        &self,
        outcome: &ViewerOutcome,
    ) -> Result<Option<DownloadArtifact>, ResolveError> {
        match (outcome.download.mode, &outcome.payload) {
            (Some(DownloadMode::Xml), Ok(payload)) => Ok(Some(DownloadArtifact {
                filename: payload.filename.clone(),
                mime_type: MIME_XML,
                bytes: payload.xml_content.clone().into_bytes(),
            })),
            (Some(DownloadMode::P7m), _) => Ok(Some(DownloadArtifact {
                filename: self.filename.clone(),
                mime_type: MIME_PKCS7,
                bytes: decode_base64_to_bytes(&self.b64)?,
            })),
            _ => Ok(None),
        }
    }
}
