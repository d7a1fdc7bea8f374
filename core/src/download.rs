use serde::Serialize;

use crate::filename::is_signed_xml_p7m;

pub const LABEL_XML: &str = "Download anyway";
pub const LABEL_P7M: &str = "Download original .p7m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    /// The resolved XML text.
    Xml,
    /// The original signed bytes, untouched.
    P7m,
}

/// What the download control offers. `mode` and `label` are both set or both
/// empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DownloadState {
    pub mode: Option<DownloadMode>,
    pub label: Option<&'static str>,
}

impl DownloadState {
    pub const DISABLED: DownloadState = DownloadState {
        mode: None,
        label: None,
    };

    pub fn is_enabled(&self) -> bool {
        self.mode.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadStateInput<'a> {
    pub xml_content: Option<&'a str>,
    pub original_filename: Option<&'a str>,
    pub original_b64: Option<&'a str>,
    pub had_error: bool,
}

/// Empty strings count as absent.
pub fn get_download_state(input: &DownloadStateInput<'_>) -> DownloadState {
    let present = |value: Option<&str>| value.is_some_and(|v| !v.is_empty());

    if !input.had_error && present(input.xml_content) {
        return DownloadState {
            mode: Some(DownloadMode::Xml),
            label: Some(LABEL_XML),
        };
    }

    if input.had_error
        && present(input.original_b64)
        && input
            .original_filename
            .is_some_and(|name| !name.is_empty() && is_signed_xml_p7m(name))
    {
        return DownloadState {
            mode: Some(DownloadMode::P7m),
            label: Some(LABEL_P7M),
        };
    }

    DownloadState::DISABLED
}

/// A file ready to be saved by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_after_successful_load() {
        let state = get_download_state(&DownloadStateInput {
            xml_content: Some("<FatturaElettronicaHeader/>"),
            original_filename: Some("invoice.xml"),
            original_b64: Some("abc"),
            had_error: false,
        });
        assert_eq!(
            state,
            DownloadState {
                mode: Some(DownloadMode::Xml),
                label: Some("Download anyway"),
            }
        );
    }

    #[test]
    fn test_p7m_fallback_when_signed_extraction_fails() {
        let state = get_download_state(&DownloadStateInput {
            xml_content: None,
            original_filename: Some("invoice.xml.p7m"),
            original_b64: Some("abc"),
            had_error: true,
        });
        assert_eq!(
            state,
            DownloadState {
                mode: Some(DownloadMode::P7m),
                label: Some("Download original .p7m"),
            }
        );
    }

    #[test]
    fn test_disabled_when_plain_xml_fails() {
        let state = get_download_state(&DownloadStateInput {
            xml_content: None,
            original_filename: Some("invoice.xml"),
            original_b64: Some("abc"),
            had_error: true,
        });
        assert_eq!(state, DownloadState::DISABLED);
        assert!(!state.is_enabled());
    }

    #[test]
    fn test_p7m_fallback_needs_original_bytes() {
        let state = get_download_state(&DownloadStateInput {
            original_filename: Some("invoice.xml.p7m"),
            original_b64: Some(""),
            had_error: true,
            ..Default::default()
        });
        assert_eq!(state, DownloadState::DISABLED);
    }

    #[test]
    fn test_error_wins_over_stale_content() {
        let state = get_download_state(&DownloadStateInput {
            xml_content: Some("<Root/>"),
            original_filename: Some("invoice.XML.P7M"),
            original_b64: Some("abc"),
            had_error: true,
        });
        assert_eq!(state.mode, Some(DownloadMode::P7m));
    }

    #[test]
    fn test_nothing_to_offer_without_content() {
        assert_eq!(
            get_download_state(&DownloadStateInput::default()),
            DownloadState::DISABLED
        );
    }

    #[test]
    fn test_serializes_for_the_ui() {
        let json = serde_json::to_string(&DownloadState {
            mode: Some(DownloadMode::P7m),
            label: Some(LABEL_P7M),
        })
        .unwrap();
        assert_eq!(json, r#"{"mode":"p7m","label":"Download original .p7m"}"#);
        assert_eq!(
            serde_json::to_string(&DownloadState::DISABLED).unwrap(),
            r#"{"mode":null,"label":null}"#
        );
    }
}
