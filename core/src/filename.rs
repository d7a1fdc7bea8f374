//! Filename rules for signed (`.xml.p7m`) and plain (`.xml`) invoices.

/// Name used when a download carries no filename.
pub const DEFAULT_FILENAME: &str = "download.xml";

const P7M_SUFFIX: &str = ".p7m";
const XML_SUFFIX: &str = ".xml";
const SIGNED_XML_SUFFIX: &str = ".xml.p7m";

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    let (name, suffix) = (name.as_bytes(), suffix.as_bytes());
    name.len() >= suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// `*.xml.p7m`, any case. A bare `*.p7m` is some other signed document and
/// does not qualify.
pub fn is_signed_xml_p7m(filename: &str) -> bool {
    ends_with_ignore_case(filename, SIGNED_XML_SUFFIX)
}

/// `*.xml`, any case.
pub fn is_plain_xml(filename: &str) -> bool {
    ends_with_ignore_case(filename, XML_SUFFIX)
}

/// Name under which the unwrapped XML of a signed invoice is offered.
///
/// Strips the trailing `.p7m` of a `*.xml.p7m` name, keeping the case of
/// the rest. Any other name is returned unchanged.
pub fn normalize_signed_filename(filename: &str) -> &str {
    if is_signed_xml_p7m(filename) {
        // The suffix is ASCII, so the cut lands on a char boundary.
        &filename[..filename.len() - P7M_SUFFIX.len()]
    } else {
        filename
    }
}

pub fn infer_filename(name: Option<&str>) -> &str {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_FILENAME,
    }
}
