use log::debug;

use crate::asn::{self, AsnNode, Body, INTEGER, OBJECT_IDENTIFIER, OCTET_STRING, SEQUENCE, SET};
use crate::error::{malformed, ExtractError};

/// Content octets of the signedData content type, 1.2.840.113549.1.7.2.
const SIGNED_DATA_OID: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x02];

/// Extract the encapsulated content of a PKCS#7 SignedData envelope and decode
/// it as UTF-8 text.
pub fn extract_signed_content(der_bytes: &[u8]) -> Result<String, ExtractError> {
    let payload = extract_signed_content_bytes(der_bytes)?;
    Ok(String::from_utf8(payload)?)
}

/// Same as [`extract_signed_content`] without the UTF-8 step.
///
/// A constructed eContent OCTET STRING is flattened by concatenating its
/// segments in document order.
pub fn extract_signed_content_bytes(der_bytes: &[u8]) -> Result<Vec<u8>, ExtractError> {
    let content_info = asn::parse(der_bytes)?;
    let signed_data = signed_data(&content_info)?;
    let encap = encap_content_info(signed_data)?;

    let econtent = match encap.child(1) {
        Some(wrapper) => explicit_inner(wrapper, "eContent")?,
        None => return Err(ExtractError::EmptyContent),
    };

    let mut payload = Vec::new();
    let segments = collect_octets(econtent, &mut payload)?;
    debug!(
        "reassembled {} eContent bytes from {} segment(s)",
        payload.len(),
        segments
    );

    if payload.is_empty() {
        return Err(ExtractError::EmptyContent);
    }
    Ok(payload)
}

/// Dotted eContentType OID of the envelope, e.g. `1.2.840.113549.1.7.1` for
/// plain data.
pub fn encapsulated_content_type(der_bytes: &[u8]) -> Result<String, ExtractError> {
    let content_info = asn::parse(der_bytes)?;
    let encap = encap_content_info(signed_data(&content_info)?)?;
    let oid_node = encap
        .child(0)
        .ok_or_else(|| malformed("EncapsulatedContentInfo missing eContentType"))?;
    Ok(oid_to_string(oid_value(oid_node, "eContentType")?))
}

fn signed_data(content_info: &AsnNode) -> Result<&AsnNode, ExtractError> {
    expect_sequence(content_info, "ContentInfo")?;

    let content_type = content_info
        .child(0)
        .ok_or_else(|| malformed("ContentInfo missing contentType"))?;
    let content_type = oid_value(content_type, "contentType")?;
    if content_type != SIGNED_DATA_OID {
        return Err(malformed(format!(
            "contentType {} is not signedData",
            oid_to_string(content_type)
        )));
    }

    let wrapper = content_info
        .child(1)
        .ok_or_else(|| malformed("ContentInfo missing SignedData content"))?;
    let signed_data = explicit_inner(wrapper, "SignedData")?;
    expect_sequence(signed_data, "SignedData")?;
    Ok(signed_data)
}

fn encap_content_info(signed_data: &AsnNode) -> Result<&AsnNode, ExtractError> {
    // SignedData ::= SEQUENCE { version, digestAlgorithms, encapContentInfo, ... }
    match signed_data.child(0) {
        Some(version) if version.is_universal(INTEGER) && !version.is_constructed() => {}
        _ => return Err(malformed("SignedData version is not an INTEGER")),
    }
    match signed_data.child(1) {
        Some(algos) if algos.is_universal(SET) && algos.is_constructed() => {}
        _ => return Err(malformed("SignedData digestAlgorithms is not a SET")),
    }

    let encap = signed_data
        .child(2)
        .ok_or_else(|| malformed("SignedData missing encapContentInfo"))?;
    expect_sequence(encap, "EncapsulatedContentInfo")?;

    let content_type = encap
        .child(0)
        .ok_or_else(|| malformed("EncapsulatedContentInfo missing eContentType"))?;
    oid_value(content_type, "eContentType")?;
    Ok(encap)
}

/// Unwrap a `[0] EXPLICIT` wrapper and return the single element inside it.
fn explicit_inner<'a>(wrapper: &'a AsnNode, what: &str) -> Result<&'a AsnNode, ExtractError> {
    if !wrapper.is_context(0) || !wrapper.is_constructed() {
        return Err(malformed(format!("{what} is not wrapped in [0] EXPLICIT")));
    }
    match wrapper.children() {
        Some([inner]) => Ok(inner),
        _ => Err(malformed(format!("{what} wrapper must hold exactly one element"))),
    }
}

/// Append the octets of a primitive or constructed OCTET STRING to `out`.
/// Returns the number of primitive segments seen.
fn collect_octets(node: &AsnNode, out: &mut Vec<u8>) -> Result<usize, ExtractError> {
    if !node.is_universal(OCTET_STRING) {
        return Err(malformed(format!(
            "eContent segment has tag {:?}, expected OCTET STRING",
            node.tag()
        )));
    }
    match node.body() {
        Body::Primitive(bytes) => {
            out.extend_from_slice(bytes);
            Ok(1)
        }
        Body::Constructed(segments) => {
            let mut count = 0;
            for segment in segments {
                count += collect_octets(segment, out)?;
            }
            Ok(count)
        }
    }
}

fn expect_sequence(node: &AsnNode, what: &str) -> Result<(), ExtractError> {
    if node.is_universal(SEQUENCE) && node.is_constructed() {
        Ok(())
    } else {
        Err(malformed(format!("{what} is not a SEQUENCE")))
    }
}

fn oid_value<'a>(node: &'a AsnNode, what: &str) -> Result<&'a [u8], ExtractError> {
    match node.value() {
        Some(value) if node.is_universal(OBJECT_IDENTIFIER) => Ok(value),
        _ => Err(malformed(format!("{what} is not an OBJECT IDENTIFIER"))),
    }
}

/// Decode the content octets of an OBJECT IDENTIFIER into its arcs.
///
/// The first sub-identifier is base-128 like the others before it is split
/// into the first two arcs, so `2.999` (a two-byte first sub-identifier)
/// comes out right.
fn oid_arcs(oid: &[u8]) -> Option<Vec<u64>> {
    let mut sub_ids = Vec::new();
    let mut acc: u64 = 0;
    let mut pending = false;
    for &byte in oid {
        // 0x80 cannot start a minimally encoded sub-identifier.
        if !pending && byte == 0x80 {
            return None;
        }
        if acc > u64::MAX >> 7 {
            return None;
        }
        acc = (acc << 7) | u64::from(byte & 0x7F);
        pending = byte & 0x80 != 0;
        if !pending {
            sub_ids.push(acc);
            acc = 0;
        }
    }
    if pending {
        return None;
    }

    let (&first, rest) = sub_ids.split_first()?;
    let (a, b) = match first {
        0..=39 => (0, first),
        40..=79 => (1, first - 40),
        _ => (2, first - 80),
    };
    let mut arcs = Vec::with_capacity(sub_ids.len() + 1);
    arcs.extend([a, b]);
    arcs.extend_from_slice(rest);
    Some(arcs)
}

fn oid_to_string(oid: &[u8]) -> String {
    match oid_arcs(oid) {
        Some(arcs) => arcs
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join("."),
        None => format!("<invalid-oid {}>", hex::encode(oid)),
    }
}
