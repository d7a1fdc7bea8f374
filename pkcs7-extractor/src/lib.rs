//! Unwraps the content embedded in PKCS#7 / CMS SignedData envelopes
//! (`.p7m` files).
//!
//! Signatures are not verified: the crate only walks
//! `ContentInfo -> SignedData -> EncapsulatedContentInfo` and returns the
//! eContent octets, reassembling constructed OCTET STRINGs on the way.

pub mod asn;
mod error;
pub mod pkcs7_content;

pub use asn::AsnNode;
pub use error::{ExtractError, ParseError};
pub use pkcs7_content::{
    encapsulated_content_type, extract_signed_content, extract_signed_content_bytes,
};
