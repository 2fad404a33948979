//! Upload payload checks.

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Recognizes one kind of file from its leading bytes.
pub trait ContentSniffer: Send + Sync {
    /// Returns `true` if `bytes` look like this kind of file.
    fn matches(&self, bytes: &[u8]) -> bool;

    /// Validation message for a payload that does not match.
    fn rejection(&self) -> &'static str;
}

pub const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfSniffer;

impl ContentSniffer for PdfSniffer {
    fn matches(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(PDF_MAGIC)
    }

    fn rejection(&self) -> &'static str {
        "not a valid PDF"
    }
}

/// Decodes canonical, padded standard base64.
///
/// The payload must re-encode to exactly itself, so whitespace, URL-safe
/// characters and missing padding are all rejected.
pub fn decode_base64(payload: &str) -> Option<Vec<u8>> {
    let bytes = STANDARD.decode(payload).ok()?;
    (STANDARD.encode(&bytes) == payload).then_some(bytes)
}
