use thiserror::Error;

/// Structural decode failures.
///
/// These are the only fatal errors the crate produces: a container or TIFF
/// header that was declared (by media type or by its own signature) but is
/// absent or truncated. Malformed individual tags never surface here; they
/// are skipped field by field.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("{format} header is truncated: need {needed} bytes, have {len}")]
    TruncatedHeader {
        format: &'static str,
        needed: usize,
        len: usize,
    },

    #[error("declared media type {media_type} but the {format} signature is missing")]
    SignatureMismatch {
        media_type: String,
        format: &'static str,
    },

    #[error("invalid TIFF byte order marker {found:?} (expected 'II' or 'MM')")]
    InvalidByteOrder { found: [u8; 2] },

    #[error("invalid TIFF magic number {found} (expected 42)")]
    InvalidMagic { found: u16 },
}
