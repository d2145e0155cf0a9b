//! Container detection: find the TIFF-structured Exif payload inside a
//! byte stream.
//!
//! A declared media type short-circuits detection; otherwise the leading
//! signature bytes decide. A recognized container without any metadata
//! segment is an explicit "not present", never an error. The only failures
//! here are structural: a declared format whose signature is missing or
//! cut off.

use log::debug;

use crate::error::MetadataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Jpeg,
    Tiff,
    Png,
    WebP,
}

impl Container {
    fn name(self) -> &'static str {
        match self {
            Container::Jpeg => "JPEG",
            Container::Tiff => "TIFF",
            Container::Png => "PNG",
            Container::WebP => "WebP",
        }
    }

    fn signature_len(self) -> usize {
        match self {
            Container::Jpeg => 2,
            Container::Tiff => 4,
            Container::Png => 8,
            Container::WebP => 12,
        }
    }

    fn matches(self, bytes: &[u8]) -> bool {
        match self {
            Container::Jpeg => bytes.starts_with(&[0xFF, 0xD8]),
            Container::Tiff => {
                bytes.starts_with(b"II\x2A\x00") || bytes.starts_with(b"MM\x00\x2A")
            }
            Container::Png => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
            Container::WebP => {
                bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP"
            }
        }
    }
}

fn from_media_type(media_type: &str) -> Option<Container> {
    match media_type {
        "image/jpeg" | "image/jpg" => Some(Container::Jpeg),
        "image/tiff" => Some(Container::Tiff),
        "image/png" => Some(Container::Png),
        "image/webp" => Some(Container::WebP),
        _ => None,
    }
}

fn from_signature(bytes: &[u8]) -> Option<Container> {
    [
        Container::Png,
        Container::WebP,
        Container::Tiff,
        Container::Jpeg,
    ]
    .into_iter()
    .find(|c| c.matches(bytes))
}

/// Locate the Exif segment, if any.
///
/// Returns the TIFF-structured payload slice (starting at the byte order
/// marker), `Ok(None)` when no recognizable metadata is present, or a
/// structural error when the declared media type's header is absent or
/// truncated.
pub(crate) fn locate<'a>(
    bytes: &'a [u8],
    media_type: Option<&str>,
) -> Result<Option<&'a [u8]>, MetadataError> {
    let container = match media_type.and_then(from_media_type) {
        Some(declared) => {
            if !declared.matches(bytes) {
                let needed = declared.signature_len();
                return Err(if bytes.len() < needed {
                    MetadataError::TruncatedHeader {
                        format: declared.name(),
                        needed,
                        len: bytes.len(),
                    }
                } else {
                    MetadataError::SignatureMismatch {
                        media_type: media_type.unwrap_or_default().to_string(),
                        format: declared.name(),
                    }
                });
            }
            declared
        }
        None => match from_signature(bytes) {
            Some(detected) => detected,
            None => return Ok(None),
        },
    };

    Ok(match container {
        Container::Tiff => Some(bytes),
        Container::Jpeg => jpeg_app1(bytes),
        Container::Png => png_exif_chunk(bytes),
        Container::WebP => webp_exif_chunk(bytes),
    })
}

const EXIF_HEADER: &[u8] = b"Exif\0\0";

// Walk the JPEG marker stream up to the scan data, looking for an APP1
// segment with the Exif header.
fn jpeg_app1(bytes: &[u8]) -> Option<&[u8]> {
    let mut pos = 2;
    while pos + 1 < bytes.len() {
        if bytes[pos] != 0xFF {
            debug!("JPEG marker stream desynced at byte {pos}; giving up");
            return None;
        }
        let marker = bytes[pos + 1];
        pos += 2;

        match marker {
            // Fill byte before a marker.
            0xFF => {
                pos -= 1;
                continue;
            }
            // EOI or start of scan: no Exif segment before the image data.
            0xD9 | 0xDA => return None,
            // Standalone markers carry no length word.
            0x01 | 0xD0..=0xD7 => continue,
            _ => {}
        }

        if pos + 2 > bytes.len() {
            return None;
        }
        let len = u16::from_be_bytes([bytes[pos], bytes[pos + 1]]) as usize;
        if len < 2 || pos + len > bytes.len() {
            debug!("JPEG segment {marker:#04x} declares {len} bytes past the end of the stream");
            return None;
        }
        let payload = &bytes[pos + 2..pos + len];
        if marker == 0xE1 && payload.starts_with(EXIF_HEADER) {
            return Some(&payload[EXIF_HEADER.len()..]);
        }
        pos += len;
    }
    None
}

// PNG stores Exif in an optional eXIf chunk.
fn png_exif_chunk(bytes: &[u8]) -> Option<&[u8]> {
    let mut pos = 8;
    while pos + 8 <= bytes.len() {
        let len = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
            as usize;
        let chunk_type = &bytes[pos + 4..pos + 8];
        let data_start = pos + 8;
        let data_end = data_start.checked_add(len)?;
        if data_end > bytes.len() {
            debug!("PNG chunk {chunk_type:?} declares {len} bytes past the end of the stream");
            return None;
        }
        match chunk_type {
            b"eXIf" => return Some(&bytes[data_start..data_end]),
            b"IEND" => return None,
            _ => {}
        }
        // Skip data + CRC.
        pos = data_end + 4;
    }
    None
}

// WebP is RIFF; Exif lives in an EXIF chunk, with or without the JPEG-style
// Exif header prefix depending on the writer.
fn webp_exif_chunk(bytes: &[u8]) -> Option<&[u8]> {
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let fourcc = &bytes[pos..pos + 4];
        let len = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]])
            as usize;
        let data_start = pos + 8;
        let data_end = data_start.checked_add(len)?;
        if data_end > bytes.len() {
            debug!("WebP chunk {fourcc:?} declares {len} bytes past the end of the stream");
            return None;
        }
        if fourcc == b"EXIF" {
            let payload = &bytes[data_start..data_end];
            return Some(payload.strip_prefix(EXIF_HEADER).unwrap_or(payload));
        }
        // Chunks are padded to even sizes.
        pos = data_end + (len & 1);
    }
    None
}
