//! TIFF-structured Exif segment parsing.
//!
//! The located segment starts with the classic TIFF header (byte order
//! marker, magic 42, offset of the first IFD). Directories are walked with
//! hard bounds: a global entry budget, a cap on the primary IFD chain, and
//! a single level of sub-IFD indirection for the Exif and GPS directories.

pub(crate) mod directory;
pub(crate) mod reader;
pub(crate) mod value;

use log::debug;

use crate::error::MetadataError;
use crate::tags;
use directory::Entry;
use reader::{ByteOrder, Reader};

/// Byte order marker + magic + first IFD offset.
pub(crate) const HEADER_LEN: usize = 8;

// Upper bound on directory entries processed per decode call, across the
// primary chain and both sub-IFDs. Real images carry a few dozen.
const MAX_ENTRIES: usize = 512;
// Upper bound on chained primary IFDs (IFD0, thumbnail IFD, ...).
const MAX_CHAINED_IFDS: usize = 8;

/// All entries extracted from one segment, grouped by directory.
#[derive(Debug, Default)]
pub(crate) struct Parsed {
    pub primary: Vec<Entry>,
    pub exif: Vec<Entry>,
    pub gps: Vec<Entry>,
}

/// Parse a located Exif segment.
///
/// Header problems are structural: once a container pointed here, a
/// missing byte order marker or bad magic is an error, not "no metadata".
/// Everything after the header is best-effort.
pub(crate) fn parse(segment: &[u8]) -> Result<Parsed, MetadataError> {
    if segment.len() < HEADER_LEN {
        return Err(MetadataError::TruncatedHeader {
            format: "TIFF",
            needed: HEADER_LEN,
            len: segment.len(),
        });
    }

    let order = match [segment[0], segment[1]] {
        [0x49, 0x49] => ByteOrder::Little,
        [0x4D, 0x4D] => ByteOrder::Big,
        found => return Err(MetadataError::InvalidByteOrder { found }),
    };

    let reader = Reader::new(segment, order);
    let magic = reader.u16_at(2).unwrap_or(0);
    if magic != 42 {
        return Err(MetadataError::InvalidMagic { found: magic });
    }

    let mut parsed = Parsed::default();
    let mut budget = MAX_ENTRIES;

    // Primary chain: IFD0 plus any linked IFDs, loop-protected.
    let mut offset = reader.u32_at(4).unwrap_or(0) as usize;
    let mut visited = Vec::new();
    while offset != 0 && visited.len() < MAX_CHAINED_IFDS {
        if visited.contains(&offset) {
            debug!("IFD chain loops back to offset {offset}; stopping");
            break;
        }
        visited.push(offset);

        let (entries, next) = directory::parse(&reader, offset, &mut budget);
        parsed.primary.extend(entries);
        offset = next.unwrap_or(0);
    }

    // One level of sub-IFD indirection. The pointers live in the primary
    // chain; the sub-directories' own links are deliberately not followed.
    if let Some(exif_offset) = pointer(&parsed.primary, tags::EXIF_IFD_POINTER) {
        let (entries, _) = directory::parse(&reader, exif_offset, &mut budget);
        parsed.exif = entries;
    }
    if let Some(gps_offset) = pointer(&parsed.primary, tags::GPS_IFD_POINTER) {
        let (entries, _) = directory::parse(&reader, gps_offset, &mut budget);
        parsed.gps = entries;
    }

    Ok(parsed)
}

fn pointer(entries: &[Entry], tag: u16) -> Option<usize> {
    entries
        .iter()
        .find(|entry| entry.tag == tag)
        .and_then(|entry| entry.value.first_uint())
        .map(|offset| offset as usize)
}
