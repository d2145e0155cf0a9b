use log::debug;

use super::reader::Reader;
use super::value::{self, TypeCode, Value};

/// One resolved directory entry: the tag id and its decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entry {
    pub tag: u16,
    pub value: Value,
}

const ENTRY_LEN: usize = 12;
// Payloads of at most four bytes live inside the entry itself.
const INLINE_LEN: usize = 4;

/// Walk one IFD.
///
/// Returns the entries that could be resolved plus the offset of the next
/// IFD in the chain (`None` when the chain ends or the link is unreadable).
/// Malformed entries are skipped individually: an unknown type code, a
/// count that overflows, or a payload outside the buffer costs only that
/// entry, never the rest of the directory. A directory whose declared
/// count runs past the end of the stream yields the complete entries that
/// fit.
///
/// `budget` bounds the total number of entries processed across all
/// directories of one decode call.
pub(crate) fn parse(
    reader: &Reader,
    offset: usize,
    budget: &mut usize,
) -> (Vec<Entry>, Option<usize>) {
    let Some(declared) = reader.u16_at(offset) else {
        debug!("IFD at offset {offset} has no entry count; nothing to parse");
        return (Vec::new(), None);
    };

    let mut entries = Vec::new();
    let mut walked = 0usize;

    for index in 0..usize::from(declared) {
        if *budget == 0 {
            debug!("entry budget exhausted after {walked} entries; stopping");
            break;
        }
        let pos = offset + 2 + index * ENTRY_LEN;
        if reader.bytes_at(pos, ENTRY_LEN).is_none() {
            debug!("IFD truncated after {walked} of {declared} entries");
            break;
        }
        *budget -= 1;
        walked += 1;

        if let Some(entry) = parse_entry(reader, pos) {
            entries.push(entry);
        }
    }

    // The next-IFD link sits right after the declared entry table. Only
    // trust it when every declared entry was actually walked.
    let next = if walked == usize::from(declared) {
        reader
            .u32_at(offset + 2 + walked * ENTRY_LEN)
            .map(|v| v as usize)
            .filter(|&v| v != 0)
    } else {
        None
    };

    (entries, next)
}

fn parse_entry(reader: &Reader, pos: usize) -> Option<Entry> {
    let tag = reader.u16_at(pos)?;
    let raw_kind = reader.u16_at(pos + 2)?;
    let count = reader.u32_at(pos + 4)?;

    let Some(kind) = TypeCode::from_u16(raw_kind) else {
        debug!("tag {tag:#06x}: unknown type code {raw_kind}, skipping");
        return None;
    };

    let Some(byte_len) = (count as usize).checked_mul(kind.size()) else {
        debug!("tag {tag:#06x}: component count {count} overflows, skipping");
        return None;
    };

    let payload = if byte_len <= INLINE_LEN {
        reader.bytes_at(pos + 8, byte_len)?
    } else {
        let value_offset = reader.u32_at(pos + 8)? as usize;
        match reader.bytes_at(value_offset, byte_len) {
            Some(bytes) => bytes,
            None => {
                debug!(
                    "tag {tag:#06x}: payload of {byte_len} bytes at offset {value_offset} is out \
                     of bounds (stream is {} bytes), skipping",
                    reader.len()
                );
                return None;
            }
        }
    };

    Some(Entry {
        tag,
        value: value::decode(kind, payload, reader.order),
    })
}
