//! # imgmeta
//!
//! An Exif metadata decoder for untrusted image byte streams.
//!
//! Give [`decode`] the raw bytes of an image (JPEG, TIFF, PNG or WebP) and
//! optionally the media type the caller believes it has, and get back a
//! [`Metadata`] record with the well-known fields: camera make and model,
//! flash state, GPS position and altitude, description, copyright, and a
//! few companions. Every field is optional; a malformed tag costs only
//! that field, never the whole decode.
//!
//! The decoder is a pure function: no I/O, no global state, no setup step.
//! It never reads past the supplied buffer and bounds the directory walk,
//! so adversarial input degrades to an empty record, not to unbounded
//! work. Calls are independent and may run concurrently.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use imgmeta::{decode, MetadataError};
//!
//! fn main() -> Result<(), MetadataError> {
//!     let bytes = std::fs::read("photo.jpg").expect("readable file");
//!
//!     match decode(&bytes, Some("image/jpeg"))? {
//!         Some(record) => {
//!             if let Some(make) = &record.make {
//!                 println!("Make: {make}");
//!             }
//!             if let Some(point) = &record.gps {
//!                 println!("At {} / {}", point.latitude, point.longitude);
//!             }
//!             // The serialized shape is what UI layers consume: `gps` is
//!             // always an array, `altitude` a decimal string.
//!             println!("{}", serde_json::to_string(&record).expect("record serializes"));
//!         }
//!         None => println!("no metadata found"),
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod mapper;
mod record;
mod sniffer;
mod tags;
mod tiff;

pub mod ser_fn;

pub use error::MetadataError;
pub use record::{GpsPoint, Metadata};

/// Decode the metadata embedded in `bytes`.
///
/// `media_type` short-circuits container detection when it names a
/// supported format (`image/jpeg`, `image/tiff`, `image/png`,
/// `image/webp`); when absent or unrecognized, the signature bytes at the
/// start of the stream decide.
///
/// Returns:
/// - `Ok(Some(record))`: a metadata segment was found; the record holds
///   whatever fields decoded cleanly, possibly none.
/// - `Ok(None)`: no recognizable metadata in the stream. A well-formed
///   image without an Exif segment lands here, never in `Err`.
/// - `Err(..)`: structural failure only, when the declared (or
///   signature-committed) format's mandatory header is absent or
///   truncated.
pub fn decode(bytes: &[u8], media_type: Option<&str>) -> Result<Option<Metadata>, MetadataError> {
    let Some(segment) = sniffer::locate(bytes, media_type)? else {
        return Ok(None);
    };
    let parsed = tiff::parse(segment)?;
    Ok(Some(mapper::map(&parsed)))
}
