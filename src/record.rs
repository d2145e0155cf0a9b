use chrono::NaiveDateTime;
use serde::Serialize;

/// Decoded metadata for a single image.
///
/// Every field is optional: a tag that is missing from the image, or whose
/// payload turned out to be malformed, simply leaves its field `None`. The
/// record is built once per [`crate::decode`] call and never mutated after.
///
/// The serialized form follows the boundary contract consumed by UI layers:
/// `gps` is always an array of `{latitude, longitude}` objects (empty when
/// no position was found) and `altitude` is a decimal string.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Human-readable flash state: "Flash fired", "No flash" or "unknown".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash_found: Option<String>,

    /// At most one position per image; serialized as a list at the boundary.
    #[serde(serialize_with = "crate::ser_fn::gps::list")]
    pub gps: Option<GpsPoint>,

    /// Meters relative to sea level, negative below it. Full precision is
    /// kept here; rounding for display is the caller's concern.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::ser_fn::decimal::string"
    )]
    pub altitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_original: Option<NaiveDateTime>,
}

impl Metadata {
    /// True when no tag produced a value.
    pub fn is_empty(&self) -> bool {
        *self == Metadata::default()
    }
}

/// One GPS position, kept in the raw sexagesimal shape of the GPS IFD.
///
/// `latitude` and `longitude` are each three space-separated numbers
/// (degrees, minutes, seconds). Components that could not be resolved are
/// emitted as literal `"0"` so the triple shape always holds. The
/// hemisphere is not folded into the sign; the reference tags only gate
/// whether a position is emitted at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpsPoint {
    pub latitude: String,
    pub longitude: String,
}
