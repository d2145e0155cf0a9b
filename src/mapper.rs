//! Assembles the output record from resolved directory entries.
//!
//! Simple tags go through a fixed tag→setter table. GPS and altitude are
//! composite: their parts are accumulated from the GPS sub-directory and
//! combined at the end, with all-or-nothing gating for the position.

use chrono::NaiveDateTime;
use log::{debug, trace};

use crate::record::{GpsPoint, Metadata};
use crate::tags;
use crate::tiff::directory::Entry;
use crate::tiff::value::Value;
use crate::tiff::Parsed;

type Setter = fn(&mut Metadata, &Value);

// Tags of the primary and Exif directories that map 1:1 onto a record
// field. Duplicated tags follow last-write-wins, like the original field
// loop this replaces.
const RECORD_FIELDS: &[(u16, Setter)] = &[
    (tags::IMAGE_DESCRIPTION, set_description),
    (tags::MAKE, set_make),
    (tags::MODEL, set_model),
    (tags::SOFTWARE, set_software),
    (tags::ARTIST, set_artist),
    (tags::COPYRIGHT, set_copyright),
    (tags::DATE_TIME_ORIGINAL, set_date_time_original),
    (tags::FLASH, set_flash),
];

pub(crate) fn map(parsed: &Parsed) -> Metadata {
    let mut record = Metadata::default();

    for entry in parsed.primary.iter().chain(&parsed.exif) {
        match RECORD_FIELDS.iter().find(|(tag, _)| *tag == entry.tag) {
            Some((_, setter)) => setter(&mut record, &entry.value),
            None => trace!("tag {:#06x} has no record field", entry.tag),
        }
    }

    let gps = GpsRaw::accumulate(&parsed.gps);
    record.gps = gps.position();
    record.altitude = gps.altitude();

    record
}

fn set_make(record: &mut Metadata, value: &Value) {
    record.make = text(value);
}

fn set_model(record: &mut Metadata, value: &Value) {
    record.model = text(value);
}

fn set_description(record: &mut Metadata, value: &Value) {
    record.description = text(value);
}

fn set_copyright(record: &mut Metadata, value: &Value) {
    record.copyright = text(value);
}

fn set_software(record: &mut Metadata, value: &Value) {
    record.software = text(value);
}

fn set_artist(record: &mut Metadata, value: &Value) {
    record.artist = text(value);
}

fn set_flash(record: &mut Metadata, value: &Value) {
    record.flash_found = value.first_uint().map(|bits| flash_label(bits).to_string());
}

fn set_date_time_original(record: &mut Metadata, value: &Value) {
    record.date_time_original = value.as_text().and_then(|s| {
        NaiveDateTime::parse_from_str(s.trim(), "%Y:%m:%d %H:%M:%S")
            .map_err(|err| debug!("unparsable DateTimeOriginal {s:?}: {err}"))
            .ok()
    });
}

// A string tag of the wrong type is a field-level failure; an empty string
// is a present value. The caller can tell the two apart.
fn text(value: &Value) -> Option<String> {
    value.as_text().map(str::to_string)
}

// Bits 0..=6 of the flash word are defined by the standard; the low bit is
// the fired flag. Anything touching the reserved bits gets "unknown"
// rather than a guess.
const FLASH_DEFINED_BITS: u64 = 0x7F;

fn flash_label(bits: u64) -> &'static str {
    if bits & !FLASH_DEFINED_BITS != 0 {
        "unknown"
    } else if bits & 0x01 != 0 {
        "Flash fired"
    } else {
        "No flash"
    }
}

/// Raw parts of the GPS sub-directory, prior to composition.
#[derive(Debug, Default)]
struct GpsRaw<'a> {
    latitude: Option<&'a [(u32, u32)]>,
    latitude_ref: Option<&'a str>,
    longitude: Option<&'a [(u32, u32)]>,
    longitude_ref: Option<&'a str>,
    altitude: Option<(u32, u32)>,
    altitude_ref: Option<u64>,
}

impl<'a> GpsRaw<'a> {
    fn accumulate(entries: &'a [Entry]) -> Self {
        let mut raw = GpsRaw::default();
        for entry in entries {
            match entry.tag {
                tags::GPS_LATITUDE => raw.latitude = entry.value.rationals(),
                tags::GPS_LATITUDE_REF => raw.latitude_ref = entry.value.as_text(),
                tags::GPS_LONGITUDE => raw.longitude = entry.value.rationals(),
                tags::GPS_LONGITUDE_REF => raw.longitude_ref = entry.value.as_text(),
                tags::GPS_ALTITUDE => {
                    raw.altitude = entry.value.rationals().and_then(|r| r.first().copied())
                }
                tags::GPS_ALTITUDE_REF => raw.altitude_ref = entry.value.first_uint(),
                other => trace!("GPS tag {other:#06x} has no record field"),
            }
        }
        raw
    }

    /// A position is emitted only when both coordinates and both
    /// hemisphere references resolved; partial combinations yield nothing.
    /// The references gate presence but are not folded into the sign.
    fn position(&self) -> Option<GpsPoint> {
        let latitude = self.latitude?;
        let longitude = self.longitude?;
        self.latitude_ref?;
        self.longitude_ref?;

        Some(GpsPoint {
            latitude: sexagesimal(latitude),
            longitude: sexagesimal(longitude),
        })
    }

    /// Altitude in meters; reference value 1 means below sea level.
    fn altitude(&self) -> Option<f64> {
        let (num, den) = self.altitude?;
        if den == 0 {
            debug!("GPS altitude has a zero denominator; dropping the field");
            return None;
        }
        let meters = f64::from(num) / f64::from(den);
        Some(if self.altitude_ref == Some(1) {
            -meters
        } else {
            meters
        })
    }
}

// Always three space-separated components; anything unresolvable inside a
// component renders as "0" so the shape stays fixed.
fn sexagesimal(components: &[(u32, u32)]) -> String {
    let part = |i: usize| match components.get(i) {
        Some(&(_, 0)) | None => "0".to_string(),
        Some(&(num, den)) => (f64::from(num) / f64::from(den)).to_string(),
    };
    format!("{} {} {}", part(0), part(1), part(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rational(pairs: &[(u32, u32)]) -> Value {
        Value::Rationals(pairs.to_vec())
    }

    fn ascii(s: &str) -> Value {
        Value::Ascii(s.to_string())
    }

    fn gps_entries(entries: &[(u16, Value)]) -> Parsed {
        Parsed {
            gps: entries
                .iter()
                .map(|(tag, value)| Entry {
                    tag: *tag,
                    value: value.clone(),
                })
                .collect(),
            ..Parsed::default()
        }
    }

    #[test]
    fn flash_patterns_are_deterministic() {
        assert_eq!(flash_label(0x00), "No flash");
        assert_eq!(flash_label(0x01), "Flash fired");
        assert_eq!(flash_label(0x05), "Flash fired");
        assert_eq!(flash_label(0x09), "Flash fired");
        assert_eq!(flash_label(0x10), "No flash");
        assert_eq!(flash_label(0x20), "No flash");
        // Reserved bits set: refuse to guess.
        assert_eq!(flash_label(0x80), "unknown");
        assert_eq!(flash_label(0x101), "unknown");
    }

    #[test]
    fn string_fields_map_and_empty_is_present() {
        let parsed = Parsed {
            primary: vec![
                Entry {
                    tag: tags::MAKE,
                    value: ascii("Acme"),
                },
                Entry {
                    tag: tags::IMAGE_DESCRIPTION,
                    value: ascii(""),
                },
            ],
            ..Parsed::default()
        };

        let record = map(&parsed);
        assert_eq!(record.make.as_deref(), Some("Acme"));
        assert_eq!(record.description.as_deref(), Some(""));
        assert_eq!(record.model, None);
    }

    #[test]
    fn wrong_typed_string_tag_is_dropped() {
        let parsed = Parsed {
            primary: vec![Entry {
                tag: tags::MAKE,
                value: Value::Shorts(vec![1]),
            }],
            ..Parsed::default()
        };
        assert_eq!(map(&parsed).make, None);
    }

    #[test]
    fn duplicate_tags_follow_last_write_wins() {
        let parsed = Parsed {
            primary: vec![
                Entry {
                    tag: tags::MAKE,
                    value: ascii("First"),
                },
                Entry {
                    tag: tags::MAKE,
                    value: ascii("Second"),
                },
            ],
            ..Parsed::default()
        };
        assert_eq!(map(&parsed).make.as_deref(), Some("Second"));
    }

    #[test]
    fn gps_requires_all_four_parts() {
        let lat = rational(&[(40, 1), (26, 1), (46, 1)]);
        let lon = rational(&[(79, 1), (58, 1), (56, 1)]);

        let complete = gps_entries(&[
            (tags::GPS_LATITUDE, lat.clone()),
            (tags::GPS_LATITUDE_REF, ascii("N")),
            (tags::GPS_LONGITUDE, lon.clone()),
            (tags::GPS_LONGITUDE_REF, ascii("W")),
        ]);
        let record = map(&complete);
        let point = record.gps.unwrap();
        assert_eq!(point.latitude, "40 26 46");
        assert_eq!(point.longitude, "79 58 56");

        // Any partial combination yields nothing.
        let missing_ref = gps_entries(&[
            (tags::GPS_LATITUDE, lat.clone()),
            (tags::GPS_LATITUDE_REF, ascii("N")),
            (tags::GPS_LONGITUDE, lon.clone()),
        ]);
        assert_eq!(map(&missing_ref).gps, None);

        let refs_only = gps_entries(&[
            (tags::GPS_LATITUDE_REF, ascii("N")),
            (tags::GPS_LONGITUDE_REF, ascii("W")),
        ]);
        assert_eq!(map(&refs_only).gps, None);
    }

    #[test]
    fn gps_components_render_fractions_and_bad_parts() {
        let parsed = gps_entries(&[
            (
                tags::GPS_LATITUDE,
                rational(&[(40, 1), (53, 2), (0, 5)]),
            ),
            (tags::GPS_LATITUDE_REF, ascii("N")),
            (
                tags::GPS_LONGITUDE,
                // Zero denominator and a missing third component.
                rational(&[(79, 1), (7, 0)]),
            ),
            (tags::GPS_LONGITUDE_REF, ascii("E")),
        ]);

        let point = map(&parsed).gps.unwrap();
        assert_eq!(point.latitude, "40 26.5 0");
        assert_eq!(point.longitude, "79 0 0");
    }

    #[test]
    fn altitude_combines_reference_sign() {
        let above = gps_entries(&[
            (tags::GPS_ALTITUDE, rational(&[(1234, 10)])),
            (tags::GPS_ALTITUDE_REF, Value::Bytes(vec![0])),
        ]);
        assert_eq!(map(&above).altitude, Some(123.4));

        let below = gps_entries(&[
            (tags::GPS_ALTITUDE, rational(&[(15, 2)])),
            (tags::GPS_ALTITUDE_REF, Value::Bytes(vec![1])),
        ]);
        assert_eq!(map(&below).altitude, Some(-7.5));

        // No reference tag defaults to above sea level.
        let bare = gps_entries(&[(tags::GPS_ALTITUDE, rational(&[(30, 1)]))]);
        assert_eq!(map(&bare).altitude, Some(30.0));
    }

    #[test]
    fn altitude_zero_denominator_is_absent() {
        let parsed = gps_entries(&[
            (tags::GPS_ALTITUDE, rational(&[(100, 0)])),
            (tags::GPS_ALTITUDE_REF, Value::Bytes(vec![0])),
        ]);
        assert_eq!(map(&parsed).altitude, None);
    }

    #[test]
    fn altitude_reference_alone_is_absent() {
        let parsed = gps_entries(&[(tags::GPS_ALTITUDE_REF, Value::Bytes(vec![1]))]);
        assert_eq!(map(&parsed).altitude, None);
    }

    #[test]
    fn flash_accepts_short_and_opaque_payloads() {
        let as_short = Parsed {
            exif: vec![Entry {
                tag: tags::FLASH,
                value: Value::Shorts(vec![0x01]),
            }],
            ..Parsed::default()
        };
        assert_eq!(map(&as_short).flash_found.as_deref(), Some("Flash fired"));

        let as_opaque = Parsed {
            exif: vec![Entry {
                tag: tags::FLASH,
                value: Value::Opaque(vec![0x00]),
            }],
            ..Parsed::default()
        };
        assert_eq!(map(&as_opaque).flash_found.as_deref(), Some("No flash"));
    }

    #[test]
    fn date_time_original_parses_the_exif_convention() {
        let parsed = Parsed {
            exif: vec![Entry {
                tag: tags::DATE_TIME_ORIGINAL,
                value: ascii("2021:06:06 13:38:22"),
            }],
            ..Parsed::default()
        };
        let expected = NaiveDateTime::parse_from_str("2021-06-06 13:38:22", "%Y-%m-%d %H:%M:%S");
        assert_eq!(map(&parsed).date_time_original, expected.ok());

        let garbage = Parsed {
            exif: vec![Entry {
                tag: tags::DATE_TIME_ORIGINAL,
                value: ascii("yesterday-ish"),
            }],
            ..Parsed::default()
        };
        assert_eq!(map(&garbage).date_time_original, None);
    }
}
