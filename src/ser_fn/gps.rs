use crate::record::GpsPoint;
use serde::Serializer;

// Serialize the internal Option<GpsPoint> as a list, so the wire shape is
// always an array: empty when no position was decoded, one element otherwise.
pub fn list<S>(gps: &Option<GpsPoint>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(gps.iter())
}
