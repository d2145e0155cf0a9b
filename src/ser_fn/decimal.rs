use serde::Serializer;

// Serialize an optional f64 as a decimal string, keeping the shortest
// representation that round-trips. Rounding for display stays caller-side.
pub fn string<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serializer.serialize_str(&v.to_string()),
        None => serializer.serialize_none(),
    }
}
