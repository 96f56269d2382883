// Module name shadows the `serde` crate; use `::serde` for the external crate.
use ::serde::Serializer;
use chrono::{DateTime, SecondsFormat, Utc};

/// Serialize `DateTime<Utc>` as RFC 3339 at whole-second precision.
///
/// Response DTOs use this so timestamps stay stable across the store
/// round-trip (Redis JSON keeps nanoseconds, clients do not need them).
pub fn to_rfc3339_secs<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}
