//! Serde helpers for timestamps stored in blobs.
//!
//! Values are written as RFC 3339 strings. On read, epoch milliseconds are accepted as
//! well since older records stored `Date#getTime()` numbers.

use chrono::{DateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
    Float(f64),
}

impl RawTimestamp {
    fn resolve<E: de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|err| E::custom(format!("invalid timestamp `{text}`: {err}"))),
            RawTimestamp::Millis(millis) => from_millis(millis),
            RawTimestamp::Float(millis) if millis.is_finite() => from_millis(millis as i64),
            RawTimestamp::Float(millis) => Err(E::custom(format!("invalid timestamp {millis}"))),
        }
    }
}

fn from_millis<E: de::Error>(millis: i64) -> Result<DateTime<Utc>, E> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| E::custom(format!("timestamp {millis} out of range")))
}

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    RawTimestamp::deserialize(deserializer)?.resolve()
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<RawTimestamp>::deserialize(deserializer)?
            .map(RawTimestamp::resolve)
            .transpose()
    }
}
