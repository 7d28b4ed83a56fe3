//! Serde helpers for opaque record ids.
//!
//! Ids are kept as text. Older records carry numeric `Date.now()` ids, which are read as
//! their decimal form so they still match the `recurringId` of the entries they produced.

use serde::{Deserialize, Deserializer};
use serde_json::Number;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

pub mod option {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::deserialize")]
        id: String,
        #[serde(default, deserialize_with = "super::option::deserialize")]
        parent: Option<String>,
    }

    #[test]
    fn numbers_and_strings_both_read_as_text() {
        let holder: Holder =
            serde_json::from_value(json!({ "id": 1714000000000u64, "parent": "abc" })).unwrap();
        assert_eq!(holder.id, "1714000000000");
        assert_eq!(holder.parent.as_deref(), Some("abc"));

        let holder: Holder = serde_json::from_value(json!({ "id": "x-1" })).unwrap();
        assert_eq!(holder.id, "x-1");
        assert_eq!(holder.parent, None);
    }
}
