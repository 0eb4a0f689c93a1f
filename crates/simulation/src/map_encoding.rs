// ---------------------------------------------------------------------------
// map_encoding – explicit JSON encoding for map-typed save fields
// ---------------------------------------------------------------------------
//
// JSON objects only have string keys and carry no notion of "this was a map".
// Map-typed fields are therefore written as
//
//     {"$type": "Map", "value": [[key, value], [key, value], ...]}
//
// which keeps numeric keys numeric and lets the reader tell a real map apart
// from a plain keyed record (the legacy tile layout). Use via
// `#[serde(with = "crate::map_encoding")]`.

use std::collections::BTreeMap;

use bevy::log::warn;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tag value written into the `$type` field of an encoded map.
pub const MAP_TYPE_TAG: &str = "Map";

#[derive(Serialize)]
struct TaggedMapRef<'a, K, V> {
    #[serde(rename = "$type")]
    kind: &'static str,
    value: Vec<(&'a K, &'a V)>,
}

#[derive(Deserialize)]
struct TaggedMap<K, V> {
    #[serde(rename = "$type")]
    kind: String,
    value: Vec<(K, V)>,
}

pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    K: Serialize,
    V: Serialize,
    S: Serializer,
{
    TaggedMapRef {
        kind: MAP_TYPE_TAG,
        value: map.iter().collect(),
    }
    .serialize(serializer)
}

pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let tagged = TaggedMap::<K, V>::deserialize(deserializer)?;
    if tagged.kind != MAP_TYPE_TAG {
        return Err(D::Error::custom(format!(
            "expected $type \"{MAP_TYPE_TAG}\", found \"{}\"",
            tagged.kind
        )));
    }
    Ok(tagged.value.into_iter().collect())
}

/// Like [`deserialize`], but anything that is not a tagged map (or a tagged
/// map with an unreadable entry) reads as an empty map instead of failing the
/// whole document. Discarding a non-empty value is logged.
///
/// Used for derived state that older saves stored in another shape and that
/// is rebuilt on migration anyway.
pub fn deserialize_lenient<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr<K, V> {
        Tagged(TaggedMap<K, V>),
        Other(serde_json::Value),
    }

    match Repr::<K, V>::deserialize(deserializer)? {
        Repr::Tagged(tagged) if tagged.kind == MAP_TYPE_TAG => {
            Ok(tagged.value.into_iter().collect())
        }
        Repr::Tagged(tagged) => {
            warn!("Discarding map with unexpected $type {:?}", tagged.kind);
            Ok(BTreeMap::new())
        }
        Repr::Other(value) => {
            if !is_blank(&value) {
                warn!("Discarding unreadable map value: {}", preview(&value));
            }
            Ok(BTreeMap::new())
        }
    }
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn preview(value: &serde_json::Value) -> String {
    const MAX: usize = 120;
    let text = value.to_string();
    match text.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text,
    }
}
