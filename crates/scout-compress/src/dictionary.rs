//! Key-dictionary and key+value-dictionary transforms.
//!
//! Encoded value grammar (exactly invertible, no literal can collide with a marker):
//!
//! ```text
//! object  -> [[keyIndex, value], ...]
//! array   -> {"a": [value, ...]}
//! string  -> {"~": stringIndex}     (value dictionary hit)
//!          | "literal"              (otherwise)
//! scalar  -> scalar
//! ```
//!
//! The document is `{"k": [keys], "s": [strings], "d": body}`; `s` is omitted for the
//! key-only variant.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::CompressError;

const ARRAY_TAG: &str = "a";
const STRING_TAG: &str = "~";

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DictionaryDocument {
    k: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    s: Vec<String>,
    d: Value,
}

/// Value-dictionary selection rules.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValueRules {
    pub min_occurrences: usize,
    pub min_chars: usize,
    pub limit: usize,
}

/// Build the key-only dictionary document.
pub(crate) fn encode_keys(value: &Value) -> DictionaryDocument {
    encode(value, None)
}

/// Build the key + value dictionary document.
pub(crate) fn encode_keys_and_values(value: &Value, rules: ValueRules) -> DictionaryDocument {
    encode(value, Some(rules))
}

fn encode(value: &Value, rules: Option<ValueRules>) -> DictionaryDocument {
    let mut keys = Interner::default();
    collect_keys(value, &mut keys);

    let strings = rules.map(|r| frequent_strings(value, r)).unwrap_or_default();
    let string_index: HashMap<&str, usize> = strings
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let body = encode_value(value, &keys.index, &string_index);
    DictionaryDocument {
        k: keys.values,
        s: strings,
        d: body,
    }
}

/// Invert either dictionary document.
pub(crate) fn decode(doc: &DictionaryDocument) -> Result<Value, CompressError> {
    decode_value(&doc.d, &doc.k, &doc.s)
}

#[derive(Default)]
struct Interner {
    values: Vec<String>,
    index: HashMap<String, usize>,
}

impl Interner {
    fn intern(&mut self, key: &str) {
        if !self.index.contains_key(key) {
            self.index.insert(key.to_string(), self.values.len());
            self.values.push(key.to_string());
        }
    }
}

fn collect_keys(value: &Value, keys: &mut Interner) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                keys.intern(k);
                collect_keys(v, keys);
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_keys(v, keys)),
        _ => {}
    }
}

/// Strings seen at least `min_occurrences` times with at least `min_chars`
/// characters, most frequent first, ties broken by first appearance.
fn frequent_strings(value: &Value, rules: ValueRules) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    count_strings(value, rules.min_chars, &mut counts);

    let mut candidates: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .filter(|(_, (count, _))| *count >= rules.min_occurrences)
        .map(|(s, (count, first))| (s, count, first))
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    candidates
        .into_iter()
        .take(rules.limit)
        .map(|(s, _, _)| s.to_string())
        .collect()
}

fn count_strings<'a>(
    value: &'a Value,
    min_chars: usize,
    counts: &mut HashMap<&'a str, (usize, usize)>,
) {
    match value {
        Value::String(s) if s.chars().count() >= min_chars => {
            let next = counts.len();
            counts.entry(s.as_str()).or_insert((0, next)).0 += 1;
        }
        Value::Object(map) => map.values().for_each(|v| count_strings(v, min_chars, counts)),
        Value::Array(items) => items.iter().for_each(|v| count_strings(v, min_chars, counts)),
        _ => {}
    }
}

fn encode_value(
    value: &Value,
    keys: &HashMap<String, usize>,
    strings: &HashMap<&str, usize>,
) -> Value {
    match value {
        Value::Object(map) => Value::Array(
            map.iter()
                .map(|(k, v)| {
                    // Every key was interned by collect_keys; the literal is a fallback.
                    let key = keys.get(k).map_or_else(|| json!(k), |i| json!(i));
                    json!([key, encode_value(v, keys, strings)])
                })
                .collect(),
        ),
        Value::Array(items) => {
            let encoded: Vec<Value> = items
                .iter()
                .map(|v| encode_value(v, keys, strings))
                .collect();
            json!({ ARRAY_TAG: encoded })
        }
        Value::String(s) => strings
            .get(s.as_str())
            .map_or_else(|| value.clone(), |i| json!({ STRING_TAG: i })),
        other => other.clone(),
    }
}

fn decode_value(value: &Value, keys: &[String], strings: &[String]) -> Result<Value, CompressError> {
    match value {
        Value::Array(pairs) => {
            let mut map = Map::new();
            for pair in pairs {
                let [key, inner] = pair.as_array().map(Vec::as_slice).unwrap_or_default() else {
                    return Err(malformed("object entry is not a [key, value] pair"));
                };
                let key = match key {
                    Value::Number(n) => n
                        .as_u64()
                        .and_then(|i| keys.get(usize::try_from(i).ok()?))
                        .cloned()
                        .ok_or_else(|| malformed(format!("key index {n} out of range")))?,
                    Value::String(s) => s.clone(),
                    _ => return Err(malformed("object key must be an index or string")),
                };
                map.insert(key, decode_value(inner, keys, strings)?);
            }
            Ok(Value::Object(map))
        }
        Value::Object(tagged) if tagged.len() == 1 => {
            if let Some(items) = tagged.get(ARRAY_TAG) {
                let items = items
                    .as_array()
                    .ok_or_else(|| malformed("array marker must hold an array"))?;
                return items
                    .iter()
                    .map(|v| decode_value(v, keys, strings))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array);
            }
            if let Some(index) = tagged.get(STRING_TAG) {
                return index
                    .as_u64()
                    .and_then(|i| strings.get(usize::try_from(i).ok()?))
                    .map(|s| Value::String(s.clone()))
                    .ok_or_else(|| malformed(format!("string index {index} out of range")));
            }
            Err(malformed("unknown marker"))
        }
        Value::Object(_) => Err(malformed("bare object in encoded body")),
        other => Ok(other.clone()),
    }
}

fn malformed(reason: impl Into<String>) -> CompressError {
    CompressError::malformed("dictionary", reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: ValueRules = ValueRules {
        min_occurrences: 3,
        min_chars: 4,
        limit: 256,
    };

    fn sample() -> Value {
        json!({
            "entries": [
                {"scoutName": "Grace", "alliance": "red", "data": {"cycles": [1, 2, 3]}},
                {"scoutName": "Grace", "alliance": "blue", "data": {"cycles": []}},
                {"scoutName": "Grace", "alliance": "red", "data": null},
            ],
            "version": "1.0",
        })
    }

    #[test]
    fn key_dictionary_roundtrip() {
        let doc = encode_keys(&sample());
        assert!(doc.s.is_empty());
        assert!(doc.k.contains(&"scoutName".to_string()));
        assert_eq!(decode(&doc).unwrap(), sample());
    }

    #[test]
    fn keys_are_deduplicated() {
        let doc = encode_keys(&sample());
        let mut sorted = doc.k.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), doc.k.len());
    }

    #[test]
    fn value_dictionary_only_takes_frequent_long_strings() {
        let doc = encode_keys_and_values(&sample(), RULES);
        // "Grace" appears 3 times; "red" is too short; "blue" appears once.
        assert_eq!(doc.s, vec!["Grace".to_string()]);
        assert_eq!(decode(&doc).unwrap(), sample());
    }

    #[test]
    fn value_dictionary_limit() {
        let value = json!(["aaaa", "aaaa", "aaaa", "bbbb", "bbbb", "bbbb", "bbbb"]);
        let rules = ValueRules { limit: 1, ..RULES };
        let doc = encode_keys_and_values(&value, rules);
        assert_eq!(doc.s, vec!["bbbb".to_string()]);
        assert_eq!(decode(&doc).unwrap(), value);
    }

    #[test]
    fn literals_resembling_markers_survive() {
        let value = json!({
            "a": ["~", 0],
            "~": {"a": [1]},
            "pairs": [[0, "x"], [1, "y"]],
        });
        let doc = encode_keys_and_values(&value, RULES);
        assert_eq!(decode(&doc).unwrap(), value);
    }

    #[test]
    fn scalars_at_root() {
        for value in [json!(null), json!(3.5), json!("plain"), json!(true), json!([])] {
            assert_eq!(decode(&encode_keys(&value)).unwrap(), value);
        }
    }

    #[test]
    fn out_of_range_index_is_malformed() {
        let doc = DictionaryDocument {
            k: vec![],
            s: vec![],
            d: json!([[4, 1]]),
        };
        assert!(matches!(decode(&doc), Err(CompressError::Malformed { .. })));
    }
}
