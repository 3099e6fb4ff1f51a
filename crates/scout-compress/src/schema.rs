//! Schema-aware tabular codec for scouting-entry exports.
//!
//! Applies only to `{entries, version?, exportedAt?}` documents whose entries carry
//! the recognized scouting fields with the expected types. Anything else is left to
//! the generic variants; a mismatch is never an error.
//!
//! Document shape:
//!
//! ```text
//! { t: "scouting", v: version, x: exportedAt, b: baseTimestamp,
//!   mk: [matchKey..], sn: [scoutName..], ek: [eventKey..], cm: [comment..],
//!   gk: [gameDataKey..], xk: [extraKey..],
//!   r: [[mk, team, alliance, sn, ek, matchNumber, tsDelta, noShow, cm, gameData, extras], ..] }
//! ```
//!
//! `alliance` is 0 (red) / 1 (blue). `noShow` is 0/1, or null when absent. `cm` is a
//! comment index, -1 for an empty comment, or null when absent. `gameData` is a
//! list of `[gk, value]` pairs, or null when absent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::CompressError;

const DOCUMENT_TAG: &str = "scouting";
const EMPTY_COMMENT: i64 = -1;

const MATCH_KEY: &str = "matchKey";
const TEAM_NUMBER: &str = "teamNumber";
const ALLIANCE_COLOR: &str = "allianceColor";
const SCOUT_NAME: &str = "scoutName";
const EVENT_KEY: &str = "eventKey";
const MATCH_NUMBER: &str = "matchNumber";
const TIMESTAMP: &str = "timestamp";
const NO_SHOW: &str = "noShow";
const COMMENTS: &str = "comments";
const GAME_DATA: &str = "gameData";

const RECOGNIZED: [&str; 10] = [
    MATCH_KEY,
    TEAM_NUMBER,
    ALLIANCE_COLOR,
    SCOUT_NAME,
    EVENT_KEY,
    MATCH_NUMBER,
    TIMESTAMP,
    NO_SHOW,
    COMMENTS,
    GAME_DATA,
];

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SchemaDocument {
    t: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    v: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<Value>,
    b: u64,
    mk: Vec<String>,
    sn: Vec<String>,
    ek: Vec<String>,
    cm: Vec<String>,
    gk: Vec<String>,
    xk: Vec<String>,
    r: Vec<Row>,
}

type Pairs = Vec<(usize, Value)>;

#[derive(Debug, Serialize, Deserialize)]
struct Row(
    usize,         // matchKey
    u64,           // teamNumber
    u8,            // allianceColor
    usize,         // scoutName
    usize,         // eventKey
    u64,           // matchNumber
    u64,           // timestamp delta
    Option<u8>,    // noShow
    Option<i64>,   // comments
    Option<Pairs>, // gameData
    Pairs,         // extras
);

/// Whether `value` has the scouting-entry export shape this codec handles.
#[must_use]
pub fn matches_scouting_shape(value: &Value) -> bool {
    encode(value).is_some()
}

/// Encode, or `None` when the value does not have the export shape.
pub(crate) fn encode(value: &Value) -> Option<SchemaDocument> {
    let root = value.as_object()?;
    if root
        .keys()
        .any(|k| !matches!(k.as_str(), "entries" | "version" | "exportedAt"))
    {
        return None;
    }
    let version = optional_non_null(root, "version")?;
    let exported_at = optional_non_null(root, "exportedAt")?;
    let entries = root.get("entries")?.as_array()?;

    let parsed: Vec<&Map<String, Value>> = entries
        .iter()
        .map(Value::as_object)
        .collect::<Option<_>>()?;

    let base = parsed
        .iter()
        .map(|e| e.get(TIMESTAMP).and_then(Value::as_u64))
        .collect::<Option<Vec<_>>>()?
        .into_iter()
        .min()
        .unwrap_or(0);

    let mut dicts = Dictionaries::default();
    let rows = parsed
        .iter()
        .map(|entry| encode_row(entry, base, &mut dicts))
        .collect::<Option<Vec<_>>>()?;

    Some(SchemaDocument {
        t: DOCUMENT_TAG.to_string(),
        v: version,
        x: exported_at,
        b: base,
        mk: dicts.match_keys.values,
        sn: dicts.scout_names.values,
        ek: dicts.event_keys.values,
        cm: dicts.comments.values,
        gk: dicts.game_keys.values,
        xk: dicts.extra_keys.values,
        r: rows,
    })
}

/// `Some(None)` when absent, `Some(Some(v))` when present and non-null, `None` for null.
#[allow(clippy::option_option)]
fn optional_non_null(root: &Map<String, Value>, key: &str) -> Option<Option<Value>> {
    match root.get(key) {
        None => Some(None),
        Some(Value::Null) => None,
        Some(v) => Some(Some(v.clone())),
    }
}

#[derive(Default)]
struct Dictionary {
    values: Vec<String>,
    index: HashMap<String, usize>,
}

impl Dictionary {
    fn intern(&mut self, value: &str) -> usize {
        if let Some(&i) = self.index.get(value) {
            return i;
        }
        let i = self.values.len();
        self.index.insert(value.to_string(), i);
        self.values.push(value.to_string());
        i
    }
}

#[derive(Default)]
struct Dictionaries {
    match_keys: Dictionary,
    scout_names: Dictionary,
    event_keys: Dictionary,
    comments: Dictionary,
    game_keys: Dictionary,
    extra_keys: Dictionary,
}

fn encode_row(entry: &Map<String, Value>, base: u64, dicts: &mut Dictionaries) -> Option<Row> {
    let match_key = entry.get(MATCH_KEY)?.as_str()?;
    let team = entry.get(TEAM_NUMBER)?.as_u64()?;
    let alliance = match entry.get(ALLIANCE_COLOR)?.as_str()? {
        "red" => 0,
        "blue" => 1,
        _ => return None,
    };
    let scout = entry.get(SCOUT_NAME)?.as_str()?;
    let event = entry.get(EVENT_KEY)?.as_str()?;
    let match_number = entry.get(MATCH_NUMBER)?.as_u64()?;
    let delta = entry.get(TIMESTAMP)?.as_u64()?.checked_sub(base)?;

    let no_show = match entry.get(NO_SHOW) {
        None => None,
        Some(v) => Some(u8::from(v.as_bool()?)),
    };
    let comment = match entry.get(COMMENTS) {
        None => None,
        Some(v) => match v.as_str()? {
            "" => Some(EMPTY_COMMENT),
            text => Some(i64::try_from(dicts.comments.intern(text)).ok()?),
        },
    };
    let game_data = match entry.get(GAME_DATA) {
        None => None,
        Some(v) => Some(
            v.as_object()?
                .iter()
                .map(|(k, v)| (dicts.game_keys.intern(k), v.clone()))
                .collect(),
        ),
    };
    let extras = entry
        .iter()
        .filter(|(k, _)| !RECOGNIZED.contains(&k.as_str()))
        .map(|(k, v)| (dicts.extra_keys.intern(k), v.clone()))
        .collect();

    Some(Row(
        dicts.match_keys.intern(match_key),
        team,
        alliance,
        dicts.scout_names.intern(scout),
        dicts.event_keys.intern(event),
        match_number,
        delta,
        no_show,
        comment,
        game_data,
        extras,
    ))
}

/// Invert a schema document.
pub(crate) fn decode(doc: &SchemaDocument) -> Result<Value, CompressError> {
    if doc.t != DOCUMENT_TAG {
        return Err(malformed(format!("unexpected document tag {:?}", doc.t)));
    }

    let entries = doc
        .r
        .iter()
        .map(|row| decode_row(doc, row))
        .collect::<Result<Vec<_>, _>>()?;

    let mut root = Map::new();
    root.insert("entries".into(), Value::Array(entries));
    if let Some(v) = &doc.v {
        root.insert("version".into(), v.clone());
    }
    if let Some(x) = &doc.x {
        root.insert("exportedAt".into(), x.clone());
    }
    Ok(Value::Object(root))
}

fn decode_row(doc: &SchemaDocument, row: &Row) -> Result<Value, CompressError> {
    let Row(mk, team, alliance, sn, ek, match_number, delta, no_show, comment, game_data, extras) =
        row;

    let mut entry = Map::new();
    entry.insert(MATCH_KEY.into(), lookup(&doc.mk, *mk, "mk")?.into());
    entry.insert(TEAM_NUMBER.into(), (*team).into());
    let alliance = match alliance {
        0 => "red",
        1 => "blue",
        other => return Err(malformed(format!("alliance code {other}"))),
    };
    entry.insert(ALLIANCE_COLOR.into(), alliance.into());
    entry.insert(SCOUT_NAME.into(), lookup(&doc.sn, *sn, "sn")?.into());
    entry.insert(EVENT_KEY.into(), lookup(&doc.ek, *ek, "ek")?.into());
    entry.insert(MATCH_NUMBER.into(), (*match_number).into());
    let timestamp = doc
        .b
        .checked_add(*delta)
        .ok_or_else(|| malformed("timestamp overflow"))?;
    entry.insert(TIMESTAMP.into(), timestamp.into());

    if let Some(flag) = no_show {
        entry.insert(NO_SHOW.into(), Value::Bool(*flag != 0));
    }
    match comment {
        None => {}
        Some(EMPTY_COMMENT) => {
            entry.insert(COMMENTS.into(), "".into());
        }
        Some(index) => {
            let index = usize::try_from(*index).map_err(|_| malformed("negative comment index"))?;
            entry.insert(COMMENTS.into(), lookup(&doc.cm, index, "cm")?.into());
        }
    }
    if let Some(pairs) = game_data {
        let mut data = Map::new();
        for (k, v) in pairs {
            data.insert(lookup(&doc.gk, *k, "gk")?.to_string(), v.clone());
        }
        entry.insert(GAME_DATA.into(), Value::Object(data));
    }
    for (k, v) in extras {
        entry.insert(lookup(&doc.xk, *k, "xk")?.to_string(), v.clone());
    }
    Ok(Value::Object(entry))
}

fn lookup<'a>(dict: &'a [String], index: usize, name: &str) -> Result<&'a str, CompressError> {
    dict.get(index)
        .map(String::as_str)
        .ok_or_else(|| malformed(format!("{name} index {index} out of range")))
}

fn malformed(reason: impl Into<String>) -> CompressError {
    CompressError::malformed("schema-aware", reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(match_number: u64, team: u64, alliance: &str, ts: u64) -> Value {
        json!({
            "matchKey": format!("qm{match_number}"),
            "matchNumber": match_number,
            "teamNumber": team,
            "allianceColor": alliance,
            "scoutName": "Ada",
            "eventKey": "2025mimid",
            "timestamp": ts,
            "comments": "",
            "noShow": false,
            "gameData": {"autoCoral": 2, "climb": "deep"},
        })
    }

    fn export(entries: Vec<Value>) -> Value {
        json!({"entries": entries, "version": "1.0", "exportedAt": 1_740_000_000_000_u64})
    }

    #[test]
    fn roundtrip_with_base_timestamp() {
        let value = export(vec![
            entry(1, 1234, "red", 1_740_000_000_500),
            entry(2, 254, "blue", 1_740_000_000_100),
        ]);
        let doc = encode(&value).unwrap();
        assert_eq!(doc.b, 1_740_000_000_100);
        assert_eq!(doc.sn, vec!["Ada".to_string()]);
        assert!(doc.cm.is_empty());
        assert_eq!(decode(&doc).unwrap(), value);
    }

    #[test]
    fn optional_fields_keep_presence() {
        let mut bare = entry(3, 1, "red", 10);
        let obj = bare.as_object_mut().unwrap();
        obj.remove("comments");
        obj.remove("noShow");
        obj.remove("gameData");
        let mut commented = entry(4, 2, "blue", 20);
        commented["comments"] = json!("defended well");
        commented["noShow"] = json!(true);

        let value = json!({"entries": [bare, commented]});
        let doc = encode(&value).unwrap();
        assert_eq!(doc.cm, vec!["defended well".to_string()]);
        assert_eq!(decode(&doc).unwrap(), value);
    }

    #[test]
    fn extra_fields_are_dictionary_encoded() {
        let mut a = entry(1, 1, "red", 1);
        a["deviceId"] = json!("tab-1");
        let mut b = entry(2, 2, "red", 2);
        b["deviceId"] = json!("tab-2");
        b["rev"] = json!(3);
        let value = export(vec![a, b]);

        let doc = encode(&value).unwrap();
        assert_eq!(doc.xk, vec!["deviceId".to_string(), "rev".to_string()]);
        assert_eq!(decode(&doc).unwrap(), value);
    }

    #[test]
    fn empty_entries_roundtrip() {
        let value = json!({"entries": []});
        let doc = encode(&value).unwrap();
        assert_eq!(doc.b, 0);
        assert_eq!(decode(&doc).unwrap(), value);
    }

    #[test]
    fn shape_mismatches_are_skipped() {
        let mut bad_alliance = entry(1, 1, "green", 1);
        assert!(encode(&export(vec![bad_alliance.clone()])).is_none());

        bad_alliance["allianceColor"] = json!("red");
        bad_alliance["teamNumber"] = json!("1234");
        assert!(encode(&export(vec![bad_alliance])).is_none());

        assert!(encode(&json!({"entries": [], "other": 1})).is_none());
        assert!(encode(&json!({"entries": [], "version": null})).is_none());
        assert!(encode(&json!({"matches": []})).is_none());
        assert!(encode(&json!([1, 2, 3])).is_none());
        assert!(encode(&json!({"entries": [1]})).is_none());
        assert!(!matches_scouting_shape(&json!({"entries": [{"teamNumber": 1}]})));
    }

    #[test]
    fn fractional_numbers_are_not_tabular() {
        let mut e = entry(1, 1, "red", 1);
        e["timestamp"] = json!(1.5);
        assert!(encode(&export(vec![e])).is_none());
    }

    #[test]
    fn corrupted_index_is_malformed() {
        let value = export(vec![entry(1, 1, "red", 1)]);
        let mut doc = encode(&value).unwrap();
        doc.sn.clear();
        assert!(matches!(decode(&doc), Err(CompressError::Malformed { .. })));
    }
}
