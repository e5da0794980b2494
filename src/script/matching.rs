//! Structural matching between script fields (JSON) and decoded wire values
//! (PackStream), plus synthesis of AUTO-matched canned replies.

use crate::bolt::BoltVersion;
use crate::packstream::Value as WireValue;

/// Convert a decoded PackStream value into its JSON-semantic equivalent for
/// comparison against script field values.
pub fn wire_to_json(value: &WireValue) -> serde_json::Value {
    match value {
        WireValue::Null => serde_json::Value::Null,
        WireValue::Bool(b) => serde_json::Value::Bool(*b),
        WireValue::Int(n) => serde_json::Value::Number((*n).into()),
        WireValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        WireValue::String(s) => serde_json::Value::String(s.clone()),
        WireValue::List(items) => serde_json::Value::Array(items.iter().map(wire_to_json).collect()),
        WireValue::Dict(entries) => {
            let mut map = serde_json::Map::new();
            for (k, v) in entries {
                map.insert(k.clone(), wire_to_json(v));
            }
            serde_json::Value::Object(map)
        }
        WireValue::Struct { tag, fields } => {
            let mut map = serde_json::Map::new();
            map.insert("tag".to_string(), serde_json::Value::Number((*tag).into()));
            map.insert(
                "fields".to_string(),
                serde_json::Value::Array(fields.iter().map(wire_to_json).collect()),
            );
            serde_json::Value::Object(map)
        }
    }
}

/// True if a message's field list matches a script line's declared fields:
/// equal arity and structural JSON equality field-by-field (dict key order
/// is irrelevant because `serde_json::Value`'s map equality already ignores it).
pub fn fields_match(received: &[WireValue], expected: &[serde_json::Value]) -> bool {
    if received.len() != expected.len() {
        return false;
    }
    received
        .iter()
        .zip(expected)
        .all(|(got, want)| &wire_to_json(got) == want)
}

/// Convert a script field value (JSON) into the PackStream value sent on the wire.
pub fn json_to_wire(value: &serde_json::Value) -> WireValue {
    match value {
        serde_json::Value::Null => WireValue::Null,
        serde_json::Value::Bool(b) => WireValue::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                WireValue::Int(i)
            } else {
                WireValue::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => WireValue::String(s.clone()),
        serde_json::Value::Array(items) => WireValue::List(items.iter().map(json_to_wire).collect()),
        serde_json::Value::Object(map) => {
            WireValue::Dict(map.iter().map(|(k, v)| (k.clone(), json_to_wire(v))).collect())
        }
    }
}

/// Build the canned SUCCESS reply the stub sends for an AUTO-matched message.
///
/// The `server` string is cosmetic; callers should not assert its exact
/// value (see script engine design notes). Bolt 3+ additionally carries a
/// stable `connection_id`.
pub fn auto_reply(version: BoltVersion) -> WireValue {
    let mut fields = vec![(
        "server".to_string(),
        WireValue::string(format!("boltkit-rs/{version}")),
    )];
    if version.major >= 3 {
        fields.push(("connection_id".to_string(), WireValue::string("bolt-0")));
    }
    WireValue::Struct {
        tag: 0x70,
        fields: vec![WireValue::Dict(fields)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::{V1_0, V3_0};

    #[test]
    fn dict_order_is_irrelevant() {
        let a = WireValue::Dict(vec![
            ("a".into(), WireValue::Int(1)),
            ("b".into(), WireValue::Int(2)),
        ]);
        let want = serde_json::json!({"b": 2, "a": 1});
        assert_eq!(wire_to_json(&a), want);
    }

    #[test]
    fn arity_mismatch_fails() {
        let received = vec![WireValue::Int(1)];
        let expected = vec![serde_json::json!(1), serde_json::json!(2)];
        assert!(!fields_match(&received, &expected));
    }

    #[test]
    fn auto_reply_v1_has_no_connection_id() {
        let reply = auto_reply(V1_0);
        if let WireValue::Struct { fields, .. } = reply {
            if let WireValue::Dict(entries) = &fields[0] {
                assert!(!entries.iter().any(|(k, _)| k == "connection_id"));
                return;
            }
        }
        panic!("expected dict field");
    }

    #[test]
    fn auto_reply_v3_has_connection_id() {
        let reply = auto_reply(V3_0);
        if let WireValue::Struct { fields, .. } = reply {
            if let WireValue::Dict(entries) = &fields[0] {
                assert!(entries.iter().any(|(k, _)| k == "connection_id"));
                return;
            }
        }
        panic!("expected dict field");
    }
}
