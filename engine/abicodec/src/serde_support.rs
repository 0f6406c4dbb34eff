use std::fmt;

use ordered_float::OrderedFloat;
use serde::de::{self, DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CodecError, CodecResult};
use crate::value::JValue;

impl Serialize for JValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            JValue::Null => serializer.serialize_unit(),
            JValue::Bool(v) => serializer.serialize_bool(*v),
            JValue::Int(v) => serializer.serialize_i64(*v),
            JValue::UInt(v) => serializer.serialize_u64(*v),
            JValue::Float(v) => {
                let v = v.into_inner();
                if v.is_nan() {
                    serializer.serialize_str("NaN")
                } else if v.is_infinite() {
                    serializer.serialize_str(if v > 0.0 { "Infinity" } else { "-Infinity" })
                } else {
                    serializer.serialize_f64(v)
                }
            }
            JValue::String(s) => serializer.serialize_str(s),
            JValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            JValue::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct JValueVisitor;

impl<'de> Visitor<'de> for JValueVisitor {
    type Value = JValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<JValue, E> {
        Ok(JValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JValue, E> {
        Ok(JValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<JValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        JValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JValue, E> {
        Ok(JValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JValue, E> {
        Ok(JValue::int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JValue, E> {
        Ok(JValue::UInt(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JValue, E> {
        Ok(JValue::Float(OrderedFloat(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JValue, E> {
        Ok(JValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JValue, E> {
        Ok(JValue::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<JValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JValue::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<JValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, JValue>()? {
            entries.push((key, value));
        }
        Ok(JValue::Object(entries))
    }
}

impl<'de> Deserialize<'de> for JValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(JValueVisitor)
    }
}

/// Parse JSON text, keeping object order and exact 64-bit integers.
///
/// serde_json's own nesting limit bounds the recursion here.
pub fn from_json_str(text: &str) -> CodecResult<JValue> {
    serde_json::from_str(text).map_err(|err| CodecError::Json(err.to_string()))
}

pub fn to_json_string(value: &JValue) -> CodecResult<String> {
    serde_json::to_string(value).map_err(|err| CodecError::Json(err.to_string()))
}

pub fn to_json_pretty(value: &JValue) -> CodecResult<String> {
    serde_json::to_string_pretty(value).map_err(|err| CodecError::Json(err.to_string()))
}

/// Convert any serializable Rust value into a [`JValue`], keeping field order.
pub fn to_jvalue<T>(value: &T) -> CodecResult<JValue>
where
    T: Serialize + ?Sized,
{
    let text = serde_json::to_string(value).map_err(|err| CodecError::Json(err.to_string()))?;
    from_json_str(&text)
}

pub fn from_jvalue<T>(value: &JValue) -> CodecResult<T>
where
    T: DeserializeOwned,
{
    let json = serde_json::to_value(value).map_err(|err| CodecError::Json(err.to_string()))?;
    T::deserialize(json).map_err(|err| CodecError::Json(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order_and_precision() {
        let value = from_json_str(r#"{"z":18446744073709551615,"a":-9223372036854775808,"m":[1.5,null]}"#)
            .expect("parse");
        let entries = value.as_object().expect("object");
        assert_eq!(entries[0], ("z".to_string(), JValue::UInt(u64::MAX)));
        assert_eq!(entries[1], ("a".to_string(), JValue::Int(i64::MIN)));
        assert_eq!(
            to_json_string(&value).expect("render"),
            r#"{"z":18446744073709551615,"a":-9223372036854775808,"m":[1.5,null]}"#
        );
    }

    #[test]
    fn malformed_json_is_a_codec_error() {
        assert!(matches!(from_json_str("{\"a\":"), Err(CodecError::Json(_))));
    }

    #[test]
    fn non_finite_floats_render_as_strings() {
        let value = JValue::Array(vec![JValue::from(f64::NAN), JValue::from(f64::NEG_INFINITY)]);
        assert_eq!(to_json_string(&value).expect("render"), r#"["NaN","-Infinity"]"#);
    }

    #[test]
    fn typed_values_convert_through_jvalue() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Transfer {
            from: String,
            memo: String,
        }
        let original = Transfer {
            from: "alice".into(),
            memo: "hi".into(),
        };
        let value = to_jvalue(&original).expect("to");
        assert_eq!(value.get("from"), Some(&JValue::from("alice")));
        let back: Transfer = from_jvalue(&value).expect("from");
        assert_eq!(back, original);
    }
}
