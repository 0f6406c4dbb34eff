use std::fmt::{self, Display, Formatter};

use ordered_float::OrderedFloat;

/// Order-preserving JSON tree used between JSON text and the binary codec.
///
/// Integers are kept exact: non-negative values normally live in `UInt`
/// and negative ones in `Int`, so 64-bit quantities never pass through a
/// float. Objects keep their entries in insertion order and may contain
/// duplicate keys; lookups return the first match.
#[derive(Clone, Debug)]
pub enum JValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(OrderedFloat<f64>),
    String(String),
    Array(Vec<JValue>),
    Object(Vec<(String, JValue)>),
}

impl JValue {
    pub fn kind(&self) -> &'static str {
        match self {
            JValue::Null => "null",
            JValue::Bool(_) => "bool",
            JValue::Int(_) | JValue::UInt(_) => "integer",
            JValue::Float(_) => "float",
            JValue::String(_) => "string",
            JValue::Array(_) => "array",
            JValue::Object(_) => "object",
        }
    }

    /// Signed integer constructor that picks the canonical variant.
    pub fn int(value: i64) -> Self {
        if value < 0 {
            JValue::Int(value)
        } else {
            JValue::UInt(value as u64)
        }
    }

    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, JValue)>,
    {
        JValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view wide enough for every 64-bit variant.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            JValue::Int(v) => Some(*v as i128),
            JValue::UInt(v) => Some(*v as i128),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JValue::Int(v) => Some(*v as f64),
            JValue::UInt(v) => Some(*v as f64),
            JValue::Float(v) => Some(v.0),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JValue]> {
        match self {
            JValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, JValue)]> {
        match self {
            JValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// First entry with the given key, if this is an object.
    pub fn get(&self, key: &str) -> Option<&JValue> {
        self.as_object()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Structural equality that ignores object key order.
    pub fn eq_unordered(&self, other: &JValue) -> bool {
        match (self, other) {
            (JValue::Array(a), JValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_unordered(y))
            }
            (JValue::Object(a), JValue::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        other
                            .get(key)
                            .map(|found| value.eq_unordered(found))
                            .unwrap_or(false)
                    })
            }
            _ => self == other,
        }
    }
}

impl PartialEq for JValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JValue::Null, JValue::Null) => true,
            (JValue::Bool(a), JValue::Bool(b)) => a == b,
            (JValue::Int(_) | JValue::UInt(_), JValue::Int(_) | JValue::UInt(_)) => {
                self.as_i128() == other.as_i128()
            }
            (JValue::Float(a), JValue::Float(b)) => a == b,
            (JValue::String(a), JValue::String(b)) => a == b,
            (JValue::Array(a), JValue::Array(b)) => a == b,
            (JValue::Object(a), JValue::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for JValue {}

impl From<bool> for JValue {
    fn from(value: bool) -> Self {
        JValue::Bool(value)
    }
}

impl From<i64> for JValue {
    fn from(value: i64) -> Self {
        JValue::int(value)
    }
}

impl From<i32> for JValue {
    fn from(value: i32) -> Self {
        JValue::int(value as i64)
    }
}

impl From<u64> for JValue {
    fn from(value: u64) -> Self {
        JValue::UInt(value)
    }
}

impl From<u32> for JValue {
    fn from(value: u32) -> Self {
        JValue::UInt(value as u64)
    }
}

impl From<f64> for JValue {
    fn from(value: f64) -> Self {
        JValue::Float(OrderedFloat(value))
    }
}

impl From<&str> for JValue {
    fn from(value: &str) -> Self {
        JValue::String(value.to_string())
    }
}

impl From<String> for JValue {
    fn from(value: String) -> Self {
        JValue::String(value)
    }
}

impl From<Vec<JValue>> for JValue {
    fn from(value: Vec<JValue>) -> Self {
        JValue::Array(value)
    }
}

impl Display for JValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_variants_compare_by_value() {
        assert_eq!(JValue::Int(5), JValue::UInt(5));
        assert_eq!(JValue::int(-3), JValue::Int(-3));
        assert_ne!(JValue::Int(-1), JValue::UInt(u64::MAX));
        assert_ne!(JValue::UInt(1), JValue::Float(OrderedFloat(1.0)));
    }

    #[test]
    fn get_returns_first_duplicate() {
        let obj = JValue::object([("a", JValue::from(1u64)), ("a", JValue::from(2u64))]);
        assert_eq!(obj.get("a"), Some(&JValue::UInt(1)));
        assert_eq!(obj.get("b"), None);
    }

    #[test]
    fn unordered_equality_ignores_key_order() {
        let a = JValue::object([("x", JValue::from(1u64)), ("y", JValue::from("z"))]);
        let b = JValue::object([("y", JValue::from("z")), ("x", JValue::from(1u64))]);
        assert_ne!(a, b);
        assert!(a.eq_unordered(&b));
    }
}
