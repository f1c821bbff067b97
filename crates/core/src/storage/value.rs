use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-agnostic attribute value, the table's generic representation.
///
/// Numbers are kept as strings, matching the wire format of the backing
/// store, so no precision is lost on attributes this layer never interprets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// String.
    S(String),
    /// Number, stored as its decimal string representation.
    N(String),
    /// Boolean.
    Bool(bool),
    /// List of values.
    L(Vec<Value>),
}

impl Value {
    /// Builds a numeric value from an unsigned integer.
    pub fn from_u64(n: u64) -> Self {
        Value::N(n.to_string())
    }

    pub fn as_s(&self) -> Option<&str> {
        match self {
            Value::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::N(n) => n.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_l(&self) -> Option<&[Value]> {
        match self {
            Value::L(l) => Some(l),
            _ => None,
        }
    }
}

/// A raw stored item: attribute name to value.
pub type RawItem = BTreeMap<String, Value>;

/// Composite primary key of one item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(Value::from_u64(42).as_u64(), Some(42));
        assert_eq!(Value::N("not-a-number".to_string()).as_u64(), None);
        assert_eq!(Value::S("42".to_string()).as_u64(), None);
    }

    #[test]
    fn test_item_key_display() {
        let key = ItemKey::new("USER#alice", "RECIPE#r1");
        assert_eq!(key.to_string(), "USER#alice/RECIPE#r1");
    }
}
