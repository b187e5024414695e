//! Value records passed to contract methods
//!
//! These are plain data: a field element and the two history records the
//! credit contract works with. Field elements travel as decimal strings so that
//! the JSON stays exact regardless of the reader's number type.

use core::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_aux::field_attributes::deserialize_number_from_string;

/// A field element
///
/// Reads both decimal strings and plain JSON numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct Field(#[serde(deserialize_with = "deserialize_number_from_string")] u64);

impl Field {
    /// Wrap a raw value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// A pair of field elements recorded as one history entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    /// The two recorded values
    pub history: [Field; 2],
}

impl History {
    /// Build a history entry from two raw values
    pub const fn new(first: u64, second: u64) -> Self {
        Self {
            history: [Field::new(first), Field::new(second)],
        }
    }
}

/// The two most relevant history entries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopHistory {
    /// Both entries, most relevant first
    pub top: [History; 2],
}

impl TopHistory {
    /// Flatten into the four field elements a method call takes
    pub fn to_fields(&self) -> [Field; 4] {
        let [a, b] = self.top;
        [a.history[0], a.history[1], b.history[0], b.history[1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_is_a_decimal_string() {
        assert_eq!(serde_json::to_value(Field::new(22)).expect("serialize"), json!("22"));
        let parsed: Field = serde_json::from_value(json!("100")).expect("text");
        assert_eq!(parsed, Field::new(100));
        let parsed: Field = serde_json::from_value(json!(7)).expect("number");
        assert_eq!(parsed, Field::new(7));
        assert!(serde_json::from_value::<Field>(json!("-1")).is_err());
        assert!(serde_json::from_value::<Field>(json!("0x10")).is_err());
        let history: History =
            serde_json::from_value(json!({"history": [34, "100"]})).expect("mixed");
        assert_eq!(history, History::new(34, 100));
    }

    #[test]
    fn top_history_flattens_in_order() {
        let top = TopHistory {
            top: [History::new(34, 100), History::new(88, 100)],
        };
        let fields: Vec<u64> = top.to_fields().iter().map(|f| f.value()).collect();
        assert_eq!(fields, vec![34, 100, 88, 100]);
        assert_eq!(
            serde_json::to_value(top).expect("serialize"),
            json!({"top": [{"history": ["34", "100"]}, {"history": ["88", "100"]}]})
        );
    }
}
