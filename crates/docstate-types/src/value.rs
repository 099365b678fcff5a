use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::DocId;
use crate::state::State;

/// A field value held by a [`State`].
///
/// `Array` holds scalars only; lists of complex values are `StateList`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    State(State),
    StateList(Vec<State>),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
            Self::Array(_) => "array",
            Self::State(_) => "state",
            Self::StateList(_) => "state-list",
        }
    }

    /// Returns `true` for string, number, boolean and timestamp values.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::State(_) | Self::StateList(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view: longs are widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Long(n) => Some(*n as f64),
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_state(&self) -> Option<&State> {
        match self {
            Self::State(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_state_list(&self) -> Option<&[State]> {
        match self {
            Self::StateList(list) => Some(list),
            _ => None,
        }
    }

    /// Membership test used by key/value array scans.
    ///
    /// An array contains `needle` if any element equals it; any other value
    /// contains `needle` only if it equals it.
    pub fn contains(&self, needle: &Value) -> bool {
        match self {
            Self::Array(items) => items.iter().any(|item| item == needle),
            other => other == needle,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&DocId> for Value {
    fn from(id: &DocId) -> Self {
        Self::String(id.as_str().to_string())
    }
}

impl From<DocId> for Value {
    fn from(id: DocId) -> Self {
        Self::String(id.into_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl From<State> for Value {
    fn from(s: State) -> Self {
        Self::State(s)
    }
}

impl From<Vec<State>> for Value {
    fn from(list: Vec<State>) -> Self {
        Self::StateList(list)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Self::Array(items.into_iter().map(Value::from).collect())
    }
}
