use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::DocId;
use crate::keys::{KEY_ID, KEY_NAME, KEY_PARENT_ID, KEY_TYPE};
use crate::value::Value;

/// A document state: the field map stored for one node of the hierarchy.
///
/// Absent keys mean "no value"; there is no null variant. Fields are kept in
/// key order so that equal states always serialize identically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    fields: BTreeMap<String, Value>,
}

impl State {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// A document state carrying the reserved hierarchy keys.
    pub fn document(id: &DocId, parent: Option<&DocId>, name: &str, doc_type: &str) -> Self {
        let mut state = Self::new();
        state.put(KEY_ID, id);
        if let Some(parent) = parent {
            state.put(KEY_PARENT_ID, parent);
        }
        state.put(KEY_NAME, name);
        state.put(KEY_TYPE, doc_type);
        state
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(key, value);
        self
    }

    /// Insert or replace a field, returning the previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// The state's identifier, if the reserved key holds a string.
    pub fn id(&self) -> Option<DocId> {
        self.get_str(KEY_ID).map(DocId::from)
    }

    /// Borrowed form of [`State::id`] for hot paths.
    pub fn id_str(&self) -> Option<&str> {
        self.get_str(KEY_ID)
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.get_str(KEY_PARENT_ID)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str(KEY_NAME)
    }

    pub fn doc_type(&self) -> Option<&str> {
        self.get_str(KEY_TYPE)
    }

    /// Convert to a JSON object. Timestamps become RFC 3339 strings and
    /// non-finite doubles become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Build a state from a JSON object.
    ///
    /// `null` members are dropped, integers become `Long`, other numbers
    /// `Double`, and a non-empty array of objects becomes a `StateList`.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, TypeError> {
        let object = json.as_object().ok_or_else(|| {
            TypeError::Serialization(format!("expected JSON object, got {json}"))
        })?;
        let mut state = Self::new();
        for (key, member) in object {
            if let Some(value) = json_to_value(key, member)? {
                state.fields.insert(key.clone(), value);
            }
        }
        Ok(state)
    }
}

impl FromIterator<(String, Value)> for State {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as J;
    match value {
        Value::String(s) => J::String(s.clone()),
        Value::Long(n) => J::from(*n),
        Value::Double(d) => serde_json::Number::from_f64(*d).map_or(J::Null, J::Number),
        Value::Boolean(b) => J::Bool(*b),
        Value::Timestamp(t) => J::String(t.to_rfc3339()),
        Value::Array(items) => J::Array(items.iter().map(value_to_json).collect()),
        Value::State(s) => s.to_json(),
        Value::StateList(list) => J::Array(list.iter().map(State::to_json).collect()),
    }
}

fn json_to_value(key: &str, json: &serde_json::Value) -> Result<Option<Value>, TypeError> {
    use serde_json::Value as J;
    let value = match json {
        J::Null => return Ok(None),
        J::Bool(b) => Value::Boolean(*b),
        J::Number(n) => match n.as_i64() {
            Some(long) => Value::Long(long),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        J::String(s) => Value::String(s.clone()),
        J::Object(_) => Value::State(State::from_json(json)?),
        J::Array(items) if !items.is_empty() && items.iter().all(J::is_object) => {
            let list = items
                .iter()
                .map(State::from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Value::StateList(list)
        }
        J::Array(items) => {
            let mut scalars = Vec::with_capacity(items.len());
            for item in items {
                match json_to_value(key, item)? {
                    Some(v) if v.is_scalar() => scalars.push(v),
                    Some(v) => {
                        return Err(TypeError::Malformed {
                            key: key.to_string(),
                            reason: format!("array element of kind {} is not a scalar", v.kind_name()),
                        })
                    }
                    None => {}
                }
            }
            Value::Array(scalars)
        }
    };
    Ok(Some(value))
}
