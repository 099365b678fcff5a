use serde::{Deserialize, Serialize};

use crate::digest::BlobDigest;
use crate::error::TypeError;
use crate::keys::{KEY_BLOB_DIGEST, KEY_BLOB_LENGTH, KEY_BLOB_MIME_TYPE, KEY_BLOB_NAME};
use crate::state::State;
use crate::value::Value;

/// Reference from a document state to a payload held by a blob store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    pub digest: BlobDigest,
    pub length: u64,
    pub name: Option<String>,
    pub mime_type: Option<String>,
}

impl BlobRef {
    pub fn new(digest: BlobDigest, length: u64) -> Self {
        Self {
            digest,
            length,
            name: None,
            mime_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Encode as the nested state stored inside a document field.
    pub fn to_state(&self) -> State {
        let mut state = State::new();
        state.put(KEY_BLOB_DIGEST, self.digest.to_hex());
        state.put(KEY_BLOB_LENGTH, self.length as i64);
        if let Some(name) = &self.name {
            state.put(KEY_BLOB_NAME, name.as_str());
        }
        if let Some(mime) = &self.mime_type {
            state.put(KEY_BLOB_MIME_TYPE, mime.as_str());
        }
        state
    }

    /// Decode from a nested state. Fails unless a valid digest and length are present.
    pub fn from_state(state: &State) -> Result<Self, TypeError> {
        let hex = state.get_str(KEY_BLOB_DIGEST).ok_or_else(|| TypeError::Malformed {
            key: KEY_BLOB_DIGEST.to_string(),
            reason: "missing blob digest".into(),
        })?;
        let digest = BlobDigest::from_hex(hex)?;
        let length = match state.get(KEY_BLOB_LENGTH) {
            Some(Value::Long(n)) if *n >= 0 => *n as u64,
            Some(other) => {
                return Err(TypeError::Malformed {
                    key: KEY_BLOB_LENGTH.to_string(),
                    reason: format!("expected non-negative long, got {}", other.kind_name()),
                })
            }
            None => {
                return Err(TypeError::Malformed {
                    key: KEY_BLOB_LENGTH.to_string(),
                    reason: "missing blob length".into(),
                })
            }
        };
        Ok(Self {
            digest,
            length,
            name: state.get_str(KEY_BLOB_NAME).map(str::to_string),
            mime_type: state.get_str(KEY_BLOB_MIME_TYPE).map(str::to_string),
        })
    }

    /// Collect every blob reference reachable from `state`, at any depth.
    ///
    /// A nested state is a blob reference when it carries a decodable digest.
    pub fn collect_from(state: &State) -> Vec<BlobRef> {
        let mut out = Vec::new();
        collect_state(state, &mut out);
        out
    }
}

fn collect_state(state: &State, out: &mut Vec<BlobRef>) {
    for (_, value) in state.iter() {
        match value {
            Value::State(nested) => collect_nested(nested, out),
            Value::StateList(list) => list.iter().for_each(|nested| collect_nested(nested, out)),
            _ => {}
        }
    }
}

fn collect_nested(nested: &State, out: &mut Vec<BlobRef>) {
    if nested.contains_key(KEY_BLOB_DIGEST) {
        if let Ok(blob) = BlobRef::from_state(nested) {
            out.push(blob);
            return;
        }
    }
    collect_state(nested, out);
}
