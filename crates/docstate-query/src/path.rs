//! Field paths into document states.
//!
//! A path is a `/`-separated list of segments:
//!
//! - a key segment selects a field of a nested state, and fans out over every
//!   element of a list of states (`files/name`);
//! - `*` fans out over every element of any list (`files/*/name`, `tags/*`);
//! - a numeric segment selects one list element (`files/0/name`).
//!
//! Resolution returns every field value reached; elements selected from a
//! list of states are traversed but never returned. A leaf list of scalars is
//! flattened, so a predicate over a list field is true when any element
//! satisfies it.

use std::fmt;
use std::str::FromStr;

use docstate_types::{State, Value};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Key(String),
    Index(usize),
    Any,
}

/// Parsed path to a (possibly nested) field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Path to a top-level field. Never fails: the key is used verbatim.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Key(key.into())],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The top-level key this path starts from.
    pub fn root_key(&self) -> &str {
        match self.segments.first() {
            Some(Segment::Key(k)) => k,
            _ => "",
        }
    }

    /// Every value reachable through this path, leaf arrays flattened.
    pub fn resolve<'a>(&self, state: &'a State) -> Vec<&'a Value> {
        let mut nodes = vec![Node::State(state)];
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in nodes {
                node.step(segment, &mut next);
            }
            if next.is_empty() {
                return Vec::new();
            }
            nodes = next;
        }

        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Value(Value::Array(items)) => out.extend(items.iter()),
                Node::Value(value) => out.push(value),
                Node::State(_) => {}
            }
        }
        out
    }

    /// First value reachable through this path, used as a sort key.
    pub fn first<'a>(&self, state: &'a State) -> Option<&'a Value> {
        self.resolve(state).into_iter().next()
    }
}

#[derive(Clone, Copy)]
enum Node<'a> {
    State(&'a State),
    Value(&'a Value),
}

impl<'a> Node<'a> {
    fn step(self, segment: &Segment, out: &mut Vec<Node<'a>>) {
        match (self, segment) {
            (Node::State(s), Segment::Key(k)) | (Node::Value(Value::State(s)), Segment::Key(k)) => {
                if let Some(v) = s.get(k) {
                    out.push(Node::Value(v));
                }
            }
            (Node::Value(Value::StateList(list)), Segment::Key(k)) => {
                out.extend(list.iter().filter_map(|s| s.get(k)).map(Node::Value));
            }
            (Node::Value(Value::StateList(list)), Segment::Any) => {
                out.extend(list.iter().map(Node::State));
            }
            (Node::Value(Value::StateList(list)), Segment::Index(i)) => {
                out.extend(list.get(*i).map(Node::State));
            }
            (Node::Value(Value::Array(items)), Segment::Any) => {
                out.extend(items.iter().map(Node::Value));
            }
            (Node::Value(Value::Array(items)), Segment::Index(i)) => {
                out.extend(items.get(*i).map(Node::Value));
            }
            _ => {}
        }
    }
}

impl FromStr for FieldPath {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| QueryError::InvalidPath {
            path: s.to_string(),
            reason: reason.to_string(),
        };
        let mut segments = Vec::new();
        for part in s.split('/') {
            let segment = match part {
                "" => return Err(invalid("empty segment")),
                "*" => Segment::Any,
                digits if digits.bytes().all(|b| b.is_ascii_digit()) => Segment::Index(
                    digits.parse().map_err(|_| invalid("index out of range"))?,
                ),
                key => Segment::Key(key.to_string()),
            };
            segments.push(segment);
        }
        if !matches!(segments.first(), Some(Segment::Key(_))) {
            return Err(invalid("must start with a field key"));
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match segment {
                Segment::Key(k) => f.write_str(k)?,
                Segment::Index(n) => write!(f, "{n}")?,
                Segment::Any => f.write_str("*")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    fn sample() -> State {
        State::new()
            .with("dc:title", "Report")
            .with("dc:subjects", vec!["art", "science"])
            .with("author", State::new().with("first", "Ada").with("last", "Lovelace"))
            .with(
                "files",
                vec![
                    State::new().with("name", "a.pdf").with("size", 10i64),
                    State::new().with("name", "b.pdf"),
                ],
            )
    }

    #[test]
    fn parse_and_display() {
        let p = path("files/*/name");
        assert_eq!(
            p.segments(),
            &[
                Segment::Key("files".into()),
                Segment::Any,
                Segment::Key("name".into())
            ]
        );
        assert_eq!(p.to_string(), "files/*/name");
        assert_eq!(path("files/1/name").segments()[1], Segment::Index(1));
    }

    #[test]
    fn parse_rejects_bad_paths() {
        for bad in ["", "a//b", "*/x", "0/x", "a/"] {
            assert!(bad.parse::<FieldPath>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn key_allows_colons_and_slashes_verbatim() {
        let p = FieldPath::key("odd/key");
        assert_eq!(p.segments().len(), 1);
        assert_eq!(p.root_key(), "odd/key");
    }

    #[test]
    fn resolves_top_level_and_nested_fields() {
        let state = sample();
        assert_eq!(path("dc:title").resolve(&state), vec![&Value::from("Report")]);
        assert_eq!(path("author/last").resolve(&state), vec![&Value::from("Lovelace")]);
        assert!(path("author/middle").resolve(&state).is_empty());
        assert!(path("missing/deeper").resolve(&state).is_empty());
    }

    #[test]
    fn leaf_arrays_are_flattened() {
        let state = sample();
        assert_eq!(
            path("dc:subjects").resolve(&state),
            vec![&Value::from("art"), &Value::from("science")]
        );
        assert_eq!(path("dc:subjects/1").resolve(&state), vec![&Value::from("science")]);
        assert_eq!(path("dc:subjects/*").resolve(&state).len(), 2);
    }

    #[test]
    fn state_lists_fan_out() {
        let state = sample();
        let implicit = path("files/name").resolve(&state);
        let explicit = path("files/*/name").resolve(&state);
        assert_eq!(implicit, vec![&Value::from("a.pdf"), &Value::from("b.pdf")]);
        assert_eq!(implicit, explicit);
        assert_eq!(path("files/1/name").resolve(&state), vec![&Value::from("b.pdf")]);
        assert!(path("files/5/name").resolve(&state).is_empty());
        assert_eq!(path("files/size").resolve(&state), vec![&Value::Long(10)]);
    }

    #[test]
    fn list_elements_are_traversed_not_returned() {
        let state = sample();
        assert!(path("files/0").resolve(&state).is_empty());
        assert_eq!(path("author").resolve(&state).len(), 1);
    }

    #[test]
    fn first_picks_first_resolved() {
        let state = sample();
        assert_eq!(path("files/name").first(&state), Some(&Value::from("a.pdf")));
        assert_eq!(path("nope").first(&state), None);
    }
}
