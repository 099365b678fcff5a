//! Order-by clauses.

use std::cmp::Ordering;

use docstate_types::State;
use serde::{Deserialize, Serialize};

use crate::compare::sort_key_cmp;
use crate::path::FieldPath;

/// One `(path, direction)` pair of an ordering clause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByExpr {
    pub path: FieldPath,
    pub ascending: bool,
}

impl OrderByExpr {
    pub fn asc(path: FieldPath) -> Self {
        Self {
            path,
            ascending: true,
        }
    }

    pub fn desc(path: FieldPath) -> Self {
        Self {
            path,
            ascending: false,
        }
    }
}

/// Composite ordering: each element breaks ties left by the previous ones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByClause {
    pub elements: Vec<OrderByExpr>,
}

impl OrderByClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, element: OrderByExpr) -> Self {
        self.elements.push(element);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Compare two states. Absent sort keys come first in either direction.
    pub fn compare(&self, a: &State, b: &State) -> Ordering {
        self.elements
            .iter()
            .map(|e| sort_key_cmp(e.path.first(a), e.path.first(b), e.ascending))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl FromIterator<OrderByExpr> for OrderByClause {
    fn from_iter<I: IntoIterator<Item = OrderByExpr>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}
