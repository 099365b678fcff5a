//! Query definition and full-scan evaluation.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use docstate_types::keys::KEY_READ_ACL;
use docstate_types::{DocId, State, Value};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::QueryResult;
use crate::expr::Expression;
use crate::order::{OrderByClause, OrderByExpr};
use crate::partial::{paginate, PartialList};
use crate::predicate::Predicate;

/// A predicate with ordering, pagination and an optional principal filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub expression: Expression,
    #[serde(default)]
    pub order_by: OrderByClause,
    /// Page size; `0` means no limit.
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    /// Return private copies instead of shared snapshots.
    #[serde(default)]
    pub deep_copy: bool,
    /// When set, only states whose read ACL names one of these principals match.
    #[serde(default)]
    pub principals: Option<BTreeSet<String>>,
}

impl Query {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            order_by: OrderByClause::default(),
            limit: 0,
            offset: 0,
            deep_copy: false,
            principals: None,
        }
    }

    /// Matches every state.
    pub fn all() -> Self {
        Self::new(Expression::All)
    }

    pub fn order_by(mut self, element: OrderByExpr) -> Self {
        self.order_by.elements.push(element);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn deep_copy(mut self, deep_copy: bool) -> Self {
        self.deep_copy = deep_copy;
        self
    }

    pub fn principals<I, S>(mut self, principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.principals = Some(principals.into_iter().map(Into::into).collect());
        self
    }

    /// Filter, sort and paginate `states`.
    ///
    /// States whose id is in `ignored` are skipped. The predicate is compiled
    /// before the first state is examined, so a malformed query never scans.
    pub fn evaluate<I>(
        &self,
        states: I,
        ignored: &HashSet<DocId>,
    ) -> QueryResult<PartialList<Arc<State>>>
    where
        I: IntoIterator<Item = Arc<State>>,
    {
        let predicate = Predicate::compile(&self.expression)?;

        let mut scanned = 0usize;
        let mut matches: Vec<Arc<State>> = Vec::new();
        for state in states {
            scanned += 1;
            if state.id_str().is_some_and(|id| ignored.contains(id)) {
                continue;
            }
            if !self.readable(&state) || !predicate.matches(&state) {
                continue;
            }
            matches.push(if self.deep_copy {
                Arc::new(State::clone(&state))
            } else {
                state
            });
        }

        if !self.order_by.is_empty() {
            // `sort_by` is stable: ties keep scan order.
            matches.sort_by(|a, b| self.order_by.compare(a, b));
        }

        let page = paginate(matches, self.limit, self.offset);
        trace!(
            scanned,
            matched = page.total_size,
            returned = page.len(),
            limit = self.limit,
            offset = self.offset,
            "query evaluated"
        );
        Ok(page)
    }

    fn readable(&self, state: &State) -> bool {
        let Some(principals) = &self.principals else {
            return true;
        };
        match state.get(KEY_READ_ACL) {
            Some(Value::Array(allowed)) => allowed
                .iter()
                .filter_map(Value::as_str)
                .any(|p| principals.contains(p)),
            Some(Value::String(p)) => principals.contains(p.as_str()),
            _ => false,
        }
    }
}
