//! Paginated query results.

use serde::{Deserialize, Serialize};

/// A page of results together with the match count before pagination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartialList<T> {
    pub items: Vec<T>,
    pub total_size: usize,
}

impl<T> PartialList<T> {
    pub fn new(items: Vec<T>, total_size: usize) -> Self {
        Self { items, total_size }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PartialList<U> {
        PartialList {
            items: self.items.into_iter().map(f).collect(),
            total_size: self.total_size,
        }
    }
}

impl<T> IntoIterator for PartialList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Apply `limit`/`offset` to a full result set.
///
/// A zero `limit` returns everything and ignores `offset`. An `offset` past
/// the end yields an empty page.
pub fn paginate<T>(mut items: Vec<T>, limit: usize, offset: usize) -> PartialList<T> {
    let total_size = items.len();
    if limit != 0 {
        let start = offset.min(total_size);
        items.drain(..start);
        items.truncate(limit);
    }
    PartialList { items, total_size }
}
