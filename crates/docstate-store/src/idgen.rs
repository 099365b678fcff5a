//! Document identifier generators.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use docstate_types::DocId;
use uuid::Uuid;

use crate::config::IdStrategy;

/// Issues document identifiers for one repository.
///
/// `root_id` is fixed for the generator's lifetime. `new_id` never returns
/// the root id nor any id it returned before. Both must be callable from any
/// thread.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn root_id(&self) -> DocId;
    fn new_id(&self) -> DocId;
}

/// Deterministic counter: root is `"0"`, new ids count up from `"1"`.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn root_id(&self) -> DocId {
        DocId::new("0")
    }

    fn new_id(&self) -> DocId {
        DocId::new(self.next.fetch_add(1, Ordering::Relaxed).to_string())
    }
}

/// Time-ordered UUID v7 ids; the root is the nil UUID.
#[derive(Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn root_id(&self) -> DocId {
        DocId::from_uuid(Uuid::nil())
    }

    fn new_id(&self) -> DocId {
        DocId::from_uuid(Uuid::now_v7())
    }
}

pub fn for_strategy(strategy: IdStrategy) -> Box<dyn IdGenerator> {
    match strategy {
        IdStrategy::Sequential => Box::new(SequentialIdGenerator::new()),
        IdStrategy::Random => Box::new(RandomIdGenerator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn sequential_starts_after_root() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.root_id().as_str(), "0");
        assert_eq!(ids.new_id().as_str(), "1");
        assert_eq!(ids.new_id().as_str(), "2");
        assert_eq!(ids.root_id().as_str(), "0");
    }

    #[test]
    fn random_ids_differ_from_root() {
        let ids = RandomIdGenerator;
        let root = ids.root_id();
        assert_eq!(root.as_str(), "00000000-0000-0000-0000-000000000000");
        let a = ids.new_id();
        let b = ids.new_id();
        assert_ne!(a, root);
        assert_ne!(a, b);
    }

    #[test]
    fn concurrent_sequential_ids_are_unique() {
        let ids = SequentialIdGenerator::new();
        let issued: Vec<DocId> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| (0..250).map(|_| ids.new_id()).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        let unique: HashSet<_> = issued.iter().collect();
        assert_eq!(unique.len(), 1000);
        assert!(!unique.contains(&ids.root_id()));
    }

    proptest! {
        #[test]
        fn never_repeats(count in 1usize..300, random in any::<bool>()) {
            let ids = for_strategy(if random { IdStrategy::Random } else { IdStrategy::Sequential });
            let mut seen = HashSet::new();
            seen.insert(ids.root_id());
            for _ in 0..count {
                prop_assert!(seen.insert(ids.new_id()));
            }
        }
    }
}
