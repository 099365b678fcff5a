//! Query evaluation over docstate document states.
//!
//! A [`Query`] pairs an already-built [`Expression`] with an
//! [`OrderByClause`] and `limit`/`offset` pagination. Evaluation is a full
//! scan: compile the predicate, filter, stable-sort, count, then page.
//!
//! # Semantics
//!
//! - Multi-valued paths match when any resolved value satisfies a positive
//!   predicate; negated forms are the logical negation of the positive one.
//! - Comparisons across incompatible kinds are false. Longs and doubles
//!   compare numerically.
//! - Absent sort keys come first in both directions.
//! - `limit == 0` means no limit, and `offset` is then ignored.

pub mod compare;
pub mod error;
pub mod expr;
pub mod order;
pub mod partial;
pub mod path;
pub mod predicate;
pub mod query;

pub use error::{QueryError, QueryResult};
pub use expr::{CompareOp, Expression};
pub use order::{OrderByClause, OrderByExpr};
pub use partial::{paginate, PartialList};
pub use path::{FieldPath, Segment};
pub use predicate::Predicate;
pub use query::Query;
