//! Value comparison for predicates and sorting.

use std::cmp::Ordering;

use docstate_types::Value;

/// Compare two scalars for predicate evaluation.
///
/// Returns `None` when the values are not comparable (different kinds, NaN,
/// or complex values); predicates treat that as "no match". Longs and doubles
/// compare numerically.
pub fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Long(x), Value::Long(y)) => Some(x.cmp(y)),
        (Value::Long(_) | Value::Double(_), Value::Long(_) | Value::Double(_)) => {
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Predicate equality: comparable and equal.
pub fn scalars_equal(a: &Value, b: &Value) -> bool {
    compare_scalars(a, b) == Some(Ordering::Equal)
}

/// Position of a value kind in the mixed-type sort order.
fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Boolean(_) => 0,
        Value::Long(_) | Value::Double(_) => 1,
        Value::String(_) => 2,
        Value::Timestamp(_) => 3,
        Value::Array(_) | Value::State(_) | Value::StateList(_) => 4,
    }
}

/// Total order over present values, used for sorting.
///
/// Kinds order Boolean < Number < String < Timestamp < complex; within a kind
/// values use their natural order (doubles via `total_cmp`). Complex values
/// tie with each other.
pub fn total_cmp(a: &Value, b: &Value) -> Ordering {
    kind_rank(a).cmp(&kind_rank(b)).then_with(|| match (a, b) {
        (Value::Long(x), Value::Long(y)) => x.cmp(y),
        (Value::Long(_) | Value::Double(_), Value::Long(_) | Value::Double(_)) => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        _ => Ordering::Equal,
    })
}

/// Sort-key comparison with absent values first regardless of direction.
pub fn sort_key_cmp(a: Option<&Value>, b: Option<&Value>, ascending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => {
            let ord = total_cmp(x, y);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}
