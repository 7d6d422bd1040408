//! Sequence mutation and slicing opcodes (§4.4.2).
//!
//! Every opcode here takes an existing sequence `Value` and produces a
//! brand new one (values are immutable) or `Invalid` when a precondition
//! is violated. Construction always goes through the supplied
//! [`Builder`] so results are consistently owned/arena-tagged.

use crate::arena::Builder;
use crate::ops::convert::canonical_compare;
use crate::value::{Value, ValueType};

fn items_of(v: &Value) -> Option<&[Value]> {
    match v {
        Value::Seq(s) => Some(s.as_slice()),
        _ => None,
    }
}

/// `insert(seq, idx, items[], n)`: `idx <= |seq|`.
pub fn insert(builder: &Builder<'_>, seq: &Value, idx: usize, items: &[Value]) -> Value {
    let Some(existing) = items_of(seq) else { return Value::Invalid };
    if idx > existing.len() {
        return Value::Invalid;
    }
    let mut out = Vec::with_capacity(existing.len() + items.len());
    out.extend_from_slice(&existing[..idx]);
    out.extend_from_slice(items);
    out.extend_from_slice(&existing[idx..]);
    builder.make_seq(out)
}

/// `replace(seq, idx, items[], n)`: the `n` elements starting at `idx`
/// (`idx + n <= |seq|`) are removed and `items` spliced in their place.
pub fn replace(builder: &Builder<'_>, seq: &Value, idx: usize, n: usize, items: &[Value]) -> Value {
    let Some(existing) = items_of(seq) else { return Value::Invalid };
    if idx.checked_add(n).map_or(true, |end| end > existing.len()) {
        return Value::Invalid;
    }
    let mut out = Vec::with_capacity(existing.len() - n + items.len());
    out.extend_from_slice(&existing[..idx]);
    out.extend_from_slice(items);
    out.extend_from_slice(&existing[idx + n..]);
    builder.make_seq(out)
}

/// `append(seq, items[], n)`: equivalent to `insert` at `|seq|`.
pub fn append(builder: &Builder<'_>, seq: &Value, items: &[Value]) -> Value {
    let Some(existing) = items_of(seq) else { return Value::Invalid };
    insert(builder, seq, existing.len(), items)
}

/// `concat(seq, others[], n)`: concatenate sequences in order.
pub fn concat(builder: &Builder<'_>, seq: &Value, others: &[Value]) -> Value {
    let Some(first) = items_of(seq) else { return Value::Invalid };
    let mut out = first.to_vec();
    for other in others {
        match items_of(other) {
            Some(items) => out.extend_from_slice(items),
            None => return Value::Invalid,
        }
    }
    builder.make_seq(out)
}

pub fn reverse(builder: &Builder<'_>, seq: &Value) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };
    let mut out = items.to_vec();
    out.reverse();
    builder.make_seq(out)
}

/// Ordering-stable dedup by value equality, preserving first occurrence.
pub fn unique(builder: &Builder<'_>, seq: &Value) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.iter().any(|seen| seen.value_eq(item)) {
            out.push(item.clone());
        }
    }
    builder.make_seq(out)
}

/// `sort(seq, cmp?)`: stable sort; the default comparator is the
/// canonical ordering (§4.4.3). `cmp` lets a caller override it.
pub fn sort(
    builder: &Builder<'_>,
    seq: &Value,
    cmp: Option<&dyn Fn(&Value, &Value) -> std::cmp::Ordering>,
) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };
    let mut out = items.to_vec();
    match cmp {
        Some(f) => out.sort_by(|a, b| f(a, b)),
        None => out.sort_by(canonical_compare),
    }
    builder.make_seq(out)
}

/// `slice(seq, start, end)`: half-open range, must already lie within
/// bounds — unlike `slice_py` this does not clamp or accept negatives.
pub fn slice(builder: &Builder<'_>, seq: &Value, start: usize, end: usize) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };
    if start > end || end > items.len() {
        return Value::Invalid;
    }
    builder.make_seq(items[start..end].to_vec())
}

/// `slice_py(seq, start, end)`: Python-style slicing — negative indices
/// count from the end, and out-of-range bounds clamp rather than fail.
pub fn slice_py(builder: &Builder<'_>, seq: &Value, start: i64, end: i64) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };
    let len = items.len() as i64;
    let norm = |i: i64| -> i64 {
        let v = if i < 0 { len + i } else { i };
        v.clamp(0, len)
    };
    let (s, e) = (norm(start), norm(end));
    if s >= e {
        return builder.make_seq(vec![]);
    }
    builder.make_seq(items[s as usize..e as usize].to_vec())
}

pub fn take(builder: &Builder<'_>, seq: &Value, n: usize) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };
    let n = n.min(items.len());
    builder.make_seq(items[..n].to_vec())
}

pub fn drop(builder: &Builder<'_>, seq: &Value, n: usize) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };
    let n = n.min(items.len());
    builder.make_seq(items[n..].to_vec())
}

pub fn first(seq: &Value) -> Value {
    items_of(seq).and_then(|items| items.first()).cloned().unwrap_or(Value::Invalid)
}

pub fn last(seq: &Value) -> Value {
    items_of(seq).and_then(|items| items.last()).cloned().unwrap_or(Value::Invalid)
}

pub fn rest(builder: &Builder<'_>, seq: &Value) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };
    if items.is_empty() {
        return Value::Invalid;
    }
    builder.make_seq(items[1..].to_vec())
}

pub fn expected_type() -> ValueType {
    ValueType::Sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BuilderConfig;

    fn seq(b: &Builder<'_>, items: &[i64]) -> Value {
        b.make_seq(items.iter().map(|&n| Value::int(n)).collect())
    }

    #[test]
    fn insert_splices_at_index() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[1, 2, 3]);
        let out = insert(&b, &s, 1, &[Value::int(9)]);
        assert_eq!(out, seq(&b, &[1, 9, 2, 3]));
    }

    #[test]
    fn insert_out_of_range_is_invalid() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[1, 2, 3]);
        assert!(insert(&b, &s, 9, &[]).is_invalid());
    }

    #[test]
    fn reverse_then_reverse_is_identity() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[1, 2, 3]);
        let once = reverse(&b, &s);
        let twice = reverse(&b, &once);
        assert_eq!(twice, s);
    }

    #[test]
    fn unique_preserves_first_occurrence_order() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[1, 2, 1, 3, 2]);
        assert_eq!(unique(&b, &s), seq(&b, &[1, 2, 3]));
    }

    #[test]
    fn unique_is_idempotent() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[1, 2, 1, 3, 2]);
        let once = unique(&b, &s);
        let twice = unique(&b, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn sort_is_stable_and_idempotent() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[3, 1, 2]);
        let once = sort(&b, &s, None);
        assert_eq!(once, seq(&b, &[1, 2, 3]));
        let twice = sort(&b, &once, None);
        assert_eq!(once, twice);
    }

    #[test]
    fn slice_py_accepts_negative_indices() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[1, 2, 3, 4, 5]);
        assert_eq!(slice_py(&b, &s, -2, 5), seq(&b, &[4, 5]));
    }

    #[test]
    fn slice_py_neg_zero_neg_zero_is_empty() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[1, 2, 3]);
        assert_eq!(slice_py(&b, &s, -0, -0), Value::seq_empty());
    }

    #[test]
    fn slice_k_k_is_empty_for_any_valid_k() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[1, 2, 3]);
        assert_eq!(slice(&b, &s, 2, 2), Value::seq_empty());
    }

    #[test]
    fn first_last_rest_basic() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = seq(&b, &[1, 2, 3]);
        assert_eq!(first(&s), Value::int(1));
        assert_eq!(last(&s), Value::int(3));
        assert_eq!(rest(&b, &s), seq(&b, &[2, 3]));
    }

    #[test]
    fn first_of_empty_is_invalid() {
        assert!(first(&Value::seq_empty()).is_invalid());
    }
}
