//! Higher-order opcodes (§4.4.2 "Higher-order"): `filter`, `map`,
//! `reduce`, each with a `PARALLEL` variant.
//!
//! Parallel variants require the reducer to be associative; the engine
//! may split the sequence into chunks and combine partial accumulators
//! in any order (§5, §9 open questions) — so a non-associative combiner
//! is not guaranteed to produce the same result as the sequential path.

use crate::arena::Builder;
use crate::ops::flags::ModifierFlags;
use crate::value::Value;

fn items_of(v: &Value) -> Option<&[Value]> {
    match v {
        Value::Seq(s) => Some(s.as_slice()),
        _ => None,
    }
}

/// `filter(seq, pred)`. With `PARALLEL` set (and the `parallel` feature
/// enabled), the predicate runs across a worker pool; the pool must
/// tolerate `pred` being called from any thread, since result order is
/// restored afterward.
pub fn filter(
    builder: &Builder<'_>,
    seq: &Value,
    pred: impl Fn(&Value) -> bool + Sync,
    flags: ModifierFlags,
) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };

    #[cfg(feature = "parallel")]
    if flags.contains(ModifierFlags::PARALLEL) {
        use rayon::prelude::*;
        let out: Vec<Value> = items.par_iter().filter(|v| pred(v)).cloned().collect();
        return builder.make_seq(out);
    }
    #[cfg(not(feature = "parallel"))]
    let _ = flags;

    let out: Vec<Value> = items.iter().filter(|v| pred(v)).cloned().collect();
    builder.make_seq(out)
}

/// `map(seq, fn)`. The callback receives `builder` so it can allocate
/// (§9 "Closures in operations").
pub fn map(
    builder: &Builder<'_>,
    seq: &Value,
    f: impl Fn(&Builder<'_>, &Value) -> Value + Sync,
    flags: ModifierFlags,
) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };

    #[cfg(feature = "parallel")]
    if flags.contains(ModifierFlags::PARALLEL) {
        use rayon::prelude::*;
        let out: Vec<Value> = items.par_iter().map(|v| f(builder, v)).collect();
        return builder.make_seq(out);
    }
    #[cfg(not(feature = "parallel"))]
    let _ = flags;

    let out: Vec<Value> = items.iter().map(|v| f(builder, v)).collect();
    builder.make_seq(out)
}

/// `reduce(seq, acc0, fn)`. The sequential path folds left-to-right over
/// `acc0`. The `PARALLEL` path (available when the `parallel` feature is
/// enabled) splits the sequence into chunks, reduces each chunk on its
/// own (seeding from the chunk's first element, not `acc0` — `acc0` is
/// not necessarily an identity for `fn`, so it must be folded in exactly
/// once), combines the partial results pairwise, then applies `acc0`
/// once at the end. Correct only when `fn` is associative, per the
/// caller's contract; the engine cannot verify that.
pub fn reduce(
    builder: &Builder<'_>,
    seq: &Value,
    acc0: Value,
    f: impl Fn(&Builder<'_>, Value, &Value) -> Value + Sync,
    flags: ModifierFlags,
) -> Value {
    let Some(items) = items_of(seq) else { return Value::Invalid };

    #[cfg(feature = "parallel")]
    if flags.contains(ModifierFlags::PARALLEL) {
        use rayon::prelude::*;
        let chunk_count = rayon::current_num_threads().max(1);
        let chunk_size = (items.len() / chunk_count).max(1);
        let combined: Option<Value> = items
            .par_chunks(chunk_size)
            .map(|chunk| {
                let mut it = chunk.iter();
                let first = it.next()?.clone();
                Some(it.fold(first, |acc, v| f(builder, acc, v)))
            })
            .reduce(
                || None,
                |a, b| match (a, b) {
                    (Some(a), Some(b)) => Some(f(builder, a, &b)),
                    (Some(a), None) => Some(a),
                    (None, Some(b)) => Some(b),
                    (None, None) => None,
                },
            );
        return match combined {
            Some(v) => f(builder, acc0, &v),
            None => acc0,
        };
    }
    #[cfg(not(feature = "parallel"))]
    let _ = flags;

    items.iter().fold(acc0, |acc, v| f(builder, acc, v))
}
