//! Query opcodes (§4.4.2 "Queries").

use crate::arena::Builder;
use crate::value::{Value, ValueType};

/// `contains(col, items[], n)`: true iff every item is present — set
/// semantics on sequences (value equality), key semantics on mappings.
pub fn contains(col: &Value, items: &[Value]) -> bool {
    match col {
        Value::Seq(s) => items.iter().all(|item| s.as_slice().iter().any(|e| e.value_eq(item))),
        Value::Map(m) => items.iter().all(|item| m.get(item).is_some()),
        _ => false,
    }
}

fn seq_index(seq_len: usize, key: &Value) -> Option<usize> {
    match key {
        Value::Int(i) => {
            let n = i.as_i128();
            if n >= 0 && (n as usize) < seq_len {
                Some(n as usize)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// `get(col, key)`: for mappings, value by key; for sequences, element
/// by integer index (coerced from `key`). Absent ⇒ invalid.
pub fn get(col: &Value, key: &Value) -> Value {
    match col {
        Value::Map(m) => m.get(key).cloned().unwrap_or(Value::Invalid),
        Value::Seq(s) => match seq_index(s.as_slice().len(), key) {
            Some(idx) => s.as_slice()[idx].clone(),
            None => Value::Invalid,
        },
        _ => Value::Invalid,
    }
}

/// `get_at(col, idx)`: element by numeric index only.
pub fn get_at(col: &Value, idx: usize) -> Value {
    match col {
        Value::Seq(s) => s.as_slice().get(idx).cloned().unwrap_or(Value::Invalid),
        _ => Value::Invalid,
    }
}

/// `get_at_path(root, path[], n)`: iterated `get` along a path of keys
/// or indices; if at any step the current node is not a collection or
/// the lookup fails, returns invalid.
pub fn get_at_path(root: &Value, path: &[Value]) -> Value {
    let mut cur = root.clone();
    for step in path {
        if !cur.is_collection() {
            return Value::Invalid;
        }
        cur = get(&cur, step);
        if cur.is_invalid() {
            return Value::Invalid;
        }
    }
    cur
}

/// `set_at(seq, idx, value)`: replace at index.
pub fn set_at(builder: &Builder<'_>, seq: &Value, idx: usize, value: Value) -> Value {
    match seq {
        Value::Seq(s) => {
            let items = s.as_slice();
            if idx >= items.len() {
                return Value::Invalid;
            }
            let mut out = items.to_vec();
            out[idx] = value;
            builder.make_seq(out)
        }
        _ => Value::Invalid,
    }
}

/// Whether a path step indicates a sequence (numeric) or mapping
/// (anything else) should be synthesized when `CREATE_PATH` is set
/// (§9 open question, resolved explicitly: integer ⇒ sequence, string ⇒
/// mapping).
fn empty_collection_for_step(step: &Value) -> Value {
    if step.type_of() == ValueType::Int {
        Value::seq_empty()
    } else {
        Value::map_empty()
    }
}

/// `set_at_path(root, path[], n, value)`: walks `path`. With
/// `create_path = true`, synthesizes mappings (or sequences, when a
/// path step is numeric) for missing nodes; without it, a missing step
/// fails. `root` must already be a collection (empty sentinels count —
/// `Value::map_empty()`/`Value::seq_empty()` are still `Value::Map`/
/// `Value::Seq`, just with no stored pairs/items yet).
pub fn set_at_path(
    builder: &Builder<'_>,
    root: &Value,
    path: &[Value],
    value: Value,
    create_path: bool,
) -> Value {
    let Some((head, rest)) = path.split_first() else {
        return value;
    };
    if rest.is_empty() {
        return set_one(builder, root, head, value);
    }

    let existing_child = get(root, head);
    let child = if !existing_child.is_invalid() {
        existing_child
    } else if create_path {
        empty_collection_for_step(&rest[0])
    } else {
        return Value::Invalid;
    };

    let updated_child = set_at_path(builder, &child, rest, value, create_path);
    if updated_child.is_invalid() {
        return Value::Invalid;
    }
    set_one(builder, root, head, updated_child)
}

/// Set a single key/index directly on `col`. `col` must be a (possibly
/// empty) mapping or sequence. For sequences, `key == len(col)` grows
/// the sequence by one (needed when a freshly synthesized empty
/// sequence receives its first element via `CREATE_PATH`).
fn set_one(builder: &Builder<'_>, col: &Value, key: &Value, value: Value) -> Value {
    match col {
        Value::Map(_) => crate::ops::mapping::assoc(builder, col, &[(key.clone(), value)]),
        Value::Seq(s) => {
            let Value::Int(i) = key else { return Value::Invalid };
            let n = i.as_i128();
            if n < 0 {
                return Value::Invalid;
            }
            let idx = n as usize;
            let len = s.as_slice().len();
            if idx < len {
                set_at(builder, col, idx, value)
            } else if idx == len {
                append(builder, col, value)
            } else {
                Value::Invalid
            }
        }
        _ => Value::Invalid,
    }
}

fn append(builder: &Builder<'_>, seq: &Value, value: Value) -> Value {
    match seq {
        Value::Seq(s) => {
            let mut out = s.as_slice().to_vec();
            out.push(value);
            builder.make_seq(out)
        }
        _ => Value::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BuilderConfig;

    #[test]
    fn contains_set_semantics_on_sequences() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = b.make_seq(vec![Value::int(1), Value::int(2), Value::int(3)]);
        assert!(contains(&s, &[Value::int(1), Value::int(3)]));
        assert!(!contains(&s, &[Value::int(9)]));
    }

    #[test]
    fn get_on_sequence_by_index() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = b.make_seq(vec![Value::int(10), Value::int(20)]);
        assert_eq!(get(&s, &Value::int(1)), Value::int(20));
        assert!(get(&s, &Value::int(5)).is_invalid());
    }

    #[test]
    fn deep_set_at_path_with_create() {
        let b = Builder::new_heap(BuilderConfig::default());
        let owner = b.id();
        let root = Value::map_empty();
        let path = vec![Value::str("a", owner), Value::str("b", owner), Value::str("c", owner)];
        let updated = set_at_path(&b, &root, &path, Value::int(42), true);
        assert_eq!(get_at_path(&updated, &path), Value::int(42));

        let partial_path = vec![Value::str("a", owner), Value::str("b", owner)];
        let partial = get_at_path(&updated, &partial_path);
        assert!(partial.is_map());
        let Value::Map(m) = partial else { panic!() };
        assert_eq!(m.as_slice().len(), 1);
    }

    #[test]
    fn set_at_path_without_create_fails_on_missing_step() {
        let b = Builder::new_heap(BuilderConfig::default());
        let owner = b.id();
        let root = Value::map_empty();
        let path = vec![Value::str("a", owner), Value::str("b", owner)];
        let updated = set_at_path(&b, &root, &path, Value::int(1), false);
        assert!(updated.is_invalid());
    }
}
