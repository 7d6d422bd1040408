//! Mapping mutation opcodes (§4.4.2 "Mapping mutation").

use crate::arena::Builder;
use crate::value::Value;

fn pairs_of(v: &Value) -> Option<&[(Value, Value)]> {
    match v {
        Value::Map(m) => Some(m.as_slice()),
        _ => None,
    }
}

/// `assoc(map, pairs[], n)`: upsert — existing keys retain position and
/// receive the new value; new keys are appended at the end. `set` is an
/// alias of this opcode.
pub fn assoc(builder: &Builder<'_>, map: &Value, pairs: &[(Value, Value)]) -> Value {
    let Some(existing) = pairs_of(map) else { return Value::Invalid };
    let mut out: Vec<(Value, Value)> = existing.to_vec();
    for (k, v) in pairs {
        match out.iter_mut().find(|(ek, _)| ek.value_eq(k)) {
            Some(slot) => slot.1 = v.clone(),
            None => out.push((k.clone(), v.clone())),
        }
    }
    builder.make_map(out)
}

/// `set(map, pairs[], n)` — alias of [`assoc`].
pub fn set(builder: &Builder<'_>, map: &Value, pairs: &[(Value, Value)]) -> Value {
    assoc(builder, map, pairs)
}

/// `disassoc(map, keys[], n)`: remove matching keys, preserving the
/// order of survivors.
pub fn disassoc(builder: &Builder<'_>, map: &Value, keys: &[Value]) -> Value {
    let Some(existing) = pairs_of(map) else { return Value::Invalid };
    let out: Vec<(Value, Value)> = existing
        .iter()
        .filter(|(k, _)| !keys.iter().any(|rk| rk.value_eq(k)))
        .cloned()
        .collect();
    builder.make_map(out)
}

/// `merge(map, others[], n)`: deep merge left-to-right. On key conflict,
/// when both values are mappings the merge recurses; otherwise the
/// later value wins. Key order follows first-appearance across the
/// merge sequence, matching `assoc`'s upsert-in-place behavior.
pub fn merge(builder: &Builder<'_>, map: &Value, others: &[Value]) -> Value {
    let Some(base) = pairs_of(map) else { return Value::Invalid };
    let mut out: Vec<(Value, Value)> = base.to_vec();
    for other in others {
        let Some(other_pairs) = pairs_of(other) else { return Value::Invalid };
        for (k, v) in other_pairs {
            match out.iter().position(|(ek, _)| ek.value_eq(k)) {
                Some(idx) => {
                    let existing_v = out[idx].1.clone();
                    let merged = if existing_v.is_map() && v.is_map() {
                        merge(builder, &existing_v, std::slice::from_ref(v))
                    } else {
                        v.clone()
                    };
                    out[idx].1 = merged;
                }
                None => out.push((k.clone(), v.clone())),
            }
        }
    }
    builder.make_map(out)
}

/// `keys(map)`: extract keys as a sequence, in stored order.
pub fn keys(builder: &Builder<'_>, map: &Value) -> Value {
    let Some(pairs) = pairs_of(map) else { return Value::Invalid };
    builder.make_seq(pairs.iter().map(|(k, _)| k.clone()).collect())
}

/// `values(map)`: extract values as a sequence, in stored order.
pub fn values(builder: &Builder<'_>, map: &Value) -> Value {
    let Some(pairs) = pairs_of(map) else { return Value::Invalid };
    builder.make_seq(pairs.iter().map(|(_, v)| v.clone()).collect())
}

/// `items(map)`: a sequence of two-element sequences `[k, v]`.
pub fn items(builder: &Builder<'_>, map: &Value) -> Value {
    let Some(pairs) = pairs_of(map) else { return Value::Invalid };
    let out = pairs
        .iter()
        .map(|(k, v)| builder.make_seq(vec![k.clone(), v.clone()]))
        .collect();
    builder.make_seq(out)
}
