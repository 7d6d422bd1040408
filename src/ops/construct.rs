//! Construction opcodes (§4.4.2 "Construction").

use crate::arena::Builder;
use crate::error::FailureKind;
use crate::ops::flags::ModifierFlags;
use crate::value::Value;

pub fn create_null() -> Value {
    Value::null()
}

pub fn create_bool(b: bool) -> Value {
    Value::bool(b)
}

pub fn create_int(n: i64, flags: ModifierFlags) -> Value {
    if flags.contains(ModifierFlags::UNSIGNED) {
        Value::int_unsigned(n as u64)
    } else {
        Value::int(n)
    }
}

pub fn create_flt(f: f64) -> Value {
    Value::float(f)
}

pub fn create_str(builder: &Builder<'_>, bytes: &str) -> Value {
    builder.intern_str(bytes)
}

/// `create_seq(items[], n)`: `n == 0` yields the empty-sequence sentinel
/// with no allocation. Items not already owned by `builder` are
/// internalized unless `DONT_INTERNALIZE` is set.
pub fn create_seq(builder: &Builder<'_>, items: Vec<Value>, flags: ModifierFlags) -> Value {
    if items.is_empty() {
        return Value::seq_empty();
    }
    let items = if flags.contains(ModifierFlags::DONT_INTERNALIZE) {
        items
    } else {
        items.into_iter().map(|v| builder.internalize(&v)).collect()
    };
    builder.make_seq(items)
}

/// `create_map(pairs[], n)`: rejects duplicate keys when the builder is
/// configured to disable them, otherwise last-write-wins like `assoc`
/// applied to an empty map would.
pub fn create_map(
    builder: &Builder<'_>,
    pairs: Vec<(Value, Value)>,
    flags: ModifierFlags,
) -> Result<Value, FailureKind> {
    if pairs.is_empty() {
        return Ok(Value::map_empty());
    }
    if builder.config().disable_duplicate_keys {
        for i in 0..pairs.len() {
            for j in (i + 1)..pairs.len() {
                if pairs[i].0.value_eq(&pairs[j].0) {
                    return Err(FailureKind::DuplicateKey);
                }
            }
        }
    }
    let pairs = if flags.contains(ModifierFlags::DONT_INTERNALIZE) {
        pairs
    } else {
        pairs
            .into_iter()
            .map(|(k, v)| (builder.internalize(&k), builder.internalize(&v)))
            .collect()
    };
    Ok(builder.make_map(pairs))
}
