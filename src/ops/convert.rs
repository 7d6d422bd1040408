//! Canonical value ordering (§4.4.3) and the type conversion table
//! (§4.4.4).

use std::cmp::Ordering;
use std::rc::Rc;

use crate::value::{Value, ValueType};

fn type_rank(t: ValueType) -> u8 {
    match t {
        ValueType::Null => 0,
        ValueType::Bool => 1,
        ValueType::Int => 2,
        ValueType::Float => 3,
        ValueType::String => 4,
        ValueType::Sequence => 5,
        ValueType::Mapping => 6,
        ValueType::Indirect => 7,
        ValueType::Alias => 8,
        ValueType::Invalid => 9,
    }
}

/// Reduce an indirect to the value it carries for ordering purposes — the
/// glossary is explicit that an indirect "does not change the value's
/// logical type", so two values that differ only by metadata wrapping
/// must compare equal to their unwrapped forms. An alias (no wrapped
/// value) compares as its anchor name.
fn strip_for_compare(v: &Value) -> Value {
    match v {
        Value::Indirect(ind) => match &ind.value {
            Some(inner) => strip_for_compare(inner),
            None => Value::Alias(Rc::from(ind.anchor.as_deref().unwrap_or(""))),
        },
        other => other.clone(),
    }
}

/// The canonical total order from §4.4.3.
pub fn canonical_compare(a: &Value, b: &Value) -> Ordering {
    let a = strip_for_compare(a);
    let b = strip_for_compare(b);

    let (ta, tb) = (a.type_of(), b.type_of());
    if ta != tb {
        return type_rank(ta).cmp(&type_rank(tb));
    }

    match (&a, &b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(_), Value::Int(_)) => {
            let (Value::Int(x), Value::Int(y)) = (&a, &b) else { unreachable!() };
            x.as_i128().cmp(&y.as_i128())
        }
        (Value::Float(x), Value::Float(y)) => compare_floats(*x, *y),
        (Value::Str(x), Value::Str(y)) => x.as_str().as_bytes().cmp(y.as_str().as_bytes()),
        (Value::Seq(x), Value::Seq(y)) => {
            let (xs, ys) = (x.as_slice(), y.as_slice());
            for (ex, ey) in xs.iter().zip(ys.iter()) {
                match canonical_compare(ex, ey) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            xs.len().cmp(&ys.len())
        }
        (Value::Map(x), Value::Map(y)) => {
            let (xs, ys) = (x.as_slice(), y.as_slice());
            for ((xk, xv), (yk, yv)) in xs.iter().zip(ys.iter()) {
                match canonical_compare(xk, yk) {
                    Ordering::Equal => {}
                    other => return other,
                }
                match canonical_compare(xv, yv) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            xs.len().cmp(&ys.len())
        }
        (Value::Alias(x), Value::Alias(y)) => x.as_bytes().cmp(y.as_bytes()),
        // Invalid has no defined order among its own kind; treat as equal
        // so sorts are at least stable.
        _ => Ordering::Equal,
    }
}

/// NaN sorts after +infinity, deterministically, rather than per IEEE 754
/// unordered comparison (§4.4.3 rule 5).
fn compare_floats(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.partial_cmp(&y).expect("non-NaN floats are totally ordered"),
    }
}

/// `convert(v, target_type)` (§4.4.4). Indirect wrapping is transparent —
/// conversion operates on the resolved value.
pub fn convert(v: &Value, target: ValueType) -> Value {
    let v = v.resolve();
    if v.is_invalid() {
        return Value::Invalid;
    }
    match target {
        ValueType::Null => convert_to_null(&v),
        ValueType::Bool => convert_to_bool(&v),
        ValueType::Int => convert_to_int(&v),
        ValueType::Float => convert_to_float(&v),
        ValueType::String => convert_to_string(&v),
        _ => Value::Invalid,
    }
}

fn convert_to_null(_v: &Value) -> Value {
    // Every source type in the table converts to null unconditionally.
    Value::Null
}

fn convert_to_bool(v: &Value) -> Value {
    match v {
        Value::Null => Value::Bool(false),
        Value::Bool(b) => Value::Bool(*b),
        Value::Int(i) => Value::Bool(i.as_i128() != 0),
        Value::Float(f) => {
            if f.is_nan() || f.is_infinite() {
                Value::Invalid
            } else {
                Value::Bool(*f != 0.0)
            }
        }
        Value::Str(s) => match s.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Invalid,
        },
        Value::Seq(s) => Value::Bool(!s.as_slice().is_empty()),
        Value::Map(m) => Value::Bool(!m.as_slice().is_empty()),
        _ => Value::Invalid,
    }
}

fn convert_to_int(v: &Value) -> Value {
    match v {
        Value::Null => Value::int(0),
        Value::Bool(b) => Value::int(if *b { 1 } else { 0 }),
        Value::Int(_) => v.clone(),
        Value::Float(f) => {
            if f.is_nan() || !f.is_finite() || *f < i64::MIN as f64 || *f > i64::MAX as f64 {
                Value::Invalid
            } else {
                Value::int(f.trunc() as i64)
            }
        }
        Value::Str(s) => match s.as_str().parse::<i64>() {
            Ok(n) => Value::int(n),
            Err(_) => Value::Invalid,
        },
        _ => Value::Invalid,
    }
}

fn convert_to_float(v: &Value) -> Value {
    match v {
        Value::Null => Value::Float(0.0),
        Value::Int(i) => Value::Float(i.as_f64()),
        Value::Float(_) => v.clone(),
        Value::Str(s) => match s.as_str().parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::Invalid,
        },
        _ => Value::Invalid,
    }
}

fn convert_to_string(v: &Value) -> Value {
    let owner = crate::arena::ArenaId::scratch();
    match v {
        Value::Null => Value::str("", owner),
        Value::Bool(b) => Value::str(if *b { "true" } else { "false" }, owner),
        Value::Int(i) => Value::str(&i.as_i128().to_string(), owner),
        Value::Float(f) => Value::str(&f.to_string(), owner),
        Value::Str(_) => v.clone(),
        _ => Value::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaId;

    #[test]
    fn type_discriminant_orders_before_value() {
        assert_eq!(canonical_compare(&Value::null(), &Value::bool(false)), Ordering::Less);
    }

    #[test]
    fn bool_orders_false_before_true() {
        assert_eq!(canonical_compare(&Value::bool(false), &Value::bool(true)), Ordering::Less);
    }

    #[test]
    fn nan_sorts_after_infinity() {
        assert_eq!(
            canonical_compare(&Value::float(f64::INFINITY), &Value::float(f64::NAN)),
            Ordering::Less
        );
    }

    #[test]
    fn sequences_compare_lexicographically() {
        let owner = ArenaId::scratch();
        let _ = owner;
        let a = Value::Seq(crate::value::ValSeq::Boxed {
            items: Rc::from(vec![Value::int(1), Value::int(2)]),
            owner: ArenaId::scratch(),
        });
        let b = Value::Seq(crate::value::ValSeq::Boxed {
            items: Rc::from(vec![Value::int(1), Value::int(3)]),
            owner: ArenaId::scratch(),
        });
        assert_eq!(canonical_compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn string_to_int_roundtrips() {
        let owner = ArenaId::scratch();
        let s = Value::str("42", owner);
        assert_eq!(convert(&s, ValueType::Int), Value::int(42));
    }

    #[test]
    fn malformed_string_to_int_is_invalid() {
        let owner = ArenaId::scratch();
        let s = Value::str("not a number", owner);
        assert!(convert(&s, ValueType::Int).is_invalid());
    }

    #[test]
    fn nan_to_int_is_invalid() {
        assert!(convert(&Value::float(f64::NAN), ValueType::Int).is_invalid());
    }

    #[test]
    fn empty_collection_converts_to_false() {
        assert_eq!(convert(&Value::seq_empty(), ValueType::Bool), Value::bool(false));
    }

    #[test]
    fn null_converts_to_zero_int_and_float() {
        assert_eq!(convert(&Value::null(), ValueType::Int), Value::int(0));
        assert_eq!(convert(&Value::null(), ValueType::Float), Value::Float(0.0));
    }
}
