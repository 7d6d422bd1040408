//! Boundary cases (§8.2).

use tagval::ops::sequence;
use tagval::value::{INLINE_STR_MAX, INPLACE_INT_BOUND};
use tagval::{ArenaId, Builder, BuilderConfig, Value};

fn heap() -> Builder<'static> {
    Builder::new_heap(BuilderConfig::default())
}

#[test]
fn empty_sequence_and_mapping_are_inplace_sentinels() {
    assert!(Value::seq_empty().is_inplace());
    assert!(Value::map_empty().is_inplace());
    // No allocation means the sentinel carries no owner.
    assert!(Value::seq_empty().owner().is_none());
    assert!(Value::map_empty().owner().is_none());
}

#[test]
fn integer_at_inplace_bound_fits_inplace_one_past_does_not() {
    assert!(Value::int(INPLACE_INT_BOUND).is_inplace());
    assert!(Value::int(-INPLACE_INT_BOUND).is_inplace());
    assert!(!Value::int(INPLACE_INT_BOUND + 1).is_inplace());
    assert!(!Value::int(-INPLACE_INT_BOUND - 1).is_inplace());
}

#[test]
fn string_at_inline_bound_fits_inplace_one_byte_longer_does_not() {
    let owner = ArenaId::scratch();
    let exact = Value::str(&"a".repeat(INLINE_STR_MAX), owner);
    assert!(exact.is_inplace());

    let over = Value::str(&"a".repeat(INLINE_STR_MAX + 1), owner);
    assert!(!over.is_inplace());
}

#[test]
fn f32_through_f64_create_flt_is_bit_identical() {
    let original: f32 = 1.0 / 3.0;
    let widened = original as f64;
    let v = Value::float(widened);
    let Value::Float(roundtripped) = v else { panic!() };
    let narrowed = roundtripped as f32;
    assert_eq!(narrowed.to_bits(), original.to_bits());
}

#[test]
fn slice_py_neg_zero_neg_zero_is_empty() {
    let b = heap();
    let s = b.make_seq(vec![Value::int(1), Value::int(2), Value::int(3)]);
    assert_eq!(sequence::slice_py(&b, &s, -0, -0), Value::seq_empty());
}

#[test]
fn slice_k_k_is_empty_for_any_valid_k() {
    let b = heap();
    let s = b.make_seq(vec![Value::int(1), Value::int(2), Value::int(3)]);
    for k in 0..=3usize {
        assert_eq!(sequence::slice(&b, &s, k, k), Value::seq_empty());
    }
}
