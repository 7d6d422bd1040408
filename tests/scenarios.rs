//! End-to-end scenarios (§8.3).

use tagval::ops::{construct, flags::ModifierFlags, higher_order, mapping, query, sequence};
use tagval::{Builder, BuilderConfig, Value};

fn heap() -> Builder<'static> {
    Builder::new_heap(BuilderConfig::default())
}

/// S1. Inplace short string round trip.
#[test]
fn s1_inplace_short_string_round_trip() {
    let b = heap();
    let v = construct::create_str(&b, "hello");
    assert!(v.is_inplace());
    let Value::Str(s) = &v else { panic!("expected string") };
    assert_eq!(s.as_str().len(), 5);
    assert_eq!(s.as_str(), "hello");
}

/// S2. Large integer round trip.
#[test]
fn s2_large_integer_round_trip() {
    let v = construct::create_int(1i64 << 62, ModifierFlags::UNSIGNED);
    assert_eq!(v.type_of(), tagval::ValueType::Int);
    assert!(!v.is_inplace());

    let mut buf = Vec::new();
    tagval::binary::encode(&mut buf, &v);
    let b = heap();
    let (decoded, _) = tagval::binary::decode(&b, &buf).unwrap();
    assert_eq!(decoded, v);

    let reconstructed = Value::int_unsigned(1u64 << 62);
    assert_eq!(reconstructed, v);
}

/// S3. Deep set at path with create.
#[test]
fn s3_deep_set_at_path_with_create() {
    let b = heap();
    let owner = b.id();
    let root = Value::map_empty();
    let path = vec![Value::str("a", owner), Value::str("b", owner), Value::str("c", owner)];
    let updated = query::set_at_path(&b, &root, &path, Value::int(42), true);

    assert_eq!(query::get_at_path(&updated, &path), Value::int(42));

    let ab_path = [path[0].clone(), path[1].clone()];
    let ab = query::get_at_path(&updated, &ab_path);
    assert!(ab.is_map());
    let Value::Map(m) = ab else { panic!() };
    assert_eq!(m.as_slice().len(), 1);
}

/// S4. Merge with nested conflict.
#[test]
fn s4_merge_with_nested_conflict() {
    let b = heap();
    let owner = b.id();

    let left_inner = b.make_map(vec![
        (Value::str("p", owner), Value::int(1)),
        (Value::str("q", owner), Value::int(2)),
    ]);
    let left = b.make_map(vec![(Value::str("x", owner), left_inner)]);

    let right_inner = b.make_map(vec![
        (Value::str("q", owner), Value::int(3)),
        (Value::str("r", owner), Value::int(4)),
    ]);
    let right = b.make_map(vec![(Value::str("x", owner), right_inner)]);

    let merged = mapping::merge(&b, &left, &[right]);
    let Value::Map(outer) = &merged else { panic!() };
    let (_, inner) = &outer.as_slice()[0];
    let Value::Map(inner_pairs) = inner else { panic!() };
    let key_order: Vec<&str> = inner_pairs.as_slice().iter().map(|(k, _)| match k {
        Value::Str(s) => s.as_str(),
        _ => panic!(),
    }).collect();
    assert_eq!(key_order, vec!["p", "q", "r"]);
    assert_eq!(query::get(inner, &Value::str("q", owner)), Value::int(3));
}

/// S5. Filter/map/reduce equivalence, sequential and (when available)
/// parallel.
#[test]
fn s5_filter_map_reduce_equivalence() {
    let b = heap();
    let items: Vec<Value> = (1..=100).map(Value::int).collect();
    let s = construct::create_seq(&b, items, ModifierFlags::empty());

    let run = |flags: ModifierFlags| -> Value {
        let evens = higher_order::filter(&b, &s, |v| matches!(v, Value::Int(i) if i.as_i128() % 2 == 0), flags);
        let doubled = higher_order::map(&b, &evens, |_, v| {
            let Value::Int(i) = v else { unreachable!() };
            Value::int((i.as_i128() * 2) as i64)
        }, flags);
        higher_order::reduce(&b, &doubled, Value::int(0), |_, acc, v| {
            let (Value::Int(a), Value::Int(bb)) = (&acc, v) else { unreachable!() };
            Value::int((a.as_i128() + bb.as_i128()) as i64)
        }, flags)
    };

    assert_eq!(run(ModifierFlags::empty()), Value::int(5100));
    #[cfg(feature = "parallel")]
    assert_eq!(run(ModifierFlags::PARALLEL), Value::int(5100));
}

/// S6. Iterator / parser round trip, using the reference literal IO
/// pair to exercise the `ext::Parser`/`ext::Emitter` contracts.
#[cfg(feature = "reference-io")]
#[test]
fn s6_iterator_parser_round_trip() {
    use tagval::external::literal::LiteralIo;
    use tagval::external::{EmitFlags, Emitter, InputRef, Mode, OutputRef, ParseFlags, Parser, Style};

    let b = heap();
    let io = LiteralIo;
    let dir = io
        .parse(&b, InputRef::Str("[1, 2, 3]"), ParseFlags { mode: Mode::Json, collect_diagnostics: false })
        .unwrap();
    let v = dir.documents[0].root.clone();

    let emitted = io
        .emit(&v, OutputRef::StringBuf, EmitFlags {
            mode: Mode::Json,
            style: Style::Compact,
            indent: 2,
            line_width: None,
            emit_comments: false,
        })
        .unwrap();

    let reparsed = io
        .parse(&b, InputRef::Str(&emitted), ParseFlags { mode: Mode::Json, collect_diagnostics: false })
        .unwrap();
    assert_eq!(reparsed.documents[0].root, v);
}

/// Exercises assoc + keys + sort composing across the mapping and
/// sequence opcode families in one pipeline.
#[test]
fn assoc_and_sequence_ops_compose() {
    let b = heap();
    let owner = b.id();
    let m = b.make_map(vec![(Value::str("a", owner), Value::int(1))]);
    let m = mapping::assoc(&b, &m, &[(Value::str("b", owner), Value::int(2))]);
    let keys = mapping::keys(&b, &m);
    let s = sequence::sort(&b, &keys, None);
    assert!(s.is_seq());
}
