//! Canonical binary encoding of [`Value`] (T1: `decode(encode(v)) = v` at
//! the tagged-word level). Built directly on the C1 size codec for every
//! variable-length field, so this module doubles as the size codec's
//! most realistic consumer.
//!
//! Scope: scalars and collections — the tagged value proper. Indirect
//! metadata (anchors, tags, comments) isn't part of this format; it's
//! produced and consumed by the document iterator / external parser and
//! emitter instead, not by this low-level binary form. This is a
//! deliberate narrowing of (T1) to the seven non-metadata-carrying
//! logical types plus `null` — see `SPEC_FULL.md` §8's "(T1) scope
//! carve-out" note. `Indirect`/`Alias` values collapse to the
//! `TAG_INVALID` byte on encode and come back as `Value::Invalid`, a
//! lossy (non-round-tripping) result, exercised deliberately by
//! `indirect_and_alias_do_not_round_trip` below rather than left as an
//! unstated gap.

use crate::arena::{ArenaId, Builder};
use crate::value::{DecoratedInt, IntRepr, Value};

const TAG_NULL: u8 = 0;
const TAG_FALSE: u8 = 1;
const TAG_TRUE: u8 = 2;
const TAG_INT_SMALL: u8 = 3;
const TAG_INT_BIG_SIGNED: u8 = 4;
const TAG_INT_BIG_UNSIGNED: u8 = 5;
const TAG_FLOAT: u8 = 6;
const TAG_STR: u8 = 7;
const TAG_SEQ_EMPTY: u8 = 8;
const TAG_SEQ: u8 = 9;
const TAG_MAP_EMPTY: u8 = 10;
const TAG_MAP: u8 = 11;
const TAG_INVALID: u8 = 12;

fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

fn zigzag_decode(z: u64) -> i64 {
    ((z >> 1) as i64) ^ -((z & 1) as i64)
}

/// Append `v`'s canonical encoding to `buf`.
pub fn encode(buf: &mut Vec<u8>, v: &Value) {
    match v {
        Value::Null => buf.push(TAG_NULL),
        Value::Bool(false) => buf.push(TAG_FALSE),
        Value::Bool(true) => buf.push(TAG_TRUE),
        Value::Int(IntRepr::Small(n)) => {
            buf.push(TAG_INT_SMALL);
            encode_size(buf, zigzag_encode(*n));
        }
        Value::Int(IntRepr::Big(DecoratedInt { magnitude, unsigned: false })) => {
            buf.push(TAG_INT_BIG_SIGNED);
            encode_size(buf, zigzag_encode(*magnitude as i64));
        }
        Value::Int(IntRepr::Big(DecoratedInt { magnitude, unsigned: true })) => {
            buf.push(TAG_INT_BIG_UNSIGNED);
            encode_size(buf, *magnitude);
        }
        Value::Float(f) => {
            buf.push(TAG_FLOAT);
            buf.extend_from_slice(&f.to_bits().to_le_bytes());
        }
        Value::Str(s) => {
            buf.push(TAG_STR);
            let bytes = s.as_str().as_bytes();
            encode_size(buf, bytes.len() as u64);
            buf.extend_from_slice(bytes);
        }
        Value::Seq(s) => {
            let items = s.as_slice();
            if items.is_empty() {
                buf.push(TAG_SEQ_EMPTY);
            } else {
                buf.push(TAG_SEQ);
                encode_size(buf, items.len() as u64);
                for item in items {
                    encode(buf, item);
                }
            }
        }
        Value::Map(m) => {
            let pairs = m.as_slice();
            if pairs.is_empty() {
                buf.push(TAG_MAP_EMPTY);
            } else {
                buf.push(TAG_MAP);
                encode_size(buf, pairs.len() as u64);
                for (k, val) in pairs {
                    encode(buf, k);
                    encode(buf, val);
                }
            }
        }
        Value::Indirect(_) | Value::Alias(_) | Value::Invalid => buf.push(TAG_INVALID),
    }
}

fn encode_size(buf: &mut Vec<u8>, n: u64) {
    let mut tmp = [0u8; crate::size_codec::MAX_BYTES_64];
    let written = crate::size_codec::encode64(&mut tmp, n).expect("fixed-size scratch buffer");
    buf.extend_from_slice(&tmp[..written]);
}

/// Decode a value from the front of `buf`, returning it and the number
/// of bytes consumed. Collections are rebuilt through `builder`, so the
/// result is owned by (and arena-tagged as) `builder`.
pub fn decode(builder: &Builder<'_>, buf: &[u8]) -> Option<(Value, usize)> {
    let (&tag, rest) = buf.split_first()?;
    let mut pos = 1;
    let v = match tag {
        TAG_NULL => Value::Null,
        TAG_FALSE => Value::Bool(false),
        TAG_TRUE => Value::Bool(true),
        TAG_INT_SMALL => {
            let (z, n) = crate::size_codec::decode64(rest).ok()?;
            pos += n;
            Value::int(zigzag_decode(z))
        }
        TAG_INT_BIG_SIGNED => {
            let (z, n) = crate::size_codec::decode64(rest).ok()?;
            pos += n;
            Value::Int(IntRepr::Big(DecoratedInt { magnitude: zigzag_decode(z) as u64, unsigned: false }))
        }
        TAG_INT_BIG_UNSIGNED => {
            let (mag, n) = crate::size_codec::decode64(rest).ok()?;
            pos += n;
            Value::int_unsigned(mag)
        }
        TAG_FLOAT => {
            let bytes: [u8; 8] = rest.get(..8)?.try_into().ok()?;
            pos += 8;
            Value::Float(f64::from_bits(u64::from_le_bytes(bytes)))
        }
        TAG_STR => {
            let (len, n) = crate::size_codec::decode64(rest).ok()?;
            pos += n;
            let len = len as usize;
            let bytes = buf.get(pos..pos + len)?;
            pos += len;
            let s = std::str::from_utf8(bytes).ok()?;
            builder.intern_str(s)
        }
        TAG_SEQ_EMPTY => Value::seq_empty(),
        TAG_SEQ => {
            let (len, n) = crate::size_codec::decode64(rest).ok()?;
            pos += n;
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                let (item, consumed) = decode(builder, &buf[pos..])?;
                pos += consumed;
                items.push(item);
            }
            builder.make_seq(items)
        }
        TAG_MAP_EMPTY => Value::map_empty(),
        TAG_MAP => {
            let (len, n) = crate::size_codec::decode64(rest).ok()?;
            pos += n;
            let mut pairs = Vec::with_capacity(len as usize);
            for _ in 0..len {
                let (k, kn) = decode(builder, &buf[pos..])?;
                pos += kn;
                let (val, vn) = decode(builder, &buf[pos..])?;
                pos += vn;
                pairs.push((k, val));
            }
            builder.make_map(pairs)
        }
        TAG_INVALID => Value::Invalid,
        _ => return None,
    };
    Some((v, pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BuilderConfig;

    fn roundtrip(v: Value) {
        let b = Builder::new_heap(BuilderConfig::default());
        let mut buf = Vec::new();
        encode(&mut buf, &v);
        let (decoded, consumed) = decode(&b, &buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(decoded, v);
    }

    #[test]
    fn scalars_roundtrip() {
        roundtrip(Value::null());
        roundtrip(Value::bool(true));
        roundtrip(Value::bool(false));
        roundtrip(Value::int(42));
        roundtrip(Value::int(-42));
        roundtrip(Value::int(i64::MIN));
        roundtrip(Value::int_unsigned(u64::MAX));
        roundtrip(Value::float(1.5));
    }

    #[test]
    fn nan_roundtrips_bit_identical() {
        // Value's derived PartialEq uses IEEE float equality, under which
        // NaN != NaN, so this checks bit patterns instead of `roundtrip`.
        let b = Builder::new_heap(BuilderConfig::default());
        let mut buf = Vec::new();
        encode(&mut buf, &Value::float(f64::NAN));
        let (decoded, _) = decode(&b, &buf).unwrap();
        let Value::Float(f) = decoded else { panic!() };
        assert_eq!(f.to_bits(), f64::NAN.to_bits());
    }

    #[test]
    fn strings_roundtrip_inplace_and_heap() {
        let owner = ArenaId::scratch();
        roundtrip(Value::str("short", owner));
        roundtrip(Value::str(&"x".repeat(100), owner));
    }

    #[test]
    fn empty_collections_roundtrip() {
        roundtrip(Value::seq_empty());
        roundtrip(Value::map_empty());
    }

    #[test]
    fn nested_collections_roundtrip() {
        let b = Builder::new_heap(BuilderConfig::default());
        let owner = b.id();
        let inner = b.make_seq(vec![Value::int(1), Value::int(2)]);
        let map = b.make_map(vec![(Value::str("a", owner), inner)]);
        roundtrip(map);
    }

    #[test]
    fn indirect_and_alias_do_not_round_trip() {
        // Deliberate: this format's scope excludes indirect metadata (see
        // the module doc and SPEC_FULL.md §8). Both collapse to the
        // invalid sentinel on decode rather than reconstructing the
        // original value.
        let b = Builder::new_heap(BuilderConfig::default());
        let ind = crate::indirect::Indirect::new(b.id());
        let wrapped = Value::Indirect(std::rc::Rc::new(ind));
        let mut buf = Vec::new();
        encode(&mut buf, &wrapped);
        let (decoded, _) = decode(&b, &buf).unwrap();
        assert_eq!(decoded, Value::Invalid);
        assert_ne!(decoded, wrapped);

        let alias = Value::Alias(std::rc::Rc::from("target"));
        let mut buf = Vec::new();
        encode(&mut buf, &alias);
        let (decoded, _) = decode(&b, &buf).unwrap();
        assert_eq!(decoded, Value::Invalid);
    }

    #[test]
    fn bytes_needed_matches_size_codec_for_lengths() {
        let b = Builder::new_heap(BuilderConfig::default());
        let s = Value::str(&"y".repeat(1000), b.id());
        let mut buf = Vec::new();
        encode(&mut buf, &s);
        // tag byte + size_codec::bytes_needed64(1000) + payload
        assert_eq!(buf.len(), 1 + crate::size_codec::bytes_needed64(1000) + 1000);
    }
}
