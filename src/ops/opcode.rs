//! The fixed opcode set (§4.4.1 dispatch model): every operation is
//! `(opcode, modifier_flags, input, args) -> value`. This module gathers
//! the opcode family behind one enum and a `dispatch` entry point so an
//! embedder driving the engine generically (rather than calling
//! `ops::sequence::insert` etc. directly) has a single call site.
//!
//! Higher-order opcodes (`Filter`/`Map`/`Reduce`) aren't representable
//! in a plain data enum — they carry closures — so `dispatch` covers
//! every opcode except those three; callers needing them use
//! `ops::higher_order` directly.
//!
//! `Parse`/`Emit` (§4.4.2 "Conversion and IO") wrap the C7/C8
//! `Parser`/`Emitter` contracts so they're reachable through `dispatch`
//! like every other opcode. Since `dispatch` takes no lifetime
//! parameter, these variants narrow the full `InputRef`/`OutputRef`
//! surface to a single source string / returned string — a caller
//! needing `Filename`/`Fd`/`Stdout` or multi-document diagnostics calls
//! `ops::construct`'s sibling trait directly (`external::Parser::parse`/
//! `external::Emitter::emit`) instead of going through the opcode.
//! `Parse` returns the first parsed document's root (or `Invalid` on
//! parse failure or an empty directory); `Emit` returns the emitted text
//! as a `Value::Str` (or `Invalid` on emitter failure).

use std::rc::Rc;

use crate::arena::Builder;
use crate::external::{EmitFlags, Emitter, InputRef, OutputRef, ParseFlags, Parser};
use crate::ops::flags::ModifierFlags;
use crate::ops::{construct, convert, mapping, query, sequence};
use crate::value::{Value, ValueType};

/// A `Parser` trait object, newtyped so `Opcode` can derive `Debug`
/// (`dyn Parser` itself doesn't implement it — the `Parser` trait has
/// no such bound).
#[derive(Clone)]
pub struct ParserHandle(pub Rc<dyn Parser>);

impl std::fmt::Debug for ParserHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<parser>")
    }
}

/// As [`ParserHandle`], for `Emitter`.
#[derive(Clone)]
pub struct EmitterHandle(pub Rc<dyn Emitter>);

impl std::fmt::Debug for EmitterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<emitter>")
    }
}

#[derive(Debug, Clone)]
pub enum Opcode {
    CreateNull,
    CreateBool(bool),
    CreateInt(i64),
    CreateFlt(f64),
    CreateStr(String),
    CreateSeq(Vec<Value>),
    CreateMap(Vec<(Value, Value)>),

    Insert { seq: Value, idx: usize, items: Vec<Value> },
    Replace { seq: Value, idx: usize, n: usize, items: Vec<Value> },
    Append { seq: Value, items: Vec<Value> },
    Concat { seq: Value, others: Vec<Value> },
    Reverse(Value),
    Unique(Value),
    Sort(Value),
    Slice { seq: Value, start: usize, end: usize },
    SlicePy { seq: Value, start: i64, end: i64 },
    Take { seq: Value, n: usize },
    Drop { seq: Value, n: usize },
    First(Value),
    Last(Value),
    Rest(Value),

    Assoc { map: Value, pairs: Vec<(Value, Value)> },
    Disassoc { map: Value, keys: Vec<Value> },
    Merge { map: Value, others: Vec<Value> },
    Keys(Value),
    Values(Value),
    Items(Value),

    Contains { col: Value, items: Vec<Value> },
    Get { col: Value, key: Value },
    GetAt { col: Value, idx: usize },
    GetAtPath { root: Value, path: Vec<Value> },
    Set { map: Value, pairs: Vec<(Value, Value)> },
    SetAt { seq: Value, idx: usize, value: Box<Value> },
    SetAtPath { root: Value, path: Vec<Value>, value: Box<Value> },

    Convert { v: Value, target: ValueType },

    Parse { parser: ParserHandle, source: String, flags: ParseFlags },
    Emit { emitter: EmitterHandle, v: Value, flags: EmitFlags },
}

/// Dispatch a single opcode against `builder`. Opcodes that can fail
/// internally (e.g. `CreateMap` with a rejected duplicate key) collapse
/// their error into the invalid sentinel here, matching §4.4.1 ("no
/// errors are thrown").
pub fn dispatch(builder: &Builder<'_>, op: Opcode, flags: ModifierFlags) -> Value {
    match op {
        Opcode::CreateNull => construct::create_null(),
        Opcode::CreateBool(b) => construct::create_bool(b),
        Opcode::CreateInt(n) => construct::create_int(n, flags),
        Opcode::CreateFlt(f) => construct::create_flt(f),
        Opcode::CreateStr(s) => construct::create_str(builder, &s),
        Opcode::CreateSeq(items) => construct::create_seq(builder, items, flags),
        Opcode::CreateMap(pairs) => construct::create_map(builder, pairs, flags).unwrap_or(Value::Invalid),

        Opcode::Insert { seq, idx, items } => sequence::insert(builder, &seq, idx, &items),
        Opcode::Replace { seq, idx, n, items } => sequence::replace(builder, &seq, idx, n, &items),
        Opcode::Append { seq, items } => sequence::append(builder, &seq, &items),
        Opcode::Concat { seq, others } => sequence::concat(builder, &seq, &others),
        Opcode::Reverse(seq) => sequence::reverse(builder, &seq),
        Opcode::Unique(seq) => sequence::unique(builder, &seq),
        Opcode::Sort(seq) => sequence::sort(builder, &seq, None),
        Opcode::Slice { seq, start, end } => sequence::slice(builder, &seq, start, end),
        Opcode::SlicePy { seq, start, end } => sequence::slice_py(builder, &seq, start, end),
        Opcode::Take { seq, n } => sequence::take(builder, &seq, n),
        Opcode::Drop { seq, n } => sequence::drop(builder, &seq, n),
        Opcode::First(seq) => sequence::first(&seq),
        Opcode::Last(seq) => sequence::last(&seq),
        Opcode::Rest(seq) => sequence::rest(builder, &seq),

        Opcode::Assoc { map, pairs } => mapping::assoc(builder, &map, &pairs),
        Opcode::Disassoc { map, keys } => mapping::disassoc(builder, &map, &keys),
        Opcode::Merge { map, others } => mapping::merge(builder, &map, &others),
        Opcode::Keys(map) => mapping::keys(builder, &map),
        Opcode::Values(map) => mapping::values(builder, &map),
        Opcode::Items(map) => mapping::items(builder, &map),

        Opcode::Contains { col, items } => Value::bool(query::contains(&col, &items)),
        Opcode::Get { col, key } => query::get(&col, &key),
        Opcode::GetAt { col, idx } => query::get_at(&col, idx),
        Opcode::GetAtPath { root, path } => query::get_at_path(&root, &path),
        Opcode::Set { map, pairs } => mapping::set(builder, &map, &pairs),
        Opcode::SetAt { seq, idx, value } => query::set_at(builder, &seq, idx, *value),
        Opcode::SetAtPath { root, path, value } => {
            query::set_at_path(builder, &root, &path, *value, flags.contains(ModifierFlags::CREATE_PATH))
        }

        Opcode::Convert { v, target } => convert::convert(&v, target),

        Opcode::Parse { parser, source, flags } => {
            match parser.0.parse(builder, InputRef::Str(&source), flags) {
                Some(dir) => dir.documents.into_iter().next().map(|vds| vds.root).unwrap_or(Value::Invalid),
                None => Value::Invalid,
            }
        }
        Opcode::Emit { emitter, v, flags } => match emitter.0.emit(&v, OutputRef::StringBuf, flags) {
            Some(text) => construct::create_str(builder, &text),
            None => Value::Invalid,
        },
    }
}
