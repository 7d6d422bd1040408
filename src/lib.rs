//! `tagval`: a compact, immutable, runtime tagged-value representation
//! for YAML/JSON data, with an arena builder and schema-aware collection
//! operations.
//!
//! The crate is organized by the six components it implements:
//!
//! - [`size_codec`] — the variable-length size encoding underlying every
//!   length-prefixed field.
//! - [`value`] — the tagged value itself ([`value::Value`]) and its
//!   inplace/out-of-place storage forms.
//! - [`indirect`] — the optional-metadata wrapper attached to a value
//!   (anchors, tags, comments, style) and alias encoding.
//! - [`arena`] — the scoped allocator ([`arena::Builder`]) backing every
//!   out-of-place value.
//! - [`ops`] — the operation engine: construction, sequence/mapping
//!   mutation, queries, higher-order opcodes, canonical ordering, and
//!   type conversion.
//! - [`iterator`] — the document iterator, replaying a value tree as an
//!   event stream.
//!
//! [`external`] specifies the parser/emitter contracts a host embeds
//! this crate behind; [`binary`] is a canonical binary encoding used for
//! round-trip testing and storage.

pub mod arena;
pub mod binary;
pub mod error;
pub mod external;
pub mod indirect;
pub mod iterator;
pub mod ops;
pub mod size_codec;
pub mod value;

pub use arena::{ArenaId, Builder, BuilderConfig, HeapArena, Schema};
pub use error::FailureKind;
pub use indirect::Indirect;
pub use iterator::{DocumentIterator, Event, EventPrefix, IteratorConfig, StripConfig};
pub use ops::{dispatch, ModifierFlags, Opcode};
pub use value::{Value, ValueType};
