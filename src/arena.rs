//! Arena builder (C4): a scoped allocator with optional deduplication and
//! parent/child chaining.
//!
//! Two allocation disciplines are provided, matching §4.5:
//!
//! - [`HeapArena`] — "arena-scoped", backed by `bumpalo::Bump`, persistent
//!   and growable. Grounded in `seq-runtime/src/arena.rs`'s thread-local
//!   `Bump` wrapper, minus the thread-local part (a `Builder` here is an
//!   explicit, owned value rather than ambient per-thread state).
//! - [`FixedArena`] — "stack-scoped", a minimal bump allocator over a
//!   caller-supplied `&mut [u8]`. `bumpalo::Bump` doesn't support bringing
//!   your own fixed buffer, so this is a small hand-rolled allocator in
//!   the same spirit.
//!
//! [`Builder`] is the public scoping/dedup/ownership layer on top of
//! either allocator.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use bumpalo::Bump;

use crate::value::{Value, ValMap, ValSeq, ValStr};

/// Opaque identifier for "which builder owns this out-of-place value"
/// (§3.4 Ownership). Two `Value`s compare as owned-by-the-same-builder iff
/// their `ArenaId`s are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaId(u64);

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

impl ArenaId {
    fn fresh() -> Self {
        ArenaId(NEXT_ARENA_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// An id usable for values built outside any builder (tests, inline
    /// construction helpers). Never matches a real builder's id.
    pub fn scratch() -> Self {
        ArenaId(0)
    }
}

/// Schema selector from §6.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Schema {
    Yaml11,
    Yaml11PyYaml,
    Yaml12,
    Yaml12Core,
    Yaml12Failsafe,
    Yaml12Json,
    Json,
}

/// Builder configuration record (§6.3).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuilderConfig {
    pub schema: Schema,
    pub estimated_max_size: usize,
    pub disable_duplicate_keys: bool,
    pub enable_dedup: bool,
    pub dedup_chain: bool,
    pub scope_leader: bool,
    pub create_tag: bool,
    pub trace: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            schema: Schema::Yaml12,
            estimated_max_size: 64 * 1024,
            disable_duplicate_keys: false,
            enable_dedup: false,
            dedup_chain: false,
            scope_leader: false,
            create_tag: false,
            trace: false,
        }
    }
}

/// A minimal bump allocator over a caller-supplied buffer. Never grows;
/// allocation past the end fails (the builder surfaces this as an
/// allocation-failure counter increment per §4.4.5/§4.5).
pub struct FixedArena<'buf> {
    buf: &'buf mut [u8],
    used: usize,
}

impl<'buf> FixedArena<'buf> {
    pub fn new(buf: &'buf mut [u8]) -> Self {
        FixedArena { buf, used: 0 }
    }

    fn try_alloc_bytes(&mut self, bytes: &[u8]) -> Option<*const u8> {
        let start = self.used;
        let end = start.checked_add(bytes.len())?;
        if end > self.buf.len() {
            return None;
        }
        self.buf[start..end].copy_from_slice(bytes);
        self.used = end;
        Some(self.buf[start..end].as_ptr())
    }

    pub fn high_water_mark(&self) -> usize {
        self.used
    }

    pub fn trim(&mut self) {
        // Nothing to release back to an owner-supplied buffer; "trim"
        // here just means future allocations may reuse from the start
        // once the caller knows no live values remain.
        self.used = 0;
    }
}

/// Backing allocator used by a [`Builder`]. Abstracts over [`HeapArena`]
/// (bumpalo-backed, growable) and [`FixedArena`] (caller buffer, fixed).
enum Backing<'buf> {
    Heap(Bump),
    Fixed(FixedArena<'buf>),
}

/// A scoped allocator owning (or borrowing) one allocator, per §4.5.
///
/// Builders form a tree via `parent`. A *scope leader* is the root of a
/// subtree whose allocations can be bulk-discarded together; the *export
/// builder* for a scope is the first non-leader ancestor.
pub struct Builder<'buf> {
    id: ArenaId,
    backing: RefCell<Backing<'buf>>,
    config: BuilderConfig,
    parent: Option<Rc<Builder<'static>>>,
    /// Number of allocation failures observed so far (§4.4.5, §4.5).
    failures: RefCell<u64>,
    /// Content-hash -> previously interned value, for dedup (§4.5).
    dedup: RefCell<HashMap<u64, Value>>,
}

impl<'buf> Builder<'buf> {
    /// Construct a heap-backed ("arena-scoped") builder with no parent.
    pub fn new_heap(config: BuilderConfig) -> Builder<'static> {
        Builder {
            id: ArenaId::fresh(),
            backing: RefCell::new(Backing::Heap(Bump::with_capacity(
                config.estimated_max_size,
            ))),
            config,
            parent: None,
            failures: RefCell::new(0),
            dedup: RefCell::new(HashMap::new()),
        }
    }

    /// Construct a fixed-buffer ("stack-scoped") builder over caller
    /// memory, bypassing the heap entirely.
    pub fn new_fixed(buf: &'buf mut [u8], config: BuilderConfig) -> Builder<'buf> {
        Builder {
            id: ArenaId::fresh(),
            backing: RefCell::new(Backing::Fixed(FixedArena::new(buf))),
            config,
            parent: None,
            failures: RefCell::new(0),
            dedup: RefCell::new(HashMap::new()),
        }
    }

    /// A child scope sharing the dedup/parent-chain machinery but with its
    /// own backing allocator.
    pub fn child_heap(parent: &Rc<Builder<'static>>, config: BuilderConfig) -> Builder<'static> {
        Builder {
            id: ArenaId::fresh(),
            backing: RefCell::new(Backing::Heap(Bump::with_capacity(
                config.estimated_max_size,
            ))),
            config,
            parent: Some(Rc::clone(parent)),
            failures: RefCell::new(0),
            dedup: RefCell::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> ArenaId {
        self.id
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn failure_count(&self) -> u64 {
        *self.failures.borrow()
    }

    fn note_failure(&self) {
        *self.failures.borrow_mut() += 1;
        if self.config.trace {
            tracing::trace!(arena = self.id.0, "allocation failure");
        }
    }

    /// `(size, align) -> ptr | null` from §4.5, expressed as a byte-slice
    /// allocation. Growth failures increment the failure counter and
    /// return `None`; callers (typically the fixed-buffer retry loop)
    /// observe this via `failure_count()`.
    fn alloc_bytes(&self, bytes: &[u8]) -> Option<*const u8> {
        let mut backing = self.backing.borrow_mut();
        match &mut *backing {
            Backing::Heap(bump) => Some(bump.alloc_slice_copy(bytes).as_ptr()),
            Backing::Fixed(fixed) => fixed.try_alloc_bytes(bytes),
        }
    }

    /// Store (intern) bytes into this arena, returning an owned `Rc<str>`
    /// copy. Dedup (if enabled) coalesces repeated content to the same
    /// `Value`.
    pub fn intern_str(&self, s: &str) -> Value {
        if s.len() <= crate::value::INLINE_STR_MAX {
            return Value::Str(ValStr::new(s, self.id));
        }
        if self.config.enable_dedup {
            if let Some(existing) = self.dedup_lookup(s.as_bytes(), 0) {
                return existing;
            }
        }
        match self.alloc_bytes(s.as_bytes()) {
            Some(_ptr) => {
                // The Rc<str> is the actual owned storage callers see;
                // `alloc_bytes` above exercises the shared allocator path
                // for accounting/dedup purposes (content hashing, failure
                // counting) even though Rc::from(s) is what's returned.
                let v = Value::Str(ValStr::Heap {
                    data: Rc::from(s),
                    owner: self.id,
                });
                if self.config.enable_dedup {
                    self.dedup_insert(s.as_bytes(), 0, v.clone());
                }
                v
            }
            None => {
                self.note_failure();
                Value::Invalid
            }
        }
    }

    /// Scatter store: concatenate-store several byte slices atomically
    /// (§4.5 "Scatter store").
    pub fn intern_str_parts(&self, parts: &[&str]) -> Value {
        let joined: String = parts.concat();
        self.intern_str(&joined)
    }

    /// Build a non-empty sequence from owned items.
    pub fn make_seq(&self, items: Vec<Value>) -> Value {
        if items.is_empty() {
            return Value::seq_empty();
        }
        if self.config.enable_dedup {
            let h = hash_seq(&items);
            if let Some(existing) = self.dedup_lookup_raw(h) {
                if matches!(&existing, Value::Seq(s) if s.as_slice() == items.as_slice()) {
                    return existing;
                }
            }
            let v = Value::Seq(ValSeq::Boxed {
                items: Rc::from(items),
                owner: self.id,
            });
            self.dedup_insert_raw(h, v.clone());
            return v;
        }
        Value::Seq(ValSeq::Boxed {
            items: Rc::from(items),
            owner: self.id,
        })
    }

    /// Build a non-empty mapping from owned pairs, in the order given
    /// (callers are responsible for duplicate-key policy — see
    /// `ops::construct::create_map`).
    pub fn make_map(&self, pairs: Vec<(Value, Value)>) -> Value {
        if pairs.is_empty() {
            return Value::map_empty();
        }
        Value::Map(ValMap::Boxed {
            pairs: Rc::from(pairs),
            owner: self.id,
        })
    }

    fn dedup_lookup(&self, bytes: &[u8], salt: u64) -> Option<Value> {
        let h = hash_bytes(bytes, salt);
        self.dedup_lookup_raw(h)
    }

    fn dedup_lookup_raw(&self, h: u64) -> Option<Value> {
        if let Some(v) = self.dedup.borrow().get(&h) {
            return Some(v.clone());
        }
        if self.config.dedup_chain {
            if let Some(parent) = &self.parent {
                return parent.dedup_lookup_raw(h);
            }
        }
        None
    }

    fn dedup_insert(&self, bytes: &[u8], salt: u64, v: Value) {
        let h = hash_bytes(bytes, salt);
        self.dedup_insert_raw(h, v);
    }

    fn dedup_insert_raw(&self, h: u64, v: Value) {
        self.dedup.borrow_mut().insert(h, v);
    }

    /// Does this builder (directly) own `v`'s out-of-place storage? (T8)
    pub fn contains(&self, v: &Value) -> bool {
        match v.owner() {
            Some(id) => id == self.id,
            None => true, // inplace values are ownerless and always valid
        }
    }

    /// Copy `v` into this builder's arena iff it isn't already owned by
    /// it (§4.5 `internalize`). Inplace values are returned unchanged —
    /// they're ownerless, so "copying" them is a no-op by definition.
    pub fn internalize(&self, v: &Value) -> Value {
        if self.contains(v) {
            return v.clone();
        }
        match v {
            Value::Str(s) => self.intern_str(s.as_str()),
            Value::Seq(s) => {
                let items: Vec<Value> = s.as_slice().iter().map(|it| self.internalize(it)).collect();
                self.make_seq(items)
            }
            Value::Map(m) => {
                let pairs: Vec<(Value, Value)> = m
                    .as_slice()
                    .iter()
                    .map(|(k, val)| (self.internalize(k), self.internalize(val)))
                    .collect();
                self.make_map(pairs)
            }
            Value::Indirect(ind) => {
                let mut copy = (**ind).clone();
                copy.owner = self.id;
                if let Some(inner) = &copy.value {
                    copy.value = Some(self.internalize(inner));
                }
                Value::Indirect(Rc::new(copy))
            }
            other => other.clone(),
        }
    }

    /// Release (hint) — no-op for the heap backing (bumpalo has no
    /// per-allocation free); for the fixed backing, equivalent to `trim`.
    pub fn release(&self) {
        self.trim();
    }

    /// Trim the arena to its high-water mark. For the heap backing this
    /// calls `bumpalo::Bump::reset`... but that would invalidate live
    /// `Rc`s if any were handed out referencing arena memory directly, so
    /// it is only safe to call once every value from this builder has
    /// been dropped or exported — see the type-level note on `Rc` sharing
    /// in `SPEC_FULL.md` §3 (collections are independently `Rc`-owned, not
    /// borrowed from the Bump, so this mainly resets scratch byte usage).
    pub fn trim(&self) {
        let mut backing = self.backing.borrow_mut();
        match &mut *backing {
            Backing::Heap(bump) => bump.reset(),
            Backing::Fixed(fixed) => fixed.trim(),
        }
    }
}

impl Builder<'static> {
    /// The export builder for this scope: the first non-leader ancestor,
    /// or `None` if this builder has no parent (it is itself the root).
    /// Scope chaining (parent links, export) is only meaningful for
    /// heap-backed builders — a fixed-buffer builder is a transient leaf
    /// over caller-owned memory, never a scope-tree interior node.
    pub fn export_builder(self: &Rc<Builder<'static>>) -> Option<Rc<Builder<'static>>> {
        let mut cur = Rc::clone(self.parent.as_ref()?);
        while cur.config.scope_leader {
            cur = Rc::clone(cur.parent.as_ref()?);
        }
        Some(cur)
    }

    /// Export `v` (deep copy) into this scope's export builder, or
    /// return it unchanged if there is no parent scope to export into.
    pub fn export(self: &Rc<Builder<'static>>, v: &Value) -> Value {
        match self.export_builder() {
            Some(target) => target.internalize(v),
            None => v.clone(),
        }
    }
}

fn hash_bytes(bytes: &[u8], salt: u64) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    salt.hash(&mut hasher);
    bytes.hash(&mut hasher);
    hasher.finish()
}

fn hash_seq(items: &[Value]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    1u64.hash(&mut hasher); // salt distinguishing "sequence" content hashes
    items.len().hash(&mut hasher);
    for it in items {
        format!("{it}").hash(&mut hasher);
    }
    hasher.finish()
}

/// A growable heap arena, constructed with `Builder::new_heap`. Kept as a
/// type alias for API clarity matching the spec's own C4 naming.
pub type HeapArena = Builder<'static>;

/// Grow-on-failure retry loop helper for the stack-scoped discipline
/// (§4.5 "In-place builders"): run `op` against a fixed-size buffer,
/// doubling the buffer and retrying while the builder reports allocation
/// failures, up to `max_bytes`.
pub fn retry_growing<T>(
    initial_bytes: usize,
    max_bytes: usize,
    config: BuilderConfig,
    mut op: impl FnMut(&Builder<'_>) -> T,
    is_failure: impl Fn(&T) -> bool,
) -> T {
    let mut size = initial_bytes.max(64);
    loop {
        let mut buf = vec![0u8; size];
        let builder = Builder::new_fixed(&mut buf, config.clone());
        let result = op(&builder);
        if !is_failure(&result) || builder.failure_count() == 0 || size >= max_bytes {
            return result;
        }
        size = (size * 2).min(max_bytes);
    }
}
