//! The indirect wrapper (C3): optional YAML metadata attached to a value.
//!
//! An indirect never nests — it wraps at most one direct value — and an
//! alias is specifically an indirect with no wrapped value, the alias bit
//! set, and the anchor field holding the target name.

use crate::arena::ArenaId;
use crate::value::Value;

/// Source position marker (start/end line/column/byte offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub start_line: u32,
    pub start_col: u32,
    pub start_byte: usize,
    pub end_line: u32,
    pub end_col: u32,
    pub end_byte: usize,
}

/// Original source style token (block/flow scalar style, quoting, etc).
/// Kept as an opaque small enum rather than modeling every YAML scalar
/// style — the iterator (C6) only needs to carry it through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
    Flow,
    Block,
}

/// The indirect wrapper struct (§3.2). Each field is `Option`-encoded;
/// the spec's "presence bitmask" is recovered on demand by `flags()`.
#[derive(Debug, Clone)]
pub struct Indirect {
    pub owner: ArenaId,
    pub value: Option<Value>,
    pub anchor: Option<Box<str>>,
    pub tag: Option<Box<str>>,
    pub diag: Option<Value>,
    pub marker: Option<Marker>,
    pub comment: Option<Box<str>>,
    pub style: Option<Style>,
    pub failsafe: Option<Box<str>>,
    /// The alias bit (§3.2): when set, this indirect has no wrapped value
    /// and `anchor` holds the name being referenced.
    pub alias: bool,
}

bitflags::bitflags! {
    /// Presence bitmask recovered from an `Indirect`'s populated `Option`s,
    /// mirroring the spec's "flags bitmask plus up to eight optional
    /// fields" description (§3.2).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IndirectFlags: u16 {
        const VALUE    = 1 << 0;
        const ANCHOR   = 1 << 1;
        const TAG      = 1 << 2;
        const DIAG     = 1 << 3;
        const MARKER   = 1 << 4;
        const COMMENT  = 1 << 5;
        const STYLE    = 1 << 6;
        const FAILSAFE = 1 << 7;
        const ALIAS    = 1 << 8;
    }
}

impl Indirect {
    pub fn new(owner: ArenaId) -> Self {
        Indirect {
            owner,
            value: None,
            anchor: None,
            tag: None,
            diag: None,
            marker: None,
            comment: None,
            style: None,
            failsafe: None,
            alias: false,
        }
    }

    /// Construct an alias: no wrapped value, alias bit set, anchor names
    /// the target.
    pub fn alias(owner: ArenaId, target_name: &str) -> Self {
        Indirect {
            owner,
            value: None,
            anchor: Some(target_name.into()),
            tag: None,
            diag: None,
            marker: None,
            comment: None,
            style: None,
            failsafe: None,
            alias: true,
        }
    }

    pub fn is_alias(&self) -> bool {
        self.alias
    }

    pub fn flags(&self) -> IndirectFlags {
        let mut f = IndirectFlags::empty();
        if self.value.is_some() {
            f |= IndirectFlags::VALUE;
        }
        if self.anchor.is_some() {
            f |= IndirectFlags::ANCHOR;
        }
        if self.tag.is_some() {
            f |= IndirectFlags::TAG;
        }
        if self.diag.is_some() {
            f |= IndirectFlags::DIAG;
        }
        if self.marker.is_some() {
            f |= IndirectFlags::MARKER;
        }
        if self.comment.is_some() {
            f |= IndirectFlags::COMMENT;
        }
        if self.style.is_some() {
            f |= IndirectFlags::STYLE;
        }
        if self.failsafe.is_some() {
            f |= IndirectFlags::FAILSAFE;
        }
        if self.alias {
            f |= IndirectFlags::ALIAS;
        }
        f
    }
}

impl PartialEq for Indirect {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && self.anchor == other.anchor
            && self.tag == other.tag
            && self.marker == other.marker
            && self.comment == other.comment
            && self.style == other.style
            && self.failsafe == other.failsafe
            && self.alias == other.alias
    }
}

/// Generic accessor family from §4.3: `has_X`/`get_X` accept both direct
/// and indirect values — a direct value simply reports no metadata.
macro_rules! field_accessor {
    ($has:ident, $get:ident, $field:ident, $to_value:expr) => {
        pub fn $has(v: &Value) -> bool {
            match v {
                Value::Indirect(ind) => ind.$field.is_some(),
                _ => false,
            }
        }

        pub fn $get(v: &Value) -> Value {
            match v {
                Value::Indirect(ind) => match &ind.$field {
                    Some(field) => $to_value(field),
                    None => Value::Null,
                },
                _ => Value::Null,
            }
        }
    };
}

pub fn has_anchor(v: &Value) -> bool {
    matches!(v, Value::Indirect(ind) if ind.anchor.is_some())
}
pub fn get_anchor(v: &Value) -> Value {
    match v {
        Value::Indirect(ind) => match &ind.anchor {
            Some(s) => Value::str(s, ind.owner),
            None => Value::Null,
        },
        _ => Value::Null,
    }
}

field_accessor!(has_tag, get_tag, tag, |s: &Box<str>| Value::str(
    s,
    ArenaId::scratch()
));
field_accessor!(has_comment, get_comment, comment, |s: &Box<str>| Value::str(
    s,
    ArenaId::scratch()
));
field_accessor!(
    has_failsafe,
    get_failsafe,
    failsafe,
    |s: &Box<str>| Value::str(s, ArenaId::scratch())
);

pub fn has_diag(v: &Value) -> bool {
    matches!(v, Value::Indirect(ind) if ind.diag.is_some())
}
pub fn get_diag(v: &Value) -> Value {
    match v {
        Value::Indirect(ind) => ind.diag.clone().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

pub fn has_marker(v: &Value) -> bool {
    matches!(v, Value::Indirect(ind) if ind.marker.is_some())
}

pub fn has_style(v: &Value) -> bool {
    matches!(v, Value::Indirect(ind) if ind.style.is_some())
}

/// `unwrap(v)`: the wrapped value if `v` is indirect with the
/// value-present bit set, else `Invalid` (§4.3).
pub fn unwrap(v: &Value) -> Value {
    v.unwrap_indirect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_value_reports_no_metadata() {
        let v = Value::int(1);
        assert!(!has_tag(&v));
        assert!(!has_anchor(&v));
        assert!(unwrap(&v).is_invalid());
    }

    #[test]
    fn indirect_roundtrips_metadata() {
        let owner = ArenaId::scratch();
        let mut ind = Indirect::new(owner);
        ind.value = Some(Value::int(42));
        ind.tag = Some("!!int".into());
        ind.anchor = Some("a1".into());
        let v = Value::Indirect(std::rc::Rc::new(ind));

        assert!(has_tag(&v));
        assert!(has_anchor(&v));
        assert_eq!(unwrap(&v), Value::int(42));
        assert_eq!(get_tag(&v), Value::str("!!int", owner));
    }

    #[test]
    fn alias_has_no_wrapped_value() {
        let owner = ArenaId::scratch();
        let ind = Indirect::alias(owner, "target");
        let v = Value::Indirect(std::rc::Rc::new(ind));
        assert!(v.is_alias());
        assert!(unwrap(&v).is_invalid());
    }

    #[test]
    fn flags_reflect_populated_fields() {
        let owner = ArenaId::scratch();
        let mut ind = Indirect::new(owner);
        ind.value = Some(Value::null());
        ind.comment = Some("hi".into());
        let flags = ind.flags();
        assert!(flags.contains(IndirectFlags::VALUE));
        assert!(flags.contains(IndirectFlags::COMMENT));
        assert!(!flags.contains(IndirectFlags::TAG));
    }
}
