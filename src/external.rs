//! External interfaces (§6): the parser (C7) and emitter (C8) contracts.
//! Both are out of core scope — this crate only specifies the traits an
//! embedder implements, plus the `Directory`/`Vds` shapes `parse`
//! produces and `emit` consumes.
//!
//! Behind the `reference-io` feature, [`literal`] provides a minimal
//! parser/emitter pair for a tiny line-oriented subset, used only to
//! exercise the contracts end-to-end in tests (S6) — it is not a YAML or
//! JSON grammar.

use crate::arena::Builder;
use crate::error::FailureKind;
use crate::value::Value;

/// Input descriptor selected by parse flags (§6.1).
pub enum InputRef<'a> {
    Str(&'a str),
    Filename(&'a str),
    Fd(i32),
    Stdin,
}

/// Output descriptor selected by emit flags (§6.2).
pub enum OutputRef<'a> {
    /// Emit into an in-memory buffer, returned to the caller.
    StringBuf,
    Filename(&'a str),
    Fd(i32),
    Stdout,
    Stderr,
}

/// Which of the three schema families (§6.3) to parse/emit under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Yaml11,
    Yaml12,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Block,
    Flow,
    Pretty,
    Compact,
    Oneline,
}

#[derive(Debug, Clone)]
pub struct ParseFlags {
    pub mode: Mode,
    pub collect_diagnostics: bool,
}

#[derive(Debug, Clone)]
pub struct EmitFlags {
    pub mode: Mode,
    pub style: Style,
    pub indent: u8,
    pub line_width: Option<u32>,
    pub emit_comments: bool,
}

/// A value paired with its YAML document state (version, tag
/// directives, schema) — the "VDS" of the glossary.
#[derive(Debug, Clone)]
pub struct Vds {
    pub root: Value,
    pub version: Option<(u32, u32)>,
    pub tag_directives: Vec<(String, String)>,
    pub schema: crate::arena::Schema,
}

/// A sequence of [`Vds`] records plus collected diagnostics — the
/// product of parsing a multi-document input (§6.1).
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub documents: Vec<Vds>,
    pub diagnostics: Vec<DiagnosticRecord>,
}

/// A diagnostic record collected during parsing when `collect_diagnostics`
/// is set (§6.1 `diag`, §7 "malformed input": error kind, marker,
/// message).
#[derive(Debug, Clone)]
pub struct DiagnosticRecord {
    pub kind: FailureKind,
    pub marker: Option<crate::indirect::Marker>,
    pub message: String,
}

/// The parser contract (C7). An embedder provides a concrete
/// implementation; the core only depends on this trait.
pub trait Parser {
    fn parse(&self, builder: &Builder<'_>, input: InputRef<'_>, flags: ParseFlags) -> Option<Directory>;
}

/// The emitter contract (C8).
pub trait Emitter {
    fn emit(&self, v: &Value, output: OutputRef<'_>, flags: EmitFlags) -> Option<String>;
}

#[cfg(feature = "reference-io")]
pub mod literal {
    //! A reference-only parser/emitter for a tiny line-oriented literal
    //! format: one scalar, sequence, or flat mapping of scalars per
    //! input, with no nesting. Exists purely so `ext::Parser`/
    //! `ext::Emitter` have a concrete pair to round-trip against in
    //! tests; it implements neither YAML nor JSON.

    use super::*;

    pub struct LiteralIo;

    impl Parser for LiteralIo {
        fn parse(&self, builder: &Builder<'_>, input: InputRef<'_>, _flags: ParseFlags) -> Option<Directory> {
            let InputRef::Str(s) = input else { return None };
            let root = parse_value(builder, s.trim());
            Some(Directory {
                documents: vec![Vds {
                    root,
                    version: None,
                    tag_directives: Vec::new(),
                    schema: builder.config().schema,
                }],
                diagnostics: Vec::new(),
            })
        }
    }

    fn parse_value(builder: &Builder<'_>, s: &str) -> Value {
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let items = if inner.trim().is_empty() {
                vec![]
            } else {
                inner.split(',').map(|tok| parse_scalar(builder, tok.trim())).collect()
            };
            return builder.make_seq(items);
        }
        if let Some(inner) = s.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
            let pairs = if inner.trim().is_empty() {
                vec![]
            } else {
                inner
                    .split(',')
                    .filter_map(|tok| {
                        let (k, v) = tok.split_once(':')?;
                        Some((
                            Value::str(k.trim(), builder.id()),
                            parse_scalar(builder, v.trim()),
                        ))
                    })
                    .collect()
            };
            return builder.make_map(pairs);
        }
        parse_scalar(builder, s)
    }

    fn parse_scalar(builder: &Builder<'_>, s: &str) -> Value {
        match s {
            "null" | "" => Value::null(),
            "true" => Value::bool(true),
            "false" => Value::bool(false),
            _ => {
                if let Ok(n) = s.parse::<i64>() {
                    Value::int(n)
                } else if let Ok(f) = s.parse::<f64>() {
                    Value::float(f)
                } else {
                    builder.intern_str(s)
                }
            }
        }
    }

    impl Emitter for LiteralIo {
        fn emit(&self, v: &Value, _output: OutputRef<'_>, _flags: EmitFlags) -> Option<String> {
            Some(format_value(v))
        }
    }

    fn format_value(v: &Value) -> String {
        match v {
            Value::Seq(s) => {
                let items: Vec<String> = s.as_slice().iter().map(format_value).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Map(m) => {
                let pairs: Vec<String> = m
                    .as_slice()
                    .iter()
                    .map(|(k, val)| format!("{}: {}", format_value(k), format_value(val)))
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
            other => format!("{other}"),
        }
    }

}
