//! The document iterator (C6, §4.6): replays a value tree as the event
//! stream a parser would have produced for it. Implemented as a
//! hand-rolled state machine (per §9 "Coroutines / iterators" — this
//! target has no native generators at the trait-object level convenient
//! for a library boundary, so the stack-of-frames discipline from the
//! spec is kept literally rather than reached for `std::iter::from_fn`).

use std::rc::Rc;

use crate::indirect::Style;
use crate::value::Value;

/// Which prefix of the full event stream to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPrefix {
    /// Just the body (no stream/document wrapper events).
    BodyOnly,
    /// `DOCUMENT_START ... body ... DOCUMENT_END`.
    DocumentAndBody,
    /// `STREAM_START DOCUMENT_START ... body ... DOCUMENT_END STREAM_END`.
    Full,
}

/// Which optional indirect metadata to strip before emitting a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StripConfig {
    pub anchor: bool,
    pub tag: bool,
    pub comment: bool,
    pub style: bool,
    pub failsafe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IteratorConfig {
    pub prefix: EventPrefix,
    pub strip: StripConfig,
}

impl Default for EventPrefix {
    fn default() -> Self {
        EventPrefix::Full
    }
}

/// Metadata carried by a `SCALAR` event, taken from any wrapping
/// indirect (§4.6: "carrying optional tag/anchor/style from any
/// wrapping indirect").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarMeta {
    pub tag: Option<Box<str>>,
    pub anchor: Option<Box<str>>,
    pub style: Option<Style>,
    pub comment: Option<Box<str>>,
    pub failsafe: Option<Box<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    Scalar { value: Value, meta: ScalarMeta },
    SeqStart,
    SeqEnd,
    MapStart,
    MapEnd,
    Alias { target: Box<str> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    StreamStart,
    DocumentStart,
    Body,
    DocumentEnd,
    StreamEnd,
    Done,
}

enum Frame {
    Seq { items: Rc<[Value]>, idx: usize },
    Map { pairs: Rc<[(Value, Value)]>, idx: usize, on_value: bool },
}

enum Classified {
    Alias(Box<str>),
    Scalar(Value, ScalarMeta),
    Seq(Rc<[Value]>),
    Map(Rc<[(Value, Value)]>),
}

fn classify(strip: &StripConfig, v: Value) -> Classified {
    match v {
        Value::Indirect(ind) => {
            if ind.is_alias() {
                return Classified::Alias(ind.anchor.clone().unwrap_or_default());
            }
            let inner = ind.value.clone().unwrap_or(Value::Invalid);
            match &inner {
                Value::Seq(_) | Value::Map(_) | Value::Indirect(_) | Value::Alias(_) => {
                    classify(strip, inner)
                }
                _ => {
                    let meta = ScalarMeta {
                        tag: if strip.tag { None } else { ind.tag.clone() },
                        anchor: if strip.anchor { None } else { ind.anchor.clone() },
                        style: if strip.style { None } else { ind.style },
                        comment: if strip.comment { None } else { ind.comment.clone() },
                        failsafe: if strip.failsafe { None } else { ind.failsafe.clone() },
                    };
                    Classified::Scalar(inner, meta)
                }
            }
        }
        Value::Alias(name) => Classified::Alias(Box::from(&*name)),
        Value::Seq(s) => match s {
            crate::value::ValSeq::Empty => Classified::Seq(Rc::from([])),
            crate::value::ValSeq::Boxed { items, .. } => Classified::Seq(items),
        },
        Value::Map(m) => match m {
            crate::value::ValMap::Empty => Classified::Map(Rc::from([])),
            crate::value::ValMap::Boxed { pairs, .. } => Classified::Map(pairs),
        },
        scalar => Classified::Scalar(scalar, ScalarMeta::default()),
    }
}

/// The document iterator. Not thread-safe (per §4.6); independent
/// iterators over the same value are unaffected by each other.
pub struct DocumentIterator {
    config: IteratorConfig,
    phase: Phase,
    stack: Vec<Frame>,
    next_value: Option<Value>,
    root: Option<Value>,
}

impl DocumentIterator {
    pub fn new(root: Value, config: IteratorConfig) -> Self {
        DocumentIterator {
            config,
            phase: Phase::StreamStart,
            stack: Vec::new(),
            next_value: None,
            root: Some(root),
        }
    }

    fn advance_body(&mut self) -> Option<Event> {
        loop {
            if let Some(v) = self.next_value.take() {
                return Some(match classify(&self.config.strip, v) {
                    Classified::Alias(target) => Event::Alias { target },
                    Classified::Scalar(value, meta) => Event::Scalar { value, meta },
                    Classified::Seq(items) => {
                        self.stack.push(Frame::Seq { items, idx: 0 });
                        Event::SeqStart
                    }
                    Classified::Map(pairs) => {
                        self.stack.push(Frame::Map { pairs, idx: 0, on_value: false });
                        Event::MapStart
                    }
                });
            }
            match self.stack.last_mut() {
                None => return None,
                Some(Frame::Seq { items, idx }) => {
                    if *idx < items.len() {
                        let v = items[*idx].clone();
                        *idx += 1;
                        self.next_value = Some(v);
                        continue;
                    }
                    self.stack.pop();
                    return Some(Event::SeqEnd);
                }
                Some(Frame::Map { pairs, idx, on_value }) => {
                    if *idx >= pairs.len() {
                        self.stack.pop();
                        return Some(Event::MapEnd);
                    }
                    if !*on_value {
                        let k = pairs[*idx].0.clone();
                        *on_value = true;
                        self.next_value = Some(k);
                        continue;
                    }
                    let v = pairs[*idx].1.clone();
                    *idx += 1;
                    *on_value = false;
                    self.next_value = Some(v);
                    continue;
                }
            }
        }
    }
}

impl Iterator for DocumentIterator {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            match self.phase {
                Phase::StreamStart => {
                    self.phase = Phase::DocumentStart;
                    if self.config.prefix == EventPrefix::Full {
                        return Some(Event::StreamStart);
                    }
                }
                Phase::DocumentStart => {
                    self.next_value = self.root.take();
                    self.phase = Phase::Body;
                    if self.config.prefix != EventPrefix::BodyOnly {
                        return Some(Event::DocumentStart);
                    }
                }
                Phase::Body => match self.advance_body() {
                    Some(ev) => return Some(ev),
                    None => self.phase = Phase::DocumentEnd,
                },
                Phase::DocumentEnd => {
                    self.phase = Phase::StreamEnd;
                    if self.config.prefix != EventPrefix::BodyOnly {
                        return Some(Event::DocumentEnd);
                    }
                }
                Phase::StreamEnd => {
                    self.phase = Phase::Done;
                    if self.config.prefix == EventPrefix::Full {
                        return Some(Event::StreamEnd);
                    }
                }
                Phase::Done => return None,
            }
        }
    }
}
