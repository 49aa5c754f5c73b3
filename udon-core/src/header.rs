//! Element headers: `|name[id].class.class?`.
//!
//! The name is emitted as-is. Every shorthand is lowered by [`lower`] into
//! the same attribute/value pair an explicit `:key value` would produce,
//! so consumers only ever see one attribute shape.

use std::borrow::Cow;

use crate::event::{Event, ParseErrorCode, ScopeKind};
use crate::parser::Parser;
use crate::scanner::is_space;
use crate::span::Span;

/// Suffix markers, attached (`|field?`) or detached (`|field ?`).
const SUFFIXES: &[u8] = b"?!*+";

#[inline]
fn is_suffix(b: u8) -> bool {
    SUFFIXES.contains(&b)
}

/// A header shorthand, located in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shorthand {
    /// `[payload]`
    Id { span: Span, payload: Span },
    /// `.payload` or `.'payload'`
    Class { span: Span, payload: Span },
    /// One of `? ! * +`
    Suffix { span: Span },
}

impl Shorthand {
    /// The whole shorthand in the source.
    pub fn span(self) -> Span {
        match self {
            Shorthand::Id { span, .. } | Shorthand::Class { span, .. } => span,
            Shorthand::Suffix { span } => span,
        }
    }
}

/// Lower a shorthand to its canonical attribute/value pair.
///
/// An empty id (`[]`) lowers to nothing.
pub(crate) fn lower(shorthand: Shorthand, src: &[u8]) -> Option<[Event<'_>; 2]> {
    let pair = match shorthand {
        Shorthand::Id { payload, .. } if payload.is_empty() => return None,
        Shorthand::Id { span, payload } => [
            Event::Attr { content: Cow::Borrowed(&b"id"[..]), span },
            Event::BareValue { content: Cow::Borrowed(payload.slice(src)), span: payload },
        ],
        Shorthand::Class { span, payload } => [
            Event::Attr { content: Cow::Borrowed(&b"class"[..]), span },
            Event::BareValue { content: Cow::Borrowed(payload.slice(src)), span: payload },
        ],
        Shorthand::Suffix { span } => [
            Event::Attr { content: Cow::Borrowed(span.slice(src)), span },
            Event::BoolTrue { span: Span::empty(span.end) },
        ],
    };
    Some(pair)
}

impl<'a> Parser<'a> {
    /// Parse an element line's `|` header, opening the element at `column`.
    pub(crate) fn element(&mut self, column: usize) {
        let start = self.s.pos();
        let intro = Span::new(start, start + 1);
        self.s.advance(1);
        self.open(ScopeKind::Element, intro, column);
        self.identity(intro);
    }

    /// Name and shorthands after an introducer.
    ///
    /// With neither, reports `MissingName` over the introducer. The scope
    /// stays open either way.
    pub(crate) fn identity(&mut self, intro: Span) {
        let named = self.name();
        if !named && !matches!(self.s.peek(), Some(b'[' | b'.')) && !self.at_suffix() {
            self.error(ParseErrorCode::MissingName, intro);
        }

        loop {
            let shorthand = match self.s.peek() {
                Some(b'[') => self.id_shorthand(),
                Some(b'.') => self.class_shorthand(),
                Some(_) if self.at_suffix() => {
                    let start = self.s.pos();
                    self.s.advance(1);
                    Some(Shorthand::Suffix { span: Span::new(start, start + 1) })
                }
                _ => break,
            };
            if let Some(shorthand) = shorthand {
                self.emit_lowered(shorthand);
            }
        }

        // Detached suffix: a lone marker after whitespace
        if self.s.peek().is_some_and(is_space)
            && self.s.peek_at(1).is_some_and(is_suffix)
            && self
                .s
                .peek_at(2)
                .map_or(true, |b| is_space(b) || matches!(b, b'\n' | b'\r' | b'}'))
        {
            let start = self.s.pos() + 1;
            self.s.set_pos(start + 1);
            self.emit_lowered(Shorthand::Suffix { span: Span::new(start, start + 1) });
        }
    }

    /// An attached suffix at the cursor. `!{{` starts an interpolation.
    fn at_suffix(&self) -> bool {
        self.s.peek().is_some_and(is_suffix) && !self.s.starts_with(b"!{{")
    }

    fn emit_lowered(&mut self, shorthand: Shorthand) {
        match lower(shorthand, self.s.src()) {
            Some([attr, value]) => {
                self.emit(attr);
                self.emit(value);
            }
            None => self.warning("empty id ignored", shorthand.span()),
        }
    }

    /// A label or `'quoted name'`.
    fn name(&mut self) -> bool {
        if self.s.peek() == Some(b'\'') {
            let Some(inner) = self.quoted_label() else {
                return false;
            };
            let content = self.bytes(inner);
            self.emit(Event::Name { content, span: inner });
            return true;
        }
        match self.s.scan_label() {
            Some(span) => {
                let content = self.bytes(span);
                self.emit(Event::Name { content, span });
                true
            }
            None => false,
        }
    }

    /// `'...'` on one line; returns the span between the quotes.
    fn quoted_label(&mut self) -> Option<Span> {
        let open = self.s.pos();
        let end = self.s.content_end();
        let close = memchr::memchr(b'\'', self.s.src().get(open + 1..end)?)? + open + 1;
        self.s.set_pos(close + 1);
        Some(Span::new(open + 1, close))
    }

    fn id_shorthand(&mut self) -> Option<Shorthand> {
        let open = self.s.pos();
        let end = self.s.content_end();
        match self.s.find(open + 1, end, b"]") {
            Some(close) => {
                self.s.set_pos(close + 1);
                Some(Shorthand::Id {
                    span: Span::new(open, close + 1),
                    payload: Span::new(open + 1, close),
                })
            }
            None => {
                self.error(ParseErrorCode::UnclosedBracket, Span::empty(end));
                self.s.set_pos(end);
                None
            }
        }
    }

    fn class_shorthand(&mut self) -> Option<Shorthand> {
        let dot = self.s.pos();
        self.s.advance(1);
        let payload = if self.s.peek() == Some(b'\'') {
            self.quoted_label()
        } else {
            self.s.scan_label()
        };
        match payload {
            Some(payload) => Some(Shorthand::Class { span: Span::new(dot, self.s.pos()), payload }),
            None => {
                self.error(ParseErrorCode::ExpectedClassName, Span::new(dot, dot + 1));
                None
            }
        }
    }
}
