//! Attribute clauses and their values.
//!
//! Every `:key` is followed by exactly one value: a scalar, a quoted
//! string, an interpolation, a full array run, or an implicit `BoolTrue`
//! when the value is absent. Classification order is flag-absence, quote,
//! array, interpolation, then [`Value::parse`] for bare tokens.

use std::borrow::Cow;

use crate::event::{Event, ParseErrorCode, ScopeKind};
use crate::parser::Parser;
use crate::scanner::{is_control, is_space};
use crate::span::Span;
use crate::value::{unescape, Value};

/// Where an attribute sits. Embedded elements end at `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Context {
    Line,
    Embedded,
}

impl<'a> Parser<'a> {
    /// Rest of an element or attribute line: attributes, rightward nested
    /// elements, then text to the end of the line.
    pub(crate) fn tail(&mut self) {
        loop {
            let end = self.s.content_end();
            self.s.skip_spaces(end);
            if self.s.pos() >= end {
                return;
            }
            match (self.s.peek(), self.s.peek_at(1)) {
                (Some(b':'), _) => self.attribute(Context::Line),
                (Some(b'|'), next) if next != Some(b'{') => {
                    let column = self.column_at(self.s.pos());
                    self.element(column);
                }
                _ => {
                    self.inline();
                    return;
                }
            }
        }
    }

    /// Attribute clauses right after an embedded element's header.
    pub(crate) fn embedded_attributes(&mut self) {
        loop {
            let end = self.s.content_end();
            self.s.skip_spaces(end);
            if self.s.peek() != Some(b':') || self.s.pos() >= end {
                return;
            }
            self.attribute(Context::Embedded);
        }
    }

    /// `:key value`, `:key` (flag), or `:[id]` (attribute merge).
    pub(crate) fn attribute(&mut self, ctx: Context) {
        let colon = self.s.pos();
        self.s.advance(1);

        if self.s.peek() == Some(b'[') {
            self.merge_reference(colon);
            return;
        }

        let Some(key) = self.s.scan_label() else {
            self.error(ParseErrorCode::ExpectedAttrKey, Span::new(colon, colon + 1));
            return;
        };
        let content = self.bytes(key);
        self.emit(Event::Attr { content, span: Span::new(colon, key.end) });
        self.value(ctx, key.end);
    }

    /// `:[id]` merges the attributes of another element.
    fn merge_reference(&mut self, colon: usize) {
        let end = self.s.content_end();
        let open = colon + 1;
        match self.s.find(open + 1, end, b"]") {
            Some(close) => {
                let content = self.bytes(Span::new(open + 1, close));
                self.emit(Event::Reference { content, span: Span::new(colon, close + 1) });
                self.s.set_pos(close + 1);
            }
            None => {
                self.error(ParseErrorCode::UnclosedBracket, Span::empty(end));
                self.s.set_pos(end);
            }
        }
    }

    /// Whether nothing that could be a value follows.
    fn value_absent(&self, ctx: Context, end: usize) -> bool {
        if self.s.pos() >= end {
            return true;
        }
        match self.s.peek() {
            Some(b':') => {
                let mut probe = self.s.clone();
                probe.advance(1);
                probe.peek() == Some(b'[') || probe.at_label()
            }
            Some(b'|') => true,
            Some(b'}') => ctx == Context::Embedded,
            // Never a value; left for the rest of the line to report
            Some(b) if is_control(b) => true,
            Some(b';') => self
                .s
                .peek_at(1)
                .map_or(true, |b| is_space(b) || matches!(b, b'{' | b'\n' | b'\r')),
            _ => false,
        }
    }

    /// Exactly one value for the attribute whose key ends at `key_end`.
    fn value(&mut self, ctx: Context, key_end: usize) {
        let end = self.s.content_end();
        self.s.skip_spaces(end);

        if self.value_absent(ctx, end) {
            self.emit(Event::BoolTrue { span: Span::empty(key_end) });
            return;
        }

        match self.s.peek() {
            Some(b'"') | Some(b'\'') => {
                self.quoted(end);
            }
            Some(b'[') => self.array(ctx),
            Some(b'!') if self.s.starts_with(b"!{{") => {
                self.interpolation_value(end);
            }
            _ => self.bare(ctx, end, false),
        }
    }

    /// A quoted string. Unclosed strings run to the end of the line and
    /// return false.
    fn quoted(&mut self, end: usize) -> bool {
        let src = self.s.src();
        let open = self.s.pos();
        let quote = src[open];

        let mut i = open + 1;
        let mut close = None;
        while i < end {
            match src[i] {
                b'\\' => i += 2,
                b if b == quote => {
                    close = Some(i);
                    break;
                }
                _ => i += 1,
            }
        }

        match close {
            Some(close) => {
                let content = unescape(&src[open + 1..close]);
                self.emit(Event::StringValue { content, span: Span::new(open, close + 1) });
                self.s.set_pos(close + 1);
                true
            }
            None => {
                let content = unescape(&src[open + 1..end]);
                self.emit(Event::StringValue { content, span: Span::new(open, end) });
                self.error(ParseErrorCode::UnclosedStringValue, Span::empty(end));
                self.s.set_pos(end);
                false
            }
        }
    }

    /// `[a b [c d]]`, nested through the scope stack rather than recursion.
    /// Arrays do not continue past the end of the line.
    fn array(&mut self, ctx: Context) {
        let base = self.scopes.len();
        loop {
            let end = self.s.content_end();
            self.s.skip_spaces(end);
            let pos = self.s.pos();

            let stop = pos >= end || (ctx == Context::Embedded && self.s.peek() == Some(b'}'));
            if stop {
                self.error(ParseErrorCode::UnclosedArray, Span::empty(pos));
                self.close_to(base, pos);
                return;
            }

            match self.s.peek() {
                Some(b'[') => {
                    self.open_inline(ScopeKind::Array, Span::new(pos, pos + 1));
                    self.s.advance(1);
                }
                Some(b']') if self.scopes.len() > base => {
                    self.close(Span::new(pos, pos + 1));
                    self.s.advance(1);
                    if self.scopes.len() == base {
                        return;
                    }
                }
                Some(b'"') | Some(b'\'') => {
                    if !self.quoted(end) {
                        // The string ran to the end of the line and was reported
                        self.close_to(base, end);
                        return;
                    }
                }
                Some(b'!') if self.s.starts_with(b"!{{") => {
                    if !self.interpolation_value(end) {
                        self.close_to(base, end);
                        return;
                    }
                }
                Some(b) if is_control(b) => {
                    self.error(ParseErrorCode::UnexpectedChar, Span::new(pos, pos + 1));
                    self.s.advance(1);
                }
                _ => self.bare(ctx, end, true),
            }
        }
    }

    /// `!{{expr}}` in value position. Unclosed, the rest of the line is
    /// kept as a bare value and this returns false.
    fn interpolation_value(&mut self, end: usize) -> bool {
        let start = self.s.pos();
        match self.s.find(start + 3, end, b"}}") {
            Some(close) => {
                let content = self.bytes(Span::new(start + 3, close));
                self.emit(Event::Interpolation { content, span: Span::new(start, close + 2) });
                self.s.set_pos(close + 2);
                true
            }
            None => {
                let span = Span::new(start, end);
                let content = self.bytes(span);
                self.emit(Event::BareValue { content, span });
                self.error(ParseErrorCode::UnclosedInterpolation, Span::empty(end));
                self.s.set_pos(end);
                false
            }
        }
    }

    /// An unquoted token, classified by [`Value::parse`].
    fn bare(&mut self, ctx: Context, end: usize, in_array: bool) {
        let stops: &[u8] = match (ctx, in_array) {
            (Context::Embedded, true) => b"]}",
            (Context::Embedded, false) => b"}",
            (Context::Line, true) => b"]",
            (Context::Line, false) => b"",
        };
        let mut span = self.s.scan_token(end, stops);
        if span.is_empty() {
            // A stray `]` outside any array, or `}` outside an embedded
            // element: take the single byte as the value.
            self.s.advance(1);
            span = Span::new(span.start, self.s.pos());
        }
        let event = Value::parse(self.s.slice(span)).into_event(span);
        self.emit(event);
    }
}

/// Build a borrowed `BareValue` for a span. Used by directive lowering.
pub(crate) fn bare_value<'a>(src: &'a [u8], span: Span) -> Event<'a> {
    Event::BareValue { content: Cow::Borrowed(span.slice(src)), span }
}
