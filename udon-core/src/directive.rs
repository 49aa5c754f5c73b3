//! Block directives and raw bodies.
//!
//! `!name` at the start of a line opens a directive scope owned by the
//! line's column, like an element. Its inline attributes are parsed as
//! usual and the rest of the line is one `RawContent` statement.
//!
//! `!raw:lang` additionally switches the indented body to raw mode: each
//! deeper line, interior blank lines included, becomes one `RawContent`
//! with the body's base indentation removed and the newline kept.

use std::borrow::Cow;

use crate::attrs::{bare_value, Context};
use crate::event::{Event, ScopeKind};
use crate::parser::{Parser, RawBody};
use crate::scanner::Scanner;
use crate::span::Span;

/// `name` or `ns:name` after a `!`. Leaves the cursor after the name.
fn scan_directive_name(s: &mut Scanner<'_>) -> Option<(Span, Option<Span>)> {
    let name = s.scan_label()?;
    let mut probe = s.clone();
    if probe.eat(b':') {
        if let Some(qualifier) = probe.scan_label() {
            s.set_pos(probe.pos());
            return Some((name, Some(qualifier)));
        }
    }
    Some((name, None))
}

impl<'a> Parser<'a> {
    /// `!label` not followed by `{` (that would be an inline directive).
    pub(crate) fn at_block_directive(&self) -> bool {
        let mut probe = self.s.clone();
        probe.advance(1);
        scan_directive_name(&mut probe).is_some() && probe.peek() != Some(b'{')
    }

    /// Emit the directive's name. `raw:lang` lowers to `Name("raw")` plus
    /// `Attr("lang")`/`BareValue(lang)`; other qualified names are kept
    /// whole. Returns whether this is a raw directive.
    pub(crate) fn directive_name(&mut self) -> bool {
        let Some((name, qualifier)) = scan_directive_name(&mut self.s) else {
            return false;
        };
        let src = self.s.src();
        match qualifier {
            Some(lang) if name.slice(src) == b"raw" => {
                self.emit(Event::Name { content: Cow::Borrowed(name.slice(src)), span: name });
                self.emit(Event::Attr {
                    content: Cow::Borrowed(&b"lang"[..]),
                    span: Span::new(name.end, lang.end),
                });
                self.emit(bare_value(src, lang));
                true
            }
            Some(qualifier) => {
                let full = Span::new(name.start, qualifier.end);
                self.emit(Event::Name { content: Cow::Borrowed(full.slice(src)), span: full });
                false
            }
            None => {
                self.emit(Event::Name { content: Cow::Borrowed(name.slice(src)), span: name });
                false
            }
        }
    }

    /// A `!name ...` line.
    pub(crate) fn block_directive(&mut self, column: usize) {
        let bang = self.s.pos();
        self.s.advance(1);
        self.open(ScopeKind::Directive, Span::new(bang, bang + 1), column);
        let raw = self.directive_name();

        loop {
            let end = self.s.content_end();
            self.s.skip_spaces(end);
            let mut probe = self.s.clone();
            if !probe.eat(b':') || !(probe.at_label() || probe.peek() == Some(b'[')) {
                break;
            }
            self.attribute(Context::Line);
        }

        let end = self.s.content_end();
        self.emit_raw(Span::new(self.s.pos(), end));
        self.s.set_pos(end);

        if raw {
            self.raw = Some(RawBody { column, base: None, held: None });
        }
    }

    /// Try to take the line at the cursor as part of a raw body. Returns
    /// false, with the cursor untouched, once the body has ended.
    pub(crate) fn raw_line(&mut self, body: RawBody) -> bool {
        let line_start = self.s.pos();
        let (column, _) = self.s.indentation();
        let end = self.s.content_end();
        let next = self.s.next_line_start();

        if self.s.pos() >= end {
            // Blank: part of the body only if more body follows
            if body.base.is_some() && body.held.is_none() {
                self.raw = Some(RawBody { held: Some(line_start), ..body });
            }
            self.s.set_pos(next);
            return true;
        }

        if column <= body.column {
            self.s.set_pos(line_start);
            return false;
        }

        let base = body.base.unwrap_or(column);
        if let Some(from) = body.held {
            self.emit_blank_lines(from, line_start, base);
        }
        self.raw = Some(RawBody { base: Some(base), held: None, ..body });
        self.emit_raw(Span::new(line_start + column.min(base), next));
        self.s.set_pos(next);
        true
    }

    /// Emit the held blank lines in `from..to`, each visited once.
    fn emit_blank_lines(&mut self, from: usize, to: usize, base: usize) {
        let mut probe = self.s.clone();
        probe.set_pos(from);
        while probe.pos() < to {
            let line_start = probe.pos();
            let (column, _) = probe.indentation();
            let next = probe.next_line_start();
            self.emit_raw(Span::new(line_start + column.min(base), next));
            probe.set_pos(next);
        }
    }
}
