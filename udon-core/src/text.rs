//! Prose and inline constructs.
//!
//! Text runs to the end of the line. Inside it the scanner recognises:
//!
//! | syntax        | events                                            |
//! |---------------|---------------------------------------------------|
//! | `\|{a ...}`   | `EmbeddedStart`, header, attributes, text, `EmbeddedEnd` |
//! | `!{{expr}}`   | `Interpolation`                                   |
//! | `!name{...}`  | `DirectiveStart`, `Name`, `RawContent`, `DirectiveEnd` |
//! | `;{...}`      | `CommentStart`, `Text`, `CommentEnd`              |
//! | `; ...`       | comment to end of line                            |
//! | `@[id]`       | `Reference`                                       |
//! | ```` ``` ```` | `FreeformStart`, `RawContent`, `FreeformEnd`      |
//! | `'x`          | escapes a structural character                    |
//!
//! Embedded elements nest through the scope stack, so deeply nested input
//! costs heap, not call stack.

use crate::event::{Event, ParseErrorCode, ScopeKind};
use crate::parser::Parser;
use crate::scanner::{is_space, UnitKind};
use crate::span::Span;

/// Characters a `'` can escape.
const ESCAPABLE: &[u8] = b"|:;!@'`{}";

/// Start of a pending text run, flushed when a construct interrupts it.
type Run = Option<usize>;

impl<'a> Parser<'a> {
    /// Scan text from the cursor to the end of the line.
    pub(crate) fn inline(&mut self) {
        let base = self.scopes.len();
        let text_start = self.s.pos();
        let mut run: Run = None;

        loop {
            let end = self.s.content_end();
            let Some(unit) = self.s.next_unit(end) else {
                self.flush(&mut run, end);
                if self.scopes.len() > base {
                    self.error(ParseErrorCode::UnclosedEmbedded, Span::empty(end));
                    self.close_to(base, end);
                }
                return;
            };

            let start = unit.span.start;
            match unit.kind {
                UnitKind::Run => {
                    run.get_or_insert(start);
                }
                UnitKind::Invalid => {
                    self.flush(&mut run, start);
                    self.error(ParseErrorCode::UnexpectedChar, unit.span);
                }
                UnitKind::Punct(b) => {
                    let in_embedded = self.scopes.len() > base;
                    let handled = match b {
                        b'|' => self.embedded(&mut run, start),
                        b'}' if in_embedded => {
                            self.flush(&mut run, start);
                            self.close(unit.span);
                            true
                        }
                        b'!' => self.bang(&mut run, start, end),
                        b';' => {
                            let line_comment = !in_embedded
                                && (start == text_start
                                    || self.s.byte_at(start.wrapping_sub(1)).is_some_and(is_space));
                            self.semicolon(&mut run, start, end, line_comment)
                        }
                        b'@' => self.reference(&mut run, start, end),
                        b'\'' => self.escape(&mut run, start),
                        b'`' => self.freeform(&mut run, start),
                        _ => false,
                    };
                    if !handled {
                        run.get_or_insert(start);
                    }
                }
            }
        }
    }

    /// Emit the pending run up to `upto`.
    fn flush(&mut self, run: &mut Run, upto: usize) {
        if let Some(start) = run.take() {
            self.emit_text(Span::new(start, upto));
        }
    }

    /// `|{` opens an embedded element. A lone `|` is text.
    fn embedded(&mut self, run: &mut Run, start: usize) -> bool {
        if self.s.peek() != Some(b'{') {
            return false;
        }
        self.flush(run, start);
        let intro = Span::new(start, start + 2);
        self.s.advance(1);
        self.open_inline(ScopeKind::Embedded, intro);
        self.identity(intro);
        self.embedded_attributes();
        // Text inside the element starts after the attributes
        let end = self.s.content_end();
        self.s.skip_spaces(end);
        true
    }

    /// `!{{expr}}` or an inline directive `!name{...}`.
    fn bang(&mut self, run: &mut Run, start: usize, end: usize) -> bool {
        if self.s.starts_with(b"{{") {
            match self.s.find(start + 3, end, b"}}") {
                Some(close) => {
                    self.flush(run, start);
                    let span = Span::new(start, close + 2);
                    let content = self.bytes(Span::new(start + 3, close));
                    self.emit(Event::Interpolation { content, span });
                    self.s.set_pos(close + 2);
                }
                None => {
                    // Unterminated: the rest of the line stays text
                    run.get_or_insert(start);
                    self.flush(run, end);
                    self.error(ParseErrorCode::UnclosedInterpolation, Span::empty(end));
                    self.s.set_pos(end);
                }
            }
            return true;
        }

        let mut probe = self.s.clone();
        if probe.scan_label().is_none() {
            return false;
        }
        if probe.eat(b':') {
            probe.scan_label();
        }
        if probe.peek() != Some(b'{') {
            return false;
        }

        self.flush(run, start);
        self.open_inline(ScopeKind::Directive, Span::new(start, start + 1));
        self.directive_name();
        let open = self.s.pos();
        match self.s.matching_brace(open + 1, end) {
            Some(close) => {
                self.emit_raw(Span::new(open + 1, close));
                self.close(Span::new(close, close + 1));
                self.s.set_pos(close + 1);
            }
            None => {
                self.emit_raw(Span::new(open + 1, end));
                self.error(ParseErrorCode::UnclosedDirective, Span::empty(end));
                self.close(Span::empty(end));
                self.s.set_pos(end);
            }
        }
        true
    }

    /// `;{inline comment}`, or `; comment` to the end of the line.
    fn semicolon(&mut self, run: &mut Run, start: usize, end: usize, line_comment: bool) -> bool {
        if self.s.peek() == Some(b'{') {
            self.flush(run, start);
            self.open_inline(ScopeKind::Comment, Span::new(start, start + 2));
            match self.s.matching_brace(start + 2, end) {
                Some(close) => {
                    self.emit_text(Span::new(start + 2, close));
                    self.close(Span::new(close, close + 1));
                    self.s.set_pos(close + 1);
                }
                None => {
                    self.emit_text(Span::new(start + 2, end));
                    self.error(ParseErrorCode::UnclosedComment, Span::empty(end));
                    self.close(Span::empty(end));
                    self.s.set_pos(end);
                }
            }
            return true;
        }
        if !line_comment {
            return false;
        }

        self.flush(run, start);
        self.open_inline(ScopeKind::Comment, Span::new(start, start + 1));
        self.emit_text(Span::new(start + 1, end));
        self.close(Span::empty(end));
        self.s.set_pos(end);
        true
    }

    /// `@[id]`. Unclosed, the rest of the line stays text.
    fn reference(&mut self, run: &mut Run, start: usize, end: usize) -> bool {
        if self.s.peek() != Some(b'[') {
            return false;
        }
        match self.s.find(start + 2, end, b"]") {
            Some(close) => {
                self.flush(run, start);
                let content = self.bytes(Span::new(start + 2, close));
                self.emit(Event::Reference { content, span: Span::new(start, close + 1) });
                self.s.set_pos(close + 1);
            }
            None => {
                run.get_or_insert(start);
                self.flush(run, end);
                self.error(ParseErrorCode::UnclosedBracket, Span::empty(end));
                self.s.set_pos(end);
            }
        }
        true
    }

    /// `'` before a structural character makes that character text.
    fn escape(&mut self, run: &mut Run, start: usize) -> bool {
        match self.s.peek() {
            Some(b) if ESCAPABLE.contains(&b) => {
                self.flush(run, start);
                *run = Some(start + 1);
                self.s.advance(1);
                true
            }
            _ => false,
        }
    }

    /// ```` ``` ```` freeform block. Runs to the next fence, across lines
    /// if need be, ignoring indentation.
    fn freeform(&mut self, run: &mut Run, start: usize) -> bool {
        if !self.s.starts_with(b"``") {
            return false;
        }
        self.flush(run, start);
        self.open_inline(ScopeKind::Freeform, Span::new(start, start + 3));

        let body = start + 3;
        let len = self.s.len();
        match self.s.find(body, len, b"```") {
            Some(close) => {
                self.emit_raw(Span::new(body, close));
                self.close(Span::new(close, close + 3));
                self.s.set_pos(close + 3);
            }
            None => {
                self.emit_raw(Span::new(body, len));
                self.error(ParseErrorCode::UnclosedFreeform, Span::empty(len));
                self.close(Span::empty(len));
                self.s.set_pos(len);
            }
        }
        true
    }
}
