//! The line driver.
//!
//! `Parser` is an explicit state machine: a cursor, the open indentation
//! levels, the open scopes and a queue of pending events. Each call to
//! [`Iterator::next`] drains the queue, parsing one more line whenever it
//! runs dry. Nothing is retained after an event is handed out.
//!
//! ```
//! use udon_core::{Event, Parser};
//!
//! let names: Vec<_> = Parser::new("|a\n  |b\n")
//!     .filter_map(|e| match e {
//!         Event::Name { content, .. } => Some(content.into_owned()),
//!         _ => None,
//!     })
//!     .collect();
//! assert_eq!(names, vec![b"a".to_vec(), b"b".to_vec()]);
//! ```

use std::borrow::Cow;
use std::iter::FusedIterator;

use crate::emitter::Emitter;
use crate::error::Error;
use crate::event::{Event, ParseErrorCode, ScopeKind};
use crate::indent::{IndentTracker, Transition};
use crate::scanner::Scanner;
use crate::scope::NestingStack;
use crate::span::Span;

/// Body of a `!raw:lang` directive being copied verbatim.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawBody {
    /// Column of the directive; body lines are deeper
    pub column: usize,
    /// Indentation of the first body line, removed from every line
    pub base: Option<usize>,
    /// Start of a run of blank lines held until the next content line
    /// shows whether they belong to the body
    pub held: Option<usize>,
}

/// Streaming UDON parser.
///
/// Pull events with the `Iterator` impl, push them into a callback with
/// [`parse`](Parser::parse), or collect them all with
/// [`collect_events`](Parser::collect_events). All three yield the same
/// sequence.
pub struct Parser<'a> {
    pub(crate) s: Scanner<'a>,
    pub(crate) out: Emitter<'a>,
    pub(crate) scopes: NestingStack,
    pub(crate) raw: Option<RawBody>,
    indent: IndentTracker,
    /// A byte offset on the current line and its character column
    mark: (usize, usize),
    finished: bool,
}

impl<'a> Parser<'a> {
    /// Create a parser over UTF-8 text.
    pub fn new(source: &'a str) -> Self {
        Self {
            s: Scanner::new(source),
            out: Emitter::new(source.len()),
            scopes: NestingStack::new(),
            raw: None,
            indent: IndentTracker::new(),
            mark: (0, 0),
            finished: false,
        }
    }

    /// Create a parser over raw bytes.
    ///
    /// Fails without producing any events if the input is not UTF-8.
    pub fn from_bytes(source: &'a [u8]) -> Result<Self, Error> {
        let text = std::str::from_utf8(source)?;
        Ok(Self::new(text))
    }

    /// The source buffer events point into.
    pub fn source(&self) -> &'a [u8] {
        self.s.src()
    }

    /// Run to completion, handing every event to `f`.
    pub fn parse<F>(self, mut f: F)
    where
        F: FnMut(Event<'a>),
    {
        for event in self {
            f(event);
        }
    }

    /// Run to completion, collecting every event.
    pub fn collect_events(self) -> Vec<Event<'a>> {
        self.collect()
    }

    // ========== Emission helpers ==========

    pub(crate) fn emit(&mut self, event: Event<'a>) {
        self.out.emit(event);
    }

    pub(crate) fn error(&mut self, code: ParseErrorCode, span: Span) {
        self.out.emit(Event::Error { code, span });
    }

    pub(crate) fn warning(&mut self, notice: &'static str, span: Span) {
        self.out.emit(Event::Warning { content: Cow::Borrowed(notice.as_bytes()), span });
    }

    /// Borrowed source bytes for a span.
    #[inline]
    pub(crate) fn bytes(&self, span: Span) -> Cow<'a, [u8]> {
        Cow::Borrowed(self.s.slice(span))
    }

    pub(crate) fn emit_text(&mut self, span: Span) {
        if !span.is_empty() {
            let content = self.bytes(span);
            self.emit(Event::Text { content, span });
        }
    }

    pub(crate) fn emit_raw(&mut self, span: Span) {
        if !span.is_empty() {
            let content = self.bytes(span);
            self.emit(Event::RawContent { content, span });
        }
    }

    /// Open a scope owned by `column`.
    pub(crate) fn open(&mut self, kind: ScopeKind, span: Span, column: usize) {
        trace!(?kind, column, depth = self.scopes.len(), "open");
        self.scopes.push(kind, column);
        self.emit(kind.start_event(span));
    }

    /// Open a scope closed by syntax rather than indentation. Its column
    /// is never consulted.
    pub(crate) fn open_inline(&mut self, kind: ScopeKind, span: Span) {
        self.open(kind, span, 0);
    }

    /// Character column of `pos`, at or after the last position asked
    /// about on the current line.
    pub(crate) fn column_at(&mut self, pos: usize) -> usize {
        let (from, column) = self.mark;
        debug_assert!(from <= pos);
        let column = column + self.s.count_chars(from, pos);
        self.mark = (pos, column);
        column
    }

    /// Close the innermost scope.
    pub(crate) fn close(&mut self, span: Span) {
        if let Some(frame) = self.scopes.pop() {
            trace!(kind = ?frame.kind, depth = self.scopes.len(), "close");
            self.emit(frame.kind.end_event(span));
        }
    }

    /// Close inline scopes above `base` at the end of a line.
    pub(crate) fn close_to(&mut self, base: usize, at: usize) {
        while self.scopes.len() > base {
            self.close(Span::empty(at));
        }
    }

    // ========== Line driver ==========

    fn step(&mut self) {
        if self.s.at_end() {
            self.finish();
            return;
        }

        if let Some(body) = self.raw {
            if self.raw_line(body) {
                return;
            }
            self.raw = None;
        }

        let line_start = self.s.pos();
        let (column, tab) = self.s.indentation();
        let first = self.s.pos();
        let end = self.s.content_end();
        self.mark = (first, column);

        if first < end {
            if tab {
                self.error(ParseErrorCode::NoTabs, Span::new(line_start, first));
            }
            if self.s.peek() == Some(b';') && self.s.peek_at(1) != Some(b'{') {
                self.comment_line(end);
            } else {
                self.dedent(column, line_start, first);
                self.line(column);
            }
        }

        let next = self.s.next_line_start();
        self.s.set_pos(next);
    }

    /// Close every block scope a line at `column` ends, deepest first.
    fn dedent(&mut self, column: usize, line_start: usize, first: usize) {
        let transition = self.indent.observe(column);
        trace!(column, ?transition, levels = self.indent.depth(), "indent");

        if let Transition::Dedent { misaligned: true, .. } = transition {
            self.error(ParseErrorCode::MisalignedDedent, Span::new(line_start, first));
        }
        while let Some(frame) = self.scopes.pop_closed_by(column) {
            trace!(kind = ?frame.kind, column = frame.column, "close on dedent");
            self.emit(frame.kind.end_event(Span::empty(first)));
        }
    }

    fn line(&mut self, column: usize) {
        match (self.s.peek(), self.s.peek_at(1)) {
            (Some(b'|'), next) if next != Some(b'{') => {
                self.element(column);
                self.tail();
            }
            (Some(b':'), _) => self.tail(),
            (Some(b'!'), _) if self.at_block_directive() => self.block_directive(column),
            _ => self.inline(),
        }
    }

    /// `; comment` on a line of its own. Leaves indentation untouched.
    fn comment_line(&mut self, end: usize) {
        let start = self.s.pos();
        self.emit(Event::CommentStart { span: Span::new(start, start + 1) });
        self.emit_text(Span::new(start + 1, end));
        self.emit(Event::CommentEnd { span: Span::empty(end) });
        self.s.set_pos(end);
    }

    fn finish(&mut self) {
        let len = self.s.len();
        self.close_to(0, len);
        debug!(events = self.out.count(), "parse complete");
        self.finished = true;
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        loop {
            if let Some(event) = self.out.pop() {
                return Some(event);
            }
            if self.finished {
                return None;
            }
            self.step();
        }
    }
}

impl FusedIterator for Parser<'_> {}
