//! Byte-level cursor over the source.
//!
//! Classification is a single table lookup per byte. Every byte the
//! scanner stops on is ASCII, so any position it reports is also a
//! UTF-8 character boundary.

use std::cell::Cell;

use unicode_xid::UnicodeXID;

use crate::span::Span;

const SPACE: u8 = 1 << 0;
const LABEL: u8 = 1 << 1;
/// Bytes that may start an inline construct in text.
const TEXT_STOP: u8 = 1 << 2;
/// Bytes that never belong in text.
const CONTROL: u8 = 1 << 3;

static CLASS: [u8; 256] = build_class_table();

const fn build_class_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        let mut class = 0;
        if b == b' ' || b == b'\t' {
            class |= SPACE;
        }
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
            class |= LABEL;
        }
        if matches!(b, b'|' | b'!' | b';' | b'@' | b'\'' | b'`' | b'{' | b'}') {
            class |= TEXT_STOP;
        }
        if (b < 0x20 && b != b'\t' && b != b'\n') || b == 0x7F {
            class |= CONTROL | TEXT_STOP;
        }
        table[i] = class;
        i += 1;
    }
    table
}

#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    CLASS[b as usize] & SPACE != 0
}

#[inline]
pub(crate) fn is_control(b: u8) -> bool {
    CLASS[b as usize] & CONTROL != 0
}

#[inline]
fn is_text_stop(b: u8) -> bool {
    CLASS[b as usize] & TEXT_STOP != 0
}

/// Label characters: Unicode XID_Continue plus `-`.
#[inline]
pub(crate) fn is_label_char(c: char) -> bool {
    if c.is_ascii() {
        CLASS[c as usize] & LABEL != 0
    } else {
        c.is_xid_continue()
    }
}

/// What a lexical unit is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnitKind {
    /// A run of plain text bytes
    Run,
    /// A single byte that may introduce an inline construct
    Punct(u8),
    /// A byte that is never valid content (control character, lone `\r`)
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unit {
    pub kind: UnitKind,
    pub span: Span,
}

/// Cursor over the source with lookahead.
#[derive(Debug, Clone)]
pub(crate) struct Scanner<'a> {
    text: &'a str,
    src: &'a [u8],
    pos: usize,
    /// Last newline search: `(from, newline)` with no `\n` in `from..newline`
    line: Cell<(usize, usize)>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, src: text.as_bytes(), pos: 0, line: Cell::new((usize::MAX, 0)) }
    }

    #[inline]
    pub fn src(&self) -> &'a [u8] {
        self.src
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        debug_assert!(pos <= self.src.len());
        self.pos = pos;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.src.len()
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    #[inline]
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.src.get(pos).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.src.len());
    }

    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.src[self.pos..].starts_with(prefix)
    }

    /// Consume `b` if it is next.
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn slice(&self, span: Span) -> &'a [u8] {
        span.slice(self.src)
    }

    /// Char at the cursor, if the cursor sits on a character boundary.
    #[inline]
    pub fn peek_char(&self) -> Option<char> {
        self.text.get(self.pos..)?.chars().next()
    }

    /// End of the current line's content: the next `\n` or end of input,
    /// minus a `\r` right before it.
    pub fn content_end(&self) -> usize {
        let newline = self.newline_at();
        if newline > self.pos && self.src[newline - 1] == b'\r' {
            newline - 1
        } else {
            newline
        }
    }

    /// Start of the next line (past the `\n`), or end of input.
    pub fn next_line_start(&self) -> usize {
        let newline = self.newline_at();
        (newline + 1).min(self.src.len())
    }

    /// The next `\n` at or after the cursor. Repeated calls on one line
    /// reuse the previous search.
    fn newline_at(&self) -> usize {
        let (from, newline) = self.line.get();
        if from <= self.pos && self.pos <= newline {
            return newline;
        }
        let newline =
            memchr::memchr(b'\n', &self.src[self.pos..]).map_or(self.src.len(), |i| self.pos + i);
        self.line.set((self.pos, newline));
        newline
    }

    /// Skip spaces and tabs, stopping at `end`.
    pub fn skip_spaces(&mut self, end: usize) {
        while self.pos < end && is_space(self.src[self.pos]) {
            self.pos += 1;
        }
    }

    /// Measure the indentation run at the cursor: its width in columns
    /// and whether it contained a tab. Tabs count one column.
    pub fn indentation(&mut self) -> (usize, bool) {
        let start = self.pos;
        let mut tab = false;
        while let Some(b) = self.peek() {
            match b {
                b' ' => {}
                b'\t' => tab = true,
                _ => break,
            }
            self.pos += 1;
        }
        (self.pos - start, tab)
    }

    /// Scan a label (XID_Continue or `-`), returning its span.
    pub fn scan_label(&mut self) -> Option<Span> {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !is_label_char(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        (self.pos > start).then(|| Span::new(start, self.pos))
    }

    /// Whether a label starts at the cursor.
    pub fn at_label(&self) -> bool {
        self.peek_char().is_some_and(is_label_char)
    }

    /// Scan up to whitespace, a control byte, a byte in `stops`, or `end`.
    pub fn scan_token(&mut self, end: usize, stops: &[u8]) -> Span {
        let start = self.pos;
        while self.pos < end {
            let b = self.src[self.pos];
            if is_space(b) || is_control(b) || stops.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        Span::new(start, self.pos)
    }

    /// Find `needle` within `from..end`.
    pub fn find(&self, from: usize, end: usize, needle: &[u8]) -> Option<usize> {
        let haystack = self.src.get(from..end)?;
        memchr::memmem::find(haystack, needle).map(|i| from + i)
    }

    /// Find the `}` matching an already-open `{`, starting at `from`.
    pub fn matching_brace(&self, from: usize, end: usize) -> Option<usize> {
        let mut depth = 1usize;
        for (i, &b) in self.src.get(from..end)?.iter().enumerate() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(from + i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Number of characters in `from..to`.
    pub fn count_chars(&self, from: usize, to: usize) -> usize {
        self.src[from..to].iter().filter(|&&b| (b & 0xC0) != 0x80).count()
    }

    /// Next lexical unit before `end`, consuming it.
    ///
    /// A lone `\r` (one not ending the line) is reported as `Invalid`.
    pub fn next_unit(&mut self, end: usize) -> Option<Unit> {
        if self.pos >= end {
            return None;
        }
        let start = self.pos;
        let b = self.src[start];
        if is_control(b) {
            self.pos += 1;
            return Some(Unit { kind: UnitKind::Invalid, span: Span::new(start, self.pos) });
        }
        if is_text_stop(b) {
            self.pos += 1;
            return Some(Unit { kind: UnitKind::Punct(b), span: Span::new(start, self.pos) });
        }
        while self.pos < end && !is_text_stop(self.src[self.pos]) {
            self.pos += 1;
        }
        Some(Unit { kind: UnitKind::Run, span: Span::new(start, self.pos) })
    }
}
