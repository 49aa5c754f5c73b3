//! Open scopes, innermost last.

use crate::event::ScopeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    pub kind: ScopeKind,
    /// Column that owns the scope. Block scopes close when a line
    /// starts at or left of it.
    pub column: usize,
}

#[derive(Debug, Default)]
pub(crate) struct NestingStack {
    frames: Vec<Frame>,
}

impl NestingStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, kind: ScopeKind, column: usize) {
        self.frames.push(Frame { kind, column });
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Pop the innermost block scope if a line at `column` closes it.
    pub fn pop_closed_by(&mut self, column: usize) -> Option<Frame> {
        match self.frames.last() {
            Some(frame) if frame.kind.is_block() && frame.column >= column => self.frames.pop(),
            _ => None,
        }
    }
}
