//! Indentation levels.
//!
//! A stack of column widths, one per distinct depth currently open.
//! Blank and comment-only lines never reach the tracker.

/// How a line's column relates to the open levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) enum Transition {
    /// First line, or deeper than the current top
    Deeper,
    /// Same column as the current top
    Same,
    /// Shallower than the current top. `misaligned` when the column
    /// matches none of the remaining levels.
    Dedent { popped: usize, misaligned: bool },
}

#[derive(Debug, Default)]
pub(crate) struct IndentTracker {
    levels: Vec<usize>,
}

impl IndentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a content line at `column`.
    ///
    /// A misaligned column is kept as a new level nested under the
    /// nearest shallower one, so later lines at the same column align.
    pub fn observe(&mut self, column: usize) -> Transition {
        let Some(&top) = self.levels.last() else {
            self.levels.push(column);
            return Transition::Deeper;
        };
        if column > top {
            self.levels.push(column);
            return Transition::Deeper;
        }
        if column == top {
            return Transition::Same;
        }

        let mut popped = 0;
        while self.levels.last().is_some_and(|&level| level > column) {
            self.levels.pop();
            popped += 1;
        }
        let misaligned = match self.levels.last() {
            Some(&level) => level != column,
            None => false,
        };
        if self.levels.last() != Some(&column) {
            self.levels.push(column);
        }
        Transition::Dedent { popped, misaligned }
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}
