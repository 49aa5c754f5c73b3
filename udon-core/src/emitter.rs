//! The pending-event queue between the line driver and the consumer.
//!
//! The driver parses one line at a time and pushes every event that line
//! produces; the consumer drains them one by one. Only the current line's
//! events are ever held, along with the blank lines of a raw body waiting
//! on its next content line.

use std::collections::VecDeque;

use crate::event::Event;

#[derive(Debug)]
pub(crate) struct Emitter<'a> {
    queue: VecDeque<Event<'a>>,
    /// Source length, for the in-bounds check
    len: usize,
    /// Start of the last emitted span, for the ordering check
    last_start: usize,
    /// Events emitted so far
    count: usize,
}

impl<'a> Emitter<'a> {
    pub fn new(len: usize) -> Self {
        Self { queue: VecDeque::with_capacity(16), len, last_start: 0, count: 0 }
    }

    /// Queue an event. Spans must stay in bounds and never move backwards.
    #[inline]
    pub fn emit(&mut self, event: Event<'a>) {
        let span = event.span();
        debug_assert!(span.end <= self.len, "{} out of bounds (len {})", event, self.len);
        debug_assert!(
            span.start >= self.last_start,
            "{} starts before previous event at {}",
            event,
            self.last_start
        );
        #[cfg(feature = "tracing")]
        match &event {
            Event::Error { code, span } => {
                debug!(code = code.name(), start = span.start, end = span.end, "diagnostic");
            }
            Event::Warning { content, span } => {
                debug!(
                    notice = %String::from_utf8_lossy(content),
                    start = span.start,
                    end = span.end,
                    "warning"
                );
            }
            _ => {}
        }
        self.last_start = span.start;
        self.count += 1;
        self.queue.push_back(event);
    }

    /// Take the oldest queued event.
    #[inline]
    pub fn pop(&mut self) -> Option<Event<'a>> {
        self.queue.pop_front()
    }

    /// Number of events emitted over the whole parse.
    #[inline]
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub fn count(&self) -> usize {
        self.count
    }
}
