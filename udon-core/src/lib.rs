//! UDON Core Parser
//!
//! Streaming, event-based parser for UDON (Universal Document & Object Notation).
//! Emits structural events without building an AST.
//!
//! ```
//! use udon_core::{Event, Parser};
//!
//! let events = Parser::new("|div[main].wide :tags [a b] Hello\n").collect_events();
//! assert!(matches!(events[0], Event::ElementStart { .. }));
//! assert!(events.iter().all(|e| !e.is_error()));
//! ```
//!
//! # Architecture
//!
//! - **scanner.rs** - Byte classification and the source cursor
//! - **indent.rs** - Indentation levels
//! - **scope.rs** - Open-scope stack
//! - **parser.rs** - Line driver and pull iterator
//! - **header.rs** - Element headers and shorthand lowering
//! - **attrs.rs** - Attribute clauses and values
//! - **text.rs** - Prose and inline constructs
//! - **directive.rs** - Block directives and raw bodies
//! - **emitter.rs** - Pending-event queue
//! - **event.rs** - Event enum, error codes
//! - **span.rs** - Span/Location types
//! - **value.rs** - Scalar value classification
//! - **tree.rs** - Optional document tree built from events

#[macro_use]
mod tracing_macros;

mod attrs;
mod directive;
mod emitter;
mod error;
mod header;
mod indent;
mod scanner;
mod scope;
mod text;

pub mod event;
pub mod parser;
pub mod span;
pub mod tree;
pub mod value;

pub use error::Error;
pub use event::{Event, ParseErrorCode, ScopeKind};
pub use parser::Parser;
pub use span::{Location, Span};
pub use value::{unescape, Value};

/// Parse a whole document into a vector of events.
///
/// Fails only if `input` is not UTF-8.
pub fn parse(input: &[u8]) -> Result<Vec<Event<'_>>, Error> {
    Ok(Parser::from_bytes(input)?.collect_events())
}
