//! Parser events - the core output of the UDON streaming parser.
//!
//! This is a SAX-style event model: events are emitted as the parser
//! encounters syntax, with no accumulation. Structure is represented
//! by start/end event pairs.
//!
//! For arrays: ArrayStart, value events..., ArrayEnd
//! For attributes: Attr { key }, then exactly one value (or array run)
//!
//! ## Event Sequences
//!
//! Element identity `|foo[myid].bar?` emits:
//! ```text
//! ElementStart
//! Name("foo")
//! Attr("id")
//! BareValue("myid")
//! Attr("class")
//! BareValue("bar")
//! Attr("?")
//! BoolTrue
//! ElementEnd
//! ```
//!
//! Array value `:tags [a b c]` emits:
//! ```text
//! Attr("tags")
//! ArrayStart
//! BareValue("a")
//! BareValue("b")
//! BareValue("c")
//! ArrayEnd
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::span::Span;

/// Error codes for in-stream diagnostics.
///
/// Using an enum instead of String keeps `Event` small and removes heap
/// allocation for error messages. The parser always continues after
/// emitting one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParseErrorCode {
    /// Control character or stray carriage return
    UnexpectedChar = 0,
    /// Tab characters not allowed in indentation (use spaces)
    NoTabs,
    /// Dedent to a column that matches no open indentation level
    MisalignedDedent,
    /// Element or directive introducer with no name and no shorthand
    MissingName,
    /// Expected attribute key after ':'
    ExpectedAttrKey,
    /// Expected class name after '.'
    ExpectedClassName,
    /// Unclosed `[` in an id shorthand or reference
    UnclosedBracket,
    /// Unclosed quoted string value
    UnclosedStringValue,
    /// Unclosed array
    UnclosedArray,
    /// Unclosed embedded element `|{`
    UnclosedEmbedded,
    /// Unclosed inline comment `;{`
    UnclosedComment,
    /// Unclosed inline directive `!name{`
    UnclosedDirective,
    /// Unclosed freeform block
    UnclosedFreeform,
    /// Unclosed interpolation `!{{`
    UnclosedInterpolation,
}

impl ParseErrorCode {
    /// Get a human-readable message for this error code.
    pub fn message(self) -> &'static str {
        match self {
            Self::UnexpectedChar => "unexpected character",
            Self::NoTabs => "tabs are not allowed in indentation",
            Self::MisalignedDedent => "dedent does not match any open indentation level",
            Self::MissingName => "expected a name or shorthand after introducer",
            Self::ExpectedAttrKey => "expected attribute key after ':'",
            Self::ExpectedClassName => "expected class name after '.'",
            Self::UnclosedBracket => "unclosed bracket",
            Self::UnclosedStringValue => "unclosed string value",
            Self::UnclosedArray => "unclosed array",
            Self::UnclosedEmbedded => "unclosed embedded element",
            Self::UnclosedComment => "unclosed inline comment",
            Self::UnclosedDirective => "unclosed inline directive",
            Self::UnclosedFreeform => "unclosed freeform block",
            Self::UnclosedInterpolation => "unclosed interpolation",
        }
    }

    /// Stable snake_case identifier, for bindings that key on error codes.
    pub fn name(self) -> &'static str {
        match self {
            Self::UnexpectedChar => "unexpected_char",
            Self::NoTabs => "no_tabs",
            Self::MisalignedDedent => "misaligned_dedent",
            Self::MissingName => "missing_name",
            Self::ExpectedAttrKey => "expected_attr_key",
            Self::ExpectedClassName => "expected_class_name",
            Self::UnclosedBracket => "unclosed_bracket",
            Self::UnclosedStringValue => "unclosed_string_value",
            Self::UnclosedArray => "unclosed_array",
            Self::UnclosedEmbedded => "unclosed_embedded",
            Self::UnclosedComment => "unclosed_comment",
            Self::UnclosedDirective => "unclosed_directive",
            Self::UnclosedFreeform => "unclosed_freeform",
            Self::UnclosedInterpolation => "unclosed_interpolation",
        }
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The kind of a bracketed scope: what a start/end event pair delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Element,
    Embedded,
    Directive,
    Array,
    Freeform,
    Comment,
}

impl ScopeKind {
    /// Scopes that stay open across lines and close on dedent.
    #[inline]
    pub fn is_block(self) -> bool {
        matches!(self, ScopeKind::Element | ScopeKind::Directive)
    }

    /// The start event for this scope.
    pub fn start_event<'a>(self, span: Span) -> Event<'a> {
        match self {
            ScopeKind::Element => Event::ElementStart { span },
            ScopeKind::Embedded => Event::EmbeddedStart { span },
            ScopeKind::Directive => Event::DirectiveStart { span },
            ScopeKind::Array => Event::ArrayStart { span },
            ScopeKind::Freeform => Event::FreeformStart { span },
            ScopeKind::Comment => Event::CommentStart { span },
        }
    }

    /// The end event for this scope.
    pub fn end_event<'a>(self, span: Span) -> Event<'a> {
        match self {
            ScopeKind::Element => Event::ElementEnd { span },
            ScopeKind::Embedded => Event::EmbeddedEnd { span },
            ScopeKind::Directive => Event::DirectiveEnd { span },
            ScopeKind::Array => Event::ArrayEnd { span },
            ScopeKind::Freeform => Event::FreeformEnd { span },
            ScopeKind::Comment => Event::CommentEnd { span },
        }
    }
}

/// Streaming parser events.
///
/// The lifetime `'a` refers to the source buffer. Content is borrowed
/// from the input; only quoted strings containing escapes are owned.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    // ========== Bracket Events (Start/End pairs) ==========

    /// Element start: `|`
    ElementStart { span: Span },
    /// Element end (dedent detected or document end)
    ElementEnd { span: Span },
    /// Embedded element start: `|{`
    EmbeddedStart { span: Span },
    /// Embedded element end: `}`
    EmbeddedEnd { span: Span },
    /// Directive start: `!name` or `!name{`
    DirectiveStart { span: Span },
    /// Directive end
    DirectiveEnd { span: Span },
    /// Array start: `[`
    ArrayStart { span: Span },
    /// Array end: `]`
    ArrayEnd { span: Span },
    /// Freeform block start: ```` ``` ````
    FreeformStart { span: Span },
    /// Freeform block end
    FreeformEnd { span: Span },
    /// Comment start: `;` or `;{`
    CommentStart { span: Span },
    /// Comment end
    CommentEnd { span: Span },

    // ========== Content Events ==========

    /// Element or directive name
    Name { content: Cow<'a, [u8]>, span: Span },
    /// Text/prose content
    Text { content: Cow<'a, [u8]>, span: Span },
    /// Attribute key: `:key`. Exactly one value follows.
    Attr { content: Cow<'a, [u8]>, span: Span },
    /// Unquoted string value
    BareValue { content: Cow<'a, [u8]>, span: Span },
    /// Quoted string value, already unescaped
    StringValue { content: Cow<'a, [u8]>, span: Span },
    /// Interpolation expression: `!{{expr}}`
    Interpolation { content: Cow<'a, [u8]>, span: Span },
    /// Reference: `@[id]` or attribute merge `:[id]`
    Reference { content: Cow<'a, [u8]>, span: Span },
    /// Verbatim content (freeform blocks, raw directives, statements)
    RawContent { content: Cow<'a, [u8]>, span: Span },

    // ========== Typed Scalars ==========

    /// Integer: `42`, `0xFF`, `0o755`, `0b1010`, `-17`
    Integer { value: i64, span: Span },
    /// Float: `3.14`, `1.5e-3`
    Float { value: f64, span: Span },
    /// Rational: `1/3r`
    Rational { numerator: i64, denominator: i64, span: Span },
    /// Complex: `3+4i`, `5i`
    Complex { real: f64, imag: f64, span: Span },
    /// `true`, or a flag attribute with no value
    BoolTrue { span: Span },
    /// `false`
    BoolFalse { span: Span },
    /// `null`, `nil` or `~`
    Nil { span: Span },

    // ========== Diagnostics ==========

    /// Parse error (parser continues after emitting this)
    Error { code: ParseErrorCode, span: Span },
    /// Notice about well-formed input that was dropped or reinterpreted.
    /// Not a defect: strict consumers only need to reject `Error`.
    Warning { content: Cow<'a, [u8]>, span: Span },
}

impl<'a> Event<'a> {
    /// Get the span for this event.
    pub fn span(&self) -> Span {
        match self {
            Event::ElementStart { span }
            | Event::ElementEnd { span }
            | Event::EmbeddedStart { span }
            | Event::EmbeddedEnd { span }
            | Event::DirectiveStart { span }
            | Event::DirectiveEnd { span }
            | Event::ArrayStart { span }
            | Event::ArrayEnd { span }
            | Event::FreeformStart { span }
            | Event::FreeformEnd { span }
            | Event::CommentStart { span }
            | Event::CommentEnd { span }
            | Event::BoolTrue { span }
            | Event::BoolFalse { span }
            | Event::Nil { span } => *span,
            Event::Name { span, .. }
            | Event::Text { span, .. }
            | Event::Attr { span, .. }
            | Event::BareValue { span, .. }
            | Event::StringValue { span, .. }
            | Event::Interpolation { span, .. }
            | Event::Reference { span, .. }
            | Event::RawContent { span, .. }
            | Event::Integer { span, .. }
            | Event::Float { span, .. }
            | Event::Rational { span, .. }
            | Event::Complex { span, .. }
            | Event::Error { span, .. }
            | Event::Warning { span, .. } => *span,
        }
    }

    /// Content payload of a content event.
    pub fn content(&self) -> Option<&[u8]> {
        match self {
            Event::Name { content, .. }
            | Event::Text { content, .. }
            | Event::Attr { content, .. }
            | Event::BareValue { content, .. }
            | Event::StringValue { content, .. }
            | Event::Interpolation { content, .. }
            | Event::Reference { content, .. }
            | Event::RawContent { content, .. }
            | Event::Warning { content, .. } => Some(content.as_ref()),
            _ => None,
        }
    }

    /// The exact source text this event was produced from.
    #[inline]
    pub fn literal<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        self.span().slice(source)
    }

    /// Check if this is an error event.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error { .. })
    }

    /// Check if this event can stand as an attribute's value
    /// (or as an array element). `ArrayStart` begins an array run.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            Event::BareValue { .. }
                | Event::StringValue { .. }
                | Event::Interpolation { .. }
                | Event::Integer { .. }
                | Event::Float { .. }
                | Event::Rational { .. }
                | Event::Complex { .. }
                | Event::BoolTrue { .. }
                | Event::BoolFalse { .. }
                | Event::Nil { .. }
                | Event::ArrayStart { .. }
        )
    }

    /// If this is a bracket start event, the scope it opens.
    pub fn opens(&self) -> Option<ScopeKind> {
        match self {
            Event::ElementStart { .. } => Some(ScopeKind::Element),
            Event::EmbeddedStart { .. } => Some(ScopeKind::Embedded),
            Event::DirectiveStart { .. } => Some(ScopeKind::Directive),
            Event::ArrayStart { .. } => Some(ScopeKind::Array),
            Event::FreeformStart { .. } => Some(ScopeKind::Freeform),
            Event::CommentStart { .. } => Some(ScopeKind::Comment),
            _ => None,
        }
    }

    /// If this is a bracket end event, the scope it closes.
    pub fn closes(&self) -> Option<ScopeKind> {
        match self {
            Event::ElementEnd { .. } => Some(ScopeKind::Element),
            Event::EmbeddedEnd { .. } => Some(ScopeKind::Embedded),
            Event::DirectiveEnd { .. } => Some(ScopeKind::Directive),
            Event::ArrayEnd { .. } => Some(ScopeKind::Array),
            Event::FreeformEnd { .. } => Some(ScopeKind::Freeform),
            Event::CommentEnd { .. } => Some(ScopeKind::Comment),
            _ => None,
        }
    }

    /// Stable snake_case name of the event type.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::ElementStart { .. } => "element_start",
            Event::ElementEnd { .. } => "element_end",
            Event::EmbeddedStart { .. } => "embedded_start",
            Event::EmbeddedEnd { .. } => "embedded_end",
            Event::DirectiveStart { .. } => "directive_start",
            Event::DirectiveEnd { .. } => "directive_end",
            Event::ArrayStart { .. } => "array_start",
            Event::ArrayEnd { .. } => "array_end",
            Event::FreeformStart { .. } => "freeform_start",
            Event::FreeformEnd { .. } => "freeform_end",
            Event::CommentStart { .. } => "comment_start",
            Event::CommentEnd { .. } => "comment_end",
            Event::Name { .. } => "name",
            Event::Text { .. } => "text",
            Event::Attr { .. } => "attr",
            Event::BareValue { .. } => "bare_value",
            Event::StringValue { .. } => "string_value",
            Event::Interpolation { .. } => "interpolation",
            Event::Reference { .. } => "reference",
            Event::RawContent { .. } => "raw_content",
            Event::Integer { .. } => "integer",
            Event::Float { .. } => "float",
            Event::Rational { .. } => "rational",
            Event::Complex { .. } => "complex",
            Event::BoolTrue { .. } => "bool_true",
            Event::BoolFalse { .. } => "bool_false",
            Event::Nil { .. } => "nil",
            Event::Error { .. } => "error",
            Event::Warning { .. } => "warning",
        }
    }

    /// One-line rendering: type, payload and span.
    pub fn format_line(&self) -> String {
        self.to_string()
    }

    /// Detach from the source buffer.
    pub fn into_owned(self) -> Event<'static> {
        fn own(c: Cow<'_, [u8]>) -> Cow<'static, [u8]> {
            Cow::Owned(c.into_owned())
        }
        match self {
            Event::ElementStart { span } => Event::ElementStart { span },
            Event::ElementEnd { span } => Event::ElementEnd { span },
            Event::EmbeddedStart { span } => Event::EmbeddedStart { span },
            Event::EmbeddedEnd { span } => Event::EmbeddedEnd { span },
            Event::DirectiveStart { span } => Event::DirectiveStart { span },
            Event::DirectiveEnd { span } => Event::DirectiveEnd { span },
            Event::ArrayStart { span } => Event::ArrayStart { span },
            Event::ArrayEnd { span } => Event::ArrayEnd { span },
            Event::FreeformStart { span } => Event::FreeformStart { span },
            Event::FreeformEnd { span } => Event::FreeformEnd { span },
            Event::CommentStart { span } => Event::CommentStart { span },
            Event::CommentEnd { span } => Event::CommentEnd { span },
            Event::Name { content, span } => Event::Name { content: own(content), span },
            Event::Text { content, span } => Event::Text { content: own(content), span },
            Event::Attr { content, span } => Event::Attr { content: own(content), span },
            Event::BareValue { content, span } => Event::BareValue { content: own(content), span },
            Event::StringValue { content, span } => {
                Event::StringValue { content: own(content), span }
            }
            Event::Interpolation { content, span } => {
                Event::Interpolation { content: own(content), span }
            }
            Event::Reference { content, span } => Event::Reference { content: own(content), span },
            Event::RawContent { content, span } => {
                Event::RawContent { content: own(content), span }
            }
            Event::Integer { value, span } => Event::Integer { value, span },
            Event::Float { value, span } => Event::Float { value, span },
            Event::Rational { numerator, denominator, span } => {
                Event::Rational { numerator, denominator, span }
            }
            Event::Complex { real, imag, span } => Event::Complex { real, imag, span },
            Event::BoolTrue { span } => Event::BoolTrue { span },
            Event::BoolFalse { span } => Event::BoolFalse { span },
            Event::Nil { span } => Event::Nil { span },
            Event::Error { code, span } => Event::Error { code, span },
            Event::Warning { content, span } => Event::Warning { content: own(content), span },
        }
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        write!(f, "{}", self.kind_name())?;
        match self {
            Event::Integer { value, .. } => write!(f, " {}", value)?,
            Event::Float { value, .. } => write!(f, " {}", value)?,
            Event::Rational { numerator, denominator, .. } => {
                write!(f, " {}/{}", numerator, denominator)?
            }
            Event::Complex { real, imag, .. } => write!(f, " {}{:+}i", real, imag)?,
            Event::Error { code, .. } => write!(f, " {}", code.name())?,
            other => {
                if let Some(content) = other.content() {
                    write!(f, " {:?}", String::from_utf8_lossy(content))?;
                }
            }
        }
        write!(f, " @{}..{}", span.start, span.end)
    }
}
