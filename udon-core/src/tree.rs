//! Tree/AST representation for UDON documents.
//!
//! This module provides a tree-based API layered over the streaming parser.
//! The tree uses an index-based arena pattern for efficient allocation and
//! to enable parent pointers without reference cycles.
//!
//! Element and attribute names are interned per document: each distinct
//! name is stored once and referred to by a [`NameId`]. The table belongs
//! to the `Document`, so separate parses never share state.
//!
//! # Example
//!
//! ```
//! use udon_core::tree::Document;
//!
//! let input = b"|article :author Joseph\n  |heading Hello\n  Some text here.\n";
//! let doc = Document::parse(input).unwrap();
//!
//! for node in doc.root().children() {
//!     if let Some(el) = node.as_element() {
//!         println!("Element: {}", el.name());
//!     }
//! }
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use crate::event::{Event, ParseErrorCode};
use crate::parser::Parser;
use crate::span::{Location, Span};

// ============================================================================
// Core Types
// ============================================================================

/// Index into the document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the document's name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameId(u32);

/// Per-document interning table for element and attribute names.
#[derive(Debug, Default)]
pub struct Names<'a> {
    names: Vec<Cow<'a, str>>,
    index: HashMap<Cow<'a, str>, NameId>,
}

impl<'a> Names<'a> {
    /// Intern a name, returning the existing handle if already present.
    pub fn intern(&mut self, name: Cow<'a, str>) -> NameId {
        if let Some(&id) = self.index.get(name.as_ref()) {
            return id;
        }
        let id = NameId(self.names.len() as u32);
        self.names.push(name.clone());
        self.index.insert(name, id);
        id
    }

    /// Look up a name without interning it.
    pub fn get(&self, name: &str) -> Option<NameId> {
        self.index.get(name).copied()
    }

    /// The text of an interned name.
    pub fn resolve(&self, id: NameId) -> &str {
        self.names.get(id.0 as usize).map_or("", |s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Internal node storage.
#[derive(Debug)]
struct NodeData<'a> {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind<'a>,
}

/// The kind of node in the tree.
#[derive(Debug)]
pub enum NodeKind<'a> {
    /// Root document container.
    Document,

    /// Element node: `|element` or `|{embedded}`.
    Element {
        name: Option<NameId>,
        id: Option<Cow<'a, str>>,
        classes: Vec<Cow<'a, str>>,
        attrs: Vec<Attribute<'a>>,
        /// True for embedded elements `|{...}`.
        embedded: bool,
    },

    /// Text content.
    Text(Cow<'a, str>),

    /// Comment: `;` line or `;{inline}`.
    Comment(Cow<'a, str>),

    /// Directive: `!if`, `!for`, `!include`, etc.
    Directive {
        name: Option<NameId>,
        attrs: Vec<Attribute<'a>>,
    },

    /// Interpolation: `!{{expr}}`.
    Interpolation(Cow<'a, str>),

    /// Reference: `@[id]` or `:[ref]`.
    Reference(Cow<'a, str>),

    /// Raw or freeform content block.
    Raw {
        lang: Option<Cow<'a, str>>,
        content: Cow<'a, str>,
    },
}

/// An attribute on an element or directive.
#[derive(Debug)]
pub struct Attribute<'a> {
    pub name: NameId,
    pub value: Value<'a>,
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Quoted string: `"hello"`.
    String(Cow<'a, str>),
    /// Bare/unquoted value.
    Bare(Cow<'a, str>),
    /// Integer (decimal, hex, octal, binary).
    Integer(i64),
    /// Floating point.
    Float(f64),
    /// Rational: `1/3r`.
    Rational { numerator: i64, denominator: i64 },
    /// Complex: `3+4i`.
    Complex { real: f64, imag: f64 },
    /// Boolean, including flag attributes.
    Bool(bool),
    /// Nil/null.
    Nil,
    /// Interpolated value: `!{{expr}}`.
    Interpolation(Cow<'a, str>),
    /// Array of values.
    Array(Vec<Value<'a>>),
}

// ============================================================================
// Document
// ============================================================================

/// A parsed UDON document as a tree.
#[derive(Debug)]
pub struct Document<'a> {
    nodes: Vec<NodeData<'a>>,
    names: Names<'a>,
    root: NodeId,
}

/// Error returned when strict parsing fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The diagnostic, or `None` for undecodable input
    pub code: Option<ParseErrorCode>,
    pub message: String,
    pub span: Span,
    pub location: Location,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.location)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

impl<'a> Document<'a> {
    /// Parse input bytes into a document tree, failing on the first
    /// diagnostic.
    pub fn parse(input: &'a [u8]) -> Result<Self, ParseError> {
        let parser = Parser::from_bytes(input).map_err(|err| {
            let message = err.to_string();
            let crate::Error::Encoding { valid_up_to } = err;
            ParseError {
                code: None,
                message,
                span: Span::new(valid_up_to, input.len()),
                location: Location::of(input, valid_up_to),
            }
        })?;

        let mut builder = TreeBuilder::new();
        for event in parser {
            if let Event::Error { code, span } = event {
                return Err(ParseError {
                    code: Some(code),
                    message: code.message().to_string(),
                    span,
                    location: span.location(input),
                });
            }
            builder.handle_event(event);
        }
        Ok(builder.finish())
    }

    /// Parse, skipping diagnostics. The tree is built from whatever
    /// structure the parser recovered.
    pub fn parse_lossy(input: &'a str) -> Self {
        let mut builder = TreeBuilder::new();
        Parser::new(input).parse(|event| builder.handle_event(event));
        builder.finish()
    }

    /// Get the root node.
    pub fn root(&self) -> Node<'_, 'a> {
        Node { doc: self, id: self.root }
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<Node<'_, 'a>> {
        if (id.index()) < self.nodes.len() {
            Some(Node { doc: self, id })
        } else {
            None
        }
    }

    /// The document's name table.
    pub fn names(&self) -> &Names<'a> {
        &self.names
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn node_data(&self, id: NodeId) -> &NodeData<'a> {
        &self.nodes[id.index()]
    }
}

// ============================================================================
// Node (navigation handle)
// ============================================================================

/// A handle for navigating the document tree.
///
/// This is a lightweight reference that borrows from the document.
/// The `'doc: 'a` bound ensures the document outlives the input.
#[derive(Clone, Copy)]
pub struct Node<'doc, 'a: 'doc> {
    doc: &'doc Document<'a>,
    id: NodeId,
}

impl<'doc, 'a: 'doc> Node<'doc, 'a> {
    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node's kind.
    pub fn kind(&self) -> &'doc NodeKind<'a> {
        &self.doc.node_data(self.id).kind
    }

    /// Get the parent node, if any.
    pub fn parent(&self) -> Option<Node<'doc, 'a>> {
        self.doc.node_data(self.id).parent.map(|id| Node { doc: self.doc, id })
    }

    /// Iterate over child nodes.
    pub fn children(&self) -> impl Iterator<Item = Node<'doc, 'a>> + 'doc {
        let doc = self.doc;
        self.doc.node_data(self.id).children.iter().map(move |&id| Node { doc, id })
    }

    /// Get the first child node.
    pub fn first_child(&self) -> Option<Node<'doc, 'a>> {
        self.doc.node_data(self.id).children.first().map(|&id| Node { doc: self.doc, id })
    }

    /// Get the last child node.
    pub fn last_child(&self) -> Option<Node<'doc, 'a>> {
        self.doc.node_data(self.id).children.last().map(|&id| Node { doc: self.doc, id })
    }

    /// Get the next sibling node.
    pub fn next_sibling(&self) -> Option<Node<'doc, 'a>> {
        let parent_id = self.doc.node_data(self.id).parent?;
        let siblings = &self.doc.node_data(parent_id).children;
        let pos = siblings.iter().position(|&id| id == self.id)?;
        siblings.get(pos + 1).map(|&id| Node { doc: self.doc, id })
    }

    /// Get the previous sibling node.
    pub fn prev_sibling(&self) -> Option<Node<'doc, 'a>> {
        let parent_id = self.doc.node_data(self.id).parent?;
        let siblings = &self.doc.node_data(parent_id).children;
        let pos = siblings.iter().position(|&id| id == self.id)?;
        pos.checked_sub(1).map(|prev| Node { doc: self.doc, id: siblings[prev] })
    }

    /// Check if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self.kind(), NodeKind::Element { .. })
    }

    /// Check if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self.kind(), NodeKind::Text(_))
    }

    /// Get element view if this is an element.
    pub fn as_element(&self) -> Option<ElementView<'doc, 'a>> {
        if let NodeKind::Element { .. } = self.kind() {
            Some(ElementView { node: *self })
        } else {
            None
        }
    }

    /// Get text content if this is a text node.
    pub fn text_content(&self) -> Option<&'doc str> {
        if let NodeKind::Text(s) = self.kind() {
            Some(s.as_ref())
        } else {
            None
        }
    }

    /// Recursively collect all text content under this node.
    pub fn all_text(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, buf: &mut String) {
        match self.kind() {
            NodeKind::Text(s) => buf.push_str(s),
            NodeKind::Comment(_) => {}
            _ => {
                for child in self.children() {
                    child.collect_text(buf);
                }
            }
        }
    }
}

impl<'doc, 'a> std::fmt::Debug for Node<'doc, 'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", self.kind())
            .finish()
    }
}

// ============================================================================
// ElementView (typed access to elements)
// ============================================================================

/// A typed view for element nodes.
#[derive(Clone, Copy)]
pub struct ElementView<'doc, 'a: 'doc> {
    node: Node<'doc, 'a>,
}

impl<'doc, 'a: 'doc> ElementView<'doc, 'a> {
    /// Get the underlying node.
    pub fn node(&self) -> Node<'doc, 'a> {
        self.node
    }

    /// Get the interned element name, if the element has one.
    pub fn name_id(&self) -> Option<NameId> {
        match self.node.kind() {
            NodeKind::Element { name, .. } => *name,
            _ => None,
        }
    }

    /// Get the element name (empty for anonymous elements like `|.note`).
    pub fn name(&self) -> &'doc str {
        self.name_id().map_or("", |id| self.node.doc.names.resolve(id))
    }

    /// Get the element ID, if any.
    pub fn id(&self) -> Option<&'doc str> {
        if let NodeKind::Element { id, .. } = self.node.kind() {
            id.as_deref()
        } else {
            None
        }
    }

    /// Get the element classes.
    pub fn classes(&self) -> &'doc [Cow<'a, str>] {
        if let NodeKind::Element { classes, .. } = self.node.kind() {
            classes
        } else {
            &[]
        }
    }

    /// Check if the element has a specific class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| *c == class)
    }

    /// Check if this is an embedded element (`|{...}`).
    pub fn is_embedded(&self) -> bool {
        if let NodeKind::Element { embedded, .. } = self.node.kind() {
            *embedded
        } else {
            false
        }
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&'doc Value<'a>> {
        let id = self.node.doc.names.get(name)?;
        self.attrs_slice().iter().find(|a| a.name == id).map(|a| &a.value)
    }

    /// Iterate over all attributes.
    pub fn attrs(&self) -> impl Iterator<Item = (&'doc str, &'doc Value<'a>)> + 'doc {
        let names = &self.node.doc.names;
        self.attrs_slice().iter().map(move |a| (names.resolve(a.name), &a.value))
    }

    fn attrs_slice(&self) -> &'doc [Attribute<'a>] {
        if let NodeKind::Element { attrs, .. } = self.node.kind() {
            attrs
        } else {
            &[]
        }
    }

    /// Iterate over child nodes.
    pub fn children(&self) -> impl Iterator<Item = Node<'doc, 'a>> + 'doc {
        self.node.children()
    }
}

impl<'doc, 'a> std::fmt::Debug for ElementView<'doc, 'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementView")
            .field("name", &self.name())
            .field("id", &self.id())
            .field("classes", &self.classes())
            .finish()
    }
}

// ============================================================================
// TreeBuilder (event consumer)
// ============================================================================

/// What the next value event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// An ordinary attribute
    Attr(NameId),
    /// Shorthand or explicit `id`, folded into the element
    Id,
    /// Shorthand or explicit `class`, folded into the element
    Class,
}

/// Builds a document tree from parser events.
struct TreeBuilder<'a> {
    nodes: Vec<NodeData<'a>>,
    names: Names<'a>,
    /// Stack of open node IDs.
    stack: Vec<NodeId>,
    /// Attribute waiting for its value.
    pending: Option<Pending>,
    /// Array nesting for values.
    array_stack: Vec<Vec<Value<'a>>>,
}

const ROOT: NodeId = NodeId(0);

impl<'a> TreeBuilder<'a> {
    fn new() -> Self {
        // Create root document node
        let root = NodeData {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Document,
        };
        TreeBuilder {
            nodes: vec![root],
            names: Names::default(),
            stack: vec![ROOT],
            pending: None,
            array_stack: Vec::new(),
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(ROOT)
    }

    fn current_kind(&mut self) -> &mut NodeKind<'a> {
        let current = self.current();
        &mut self.nodes[current.index()].kind
    }

    fn push_node(&mut self, kind: NodeKind<'a>) -> NodeId {
        let parent = self.current();
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn open_node(&mut self, kind: NodeKind<'a>) {
        let id = self.push_node(kind);
        self.stack.push(id);
    }

    fn close_node(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn element(embedded: bool) -> NodeKind<'a> {
        NodeKind::Element {
            name: None,
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
            embedded,
        }
    }

    /// Whether an attribute is waiting for the event being handled.
    fn expecting_value(&self) -> bool {
        self.pending.is_some() || !self.array_stack.is_empty()
    }

    fn handle_event(&mut self, event: Event<'a>) {
        use Event::*;

        match event {
            // ---- Elements ----
            ElementStart { .. } => self.open_node(Self::element(false)),
            EmbeddedStart { .. } => self.open_node(Self::element(true)),
            ElementEnd { .. } | EmbeddedEnd { .. } | DirectiveEnd { .. } => self.close_node(),

            Name { content, .. } => {
                let id = self.names.intern(bytes_to_cow(content));
                if let NodeKind::Element { name, .. } | NodeKind::Directive { name, .. } =
                    self.current_kind()
                {
                    *name = Some(id);
                }
            }

            // ---- Attributes ----
            Attr { content, .. } => {
                let pending = if &content[..] == b"id" {
                    Pending::Id
                } else if &content[..] == b"class" {
                    Pending::Class
                } else {
                    Pending::Attr(self.names.intern(bytes_to_cow(content)))
                };
                self.pending = Some(pending);
            }

            // ---- Values ----
            StringValue { content, .. } => self.add_value(Value::String(bytes_to_cow(content))),
            BareValue { content, .. } => self.add_value(Value::Bare(bytes_to_cow(content))),
            Integer { value, .. } => self.add_value(Value::Integer(value)),
            Float { value, .. } => self.add_value(Value::Float(value)),
            Rational { numerator, denominator, .. } => {
                self.add_value(Value::Rational { numerator, denominator })
            }
            Complex { real, imag, .. } => self.add_value(Value::Complex { real, imag }),
            BoolTrue { .. } => self.add_value(Value::Bool(true)),
            BoolFalse { .. } => self.add_value(Value::Bool(false)),
            Nil { .. } => self.add_value(Value::Nil),

            // ---- Arrays ----
            ArrayStart { .. } => self.array_stack.push(Vec::new()),
            ArrayEnd { .. } => {
                if let Some(items) = self.array_stack.pop() {
                    self.add_value(Value::Array(items));
                }
            }

            // ---- Text ----
            Text { content, .. } => {
                let text = bytes_to_cow(content);
                if let NodeKind::Comment(body) = self.current_kind() {
                    append(body, text);
                } else {
                    self.push_node(NodeKind::Text(text));
                }
            }

            // ---- Comments ----
            CommentStart { .. } => self.open_node(NodeKind::Comment(Cow::Borrowed(""))),
            CommentEnd { .. } => self.close_node(),

            // ---- Directives ----
            DirectiveStart { .. } => self.open_node(NodeKind::Directive {
                name: None,
                attrs: Vec::new(),
            }),

            // ---- Interpolation ----
            Interpolation { content, .. } => {
                let expr = bytes_to_cow(content);
                if self.expecting_value() {
                    self.add_value(Value::Interpolation(expr));
                } else {
                    self.push_node(NodeKind::Interpolation(expr));
                }
            }

            // ---- References ----
            Reference { content, .. } => {
                self.push_node(NodeKind::Reference(bytes_to_cow(content)));
            }

            // ---- Raw/Freeform ----
            FreeformStart { .. } => self.open_node(NodeKind::Raw {
                lang: None,
                content: Cow::Borrowed(""),
            }),
            FreeformEnd { .. } => self.close_node(),
            RawContent { content, .. } => self.raw_content(bytes_to_cow(content)),

            // ---- Ignored ----
            Error { .. } | Warning { .. } => {}
        }
    }

    /// Freeform bodies fill their own node; directive bodies accumulate
    /// into one `Raw` child tagged with the directive's `lang`.
    fn raw_content(&mut self, text: Cow<'a, str>) {
        let current = self.current();
        if let NodeKind::Raw { content, .. } = &mut self.nodes[current.index()].kind {
            append(content, text);
            return;
        }

        let last = self.nodes[current.index()].children.last().copied();
        if let Some(last) = last {
            if let NodeKind::Raw { content, .. } = &mut self.nodes[last.index()].kind {
                append(content, text);
                return;
            }
        }

        let lang = self.directive_lang(current);
        self.push_node(NodeKind::Raw { lang, content: text });
    }

    fn directive_lang(&self, id: NodeId) -> Option<Cow<'a, str>> {
        let NodeKind::Directive { attrs, .. } = &self.nodes[id.index()].kind else {
            return None;
        };
        let lang = self.names.get("lang")?;
        attrs.iter().find(|a| a.name == lang).and_then(|a| match &a.value {
            Value::Bare(s) | Value::String(s) => Some(s.clone()),
            _ => None,
        })
    }

    fn add_value(&mut self, value: Value<'a>) {
        // If we're in an array context, add to the array
        if let Some(arr) = self.array_stack.last_mut() {
            arr.push(value);
            return;
        }

        let Some(pending) = self.pending.take() else {
            return;
        };
        let current = self.current();
        let names = &mut self.names;
        match (pending, value, &mut self.nodes[current.index()].kind) {
            (Pending::Id, Value::Bare(s), NodeKind::Element { id, .. }) => *id = Some(s),
            (Pending::Class, Value::Bare(s), NodeKind::Element { classes, .. }) => classes.push(s),
            (pending, value, NodeKind::Element { attrs, .. } | NodeKind::Directive { attrs, .. }) => {
                let name = match pending {
                    Pending::Attr(name) => name,
                    Pending::Id => names.intern(Cow::Borrowed("id")),
                    Pending::Class => names.intern(Cow::Borrowed("class")),
                };
                attrs.push(Attribute { name, value });
            }
            _ => {}
        }
    }

    fn finish(self) -> Document<'a> {
        Document {
            nodes: self.nodes,
            names: self.names,
            root: ROOT,
        }
    }
}

/// Append text, borrowing when the target is still empty.
fn append<'a>(target: &mut Cow<'a, str>, text: Cow<'a, str>) {
    if target.is_empty() {
        *target = text;
    } else {
        target.to_mut().push_str(&text);
    }
}

/// Convert bytes to Cow<str>, borrowing when the content is borrowed.
fn bytes_to_cow(bytes: Cow<'_, [u8]>) -> Cow<'_, str> {
    match bytes {
        Cow::Borrowed(b) => String::from_utf8_lossy(b),
        Cow::Owned(b) => match String::from_utf8(b) {
            Ok(s) => Cow::Owned(s),
            Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
