//! Property-based tests for the UDON parser
//!
//! These tests verify structural invariants that must hold for ANY input,
//! not just carefully crafted examples. proptest will generate thousands
//! of random inputs and shrink failures to minimal cases.

mod common;

use common::{check_well_formed, format_event};
use proptest::prelude::*;
use udon_core::tree::Document;
use udon_core::{Event, Parser};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        max_shrink_iters: 500,
        timeout: 2000,
        ..ProptestConfig::default()
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn parse(input: &str) -> Vec<Event<'_>> {
    Parser::new(input).collect_events()
}

/// Inputs dense in structural characters, so most of the grammar is hit.
const STRUCTURAL: &str = "[a-z0-9|:.\\[\\]\\n \\t'\"?!*+;{}@`~_/\\\\-]{0,400}";

// =============================================================================
// Property: Parser Never Panics
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// The parser must never panic on any input, valid or invalid.
    #[test]
    fn parser_never_panics(input in any::<String>()) {
        let _ = parse(&input);
    }

    /// Same, on input that is mostly syntax.
    #[test]
    fn parser_never_panics_structural(input in STRUCTURAL) {
        let _ = parse(&input);
    }

    /// Non-UTF-8 bytes are rejected up front, never half-parsed.
    #[test]
    fn invalid_utf8_is_rejected(input in prop::collection::vec(any::<u8>(), 0..200)) {
        match (std::str::from_utf8(&input), udon_core::parse(&input)) {
            (Ok(s), Ok(events)) => {
                prop_assert_eq!(events, parse(s));
            }
            (Err(e), Err(udon_core::Error::Encoding { valid_up_to })) => {
                prop_assert_eq!(e.valid_up_to(), valid_up_to);
            }
            (utf8, result) => {
                prop_assert!(false, "{:?} vs {:?}", utf8, result);
            }
        }
    }

    /// The tree builder consumes any event stream.
    #[test]
    fn tree_never_panics(input in STRUCTURAL) {
        let doc = Document::parse_lossy(&input);
        prop_assert!(doc.root().parent().is_none());
        let _ = doc.root().all_text();
    }
}

// =============================================================================
// Property: Well-Formed Event Stream
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// Spans in bounds, brackets balanced, every attribute has a value.
    #[test]
    fn events_are_well_formed(input in STRUCTURAL) {
        let events = parse(&input);
        if let Err(msg) = check_well_formed(input.as_bytes(), &events) {
            prop_assert!(false, "{}", msg);
        }
    }

    /// Arbitrary unicode too.
    #[test]
    fn events_are_well_formed_unicode(input in any::<String>()) {
        let events = parse(&input);
        if let Err(msg) = check_well_formed(input.as_bytes(), &events) {
            prop_assert!(false, "{}", msg);
        }
    }

    /// Borrowed content is exactly the source text under the span.
    #[test]
    fn borrowed_content_matches_span(input in STRUCTURAL) {
        for event in parse(&input) {
            let literal = event.literal(input.as_bytes());
            match &event {
                Event::Name { content: std::borrow::Cow::Borrowed(c), .. }
                | Event::Text { content: std::borrow::Cow::Borrowed(c), .. }
                | Event::BareValue { content: std::borrow::Cow::Borrowed(c), .. } => {
                    prop_assert_eq!(*c, literal, "{}", event);
                }
                _ => {}
            }
        }
    }
}

// =============================================================================
// Property: Determinism
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// Same input, same events, however they are consumed.
    #[test]
    fn parsing_is_deterministic(input in STRUCTURAL) {
        let pulled = parse(&input);
        let mut pushed = Vec::new();
        Parser::new(&input).parse(|e| pushed.push(e));
        prop_assert_eq!(&pulled, &pushed);
        prop_assert_eq!(pulled, parse(&input));
    }

    /// Blank input produces no events.
    #[test]
    fn blank_input_is_silent(input in "[ \\t\\n]{0,40}") {
        prop_assert!(parse(&input).is_empty(), "{:?}", input);
    }
}

// =============================================================================
// Structured documents
// =============================================================================

#[derive(Debug, Clone)]
enum Val {
    Bare(String),
    Int(i32),
    Quoted(String),
}

#[derive(Debug, Clone)]
struct Elem {
    name: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Val)>,
    text: Option<String>,
    children: Vec<Elem>,
}

fn val() -> impl Strategy<Value = Val> {
    prop_oneof![
        "v[a-z0-9]{0,4}".prop_map(Val::Bare),
        any::<i32>().prop_map(Val::Int),
        "[a-z ]{0,8}".prop_map(Val::Quoted),
    ]
}

fn leaf() -> impl Strategy<Value = Elem> {
    (
        "[a-z][a-z0-9]{0,5}",
        proptest::option::of("i[a-z0-9]{0,4}"),
        prop::collection::vec("c[a-z0-9]{0,4}", 0..3),
        prop::collection::vec(("k[a-z0-9]{0,4}", val()), 0..3),
        proptest::option::of("[a-z]{1,6}( [a-z]{1,6}){0,3}"),
    )
        .prop_map(|(name, id, classes, attrs, text)| Elem {
            name,
            id,
            classes,
            attrs,
            text,
            children: Vec::new(),
        })
}

fn elem() -> impl Strategy<Value = Elem> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        (leaf(), prop::collection::vec(inner, 0..4)).prop_map(|(mut e, children)| {
            e.children = children;
            e
        })
    })
}

fn render(elem: &Elem, indent: usize, out: &mut String) {
    out.push_str(&" ".repeat(indent));
    out.push('|');
    out.push_str(&elem.name);
    if let Some(id) = &elem.id {
        out.push_str(&format!("[{}]", id));
    }
    for class in &elem.classes {
        out.push('.');
        out.push_str(class);
    }
    for (key, val) in &elem.attrs {
        match val {
            Val::Bare(s) => out.push_str(&format!(" :{} {}", key, s)),
            Val::Int(n) => out.push_str(&format!(" :{} {}", key, n)),
            Val::Quoted(s) => out.push_str(&format!(" :{} \"{}\"", key, s)),
        }
    }
    if let Some(text) = &elem.text {
        out.push(' ');
        out.push_str(text);
    }
    out.push('\n');
    for child in &elem.children {
        render(child, indent + 2, out);
    }
}

/// The events `render` output must produce, in `format_event` form.
fn expected(elem: &Elem, out: &mut Vec<String>) {
    out.push("ElementStart".to_string());
    out.push(format!("Name {:?}", elem.name));
    if let Some(id) = &elem.id {
        out.push(format!("Attr {:?}", "id"));
        out.push(format!("BareValue {:?}", id));
    }
    for class in &elem.classes {
        out.push(format!("Attr {:?}", "class"));
        out.push(format!("BareValue {:?}", class));
    }
    for (key, val) in &elem.attrs {
        out.push(format!("Attr {:?}", key));
        out.push(match val {
            Val::Bare(s) => format!("BareValue {:?}", s),
            Val::Int(n) => format!("Integer {:?}", n.to_string()),
            Val::Quoted(s) => format!("StringValue {:?}", s),
        });
    }
    if let Some(text) = &elem.text {
        out.push(format!("Text {:?}", text));
    }
    for child in &elem.children {
        expected(child, out);
    }
    out.push("ElementEnd".to_string());
}

fn check_tree(elem: &Elem, view: udon_core::tree::ElementView<'_, '_>) -> Result<(), String> {
    if view.name() != elem.name {
        return Err(format!("name {} != {}", view.name(), elem.name));
    }
    if view.id() != elem.id.as_deref() {
        return Err(format!("id {:?} != {:?}", view.id(), elem.id));
    }
    let classes: Vec<&str> = view.classes().iter().map(|c| &**c).collect();
    if classes != elem.classes {
        return Err(format!("classes {:?} != {:?}", classes, elem.classes));
    }
    let children: Vec<_> = view.children().filter_map(|n| n.as_element()).collect();
    if children.len() != elem.children.len() {
        return Err(format!("{} children, expected {}", children.len(), elem.children.len()));
    }
    for (child, view) in elem.children.iter().zip(children) {
        check_tree(child, view)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(config())]

    /// Generated documents parse to exactly the events they were built from.
    #[test]
    fn generated_documents_parse_exactly(roots in prop::collection::vec(elem(), 1..4)) {
        let mut source = String::new();
        let mut want = Vec::new();
        for root in &roots {
            render(root, 0, &mut source);
            expected(root, &mut want);
        }

        let events = parse(&source);
        let got: Vec<String> = events.iter().map(format_event).collect();
        prop_assert_eq!(got, want, "source:\n{}", source);
    }

    /// The same documents build the same tree.
    #[test]
    fn generated_documents_build_matching_trees(roots in prop::collection::vec(elem(), 1..4)) {
        let mut source = String::new();
        for root in &roots {
            render(root, 0, &mut source);
        }

        let doc = Document::parse(source.as_bytes()).map_err(|e| {
            TestCaseError::fail(format!("{} in\n{}", e, source))
        })?;
        let top: Vec<_> = doc.root().children().filter_map(|n| n.as_element()).collect();
        prop_assert_eq!(top.len(), roots.len());
        for (root, view) in roots.iter().zip(top) {
            if let Err(msg) = check_tree(root, view) {
                prop_assert!(false, "{}\nsource:\n{}", msg, source);
            }
        }
    }

    /// Rendering a parse back from event literals reproduces the parse.
    #[test]
    fn literals_reparse_identically(roots in prop::collection::vec(elem(), 1..4)) {
        let mut source = String::new();
        for root in &roots {
            render(root, 0, &mut source);
        }
        let first = parse(&source);

        // Rebuild each line from the literals of its events, collapsing
        // original spacing to single spaces.
        let mut rebuilt = String::new();
        let mut depth = 0usize;
        for event in &first {
            let literal = String::from_utf8_lossy(event.literal(source.as_bytes())).into_owned();
            match event {
                Event::ElementStart { .. } => {
                    rebuilt.push('\n');
                    rebuilt.push_str(&"  ".repeat(depth));
                    rebuilt.push('|');
                    depth += 1;
                }
                Event::ElementEnd { .. } => depth -= 1,
                Event::Name { .. } => rebuilt.push_str(&literal),
                Event::Attr { content, .. } if &content[..] == b"id" && literal.starts_with('[') => {
                    rebuilt.push_str(&literal);
                }
                Event::Attr { .. } if literal.starts_with('.') => rebuilt.push_str(&literal),
                Event::Attr { .. } => {
                    rebuilt.push(' ');
                    rebuilt.push_str(&literal);
                }
                Event::Text { .. } => {
                    rebuilt.push(' ');
                    rebuilt.push_str(&literal);
                }
                // Shorthand payloads are inside the lowered attribute's literal
                Event::BareValue { span, .. }
                    if first.iter().any(|e| {
                        matches!(e, Event::Attr { span: a, .. } if a.start < span.start && span.end <= a.end)
                    }) => {}
                e if e.is_value() => {
                    rebuilt.push(' ');
                    rebuilt.push_str(&literal);
                }
                _ => {}
            }
        }

        let second = parse(&rebuilt);
        let a: Vec<String> = first.iter().map(format_event).collect();
        let b: Vec<String> = second.iter().map(format_event).collect();
        prop_assert_eq!(a, b, "rebuilt:\n{}", rebuilt);
    }
}
