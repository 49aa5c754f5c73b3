//! Example: Parse UDON to a tree and navigate it.
//!
//! Run with: cargo run --example tree_parse

use udon_core::tree::{Document, Node, NodeKind};

fn main() {
    let input = br#"|article[intro].featured
  :author "Joseph Wecker"
  :date 2025-12-22
  :tags [udon notation design]

  |heading Welcome to UDON

  UDON treats documents and data as the same thing.
  Structure and prose coexist naturally.

  |section
    |p First paragraph with |{em emphasis} and |{strong bold}.
    |p Second paragraph, by @[intro].
    !raw:sql
      SELECT title FROM articles
"#;

    let doc = match Document::parse(input) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("parse failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("=== Document Tree ===\n");
    print_node(&doc, &doc.root(), 0);

    println!("\n=== Element Details ===\n");
    for node in doc.root().children() {
        if let Some(el) = node.as_element() {
            println!("Element: {}", el.name());
            if let Some(id) = el.id() {
                println!("  id: {}", id);
            }
            if !el.classes().is_empty() {
                println!("  classes: {:?}", el.classes());
            }
            for (name, value) in el.attrs() {
                println!("  :{} = {:?}", name, value);
            }
            println!("  text: {:?}", el.node().all_text());
            println!();
        }
    }

    println!("{} nodes, {} distinct names", doc.len(), doc.names().len());
}

fn print_node(doc: &Document, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);

    match node.kind() {
        NodeKind::Document => {
            println!("{}Document", indent);
        }
        NodeKind::Element { id, classes, embedded, .. } => {
            let mut desc = node.as_element().map_or("", |el| el.name()).to_string();
            if let Some(id) = id {
                desc.push_str(&format!("[{}]", id));
            }
            for class in classes {
                desc.push_str(&format!(".{}", class));
            }
            if *embedded {
                println!("{}|{{{}}}", indent, desc);
            } else {
                println!("{}|{}", indent, desc);
            }
        }
        NodeKind::Text(s) => {
            let text = s.trim();
            if !text.is_empty() {
                match text.char_indices().nth(40) {
                    Some((cut, _)) => println!("{}\"{}...\"", indent, &text[..cut]),
                    None => println!("{}\"{}\"", indent, text),
                }
            }
        }
        NodeKind::Comment(s) => {
            println!("{}; {}", indent, s.trim());
        }
        NodeKind::Directive { name, .. } => {
            let name = name.map_or("", |id| doc.names().resolve(id));
            println!("{}!{}", indent, name);
        }
        NodeKind::Interpolation(expr) => {
            println!("{}!{{{{{}}}}}", indent, expr);
        }
        NodeKind::Reference(r) => {
            println!("{}@[{}]", indent, r);
        }
        NodeKind::Raw { lang, content } => {
            match lang {
                Some(lang) => println!("{}```{}", indent, lang),
                None => println!("{}```", indent),
            }
            println!("{}{}", indent, content.lines().next().unwrap_or(""));
            println!("{}...", indent);
        }
    }

    for child in node.children() {
        print_node(doc, &child, depth + 1);
    }
}

