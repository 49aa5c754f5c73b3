//! Example: stream events from a small document.
//!
//! Run with: cargo run --example simple_parse

use udon_core::{Event, Parser};

fn main() {
    let input = "|div[myid].class1 :count 3 Hello World\n  |span nested |{em inline}\n";

    println!("Input: {:?}\n", input);
    println!("Events:");

    Parser::new(input).parse(|event| match &event {
        Event::Name { content, .. }
        | Event::Text { content, .. }
        | Event::Attr { content, .. }
        | Event::StringValue { content, .. } => {
            println!("  {:<14} {:?}", event.kind_name(), String::from_utf8_lossy(content));
        }
        _ => println!("  {}", event),
    });
}
