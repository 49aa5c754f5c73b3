//! Example: print one line per event for a document read from a file
//! or stdin.
//!
//! Run with: cargo run --example stdin_parse [document.udon] < document.udon

use std::io::Read;
use std::process::ExitCode;

use udon_core::Parser;

fn main() -> ExitCode {
    let read = match std::env::args().nth(1) {
        Some(path) => std::fs::read(&path),
        None => {
            let mut input = Vec::new();
            std::io::stdin().read_to_end(&mut input).map(|_| input)
        }
    };
    let input = match read {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error reading input: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let parser = match Parser::from_bytes(&input) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut errors = 0;
    for event in parser {
        if event.is_error() {
            let at = event.span().location(&input);
            eprintln!("{}:{}: {}", at.line, at.column, event);
            errors += 1;
        }
        println!("{}", event.format_line());
    }

    if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
