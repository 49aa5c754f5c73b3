//! Test harness for running tests with stochastic variations

use crate::common::{Gen, TestCase};
use udon_core::{Event, Parser};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: Vec<u8>,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub seed: u64,
    pub errors: Vec<String>,
}

/// Parse and format every event. Fixture inputs are always UTF-8.
fn collect_formatted(input: &[u8]) -> (Vec<String>, Option<String>) {
    let parser = match Parser::from_bytes(input) {
        Ok(parser) => parser,
        Err(e) => return (Vec::new(), Some(e.to_string())),
    };
    let events = parser.collect_events();
    let structure = check_well_formed(input, &events).err();
    (events.iter().map(format_event).collect(), structure)
}

/// Format event for comparison (simplified, no spans)
pub fn format_event(event: &Event<'_>) -> String {
    fn content(kind: &str, bytes: &[u8]) -> String {
        format!("{} {:?}", kind, String::from_utf8_lossy(bytes))
    }

    match event {
        Event::ElementStart { .. } => "ElementStart".to_string(),
        Event::ElementEnd { .. } => "ElementEnd".to_string(),
        Event::EmbeddedStart { .. } => "EmbeddedStart".to_string(),
        Event::EmbeddedEnd { .. } => "EmbeddedEnd".to_string(),
        Event::DirectiveStart { .. } => "DirectiveStart".to_string(),
        Event::DirectiveEnd { .. } => "DirectiveEnd".to_string(),
        Event::ArrayStart { .. } => "ArrayStart".to_string(),
        Event::ArrayEnd { .. } => "ArrayEnd".to_string(),
        Event::FreeformStart { .. } => "FreeformStart".to_string(),
        Event::FreeformEnd { .. } => "FreeformEnd".to_string(),
        Event::CommentStart { .. } => "CommentStart".to_string(),
        Event::CommentEnd { .. } => "CommentEnd".to_string(),
        Event::Name { content: c, .. } => content("Name", c),
        Event::Text { content: c, .. } => content("Text", c),
        Event::Attr { content: c, .. } => content("Attr", c),
        Event::StringValue { content: c, .. } => content("StringValue", c),
        Event::BareValue { content: c, .. } => content("BareValue", c),
        Event::Interpolation { content: c, .. } => content("Interpolation", c),
        Event::Reference { content: c, .. } => content("Reference", c),
        Event::RawContent { content: c, .. } => content("RawContent", c),
        Event::Integer { value, .. } => format!("Integer {:?}", value.to_string()),
        Event::Float { value, .. } => format!("Float {:?}", value.to_string()),
        Event::Rational { numerator, denominator, .. } => {
            format!("Rational {:?}", format!("{}/{}", numerator, denominator))
        }
        Event::Complex { real, imag, .. } => {
            format!("Complex {:?}", format!("{}{:+}i", real, imag))
        }
        Event::BoolTrue { .. } => "BoolTrue".to_string(),
        Event::BoolFalse { .. } => "BoolFalse".to_string(),
        Event::Nil { .. } => "Nil".to_string(),
        Event::Error { code, .. } => format!("Error {:?}", code.name()),
        Event::Warning { content: c, .. } => content("Warning", c),
    }
}

/// Structural checks that hold for any input: spans in bounds with
/// non-decreasing starts, LIFO bracket matching, and exactly one value
/// after every attribute key.
pub fn check_well_formed(source: &[u8], events: &[Event<'_>]) -> Result<(), String> {
    let mut stack = Vec::new();
    let mut last_start = 0;

    for (i, event) in events.iter().enumerate() {
        let span = event.span();
        if span.start > span.end || span.end > source.len() {
            return Err(format!("event {} out of bounds: {}", i, event));
        }
        if span.start < last_start {
            return Err(format!("event {} starts before its predecessor: {}", i, event));
        }
        last_start = span.start;

        if let Some(kind) = event.opens() {
            stack.push(kind);
        }
        if let Some(kind) = event.closes() {
            match stack.pop() {
                Some(open) if open == kind => {}
                other => return Err(format!("event {} ({}) closes {:?}", i, event, other)),
            }
        }
        if let Event::Attr { .. } = event {
            match events.get(i + 1) {
                Some(next) if next.is_value() => {}
                other => {
                    return Err(format!("attribute {} followed by {:?}", event, other));
                }
            }
        }
    }

    if stack.is_empty() {
        Ok(())
    } else {
        Err(format!("scopes left open: {:?}", stack))
    }
}

/// Run a single test case (canonical, no variations)
pub fn run_test(case: &TestCase) -> TestResult {
    let input = case.udon.as_bytes();
    let (actual, structure) = collect_formatted(input);
    let expected: Vec<String> = case.events.iter().map(|e| e.format()).collect();

    let mut errors: Vec<String> = structure.into_iter().collect();

    // Check event count
    if actual.len() != expected.len() {
        errors.push(format!(
            "Event count mismatch: expected {}, got {}",
            expected.len(),
            actual.len()
        ));
    }

    // Check each event
    for (i, (act, exp)) in actual.iter().zip(expected.iter()).enumerate() {
        if act != exp {
            errors.push(format!("Event {}: expected '{}', got '{}'", i, exp, act));
        }
    }

    TestResult {
        passed: errors.is_empty(),
        input: input.to_vec(),
        expected,
        actual,
        seed: 0,
        errors,
    }
}

/// Run test with stochastic variations
///
/// Applies independent variations:
/// - 40% chance of UDON above
/// - Geometric indent (α=0.9)
/// - Random blank lines
/// - 40% chance of UDON below
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let mut input = Vec::new();

    // 40% chance: add UDON above
    if gen.chance(0.4) {
        input.extend(gen.udon_fragment(0));
    }

    // Determine indent level (geometric, α=0.9)
    let indent_level = gen.indent_level();
    let indent: Vec<u8> = vec![b' '; indent_level];

    // Add canonical test with indent and possible blank lines
    for line in case.udon.as_bytes().split(|&b| b == b'\n') {
        // Maybe inject blank line before
        input.extend(gen.blank_lines());

        if !line.is_empty() {
            input.extend(&indent);
            input.extend(line);
        }
        input.push(b'\n');
    }

    // 40% chance: add UDON below
    if gen.chance(0.4) {
        input.extend(gen.udon_fragment(indent_level));
    }

    let (actual, structure) = collect_formatted(&input);
    let expected: Vec<String> = case.events.iter().map(|e| e.format()).collect();

    // For variations, we check that expected events appear in order (subsequence match)
    // because we may have extra events from the wrapping context
    let mut errors: Vec<String> = structure.into_iter().collect();
    let mut exp_idx = 0;

    for act in &actual {
        if exp_idx < expected.len() && act == &expected[exp_idx] {
            exp_idx += 1;
        }
    }

    if exp_idx < expected.len() {
        errors.push(format!(
            "Missing expected events starting at index {}: {:?}",
            exp_idx,
            &expected[exp_idx..]
        ));
    }

    // Check for Error events (unless expected)
    for act in &actual {
        if act.starts_with("Error") && !expected.iter().any(|e| e.starts_with("Error")) {
            errors.push(format!("Unexpected error: {}", act));
        }
    }

    TestResult {
        passed: errors.is_empty(),
        input,
        expected,
        actual,
        seed: gen.seed,
        errors,
    }
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!("Seed: {} (set UDON_TEST_SEED={} to reproduce)", self.seed, self.seed);
        eprintln!("\nInput:");
        eprintln!("{}", String::from_utf8_lossy(&self.input));
        eprintln!("\nExpected events:");
        for (i, e) in self.expected.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nActual events:");
        for (i, e) in self.actual.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
