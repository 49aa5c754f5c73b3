//! Attribute value types with syntactic typing.
//!
//! UDON uses syntactic typing - the syntax determines the type,
//! not value sniffing. A bare token that fails numeric validation is
//! still a perfectly good string, so classification never errors.

use std::borrow::Cow;

use phf::phf_map;

use crate::event::Event;
use crate::span::Span;

/// Reserved bare words (lowercase only).
static KEYWORDS: phf::Map<&'static [u8], Value<'static>> = phf_map! {
    b"true" => Value::Bool(true),
    b"false" => Value::Bool(false),
    b"null" => Value::Nil,
    b"nil" => Value::Nil,
    b"~" => Value::Nil,
};

/// A classified bare (unquoted) token.
///
/// The lifetime `'a` refers to the source buffer - bare strings are
/// zero-copy slices into the original input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// Nil value: `null`, `nil`, or `~`
    Nil,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// Integer: `42`, `0xFF`, `0o755`, `0b1010`, etc.
    Integer(i64),

    /// Float: `3.14`, `1.5e-3`, etc.
    Float(f64),

    /// Rational: `1/3r`, `22/7r`
    Rational { numerator: i64, denominator: i64 },

    /// Complex: `3+4i`, `5i`
    Complex { real: f64, imag: f64 },

    /// Anything else: an unquoted string
    Bare(&'a [u8]),
}

impl<'a> Value<'a> {
    /// Check if this is a nil value.
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Try to get as boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer.
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as string bytes.
    #[inline]
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Value::Bare(s) => Some(s),
            _ => None,
        }
    }

    /// Classify a bare token.
    ///
    /// Order: reserved keyword, then numeric literal, else bare string.
    /// - `true`/`false` → Bool
    /// - `null`/`nil`/`~` → Nil
    /// - Integer patterns (42, 0xFF, 0o755, 0b1010, 0d99) → Integer
    /// - Float patterns (3.14, 1.5e-3) → Float
    /// - Rational patterns (1/3r) → Rational
    /// - Complex patterns (3+4i, 5i) → Complex
    /// - Everything else → Bare
    pub fn parse(bytes: &'a [u8]) -> Value<'a> {
        if let Some(keyword) = KEYWORDS.get(bytes) {
            return *keyword;
        }

        if let Some(value) = Self::try_parse_number(bytes) {
            return value;
        }

        Value::Bare(bytes)
    }

    /// Lower to the typed event carrying this value.
    pub fn into_event(self, span: Span) -> Event<'a> {
        match self {
            Value::Nil => Event::Nil { span },
            Value::Bool(true) => Event::BoolTrue { span },
            Value::Bool(false) => Event::BoolFalse { span },
            Value::Integer(value) => Event::Integer { value, span },
            Value::Float(value) => Event::Float { value, span },
            Value::Rational { numerator, denominator } => {
                Event::Rational { numerator, denominator, span }
            }
            Value::Complex { real, imag } => Event::Complex { real, imag, span },
            Value::Bare(content) => Event::BareValue { content: Cow::Borrowed(content), span },
        }
    }

    /// Try to parse bytes as a numeric value.
    /// Returns None if not a valid number format.
    fn try_parse_number(bytes: &[u8]) -> Option<Value<'a>> {
        // Cheap reject: every numeric literal starts with a sign, digit or '.'
        match bytes.first()? {
            b'0'..=b'9' | b'+' | b'-' | b'.' => {}
            _ => return None,
        }

        // Complex number (ends with 'i')
        if bytes.last() == Some(&b'i') {
            return Self::try_parse_complex(bytes);
        }

        // Rational (ends with 'r' after a slash)
        if bytes.last() == Some(&b'r') && bytes.contains(&b'/') {
            return Self::try_parse_rational(bytes);
        }

        let (negative, rest) = split_sign(bytes);
        if rest.is_empty() {
            return None;
        }

        // Base prefixes
        if rest.len() >= 2 && rest[0] == b'0' {
            let radix = match rest[1] {
                b'x' | b'X' => Some(16),
                b'o' | b'O' => Some(8),
                b'b' | b'B' => Some(2),
                b'd' | b'D' => Some(10),
                _ => None,
            };
            if let Some(radix) = radix {
                let magnitude = parse_radix(&rest[2..], radix)?;
                return apply_sign(negative, magnitude).map(Value::Integer);
            }
        }

        // Decimal point or exponent makes it a float
        if rest.contains(&b'.') || rest.contains(&b'e') || rest.contains(&b'E') {
            let value = parse_float(rest)?;
            return Some(Value::Float(if negative { -value } else { value }));
        }

        let magnitude = parse_radix(rest, 10)?;
        apply_sign(negative, magnitude).map(Value::Integer)
    }

    fn try_parse_rational(bytes: &[u8]) -> Option<Value<'a>> {
        // Format: [numerator]/[denominator]r
        let without_r = &bytes[..bytes.len() - 1];
        let slash_pos = without_r.iter().position(|&b| b == b'/')?;

        let (negative, num_rest) = split_sign(&without_r[..slash_pos]);
        let numerator = apply_sign(negative, parse_radix(num_rest, 10)?)?;

        let denominator = i64::try_from(parse_radix(&without_r[slash_pos + 1..], 10)?).ok()?;
        if denominator == 0 {
            return None;
        }

        Some(Value::Rational { numerator, denominator })
    }

    fn try_parse_complex(bytes: &[u8]) -> Option<Value<'a>> {
        // Format: [real][+/-][imag]i or just [imag]i
        let without_i = &bytes[..bytes.len() - 1];

        // Find the last + or - that separates real and imaginary parts
        // (not at the start, and not inside an exponent)
        let split_pos = without_i
            .iter()
            .enumerate()
            .rev()
            .find(|&(i, &b)| {
                (b == b'+' || b == b'-') && i > 0 && !matches!(without_i[i - 1], b'e' | b'E')
            })
            .map(|(i, _)| i);

        match split_pos {
            Some(pos) => {
                let real = parse_signed_float(&without_i[..pos])?;
                let imag = parse_signed_float(&without_i[pos..])?;
                Some(Value::Complex { real, imag })
            }
            None => {
                let imag = parse_signed_float(without_i)?;
                Some(Value::Complex { real: 0.0, imag })
            }
        }
    }
}

fn split_sign(bytes: &[u8]) -> (bool, &[u8]) {
    match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    }
}

/// Digits in the given radix with `_` separators. The first byte must be
/// a digit so that `_` alone, or a bare prefix like `0x`, stays a string.
fn parse_radix(bytes: &[u8], radix: u32) -> Option<u64> {
    let first = *bytes.first()?;
    (first as char).to_digit(radix)?;

    let mut result: u64 = 0;
    for &b in bytes {
        if b == b'_' {
            continue;
        }
        let digit = (b as char).to_digit(radix)?;
        result = result.checked_mul(radix as u64)?.checked_add(digit as u64)?;
    }
    Some(result)
}

/// Apply a sign to a magnitude; `i64::MIN` is reachable, overflow is not.
fn apply_sign(negative: bool, magnitude: u64) -> Option<i64> {
    if negative {
        if magnitude == i64::MIN.unsigned_abs() {
            Some(i64::MIN)
        } else {
            i64::try_from(magnitude).ok().map(|v| -v)
        }
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// Unsigned decimal float. Only digits, `.`, `_`, exponent markers and
/// exponent signs are accepted so words like `inf` and `nan` stay strings.
fn parse_float(bytes: &[u8]) -> Option<f64> {
    if !bytes.iter().any(u8::is_ascii_digit) || bytes.first() == Some(&b'_') {
        return None;
    }
    let mut s = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-' => s.push(b as char),
            b'_' => {}
            _ => return None,
        }
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_signed_float(bytes: &[u8]) -> Option<f64> {
    let (negative, rest) = split_sign(bytes);
    let value = parse_float(rest)?;
    Some(if negative { -value } else { value })
}

/// Decode a quoted string body (without the quotes).
///
/// Escapes: `\\ \" \' \n \r \t \0 \u{hex}`. Unknown escapes, and `\u{..}`
/// that do not name a valid scalar value, are kept verbatim. Borrows when
/// there is nothing to decode.
pub fn unescape(raw: &[u8]) -> Cow<'_, [u8]> {
    let Some(first) = memchr::memchr(b'\\', raw) else {
        return Cow::Borrowed(raw);
    };

    let mut out = Vec::with_capacity(raw.len());
    out.extend_from_slice(&raw[..first]);
    let mut i = first;
    while i < raw.len() {
        let b = raw[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        let Some(&next) = raw.get(i + 1) else {
            out.push(b'\\');
            break;
        };
        let simple = match next {
            b'\\' => Some(b'\\'),
            b'"' => Some(b'"'),
            b'\'' => Some(b'\''),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            b'0' => Some(0),
            _ => None,
        };
        if let Some(decoded) = simple {
            out.push(decoded);
            i += 2;
            continue;
        }
        if next == b'u' {
            if let Some((ch, consumed)) = unicode_escape(&raw[i + 2..]) {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                i += 2 + consumed;
                continue;
            }
        }
        out.push(b'\\');
        out.push(next);
        i += 2;
    }
    Cow::Owned(out)
}

/// `{hex}` after `\u`: the char and the number of bytes consumed.
fn unicode_escape(bytes: &[u8]) -> Option<(char, usize)> {
    if bytes.first() != Some(&b'{') {
        return None;
    }
    let close = memchr::memchr(b'}', bytes)?;
    let hex = &bytes[1..close];
    if hex.is_empty() || hex.len() > 6 {
        return None;
    }
    let code = hex
        .iter()
        .try_fold(0u32, |acc, &b| Some(acc * 16 + (b as char).to_digit(16)?))?;
    Some((char::from_u32(code)?, close + 1))
}
