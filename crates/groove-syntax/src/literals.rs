//! Literal token scanning.
//!
//! The analysis re-scans raw literal token text (delimiters included) for
//! escape-sequence validity and terminator integrity, and parses numeric
//! literal values. Errors carry a byte range within the token text, not file
//! offsets; callers rebase onto the token's span.

use std::ops::Range;

/// The quote style of a Groovy string token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    /// `'...'`
    Single,
    /// `"..."`, interpolation-capable
    Double,
    /// `'''...'''`
    TripleSingle,
    /// `"""..."""`
    TripleDouble,
    /// `/.../`
    Slashy,
    /// `$/.../$`
    DollarSlashy,
}

impl StringKind {
    #[must_use]
    pub const fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            StringKind::Single => ("'", "'"),
            StringKind::Double => ("\"", "\""),
            StringKind::TripleSingle => ("'''", "'''"),
            StringKind::TripleDouble => ("\"\"\"", "\"\"\""),
            StringKind::Slashy => ("/", "/"),
            StringKind::DollarSlashy => ("$/", "/$"),
        }
    }

    #[must_use]
    pub const fn allows_line_terminators(self) -> bool {
        matches!(
            self,
            StringKind::TripleSingle
                | StringKind::TripleDouble
                | StringKind::Slashy
                | StringKind::DollarSlashy
        )
    }

    /// Whether `\x` escape sequences are processed inside the body.
    #[must_use]
    pub const fn processes_backslash_escapes(self) -> bool {
        !matches!(self, StringKind::Slashy | StringKind::DollarSlashy)
    }

    #[must_use]
    pub const fn is_interpolated(self) -> bool {
        matches!(
            self,
            StringKind::Double | StringKind::TripleDouble | StringKind::Slashy | StringKind::DollarSlashy
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LiteralError {
    pub message: String,
    /// Byte range within the provided literal text (not file offsets).
    pub span: Range<usize>,
}

fn err(message: impl Into<String>, span: Range<usize>) -> LiteralError {
    LiteralError {
        message: message.into(),
        span,
    }
}

/// Validate a raw string token: delimiters present and matching, body escapes
/// well formed. Reports the first offending byte, or the end of the token for
/// termination problems.
pub fn scan_string_literal(kind: StringKind, text: &str) -> Result<(), LiteralError> {
    let (open, close) = kind.delimiters();
    let bytes = text.as_bytes();

    if !text.starts_with(open) {
        return Err(err("Missing opening quote", 0..open.len().min(text.len())));
    }
    if text.len() < open.len() + close.len() || !text.ends_with(close) {
        return Err(err("String literal is not terminated", text.len()..text.len()));
    }

    let body_start = open.len();
    let body_end = text.len() - close.len();

    match kind {
        StringKind::DollarSlashy => scan_dollar_slashy_body(bytes, body_start, body_end),
        StringKind::Slashy => scan_slashy_body(bytes, body_start, body_end),
        _ => scan_escaped_body(kind, bytes, body_start, body_end),
    }
}

fn scan_escaped_body(
    kind: StringKind,
    bytes: &[u8],
    start: usize,
    end: usize,
) -> Result<(), LiteralError> {
    let mut idx = start;
    while idx < end {
        match bytes[idx] {
            b'\\' => {
                if idx + 1 >= end {
                    // The backslash would escape the closing quote.
                    return Err(err("String literal is not terminated", idx..end));
                }
                idx = scan_escape(bytes, idx, end, kind.allows_line_terminators())?;
            }
            b'\n' | b'\r' if !kind.allows_line_terminators() => {
                return Err(err(
                    "Line terminator is not allowed in single-line string literal",
                    idx..idx + 1,
                ));
            }
            _ => idx += 1,
        }
    }
    Ok(())
}

fn scan_escape(
    bytes: &[u8],
    idx: usize,
    end: usize,
    allow_line_continuation: bool,
) -> Result<usize, LiteralError> {
    debug_assert_eq!(bytes[idx], b'\\');
    let next = bytes[idx + 1];

    if allow_line_continuation && matches!(next, b'\n' | b'\r') {
        let mut new_idx = idx + 2;
        if next == b'\r' && new_idx < end && bytes[new_idx] == b'\n' {
            new_idx += 1;
        }
        return Ok(new_idx);
    }

    match next {
        b'b' | b't' | b'n' | b'f' | b'r' | b'\\' | b'\'' | b'"' | b'$' => Ok(idx + 2),
        b'u' => {
            let mut j = idx + 2;
            // javac-style: any number of `u`s before the four hex digits.
            while j < end && bytes[j] == b'u' {
                j += 1;
            }
            if j + 4 > end {
                return Err(err("Incomplete unicode escape", idx..end));
            }
            for k in 0..4 {
                let b = bytes[j + k];
                if !b.is_ascii_hexdigit() {
                    return Err(err(
                        format!("Invalid hex digit `{}` in unicode escape", b as char),
                        j + k..j + k + 1,
                    ));
                }
            }
            Ok(j + 4)
        }
        _ => Err(err(
            format!("Unknown escape sequence `\\{}`", next as char),
            idx..idx + 2,
        )),
    }
}

fn scan_slashy_body(bytes: &[u8], start: usize, end: usize) -> Result<(), LiteralError> {
    if start >= end {
        // `//` lexes as a comment, never an empty slashy string.
        return Err(err("Empty slashy string", 0..end.min(bytes.len())));
    }
    let mut idx = start;
    while idx < end {
        if bytes[idx] == b'\\' {
            // Only `\/` and unicode escapes are escapes in slashy strings; a
            // backslash before anything else is a literal backslash.
            if idx + 1 < end && bytes[idx + 1] == b'/' {
                idx += 2;
                continue;
            }
            if idx + 1 >= end {
                return Err(err("String literal is not terminated", idx..end));
            }
        }
        idx += 1;
    }
    Ok(())
}

fn scan_dollar_slashy_body(bytes: &[u8], start: usize, end: usize) -> Result<(), LiteralError> {
    let mut idx = start;
    while idx < end {
        if bytes[idx] == b'$' && idx + 1 < end && matches!(bytes[idx + 1], b'$' | b'/') {
            idx += 2;
        } else {
            idx += 1;
        }
    }
    Ok(())
}

/// Process backslash escapes of a validated single/double/triple-quoted
/// token, returning the cooked body. Interpolation holes are left verbatim.
pub fn unescape_string_literal(kind: StringKind, text: &str) -> Result<String, LiteralError> {
    scan_string_literal(kind, text)?;
    let (open, close) = kind.delimiters();
    let body = &text[open.len()..text.len() - close.len()];

    if !kind.processes_backslash_escapes() {
        return Ok(body.to_string());
    }

    let bytes = text.as_bytes();
    let start = open.len();
    let end = text.len() - close.len();
    let mut out = String::with_capacity(body.len());
    let mut idx = start;

    while idx < end {
        let b = bytes[idx];
        if b != b'\\' {
            if b < 0x80 {
                out.push(b as char);
                idx += 1;
            } else {
                let ch = text[idx..end].chars().next().unwrap_or('\u{FFFD}');
                out.push(ch);
                idx += ch.len_utf8();
            }
            continue;
        }

        let next = bytes[idx + 1];
        if kind.allows_line_terminators() && matches!(next, b'\n' | b'\r') {
            idx += 2;
            if next == b'\r' && idx < end && bytes[idx] == b'\n' {
                idx += 1;
            }
            continue;
        }

        match next {
            b'b' => out.push('\u{0008}'),
            b't' => out.push('\t'),
            b'n' => out.push('\n'),
            b'f' => out.push('\u{000C}'),
            b'r' => out.push('\r'),
            b'\\' => out.push('\\'),
            b'\'' => out.push('\''),
            b'"' => out.push('"'),
            b'$' => out.push('$'),
            b'u' => {
                let mut j = idx + 2;
                while j < end && bytes[j] == b'u' {
                    j += 1;
                }
                let mut value: u32 = 0;
                for k in 0..4 {
                    let digit = (bytes[j + k] as char).to_digit(16).unwrap_or(0);
                    value = (value << 4) | digit;
                }
                let ch = char::from_u32(value)
                    .ok_or_else(|| err("Unicode escape is not a valid scalar value", idx..j + 4))?;
                out.push(ch);
                idx = j + 4;
                continue;
            }
            _ => unreachable!("scan validated the escape"),
        }
        idx += 2;
    }

    Ok(out)
}

/// Parse a Groovy `int` literal (optional `i`/`I` suffix, underscores, and
/// `0x`/`0b`/leading-zero octal prefixes). Hex/binary/octal use two's
/// complement reinterpretation like Java.
pub fn parse_int_literal(text: &str) -> Result<i32, LiteralError> {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return Err(err("Empty int literal", 0..0));
    }

    let mut end = bytes.len();
    let last = bytes[end - 1];
    if matches!(last, b'i' | b'I') {
        end -= 1;
    } else if matches!(last, b'l' | b'L' | b'g' | b'G') {
        return Err(err(
            format!("Int literal must not have `{}` suffix", last as char),
            end - 1..end,
        ));
    }

    let (base, prefix_len, is_decimal) = integer_base(bytes, end)?;
    let limit = if is_decimal {
        i32::MAX as u64
    } else {
        u32::MAX as u64
    };

    let value = parse_unsigned_integer(bytes, prefix_len, end, base, limit)?;
    if is_decimal {
        Ok(value as i32)
    } else {
        Ok(value as u32 as i32)
    }
}

/// Parse a Groovy `long` literal; the `l`/`L` suffix is required.
pub fn parse_long_literal(text: &str) -> Result<i64, LiteralError> {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return Err(err("Empty long literal", 0..0));
    }

    let suffix_pos = bytes.len() - 1;
    if !matches!(bytes[suffix_pos], b'l' | b'L') {
        return Err(err(
            "Long literal is missing `L` suffix",
            suffix_pos..suffix_pos + 1,
        ));
    }
    if suffix_pos == 0 {
        return Err(err("Long literal is missing digits", 0..text.len()));
    }
    if bytes[suffix_pos - 1] == b'_' {
        return Err(err(
            "Underscore is not allowed immediately before long suffix",
            suffix_pos - 1..suffix_pos,
        ));
    }

    let end = suffix_pos;
    let (base, prefix_len, is_decimal) = integer_base(bytes, end)?;
    let limit = if is_decimal { i64::MAX as u64 } else { u64::MAX };

    let value = parse_unsigned_integer(bytes, prefix_len, end, base, limit)?;
    Ok(value as i64)
}

/// Parse a Groovy `BigInteger` literal; the `g`/`G` suffix is required.
/// Returns the sanitized digit text (prefix preserved, underscores removed).
pub fn parse_big_integer_literal(text: &str) -> Result<String, LiteralError> {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return Err(err("Empty BigInteger literal", 0..0));
    }

    let suffix_pos = bytes.len() - 1;
    if !matches!(bytes[suffix_pos], b'g' | b'G') {
        return Err(err(
            "BigInteger literal is missing `G` suffix",
            suffix_pos..suffix_pos + 1,
        ));
    }
    if suffix_pos == 0 {
        return Err(err("BigInteger literal is missing digits", 0..text.len()));
    }

    let end = suffix_pos;
    let (base, prefix_len, _) = integer_base(bytes, end)?;
    // No magnitude limit; digits still have to be valid for the base.
    parse_unsigned_digits_only(bytes, prefix_len, end, base)?;

    let sanitized: String = text[..end].chars().filter(|&ch| ch != '_').collect();
    Ok(sanitized)
}

fn integer_base(bytes: &[u8], end: usize) -> Result<(u32, usize, bool), LiteralError> {
    if end == 0 {
        return Err(err("Empty integer literal", 0..0));
    }

    if bytes[0] != b'0' {
        return Ok((10, 0, true));
    }

    if end >= 2 {
        match bytes[1] {
            b'x' | b'X' => return Ok((16, 2, false)),
            b'b' | b'B' => return Ok((2, 2, false)),
            _ => {}
        }
    }

    if end > 1 {
        // Leading zero with more digits: octal.
        return Ok((8, 1, false));
    }

    Ok((10, 0, true))
}

fn digit_value(b: u8, base: u32, idx: usize) -> Result<u64, LiteralError> {
    let value = match b {
        b'0'..=b'9' => (b - b'0') as u64,
        b'a'..=b'f' => (b - b'a' + 10) as u64,
        b'A'..=b'F' => (b - b'A' + 10) as u64,
        _ => u64::MAX,
    };
    if value >= base as u64 {
        let base_name = match base {
            2 => "binary",
            8 => "octal",
            10 => "decimal",
            _ => "hexadecimal",
        };
        return Err(err(
            format!("Invalid digit `{}` in {base_name} literal", b as char),
            idx..idx + 1,
        ));
    }
    Ok(value)
}

fn parse_unsigned_integer(
    bytes: &[u8],
    prefix_len: usize,
    end: usize,
    base: u32,
    limit: u64,
) -> Result<u64, LiteralError> {
    check_digit_run(bytes, prefix_len, end)?;

    let mut value: u64 = 0;
    for (idx, &b) in bytes[..end].iter().enumerate().skip(prefix_len) {
        if b == b'_' {
            continue;
        }
        let digit = digit_value(b, base, idx)?;
        value = value
            .checked_mul(base as u64)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| err("Integer literal is too large", 0..end))?;
        if value > limit {
            return Err(err("Integer literal is out of range", 0..end));
        }
    }
    Ok(value)
}

fn parse_unsigned_digits_only(
    bytes: &[u8],
    prefix_len: usize,
    end: usize,
    base: u32,
) -> Result<(), LiteralError> {
    check_digit_run(bytes, prefix_len, end)?;
    for (idx, &b) in bytes[..end].iter().enumerate().skip(prefix_len) {
        if b == b'_' {
            continue;
        }
        digit_value(b, base, idx)?;
    }
    Ok(())
}

fn check_digit_run(bytes: &[u8], prefix_len: usize, end: usize) -> Result<(), LiteralError> {
    if end == 0 || prefix_len >= end {
        return Err(err("Missing digits", prefix_len..prefix_len));
    }
    if bytes[end - 1] == b'_' {
        return Err(err(
            "Trailing underscore is not allowed in numeric literal",
            end - 1..end,
        ));
    }
    if prefix_len > 0 && bytes[prefix_len] == b'_' {
        return Err(err(
            "Underscore is not allowed immediately after base prefix",
            prefix_len..prefix_len + 1,
        ));
    }
    let mut seen_digit = false;
    for &b in &bytes[prefix_len..end] {
        if b != b'_' {
            seen_digit = true;
            break;
        }
    }
    if !seen_digit {
        return Err(err("Missing digits", prefix_len..end));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn int_literals_decimal_and_hex_twos_complement() {
        assert_eq!(parse_int_literal("2147483647").unwrap(), 2147483647);
        assert!(parse_int_literal("2147483648").is_err());
        assert_eq!(parse_int_literal("0xFFFF_FFFF").unwrap(), -1);
        assert_eq!(parse_int_literal("42i").unwrap(), 42);
        assert!(parse_int_literal("42L").is_err());
    }

    #[test]
    fn long_and_big_integer_suffixes() {
        assert_eq!(parse_long_literal("9223372036854775807L").unwrap(), i64::MAX);
        assert!(parse_long_literal("1_000").is_err());
        assert_eq!(
            parse_big_integer_literal("1_000_000G").unwrap(),
            "1000000"
        );
        assert!(parse_big_integer_literal("0xZZG").is_err());
    }

    #[test]
    fn valid_escapes_scan_clean() {
        assert!(scan_string_literal(StringKind::Single, "'a\\tb'").is_ok());
        assert!(scan_string_literal(StringKind::Double, "\"a\\$b\"").is_ok());
        assert!(scan_string_literal(StringKind::Double, "\"\\u0041\"").is_ok());
        assert!(scan_string_literal(StringKind::TripleSingle, "'''line\nline'''").is_ok());
    }

    #[test]
    fn bad_escape_positions_at_first_offender() {
        let e = scan_string_literal(StringKind::Double, "\"a\\qb\"").unwrap_err();
        assert_eq!(e.span, 2..4);
        assert_eq!(e.message, "Unknown escape sequence `\\q`");

        let e = scan_string_literal(StringKind::Double, "\"\\u00G1\"").unwrap_err();
        assert_eq!(e.span, 5..6);
    }

    #[test]
    fn unterminated_positions_at_token_end() {
        let e = scan_string_literal(StringKind::Single, "'abc").unwrap_err();
        assert_eq!(e.span, 4..4);

        // A trailing backslash would escape the closing quote.
        let e = scan_string_literal(StringKind::Double, "\"abc\\\"").unwrap_err();
        assert_eq!(e.message, "String literal is not terminated");
    }

    #[test]
    fn newline_rejected_in_single_line_kinds() {
        let e = scan_string_literal(StringKind::Double, "\"a\nb\"").unwrap_err();
        assert_eq!(e.span, 2..3);
    }

    #[test]
    fn slashy_only_escapes_the_delimiter() {
        assert!(scan_string_literal(StringKind::Slashy, "/a\\d+\\/b/").is_ok());
        assert!(scan_string_literal(StringKind::DollarSlashy, "$/a $$ b /$").is_ok());
    }

    #[test]
    fn unescape_cooks_body() {
        assert_eq!(
            unescape_string_literal(StringKind::Single, "'a\\tb'").unwrap(),
            "a\tb"
        );
        assert_eq!(
            unescape_string_literal(StringKind::Double, "\"\\u0041\\$x\"").unwrap(),
            "A$x"
        );
        assert_eq!(
            unescape_string_literal(StringKind::Slashy, "/a\\d/").unwrap(),
            "a\\d"
        );
    }
}
