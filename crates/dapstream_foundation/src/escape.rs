//! Escaping rules for identifiers, attributes, and XML text.
//!
//! Identifiers printed in declaration text are percent-escaped with
//! [`id_to_www`] and unescaped with [`www_to_id`] when read back.
//! Text values are escaped with [`escape_attr`] before being quoted.

use std::fmt::Write as _;

/// Characters allowed verbatim in an identifier.
const ID_SAFE: &[u8] = b"-+_/.\\*";

/// Returns true if `b` may appear unescaped in an identifier.
fn is_id_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || ID_SAFE.contains(&b)
}

/// Percent-escapes every byte outside the identifier safe set.
///
/// Escapes use two lowercase hex digits (`%20` for a space).
#[must_use]
pub fn id_to_www(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for &b in id.as_bytes() {
        if is_id_safe(b) {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02x}");
        }
    }
    out
}

/// Reverses [`id_to_www`].
///
/// A `%` not followed by two hex digits is kept verbatim.
#[must_use]
pub fn www_to_id(text: &str) -> String {
    www_to_id_except(text, None)
}

/// Reverses [`id_to_www`], leaving one escape code (e.g. `"%20"`) untouched.
#[must_use]
pub fn www_to_id_except(text: &str, except: Option<&str>) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let code = &text[i..i + 3];
            if except.is_some_and(|e| e.eq_ignore_ascii_case(code)) {
                out.extend_from_slice(code.as_bytes());
            } else {
                out.push(hex_value(bytes[i + 1]) * 16 + hex_value(bytes[i + 2]));
            }
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Value of one ASCII hex digit.
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

/// Replaces every `%xx` escape with an underscore.
#[must_use]
pub fn escape_to_underscore(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            out.push('_');
            i += 3;
        } else {
            let ch = text[i..].chars().next().unwrap_or('\u{fffd}');
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

/// Escapes text for inclusion between double quotes.
///
/// Backslashes are doubled, quotes are backslash-escaped, and bytes
/// outside printable ASCII become `\ooo` octal escapes.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for &b in text.as_bytes() {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b' '..=b'~' => out.push(char::from(b)),
            _ => {
                let _ = write!(out, "\\{b:03o}");
            }
        }
    }
    out
}

/// Reverses [`escape_attr`].
#[must_use]
pub fn unescape_attr(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            match bytes[i + 1] {
                b'\\' => {
                    out.push(b'\\');
                    i += 2;
                    continue;
                }
                b'"' => {
                    out.push(b'"');
                    i += 2;
                    continue;
                }
                b'0'..=b'3' if i + 3 < bytes.len() => {
                    let digits = &bytes[i + 1..i + 4];
                    if digits[1..].iter().all(|d| (b'0'..=b'7').contains(d)) {
                        let value = digits
                            .iter()
                            .fold(0u16, |acc, d| acc * 8 + u16::from(d - b'0'));
                        out.push(u8::try_from(value).unwrap_or(b'?'));
                        i += 4;
                        continue;
                    }
                }
                _ => {}
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Replaces the XML special characters with entities.
#[must_use]
pub fn id_to_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '>' => out.push_str("&gt;"),
            '<' => out.push_str("&lt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`id_to_xml`].
#[must_use]
pub fn xml_to_id(text: &str) -> String {
    const ENTITIES: [(&str, char); 5] = [
        ("&gt;", '>'),
        ("&lt;", '<'),
        ("&amp;", '&'),
        ("&apos;", '\''),
        ("&quot;", '"'),
    ];
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while let Some(c) = rest.chars().next() {
        if c == '&' {
            for (entity, ch) in ENTITIES {
                if let Some(tail) = rest.strip_prefix(entity) {
                    out.push(ch);
                    rest = tail;
                    continue 'outer;
                }
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Quotes an error message for transmission, escaping embedded quotes.
#[must_use]
pub fn munge_error_message(message: &str) -> String {
    let trimmed = message
        .strip_prefix('"')
        .and_then(|m| m.strip_suffix('"'))
        .unwrap_or(message);
    let mut out = String::with_capacity(trimmed.len() + 2);
    out.push('"');
    let mut prev = '\0';
    for c in trimmed.chars() {
        if c == '"' && prev != '\\' {
            out.push('\\');
        }
        out.push(c);
        prev = c;
    }
    out.push('"');
    out
}
