//! Identifier escaping for rendered names.
//!
//! Obfuscated assemblies routinely use names made of control characters, line breaks or
//! invisible Unicode formatting characters. Every identifier written by a renderer goes
//! through [`escape_identifier`], which replaces such characters with a visible `\uXXXX`
//! sequence. All other characters, including `\`, are copied unchanged, so the escaped form
//! only ever contains printable characters and escaping it again yields the same text.

use std::borrow::Cow;
use std::fmt::Write;

/// Returns true if `c` must be shown as an escape sequence
#[must_use]
pub fn needs_escape(c: char) -> bool {
    if c == ' ' {
        return false;
    }
    c.is_control() || c.is_whitespace() || is_invisible_format(c)
}

// Unicode `Cf` characters that render as nothing or reorder text
fn is_invisible_format(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{061C}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
    )
}

/// Escape an identifier for display
///
/// Characters outside the Basic Multilingual Plane are written as their UTF-16 surrogate
/// pair when escaped. Input without anything to escape is returned borrowed.
///
/// # Examples
///
/// ```rust
/// use dotscope_lang::escape::escape_identifier;
///
/// assert_eq!(escape_identifier("Main"), "Main");
/// assert_eq!(escape_identifier("a\u{0001}b"), "a\\u0001b");
/// assert_eq!(escape_identifier(&escape_identifier("a\u{0001}b")), "a\\u0001b");
/// ```
#[must_use]
pub fn escape_identifier(id: &str) -> Cow<'_, str> {
    if !id.chars().any(needs_escape) {
        return Cow::Borrowed(id);
    }

    let mut escaped = String::with_capacity(id.len() + 8);
    for c in id.chars() {
        if needs_escape(c) {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(escaped, "\\u{:04X}", unit);
            }
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}
