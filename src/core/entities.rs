//! XML Entity Decoding and Escaping
//!
//! Decoding handles the built-in entities (&lt; &gt; &amp; &quot; &apos;) and
//! numeric character references (&#123; &#x7B;). Escaping is the writer-side
//! inverse. Both return Cow so untouched content is never copied.

use super::scanner::{is_name_char, is_name_start_char};
use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
/// A bare `&` that does not start a reference is kept as-is. References that
/// name an undeclared entity or an invalid XML character are errors.
#[inline]
pub fn decode_text(input: &[u8]) -> Result<Cow<'_, [u8]>, &'static str> {
    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    decode_entities(input, false).map(Cow::Owned)
}

/// Decode text content in strict mode
/// Same as `decode_text`, but a bare `&` is an error too
pub fn decode_text_strict(input: &[u8]) -> Result<Cow<'_, [u8]>, &'static str> {
    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    decode_entities(input, true).map(Cow::Owned)
}

fn decode_entities(input: &[u8], strict: bool) -> Result<Vec<u8>, &'static str> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp_offset) = memchr(b'&', &input[pos..]) {
        result.extend_from_slice(&input[pos..pos + amp_offset]);
        pos += amp_offset;

        let decoded = memchr(b';', &input[pos..])
            .and_then(|semi_offset| decode_entity(&input[pos + 1..pos + semi_offset]).map(|c| (c, semi_offset)));

        match decoded {
            Some((Ok(c), semi_offset)) => {
                let mut buf = [0u8; 4];
                result.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                pos += semi_offset + 1;
            }
            Some((Err(msg), _)) => return Err(msg),
            None => {
                if is_entity_reference(&input[pos + 1..]) {
                    return Err("Undeclared entity reference");
                }
                if strict {
                    return Err("Bare '&' must start an entity reference");
                }
                result.push(b'&');
                pos += 1;
            }
        }
    }

    result.extend_from_slice(&input[pos..]);
    Ok(result)
}

/// Check for `name;` following an ampersand
fn is_entity_reference(after_amp: &[u8]) -> bool {
    match after_amp.split_first() {
        Some((&first, rest)) if is_name_start_char(first) => rest
            .iter()
            .position(|&b| !is_name_char(b))
            .is_some_and(|end| rest[end] == b';'),
        _ => false,
    }
}

/// Decode a single entity (without & and ;)
///
/// `None` means the name is not one of the five predefined entities.
fn decode_entity(entity: &[u8]) -> Option<Result<char, &'static str>> {
    if let Some(numeric) = entity.strip_prefix(b"#") {
        return Some(decode_numeric_entity(numeric).ok_or("Invalid character reference"));
    }

    let c = match entity {
        b"lt" => '<',
        b"gt" => '>',
        b"amp" => '&',
        b"quot" => '"',
        b"apos" => '\'',
        _ => return None,
    };
    Some(Ok(c))
}

/// Decode a numeric character reference (the part after '#')
fn decode_numeric_entity(entity: &[u8]) -> Option<char> {
    let digits = std::str::from_utf8(entity).ok()?;
    let codepoint = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };

    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Escape character data for output (`<`, `>`, `&`)
pub fn escape_text(input: &[u8]) -> Cow<'_, [u8]> {
    if memchr3(b'<', b'>', b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(escape_with(input, false))
}

/// Escape an attribute value for output in double quotes
///
/// Tab, newline and carriage return become character references so a reader's
/// attribute value normalisation leaves them intact.
pub fn escape_attribute(input: &[u8]) -> Cow<'_, [u8]> {
    if !input.iter().any(|b| matches!(b, b'<' | b'>' | b'&' | b'"' | b'\t' | b'\n' | b'\r')) {
        return Cow::Borrowed(input);
    }
    Cow::Owned(escape_with(input, true))
}

fn escape_with(input: &[u8], quotes: bool) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len() + 16);
    for &b in input {
        match b {
            b'<' => result.extend_from_slice(b"&lt;"),
            b'>' => result.extend_from_slice(b"&gt;"),
            b'&' => result.extend_from_slice(b"&amp;"),
            b'"' if quotes => result.extend_from_slice(b"&quot;"),
            b'\t' if quotes => result.extend_from_slice(b"&#9;"),
            b'\n' if quotes => result.extend_from_slice(b"&#10;"),
            b'\r' if quotes => result.extend_from_slice(b"&#13;"),
            _ => result.push(b),
        }
    }
    result
}
