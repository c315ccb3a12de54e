//! XML Attribute Parsing
//!
//! Parses XML attributes from tag content.

use super::entities::{decode_text, decode_text_strict};
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use memchr::memchr;
use std::borrow::Cow;

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name (may include namespace prefix)
    pub name: Cow<'a, [u8]>,
    /// Attribute value (entities decoded)
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: impl Into<Cow<'a, [u8]>>, value: impl Into<Cow<'a, [u8]>>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Get the name as a string
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    /// Get the value as a string
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }

    /// Local name (after colon, if namespaced)
    pub fn local_name(&self) -> &[u8] {
        split_name(&self.name).1
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&[u8]> {
        split_name(&self.name).0
    }

    /// The prefix this attribute binds if it is a namespace declaration.
    /// The default namespace (`xmlns="..."`) binds the empty prefix.
    pub fn declared_prefix(&self) -> Option<&[u8]> {
        match split_name(&self.name) {
            (None, b"xmlns") => Some(b""),
            (Some(b"xmlns"), local) => Some(local),
            _ => None,
        }
    }

    pub fn into_owned(self) -> Attribute<'static> {
        Attribute {
            name: Cow::Owned(self.name.into_owned()),
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

/// Split a name into prefix and local name at the colon
pub fn split_name(name: &[u8]) -> (Option<&[u8]>, &[u8]) {
    if let Some(colon_pos) = memchr(b':', name) {
        (Some(&name[..colon_pos]), &name[colon_pos + 1..])
    } else {
        (None, name)
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between element name and '>' or '/>'.
/// Lenient mode skips junk and accepts unquoted or valueless attributes;
/// strict mode reports the first problem instead.
pub fn parse_attributes(input: &[u8], strict: bool) -> Result<Vec<Attribute<'_>>, &'static str> {
    let mut attrs = Vec::new();
    let mut pos = 0;

    loop {
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= input.len() || input[pos] == b'/' || input[pos] == b'>' {
            break;
        }

        let name_start = pos;
        if !is_name_start_char(input[pos]) {
            if strict {
                return Err("Attribute name must start with letter, underscore, or colon");
            }
            pos += 1;
            continue;
        }
        while pos < input.len() && is_name_char(input[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        if pos >= input.len() || input[pos] != b'=' {
            if strict {
                return Err("Attribute value required");
            }
            // Attribute without value (like HTML boolean attributes)
            attrs.push(Attribute::new(name, &b""[..]));
            continue;
        }
        pos += 1; // Skip '='

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= input.len() {
            if strict {
                return Err("Attribute value required");
            }
            break;
        }

        let quote = input[pos];
        if quote != b'"' && quote != b'\'' {
            if strict {
                return Err("Attribute value must be quoted");
            }
            let value_start = pos;
            while pos < input.len() && !is_whitespace(input[pos]) && input[pos] != b'/' && input[pos] != b'>' {
                pos += 1;
            }
            attrs.push(Attribute::new(name, decode_text(&input[value_start..pos])?));
            continue;
        }

        pos += 1; // Skip opening quote
        let value_start = pos;
        let value_end = match memchr(quote, &input[pos..]) {
            Some(offset) => pos + offset,
            None if strict => return Err("Attribute value has mismatched quotes"),
            None => input.len(),
        };
        let raw = &input[value_start..value_end];

        let value = if strict {
            if memchr(b'<', raw).is_some() {
                return Err("Attribute value cannot contain '<'");
            }
            decode_text_strict(raw)?
        } else {
            decode_text(raw)?
        };

        if strict && attrs.iter().any(|a: &Attribute<'_>| a.name.as_ref() == name) {
            return Err("Duplicate attribute");
        }
        attrs.push(Attribute::new(name, value));
        pos = (value_end + 1).min(input.len());
    }

    Ok(attrs)
}
