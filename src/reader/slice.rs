//! Zero-Copy Slice Reader
//!
//! Reads XML events from a byte slice. Names and undecoded content are
//! borrowed straight from the input.

use super::events::{EndElement, StartElement, XmlEvent};
use super::EventSource;
use crate::core::attributes::{parse_attributes, split_name, Attribute};
use crate::core::namespace::NamespaceScope;
use crate::core::tokenizer::{Token, TokenKind, Tokenizer};
use crate::error::ParseError;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Reading,
    /// Input exhausted or an error was reported
    Finished,
    Closed,
}

/// Zero-copy XML reader from a byte slice
pub struct SliceReader<'a> {
    input: &'a [u8],
    tokenizer: Tokenizer<'a>,
    strict: bool,
    state: ReaderState,
    namespaces: NamespaceScope,
    /// Names of the currently open elements
    open: Vec<&'a [u8]>,
    /// End event owed for an empty-element tag
    queued_end: Option<&'a [u8]>,
    /// Look-ahead filled by `has_next`
    peeked: Option<Result<XmlEvent<'a>, ParseError>>,
    seen_root: bool,
}

impl<'a> SliceReader<'a> {
    /// Create a new slice reader (lenient mode)
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_mode(input, false)
    }

    /// Create a new slice reader in strict mode
    pub fn new_strict(input: &'a [u8]) -> Self {
        Self::with_mode(input, true)
    }

    pub fn with_mode(input: &'a [u8], strict: bool) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new(input, strict),
            strict,
            state: ReaderState::Reading,
            namespaces: NamespaceScope::new(),
            open: Vec::new(),
            queued_end: None,
            peeked: None,
            seen_root: false,
        }
    }

    /// Current element depth
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state == ReaderState::Closed
    }

    /// Read the next event, tracking structure
    fn read_event(&mut self) -> Option<Result<XmlEvent<'a>, ParseError>> {
        if self.state != ReaderState::Reading {
            return None;
        }

        let result = self.read_event_inner();
        if !matches!(result, Some(Ok(_))) {
            self.state = ReaderState::Finished;
        }
        result
    }

    fn read_event_inner(&mut self) -> Option<Result<XmlEvent<'a>, ParseError>> {
        if let Some(name) = self.queued_end.take() {
            self.open.pop();
            self.namespaces.pop_scope();
            return Some(Ok(XmlEvent::EndElement(EndElement::new(name))));
        }

        loop {
            let token = match self.tokenizer.next_token() {
                Ok(Some(token)) => token,
                Ok(None) => return self.finish(),
                Err(err) => return Some(Err(err)),
            };

            match token.kind {
                TokenKind::StartTag | TokenKind::EmptyTag => return Some(self.start_element(&token)),

                TokenKind::EndTag => return Some(self.end_element(&token)),

                TokenKind::Text => {
                    let content = token.content.unwrap_or_default();
                    if self.open.is_empty() {
                        // Whitespace around the root element is not content
                        if content.iter().all(|b| b.is_ascii_whitespace()) {
                            continue;
                        }
                        return Some(Err(ParseError::new("Text content outside the root element", token.span.0)));
                    }
                    return Some(Ok(XmlEvent::Text(content)));
                }

                TokenKind::CData => return Some(Ok(XmlEvent::CData(token.content.unwrap_or_default()))),

                TokenKind::Comment => return Some(Ok(XmlEvent::Comment(token.content.unwrap_or_default()))),

                TokenKind::ProcessingInstruction => {
                    let data = token.content.filter(|c| !c.is_empty());
                    let target = Cow::Borrowed(token.name.unwrap_or_default());
                    return Some(Ok(XmlEvent::ProcessingInstruction { target, data }));
                }

                TokenKind::XmlDeclaration => return Some(self.declaration(&token)),

                TokenKind::DocType => return Some(Ok(XmlEvent::DocType(token.content.unwrap_or_default()))),
            }
        }
    }

    fn finish(&mut self) -> Option<Result<XmlEvent<'a>, ParseError>> {
        let position = self.tokenizer.position();
        if let Some(name) = self.open.last() {
            let message = format!("Unclosed element <{}>", String::from_utf8_lossy(name));
            return Some(Err(ParseError::new(message, position)));
        }
        if !self.seen_root {
            return Some(Err(ParseError::new("Document has no root element", position)));
        }
        None
    }

    fn start_element(&mut self, token: &Token<'a>) -> Result<XmlEvent<'a>, ParseError> {
        let start = token.span.0;
        let name = token.name.unwrap_or_default();

        if self.open.is_empty() && self.seen_root && self.strict {
            return Err(ParseError::new("Document has more than one root element", start));
        }

        let attributes = self.tag_attributes(token, name)?;

        self.namespaces.push_scope(&attributes);
        let prefix = split_name(name).0;
        let namespace = self.namespaces.resolve(prefix).map(|uri| Cow::Owned(uri.to_vec()));
        if let (Some(prefix), None, true) = (prefix, &namespace, self.strict) {
            let message = format!("Unbound namespace prefix '{}'", String::from_utf8_lossy(prefix));
            return Err(ParseError::new(message, start));
        }

        self.seen_root = true;
        self.open.push(name);
        if token.kind == TokenKind::EmptyTag {
            self.queued_end = Some(name);
        }

        Ok(XmlEvent::StartElement(StartElement {
            name: Cow::Borrowed(name),
            namespace,
            attributes,
        }))
    }

    fn end_element(&mut self, token: &Token<'a>) -> Result<XmlEvent<'a>, ParseError> {
        let name = token.name.unwrap_or_default();

        match self.open.last() {
            Some(&open) if open == name => {
                self.open.pop();
                self.namespaces.pop_scope();
                Ok(XmlEvent::EndElement(EndElement::new(name)))
            }
            Some(&open) => {
                let message = format!(
                    "Mismatched end tag: expected </{}>, found </{}>",
                    String::from_utf8_lossy(open),
                    String::from_utf8_lossy(name)
                );
                Err(ParseError::new(message, token.span.0))
            }
            None => {
                let message = format!("Unexpected end tag </{}>", String::from_utf8_lossy(name));
                Err(ParseError::new(message, token.span.0))
            }
        }
    }

    fn declaration(&mut self, token: &Token<'a>) -> Result<XmlEvent<'a>, ParseError> {
        if self.strict && token.span.0 != 0 {
            return Err(ParseError::new("XML declaration must be at the very start of the document", token.span.0));
        }

        let content: &'a [u8] = match token.content {
            Some(Cow::Borrowed(content)) => content,
            _ => b"",
        };
        let attrs = parse_attributes(content, self.strict).map_err(|msg| ParseError::new(msg, token.span.0))?;
        let find = |name: &[u8]| attrs.iter().find(|a| a.name.as_ref() == name).map(|a| a.value.clone());

        Ok(XmlEvent::XmlDeclaration {
            version: find(&b"version"[..]).unwrap_or(Cow::Borrowed(&b"1.0"[..])),
            encoding: find(&b"encoding"[..]),
            standalone: find(&b"standalone"[..]).map(|v| v.as_ref() == b"yes"),
        })
    }

    /// Parse attributes from a tag token
    fn tag_attributes(&self, token: &Token<'a>, name: &[u8]) -> Result<Vec<Attribute<'a>>, ParseError> {
        let (start, end) = token.span;
        let tag: &'a [u8] = &self.input[start..end];

        // Between '<name' and '>' or '/>'
        let attr_start = 1 + name.len();
        let attr_end = if token.kind == TokenKind::EmptyTag { tag.len() - 2 } else { tag.len() - 1 };
        if attr_start >= attr_end {
            return Ok(Vec::new());
        }

        parse_attributes(&tag[attr_start..attr_end], self.strict).map_err(|msg| ParseError::new(msg, start))
    }
}

impl<'a> EventSource<'a> for SliceReader<'a> {
    fn has_next(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.read_event();
        }
        self.peeked.is_some()
    }

    fn next_event(&mut self) -> Result<XmlEvent<'a>, ParseError> {
        match self.peeked.take().or_else(|| self.read_event()) {
            Some(result) => result,
            None => Err(ParseError::new("No more events", self.tokenizer.position())),
        }
    }

    fn close(&mut self) -> Result<(), ParseError> {
        self.state = ReaderState::Closed;
        self.peeked = None;
        self.queued_end = None;
        Ok(())
    }
}

impl<'a> Iterator for SliceReader<'a> {
    type Item = Result<XmlEvent<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.next_event())
        } else {
            None
        }
    }
}

/// Parse XML from a byte slice and return all events
pub fn parse_events(input: &[u8]) -> Result<Vec<XmlEvent<'_>>, ParseError> {
    SliceReader::new(input).collect()
}
