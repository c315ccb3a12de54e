//! XML Tokenizer - State machine for XML token extraction
//!
//! Pull-style tokenizer over a UTF-8 buffer. Extracts:
//! - Element start/end/empty tags
//! - Text content (entities decoded)
//! - CDATA sections
//! - Comments
//! - Processing instructions and the XML declaration
//! - DOCTYPE declarations
//!
//! Unterminated or unreadable markup is always an error; strict mode adds
//! content checks on top.

use super::entities::{decode_text, decode_text_strict};
use super::scanner::Scanner;
use crate::error::ParseError;
use std::borrow::Cow;

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// End tag: </element>
    EndTag,
    /// Empty element: <element/>
    EmptyTag,
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// XML declaration: <?xml ...?>
    XmlDeclaration,
    /// DOCTYPE declaration
    DocType,
}

/// A parsed XML token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// For tags and PIs: the name or target
    pub name: Option<&'a [u8]>,
    /// For text/cdata/comments/PIs: the content
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// XML tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    strict: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8], strict: bool) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            strict,
        }
    }

    /// Get the current position in the input
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Get the next token, or None at end of input
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        if self.scanner.is_eof() {
            return Ok(None);
        }
        if self.scanner.peek() == Some(b'<') {
            self.parse_markup().map(Some)
        } else {
            self.parse_text().map(Some)
        }
    }

    fn error_at(&self, message: &str, position: usize) -> ParseError {
        ParseError::new(message, position)
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(1); // Skip '<'

        match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'!') => self.parse_bang_markup(start),
            Some(b'?') => self.parse_pi(start),
            Some(_) => self.parse_start_tag(start),
            None => Err(self.error_at("Unexpected end of input after '<'", start)),
        }
    }

    /// Parse a start tag or empty element tag
    fn parse_start_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| self.error_at("Invalid element name: must start with letter, underscore, or colon", start))?;

        let end = self
            .scanner
            .find_tag_end_quoted()
            .ok_or_else(|| self.error_at("Unterminated start tag", start))?;

        let is_empty = self.scanner.slice(start, end).ends_with(b"/");
        self.scanner.set_position(end + 1);

        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        Ok(Token::new(kind, (start, end + 1)).with_name(name))
    }

    /// Parse an end tag
    fn parse_end_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '/'

        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| self.error_at("Invalid element name in end tag", start))?;

        // Only whitespace may follow the name
        self.scanner.skip_whitespace();
        match self.scanner.peek() {
            Some(b'>') => self.scanner.advance(1),
            Some(_) => return Err(self.error_at("End tag cannot have attributes or other content", start)),
            None => return Err(self.error_at("Unterminated end tag", start)),
        }

        Ok(Token::new(TokenKind::EndTag, (start, self.scanner.position())).with_name(name))
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with(b"--") {
            self.parse_comment(start)
        } else if self.scanner.starts_with(b"[CDATA[") {
            self.parse_cdata(start)
        } else if self.scanner.starts_with(b"DOCTYPE") {
            self.parse_doctype(start)
        } else {
            Err(self.error_at("Invalid declaration - expected comment, CDATA, or DOCTYPE", start))
        }
    }

    /// Parse a comment <!--...-->
    fn parse_comment(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(2); // Skip '--'
        let content_start = self.scanner.position();

        let end = self
            .scanner
            .find_sequence(b"-->")
            .ok_or_else(|| self.error_at("Unterminated comment", start))?;
        let content = self.scanner.slice(content_start, end);

        if self.strict && memchr::memmem::find(content, b"--").is_some() {
            return Err(self.error_at("Comment cannot contain '--'", start));
        }

        self.scanner.set_position(end + 3);
        Ok(Token::new(TokenKind::Comment, (start, end + 3)).with_content(Cow::Borrowed(content)))
    }

    /// Parse a CDATA section <![CDATA[...]]>
    fn parse_cdata(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip '[CDATA['
        let content_start = self.scanner.position();

        let end = self
            .scanner
            .find_sequence(b"]]>")
            .ok_or_else(|| self.error_at("Unterminated CDATA section", start))?;
        let content = self.scanner.slice(content_start, end);

        self.scanner.set_position(end + 3);
        Ok(Token::new(TokenKind::CData, (start, end + 3)).with_content(Cow::Borrowed(content)))
    }

    /// Parse a DOCTYPE declaration, including any internal subset
    fn parse_doctype(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip 'DOCTYPE'
        let content_start = self.scanner.position();

        let mut bracket_depth = 0usize;
        let mut quote: Option<u8> = None;
        let rest = self.scanner.remaining();

        for (offset, &b) in rest.iter().enumerate() {
            match (quote, b) {
                (Some(q), _) if q == b => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => bracket_depth += 1,
                (None, b']') => bracket_depth = bracket_depth.saturating_sub(1),
                (None, b'>') if bracket_depth == 0 => {
                    let end = content_start + offset;
                    let content = self.scanner.slice(content_start, end);
                    self.scanner.set_position(end + 1);
                    return Ok(Token::new(TokenKind::DocType, (start, end + 1)).with_content(Cow::Borrowed(content)));
                }
                _ => {}
            }
        }

        Err(self.error_at("Unterminated DOCTYPE declaration", start))
    }

    /// Parse a processing instruction or the XML declaration
    fn parse_pi(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '?'

        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| self.error_at("Invalid processing instruction target", start))?;

        let is_xml_decl = name == b"xml";
        if self.strict && !is_xml_decl && name.eq_ignore_ascii_case(b"xml") {
            return Err(self.error_at("Processing instruction target 'xml' is reserved", start));
        }

        self.scanner.skip_whitespace();
        let content_start = self.scanner.position();

        let end = self
            .scanner
            .find_sequence(b"?>")
            .ok_or_else(|| self.error_at("Unterminated processing instruction", start))?;
        let content = self.scanner.slice(content_start, end);

        self.scanner.set_position(end + 2);
        let kind = if is_xml_decl { TokenKind::XmlDeclaration } else { TokenKind::ProcessingInstruction };
        Ok(Token::new(kind, (start, end + 2))
            .with_name(name)
            .with_content(Cow::Borrowed(content)))
    }

    /// Parse text content up to the next '<'
    fn parse_text(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_start()
            .unwrap_or(start + self.scanner.remaining().len());
        let content = self.scanner.slice(start, end);

        let decoded = if self.strict {
            if memchr::memmem::find(content, b"]]>").is_some() {
                return Err(self.error_at("Text cannot contain ']]>'", start));
            }
            decode_text_strict(content).map_err(|msg| self.error_at(msg, start))?
        } else {
            decode_text(content).map_err(|msg| self.error_at(msg, start))?
        };

        self.scanner.set_position(end);
        Ok(Token::new(TokenKind::Text, (start, end)).with_content(decoded))
    }
}
