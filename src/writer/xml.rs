//! Event serializer
//!
//! Writes events straight to an `io::Write`. A start tag is held open until
//! the next event arrives so that an element with no content can be
//! written as `<name/>`.

use std::io::Write;

use memchr::memmem;
use tracing::warn;

use crate::config::WriterConfig;
use crate::core::entities::{escape_attribute, escape_text};
use crate::core::namespace::NamespaceScope;
use crate::error::{StreamInitError, WriteError};
use crate::reader::events::{EndElement, StartElement, XmlEvent};

use super::EventSink;

/// Streaming XML writer
pub struct XmlWriter<W: Write> {
    out: W,
    config: WriterConfig,
    /// Names of currently open elements, innermost last
    open: Vec<Vec<u8>>,
    namespaces: NamespaceScope,
    /// `<name attrs` written, `>` not yet
    pending_start: bool,
    started: bool,
    closed: bool,
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl<W: Write> XmlWriter<W> {
    /// Writer with default options. Writes nothing until the first event.
    pub fn new(out: W) -> Self {
        XmlWriter {
            out,
            config: WriterConfig {
                write_declaration: false,
                ..WriterConfig::default()
            },
            open: Vec::with_capacity(16),
            namespaces: NamespaceScope::new(),
            pending_start: false,
            started: false,
            closed: false,
        }
    }

    /// Open a writer. With `write_declaration` set the declaration is written
    /// immediately, so an unusable output fails here rather than mid-stream.
    pub fn with_config(out: W, config: WriterConfig) -> Result<Self, StreamInitError> {
        let write_declaration = config.write_declaration;
        let mut writer = XmlWriter {
            config,
            ..XmlWriter::new(out)
        };
        if write_declaration {
            writer.out.write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
            writer.started = true;
        }
        Ok(writer)
    }

    /// Current element depth
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn finish_start_tag(&mut self) -> Result<(), WriteError> {
        if self.pending_start {
            self.pending_start = false;
            self.out.write_all(b">")?;
        }
        Ok(())
    }

    fn write_start(&mut self, elem: &StartElement<'_>) -> Result<(), WriteError> {
        self.namespaces.push_scope(&elem.attributes);
        if self.config.check_namespaces {
            if let Some(prefix) = elem.prefix() {
                if !self.namespaces.is_bound(prefix) {
                    self.namespaces.pop_scope();
                    return Err(WriteError::UnboundPrefix(lossy(prefix)));
                }
            }
            for attr in &elem.attributes {
                if let Some(prefix) = attr.prefix() {
                    if prefix != b"xmlns" && !self.namespaces.is_bound(prefix) {
                        self.namespaces.pop_scope();
                        return Err(WriteError::UnboundPrefix(lossy(prefix)));
                    }
                }
            }
        }

        self.finish_start_tag()?;
        self.out.write_all(b"<")?;
        self.out.write_all(&elem.name)?;
        for attr in &elem.attributes {
            self.out.write_all(b" ")?;
            self.out.write_all(&attr.name)?;
            self.out.write_all(b"=\"")?;
            self.out.write_all(&escape_attribute(&attr.value))?;
            self.out.write_all(b"\"")?;
        }
        self.open.push(elem.name.to_vec());
        self.pending_start = true;
        Ok(())
    }

    fn write_end(&mut self, elem: &EndElement<'_>) -> Result<(), WriteError> {
        match self.open.last() {
            None => return Err(WriteError::NothingOpen(lossy(&elem.name))),
            Some(open) if open.as_slice() != elem.name.as_ref() => {
                return Err(WriteError::Unbalanced {
                    expected: lossy(open),
                    found: lossy(&elem.name),
                });
            }
            Some(_) => {}
        }

        if self.pending_start && self.config.collapse_empty {
            self.pending_start = false;
            self.out.write_all(b"/>")?;
        } else {
            self.finish_start_tag()?;
            self.out.write_all(b"</")?;
            self.out.write_all(&elem.name)?;
            self.out.write_all(b">")?;
        }
        self.open.pop();
        self.namespaces.pop_scope();
        Ok(())
    }

    fn write_cdata(&mut self, content: &[u8]) -> Result<(), WriteError> {
        self.out.write_all(b"<![CDATA[")?;
        let mut rest = content;
        // `]]>` cannot appear inside a section; end it after `]]` and reopen
        while let Some(i) = memmem::find(rest, b"]]>") {
            self.out.write_all(&rest[..i + 2])?;
            self.out.write_all(b"]]><![CDATA[")?;
            rest = &rest[i + 2..];
        }
        self.out.write_all(rest)?;
        self.out.write_all(b"]]>")?;
        Ok(())
    }

    /// Output is always UTF-8, whatever encoding the source document declared
    fn write_declaration(
        &mut self,
        version: &[u8],
        declares_encoding: bool,
        standalone: Option<bool>,
    ) -> Result<(), WriteError> {
        self.out.write_all(b"<?xml version=\"")?;
        self.out.write_all(version)?;
        self.out.write_all(b"\"")?;
        if declares_encoding {
            self.out.write_all(b" encoding=\"UTF-8\"")?;
        }
        if let Some(standalone) = standalone {
            let value: &[u8] = if standalone { b"yes" } else { b"no" };
            self.out.write_all(b" standalone=\"")?;
            self.out.write_all(value)?;
            self.out.write_all(b"\"")?;
        }
        self.out.write_all(b"?>")?;
        Ok(())
    }
}

impl<W: Write> EventSink for XmlWriter<W> {
    fn write_event(&mut self, event: &XmlEvent<'_>) -> Result<(), WriteError> {
        if self.closed {
            return Err(WriteError::Closed);
        }

        match event {
            XmlEvent::StartElement(elem) => self.write_start(elem)?,
            XmlEvent::EndElement(elem) => self.write_end(elem)?,
            XmlEvent::Text(text) => {
                self.finish_start_tag()?;
                self.out.write_all(&escape_text(text))?;
            }
            XmlEvent::CData(content) => {
                self.finish_start_tag()?;
                self.write_cdata(content)?;
            }
            XmlEvent::Comment(content) => {
                self.finish_start_tag()?;
                self.out.write_all(b"<!--")?;
                self.out.write_all(content)?;
                self.out.write_all(b"-->")?;
            }
            XmlEvent::ProcessingInstruction { target, data } => {
                self.finish_start_tag()?;
                self.out.write_all(b"<?")?;
                self.out.write_all(target)?;
                if let Some(data) = data {
                    self.out.write_all(b" ")?;
                    self.out.write_all(data)?;
                }
                self.out.write_all(b"?>")?;
            }
            XmlEvent::XmlDeclaration {
                version,
                encoding,
                standalone,
            } => {
                if self.started {
                    warn!("dropping XML declaration: output already started");
                    return Ok(());
                }
                self.write_declaration(version, encoding.is_some(), *standalone)?;
            }
            XmlEvent::DocType(content) => {
                self.finish_start_tag()?;
                self.out.write_all(b"<!DOCTYPE")?;
                self.out.write_all(content)?;
                self.out.write_all(b">")?;
            }
        }

        self.started = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), WriteError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.finish_start_tag()?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for XmlWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open: Vec<String> = self.open.iter().map(|n| lossy(n)).collect();
        f.debug_struct("XmlWriter")
            .field("open", &open)
            .field("closed", &self.closed)
            .finish()
    }
}
