//! XML Event Types
//!
//! Event types for pull-parser style XML processing. Payloads borrow from
//! the document buffer where possible; events built by callers for
//! injection usually borrow from a `&str` or own their bytes.

use crate::core::attributes::{split_name, Attribute};
use std::borrow::Cow;

/// XML parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent<'a> {
    /// Start of an element: <name attrs...>
    /// An empty element <name/> is reported as a start directly followed by its end.
    StartElement(StartElement<'a>),
    /// End of an element: </name>
    EndElement(EndElement<'a>),
    /// Text content between tags, entities decoded
    Text(Cow<'a, [u8]>),
    /// CDATA section content
    CData(Cow<'a, [u8]>),
    /// Comment content
    Comment(Cow<'a, [u8]>),
    /// Processing instruction: <?target data?>
    ProcessingInstruction {
        target: Cow<'a, [u8]>,
        data: Option<Cow<'a, [u8]>>,
    },
    /// XML declaration: <?xml version="1.0"?>
    XmlDeclaration {
        version: Cow<'a, [u8]>,
        encoding: Option<Cow<'a, [u8]>>,
        standalone: Option<bool>,
    },
    /// DOCTYPE declaration, everything between `<!DOCTYPE` and the closing `>`
    DocType(Cow<'a, [u8]>),
}

/// Start element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement<'a> {
    /// Full element name (may include prefix)
    pub name: Cow<'a, [u8]>,
    /// Namespace URI, when the reader could resolve it
    pub namespace: Option<Cow<'a, [u8]>>,
    pub attributes: Vec<Attribute<'a>>,
}

impl<'a> StartElement<'a> {
    pub fn new(name: impl Into<Cow<'a, [u8]>>) -> Self {
        StartElement {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute (builder style)
    pub fn with_attribute(mut self, name: &'a str, value: &'a str) -> Self {
        self.attributes.push(Attribute::new(name.as_bytes(), value.as_bytes()));
        self
    }

    /// Get the name as a string
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    /// Local name (after colon)
    pub fn local_name(&self) -> &[u8] {
        split_name(&self.name).1
    }

    /// Get the local name as a string
    pub fn local_name_str(&self) -> Option<&str> {
        std::str::from_utf8(self.local_name()).ok()
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&[u8]> {
        split_name(&self.name).0
    }

    /// Get an attribute by name
    pub fn get_attribute(&self, name: &[u8]) -> Option<&Attribute<'a>> {
        self.attributes.iter().find(|a| a.name.as_ref() == name)
    }

    /// Get an attribute value by name as string
    pub fn get_attribute_value(&self, name: &str) -> Option<&str> {
        self.get_attribute(name.as_bytes()).and_then(|a| a.value_str())
    }

    /// The matching end element
    pub fn end(&self) -> EndElement<'a> {
        EndElement::new(self.name.clone())
    }

    pub fn into_owned(self) -> StartElement<'static> {
        StartElement {
            name: Cow::Owned(self.name.into_owned()),
            namespace: self.namespace.map(|ns| Cow::Owned(ns.into_owned())),
            attributes: self.attributes.into_iter().map(Attribute::into_owned).collect(),
        }
    }
}

/// End element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndElement<'a> {
    /// Full element name
    pub name: Cow<'a, [u8]>,
}

impl<'a> EndElement<'a> {
    pub fn new(name: impl Into<Cow<'a, [u8]>>) -> Self {
        EndElement { name: name.into() }
    }

    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    pub fn local_name(&self) -> &[u8] {
        split_name(&self.name).1
    }

    pub fn prefix(&self) -> Option<&[u8]> {
        split_name(&self.name).0
    }

    pub fn into_owned(self) -> EndElement<'static> {
        EndElement {
            name: Cow::Owned(self.name.into_owned()),
        }
    }
}

impl<'a> XmlEvent<'a> {
    /// `<name>`
    pub fn start(name: &'a str) -> Self {
        XmlEvent::StartElement(StartElement::new(name.as_bytes()))
    }

    /// `</name>`
    pub fn end(name: &'a str) -> Self {
        XmlEvent::EndElement(EndElement::new(name.as_bytes()))
    }

    pub fn text(content: &'a str) -> Self {
        XmlEvent::Text(Cow::Borrowed(content.as_bytes()))
    }

    pub fn cdata(content: &'a str) -> Self {
        XmlEvent::CData(Cow::Borrowed(content.as_bytes()))
    }

    pub fn comment(content: &'a str) -> Self {
        XmlEvent::Comment(Cow::Borrowed(content.as_bytes()))
    }

    /// Check if this is a start element event
    pub fn is_start_element(&self) -> bool {
        matches!(self, XmlEvent::StartElement(_))
    }

    /// Check if this is an end element event
    pub fn is_end_element(&self) -> bool {
        matches!(self, XmlEvent::EndElement(_))
    }

    /// Check if this is a text event
    pub fn is_text(&self) -> bool {
        matches!(self, XmlEvent::Text(_))
    }

    /// Get as start element if applicable
    pub fn as_start_element(&self) -> Option<&StartElement<'a>> {
        match self {
            XmlEvent::StartElement(e) => Some(e),
            _ => None,
        }
    }

    /// Get as end element if applicable
    pub fn as_end_element(&self) -> Option<&EndElement<'a>> {
        match self {
            XmlEvent::EndElement(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if applicable
    pub fn as_text(&self) -> Option<&[u8]> {
        match self {
            XmlEvent::Text(t) | XmlEvent::CData(t) => Some(t.as_ref()),
            _ => None,
        }
    }

    /// Local name of a start or end element
    pub fn local_name(&self) -> Option<&[u8]> {
        match self {
            XmlEvent::StartElement(e) => Some(e.local_name()),
            XmlEvent::EndElement(e) => Some(e.local_name()),
            _ => None,
        }
    }

    /// Is this the start of an element with the given local name?
    pub fn is_start_of(&self, local_name: &str) -> bool {
        self.is_start_element() && self.local_name() == Some(local_name.as_bytes())
    }

    /// Is this the end of an element with the given local name?
    pub fn is_end_of(&self, local_name: &str) -> bool {
        self.is_end_element() && self.local_name() == Some(local_name.as_bytes())
    }

    pub fn into_owned(self) -> XmlEvent<'static> {
        fn own(c: Cow<'_, [u8]>) -> Cow<'static, [u8]> {
            Cow::Owned(c.into_owned())
        }

        match self {
            XmlEvent::StartElement(e) => XmlEvent::StartElement(e.into_owned()),
            XmlEvent::EndElement(e) => XmlEvent::EndElement(e.into_owned()),
            XmlEvent::Text(t) => XmlEvent::Text(own(t)),
            XmlEvent::CData(t) => XmlEvent::CData(own(t)),
            XmlEvent::Comment(t) => XmlEvent::Comment(own(t)),
            XmlEvent::ProcessingInstruction { target, data } => XmlEvent::ProcessingInstruction {
                target: own(target),
                data: data.map(own),
            },
            XmlEvent::XmlDeclaration { version, encoding, standalone } => XmlEvent::XmlDeclaration {
                version: own(version),
                encoding: encoding.map(own),
                standalone,
            },
            XmlEvent::DocType(t) => XmlEvent::DocType(own(t)),
        }
    }
}
