//! Object marshalling
//!
//! A [`Marshaller`] turns the caller's template object into the XML bytes a
//! transformation reads. [`SerdeMarshaller`] covers any `serde::Serialize`
//! type through quick-xml's serializer.

use quick_xml::se::Serializer;
use serde::Serialize;

use crate::error::MarshalError;

/// Declaration written ahead of marshalled output when enabled
const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Serializes a template object into XML bytes
pub trait Marshaller<T: ?Sized> {
    /// Append the XML form of `template` to `out`
    fn marshal(&self, template: &T, out: &mut Vec<u8>) -> Result<(), MarshalError>;
}

impl<T: ?Sized, M: Marshaller<T> + ?Sized> Marshaller<T> for &M {
    fn marshal(&self, template: &T, out: &mut Vec<u8>) -> Result<(), MarshalError> {
        (**self).marshal(template, out)
    }
}

/// Marshaller backed by `serde` and quick-xml
///
/// Field naming follows quick-xml's conventions: fields renamed with a
/// leading `@` become attributes, `$text` becomes element text, and
/// sequences repeat their element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeMarshaller {
    root: Option<String>,
    declaration: bool,
    indent: Option<(char, usize)>,
}

fn marshal_error(err: impl std::fmt::Display) -> MarshalError {
    MarshalError::new(err.to_string())
}

impl SerdeMarshaller {
    /// Root element named after the serialized type, no declaration, no indentation
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the document element
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    /// Indent nested elements by `size` copies of `indent_char`
    pub fn with_indent(mut self, indent_char: char, size: usize) -> Self {
        self.indent = Some((indent_char, size));
        self
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Marshal `value` as a standalone element named `root`, with no
    /// declaration. The result can be spliced into a running transformation
    /// with [`Emitter::write_fragment`](crate::stream::Emitter::write_fragment).
    pub fn fragment<T: Serialize + ?Sized>(value: &T, root: &str) -> Result<String, MarshalError> {
        let mut buf = String::new();
        let ser = Serializer::with_root(&mut buf, Some(root)).map_err(marshal_error)?;
        value.serialize(ser).map_err(marshal_error)?;
        Ok(buf)
    }

    fn to_xml<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, MarshalError> {
        let mut buf = String::new();
        if self.declaration {
            buf.push_str(DECLARATION);
        }

        let mut ser = match &self.root {
            Some(root) => Serializer::with_root(&mut buf, Some(root.as_str())).map_err(marshal_error)?,
            None => Serializer::new(&mut buf),
        };
        if let Some((indent_char, size)) = self.indent {
            ser.indent(indent_char, size);
        }
        value.serialize(ser).map_err(marshal_error)?;
        Ok(buf)
    }
}

impl<T: Serialize + ?Sized> Marshaller<T> for SerdeMarshaller {
    fn marshal(&self, template: &T, out: &mut Vec<u8>) -> Result<(), MarshalError> {
        let xml = self.to_xml(template)?;
        out.extend_from_slice(xml.as_bytes());
        Ok(())
    }
}
