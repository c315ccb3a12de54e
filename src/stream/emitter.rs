//! Write access to the output from inside a filter call

use std::borrow::Cow;

use crate::error::{DecisionError, WriteError};
use crate::reader::events::{EndElement, StartElement, XmlEvent};
use crate::reader::slice::parse_events;
use crate::writer::EventSink;

/// The output of a run, as seen by one filter call.
///
/// Events written here go straight to the sink, ahead of the event being
/// decided. An emitter cannot close the sink and does not outlive the call.
pub struct Emitter<'s> {
    sink: &'s mut dyn EventSink,
    written: usize,
}

impl<'s> Emitter<'s> {
    pub(crate) fn new(sink: &'s mut dyn EventSink) -> Self {
        Emitter { sink, written: 0 }
    }

    /// Write any event, including the one being decided
    pub fn write(&mut self, event: &XmlEvent<'_>) -> Result<(), WriteError> {
        self.sink.write_event(event)?;
        self.written += 1;
        Ok(())
    }

    pub fn start_element(&mut self, name: &str) -> Result<(), WriteError> {
        self.write(&XmlEvent::start(name))
    }

    /// Write a start element built by the caller, attributes included
    pub fn start_element_with(&mut self, elem: StartElement<'_>) -> Result<(), WriteError> {
        self.write(&XmlEvent::StartElement(elem))
    }

    pub fn end_element(&mut self, name: &str) -> Result<(), WriteError> {
        self.write(&XmlEvent::EndElement(EndElement::new(name.as_bytes())))
    }

    /// Character data, escaped on output
    pub fn text(&mut self, text: &str) -> Result<(), WriteError> {
        self.write(&XmlEvent::Text(Cow::Borrowed(text.as_bytes())))
    }

    pub fn cdata(&mut self, text: &str) -> Result<(), WriteError> {
        self.write(&XmlEvent::CData(Cow::Borrowed(text.as_bytes())))
    }

    pub fn comment(&mut self, text: &str) -> Result<(), WriteError> {
        self.write(&XmlEvent::Comment(Cow::Borrowed(text.as_bytes())))
    }

    /// Splice a marshalled fragment into the output.
    ///
    /// The fragment is parsed completely before anything is written, so a
    /// malformed fragment leaves the output untouched. Its XML declaration
    /// and doctype, if any, are skipped. Returns the number of events written.
    pub fn write_fragment(&mut self, fragment: impl AsRef<[u8]>) -> Result<usize, DecisionError> {
        let events = parse_events(fragment.as_ref())?;
        let mut count = 0;
        for event in &events {
            if matches!(event, XmlEvent::XmlDeclaration { .. } | XmlEvent::DocType(_)) {
                continue;
            }
            self.write(event)?;
            count += 1;
        }
        Ok(count)
    }

    /// Events written through this emitter so far
    pub fn written(&self) -> usize {
        self.written
    }
}
