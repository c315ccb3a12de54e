//! XML Writer Module
//!
//! - EventSink: where a transformation writes its kept and injected events
//! - XmlWriter: serializes events to any `io::Write`

pub mod xml;

pub use xml::XmlWriter;

use crate::error::WriteError;
use crate::reader::events::XmlEvent;

/// An append-only consumer of XML events.
///
/// Implementations must reject events that would produce a structurally
/// invalid document (an end tag with nothing open, or one that does not
/// match the innermost open element).
pub trait EventSink {
    fn write_event(&mut self, event: &XmlEvent<'_>) -> Result<(), WriteError>;

    /// Flush and release. Must be idempotent.
    fn close(&mut self) -> Result<(), WriteError>;
}

impl<K: EventSink + ?Sized> EventSink for &mut K {
    fn write_event(&mut self, event: &XmlEvent<'_>) -> Result<(), WriteError> {
        (**self).write_event(event)
    }

    fn close(&mut self) -> Result<(), WriteError> {
        (**self).close()
    }
}

/// Collects owned copies of every event written. Useful for inspecting a
/// transformation without serializing it.
impl EventSink for Vec<XmlEvent<'static>> {
    fn write_event(&mut self, event: &XmlEvent<'_>) -> Result<(), WriteError> {
        self.push(event.clone().into_owned());
        Ok(())
    }

    fn close(&mut self) -> Result<(), WriteError> {
        Ok(())
    }
}
