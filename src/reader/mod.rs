//! XML Reader Module
//!
//! - Events: XML event types for pull parsing
//! - SliceReader: Zero-copy slice reader, the default event source

pub mod events;
pub mod slice;

use crate::error::ParseError;
use events::XmlEvent;

/// A finite, non-restartable sequence of XML events.
///
/// Events carry the lifetime of the underlying document buffer, not of the
/// source, so they can be held (for example on an ancestor stack) while the
/// source keeps reading.
pub trait EventSource<'a> {
    /// Whether another event (or an error) is available
    fn has_next(&mut self) -> bool;

    /// Take the next event. Fails on malformed input, or when exhausted.
    fn next_event(&mut self) -> Result<XmlEvent<'a>, ParseError>;

    /// Release the source. Must be idempotent and safe after partial reads.
    fn close(&mut self) -> Result<(), ParseError>;
}

impl<'a, S: EventSource<'a> + ?Sized> EventSource<'a> for &mut S {
    fn has_next(&mut self) -> bool {
        (**self).has_next()
    }

    fn next_event(&mut self) -> Result<XmlEvent<'a>, ParseError> {
        (**self).next_event()
    }

    fn close(&mut self) -> Result<(), ParseError> {
        (**self).close()
    }
}
