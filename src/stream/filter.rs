//! The per-event decision function

use crate::error::DecisionError;
use crate::reader::events::XmlEvent;

use super::context::{ElementStack, StateMap};
use super::emitter::Emitter;

/// Decides, for each event of a run, whether it reaches the output.
///
/// Return `Ok(true)` to forward the event and `Ok(false)` to drop it. Events
/// written through `sink` during the call land in the output ahead of the
/// current event. An error aborts the run.
///
/// Any closure with the matching signature is a filter.
pub trait EventFilter {
    fn filter(
        &mut self,
        event: &XmlEvent<'_>,
        stack: &ElementStack<'_>,
        state: &mut StateMap,
        sink: &mut Emitter<'_>,
    ) -> Result<bool, DecisionError>;
}

impl<F> EventFilter for F
where
    F: FnMut(&XmlEvent<'_>, &ElementStack<'_>, &mut StateMap, &mut Emitter<'_>) -> Result<bool, DecisionError>,
{
    fn filter(
        &mut self,
        event: &XmlEvent<'_>,
        stack: &ElementStack<'_>,
        state: &mut StateMap,
        sink: &mut Emitter<'_>,
    ) -> Result<bool, DecisionError> {
        self(event, stack, state, sink)
    }
}

/// Forwards every event unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl EventFilter for PassThrough {
    fn filter(
        &mut self,
        _event: &XmlEvent<'_>,
        _stack: &ElementStack<'_>,
        _state: &mut StateMap,
        _sink: &mut Emitter<'_>,
    ) -> Result<bool, DecisionError> {
        Ok(true)
    }
}
