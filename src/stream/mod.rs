//! Streaming transformation
//!
//! - XmlStreamGenerator: marshal, filter and write in one call
//! - EventFilter: the per-event keep/drop decision
//! - Emitter: inject events at the current position
//! - ElementStack / StateMap: per-run context for the filter

mod context;
mod emitter;
mod filter;
mod generator;
mod scoped;

pub use context::{ElementStack, StateMap};
pub use emitter::Emitter;
pub use filter::{EventFilter, PassThrough};
pub use generator::{transform_events, transform_events_with, XmlStreamGenerator};
