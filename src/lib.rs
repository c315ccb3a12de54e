//! xmlsplice - Streaming XML rewriting
//!
//! Marshal an object to XML, read it back as a stream of events and decide
//! per event whether it reaches the output. The decision function sees the
//! open ancestors and a per-run state store, and may inject events of its
//! own at the current position.
//!
//! Layers:
//! - core: scanner, tokenizer, entities, attributes, encoding, namespaces
//! - reader: event types and the zero-copy slice reader (event source)
//! - writer: event sink and the XML writer
//! - marshal: template object to XML bytes (serde + quick-xml)
//! - stream: the transformation engine
//!
//! ```
//! use xmlsplice::{SerdeMarshaller, XmlStreamGenerator};
//!
//! #[derive(serde::Serialize)]
//! struct Bean {
//!     other: Vec<String>,
//! }
//!
//! let generator = XmlStreamGenerator::new(SerdeMarshaller::new().with_root("bean"));
//! let bean = Bean { other: vec!["a".into(), "b".into()] };
//!
//! let mut out = Vec::new();
//! generator
//!     .produce(&bean, &mut out, |event, _stack, _state, sink| {
//!         if event.is_start_of("bean") {
//!             sink.comment("generated")?;
//!         }
//!         Ok(event.as_text() != Some(&b"b"[..]))
//!     })
//!     .unwrap();
//! assert_eq!(out, b"<!--generated--><bean><other>a</other><other/></bean>");
//! ```

mod core;
pub mod config;
pub mod error;
pub mod marshal;
pub mod reader;
pub mod stream;
pub mod writer;

pub use crate::core::attributes::Attribute;
pub use config::{GeneratorConfig, WriterConfig};
pub use error::{DecisionError, MarshalError, ParseError, Result, StreamInitError, TransformError, WriteError};
pub use marshal::{Marshaller, SerdeMarshaller};
pub use reader::events::{EndElement, StartElement, XmlEvent};
pub use reader::slice::{parse_events, SliceReader};
pub use reader::EventSource;
pub use stream::{
    transform_events, transform_events_with, ElementStack, Emitter, EventFilter, PassThrough, StateMap,
    XmlStreamGenerator,
};
pub use writer::{EventSink, XmlWriter};
