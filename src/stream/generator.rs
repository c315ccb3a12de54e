//! Transformation engine
//!
//! Marshals a template object, reads it back as events and pumps each event
//! through the caller's filter into an XML writer. Source and sink are each
//! closed exactly once however the run ends, panics included.

use std::io::Write;

use tracing::{debug, trace};

use crate::config::GeneratorConfig;
use crate::core::encoding::convert_to_utf8;
use crate::error::{DecisionError, Result, TransformError};
use crate::marshal::Marshaller;
use crate::reader::events::XmlEvent;
use crate::reader::slice::SliceReader;
use crate::reader::EventSource;
use crate::writer::{EventSink, XmlWriter};

use super::context::{ElementStack, StateMap};
use super::emitter::Emitter;
use super::filter::EventFilter;
use super::scoped::Scoped;

/// Event counts for one run
#[derive(Debug, Default, Clone, Copy)]
struct RunStats {
    read: usize,
    forwarded: usize,
    suppressed: usize,
    injected: usize,
}

/// Produces filtered XML from template objects.
///
/// Holds a marshaller and the options for each run. Runs share nothing, so
/// one generator can serve any number of `produce` calls, from several
/// threads if the marshaller is `Sync`.
#[derive(Debug, Clone)]
pub struct XmlStreamGenerator<M> {
    marshaller: M,
    config: GeneratorConfig,
}

impl<M> XmlStreamGenerator<M> {
    pub fn new(marshaller: M) -> Self {
        Self::with_config(marshaller, GeneratorConfig::default())
    }

    pub fn with_config(marshaller: M, config: GeneratorConfig) -> Self {
        XmlStreamGenerator { marshaller, config }
    }

    pub fn marshaller(&self) -> &M {
        &self.marshaller
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Marshal `template`, pass every event through `filter` and write the
    /// kept and injected events to `out`.
    ///
    /// ```
    /// use xmlsplice::{SerdeMarshaller, XmlStreamGenerator};
    ///
    /// #[derive(serde::Serialize)]
    /// struct Note {
    ///     to: String,
    ///     body: String,
    /// }
    ///
    /// let generator = XmlStreamGenerator::new(SerdeMarshaller::new().with_root("note"));
    /// let note = Note { to: "Tove".into(), body: "Hi".into() };
    ///
    /// let mut out = Vec::new();
    /// generator
    ///     .produce(&note, &mut out, |event, _stack, _state, _sink| {
    ///         Ok(!event.is_start_of("to") && !event.is_end_of("to") && event.as_text() != Some(&b"Tove"[..]))
    ///     })
    ///     .unwrap();
    /// assert_eq!(out, b"<note><body>Hi</body></note>");
    /// ```
    pub fn produce<T, W, F>(&self, template: &T, out: W, filter: F) -> Result<()>
    where
        T: ?Sized,
        M: Marshaller<T>,
        W: Write,
        F: FnMut(&XmlEvent<'_>, &ElementStack<'_>, &mut StateMap, &mut Emitter<'_>) -> std::result::Result<bool, DecisionError>,
    {
        self.produce_with(template, out, filter)
    }

    /// [`produce`](Self::produce) for any [`EventFilter`] implementation
    pub fn produce_with<T, W, E>(&self, template: &T, out: W, filter: E) -> Result<()>
    where
        T: ?Sized,
        M: Marshaller<T>,
        W: Write,
        E: EventFilter,
    {
        let mut buf = Vec::new();
        self.marshaller.marshal(template, &mut buf)?;
        let buf = convert_to_utf8(buf)?;
        debug!(bytes = buf.len(), strict = self.config.strict, "template marshalled");

        let mut source = SliceReader::with_mode(&buf, self.config.strict);
        let sink = match XmlWriter::with_config(out, self.config.writer.clone()) {
            Ok(sink) => sink,
            Err(err) => {
                if let Err(close_err) = source.close() {
                    debug!(error = %close_err, "closing source after failed open");
                }
                return Err(err.into());
            }
        };

        transform_events_with(source, sink, filter)
    }
}

/// Run a filter over events from any source into any sink.
///
/// Both are closed before returning, on success and on failure. The run's
/// own error wins over close errors; among those the source's wins.
pub fn transform_events<'a, S, K, F>(source: S, sink: K, filter: F) -> Result<()>
where
    S: EventSource<'a>,
    K: EventSink,
    F: FnMut(&XmlEvent<'_>, &ElementStack<'_>, &mut StateMap, &mut Emitter<'_>) -> std::result::Result<bool, DecisionError>,
{
    transform_events_with(source, sink, filter)
}

/// [`transform_events`] for any [`EventFilter`] implementation
pub fn transform_events_with<'a, S, K, E>(source: S, sink: K, mut filter: E) -> Result<()>
where
    S: EventSource<'a>,
    K: EventSink,
    E: EventFilter,
{
    let mut source = Scoped::new("source", source, |source: &mut S| source.close());
    let mut sink = Scoped::new("sink", sink, |sink: &mut K| sink.close());

    let outcome = pump(source.get_mut(), sink.get_mut(), &mut filter);
    let source_closed = source.release().map_err(TransformError::from);
    let sink_closed = sink.release().map_err(TransformError::from);

    let mut result = outcome.map(|stats| {
        debug!(
            read = stats.read,
            forwarded = stats.forwarded,
            suppressed = stats.suppressed,
            injected = stats.injected,
            "transformation finished"
        );
    });
    for (resource, closed) in [("source", source_closed), ("sink", sink_closed)] {
        if let Err(err) = closed {
            if result.is_ok() {
                result = Err(err);
            } else {
                debug!(resource, error = %err, "discarding close failure");
            }
        }
    }
    result
}

fn pump<'a, S, K, E>(source: &mut S, sink: &mut K, filter: &mut E) -> Result<RunStats>
where
    S: EventSource<'a>,
    K: EventSink,
    E: EventFilter + ?Sized,
{
    let mut stack = ElementStack::new();
    let mut state = StateMap::new();
    let mut stats = RunStats::default();
    debug!("transformation started");

    while source.has_next() {
        let event = source.next_event()?;
        stats.read += 1;

        if let XmlEvent::StartElement(start) = &event {
            stack.push(start.clone());
        }

        let mut emitter = Emitter::new(&mut *sink);
        let keep = filter.filter(&event, &stack, &mut state, &mut emitter)?;
        stats.injected += emitter.written();

        if keep {
            sink.write_event(&event)?;
            stats.forwarded += 1;
        } else {
            stats.suppressed += 1;
            trace!(depth = stack.depth(), path = %stack.path(), "event suppressed");
        }

        if event.is_end_element() {
            stack.pop();
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MarshalError, ParseError, StreamInitError, WriteError};
    use crate::marshal::SerdeMarshaller;
    use crate::reader::slice::parse_events;
    use crate::stream::filter::PassThrough;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::io;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    /// Writes a string as-is
    struct Verbatim;

    impl Marshaller<str> for Verbatim {
        fn marshal(&self, template: &str, out: &mut Vec<u8>) -> std::result::Result<(), MarshalError> {
            out.extend_from_slice(template.as_bytes());
            Ok(())
        }
    }

    struct Unmarshallable;

    impl Marshaller<str> for Unmarshallable {
        fn marshal(&self, _template: &str, _out: &mut Vec<u8>) -> std::result::Result<(), MarshalError> {
            Err(MarshalError::new("no"))
        }
    }

    #[derive(Default)]
    struct MockSource {
        events: VecDeque<XmlEvent<'static>>,
        closes: usize,
        fail_close: bool,
    }

    impl MockSource {
        fn new(xml: &str) -> Self {
            MockSource {
                events: parse_events(xml.as_bytes())
                    .unwrap()
                    .into_iter()
                    .map(XmlEvent::into_owned)
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl EventSource<'static> for MockSource {
        fn has_next(&mut self) -> bool {
            !self.events.is_empty()
        }

        fn next_event(&mut self) -> std::result::Result<XmlEvent<'static>, ParseError> {
            self.events
                .pop_front()
                .ok_or_else(|| ParseError::new("No more events", 0))
        }

        fn close(&mut self) -> std::result::Result<(), ParseError> {
            self.closes += 1;
            if self.fail_close {
                return Err(ParseError::new("source close failed", 0));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockSink {
        events: Vec<XmlEvent<'static>>,
        closes: usize,
        fail_close: bool,
    }

    impl EventSink for MockSink {
        fn write_event(&mut self, event: &XmlEvent<'_>) -> std::result::Result<(), WriteError> {
            self.events.push(event.clone().into_owned());
            Ok(())
        }

        fn close(&mut self) -> std::result::Result<(), WriteError> {
            self.closes += 1;
            if self.fail_close {
                return Err(WriteError::Closed);
            }
            Ok(())
        }
    }

    /// Ten events: root, two items with text, one empty item, root end
    const TEN_EVENTS: &str = "<r><i>1</i><i>2</i><i/></r>";

    fn run(xml: &str, filter: impl EventFilter) -> String {
        let generator = XmlStreamGenerator::new(Verbatim);
        let mut out = Vec::new();
        generator.produce_with(xml, &mut out, filter).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_identity() {
        let xml = r#"<complex name="n"><things><thing><aNumber>1</aNumber></thing></things><others><other>a</other></others><empty/></complex>"#;
        assert_eq!(run(xml, PassThrough), xml);
    }

    #[test]
    fn test_stack_during_callbacks() {
        let xml = "<complex><others><other>a</other></others></complex>";
        let mut seen = Vec::new();
        let generator = XmlStreamGenerator::new(Verbatim);
        generator
            .produce(xml, io::sink(), |event, stack, _state, _sink| {
                let top = stack.top().and_then(|e| e.name_str()).unwrap_or("").to_string();
                let parent = stack.parent().and_then(|e| e.name_str()).unwrap_or("").to_string();
                match event {
                    XmlEvent::StartElement(e) => seen.push(format!("start {} top={top} parent={parent}", e.name_str().unwrap_or(""))),
                    XmlEvent::EndElement(e) => seen.push(format!("end {} top={top} depth={}", e.name_str().unwrap_or(""), stack.depth())),
                    _ => seen.push(format!("text depth={}", stack.depth())),
                }
                Ok(true)
            })
            .unwrap();

        assert_eq!(
            seen,
            [
                "start complex top=complex parent=",
                "start others top=others parent=complex",
                "start other top=other parent=others",
                "text depth=3",
                "end other top=other depth=3",
                "end others top=others depth=2",
                "end complex top=complex depth=1",
            ]
        );
    }

    #[test]
    fn test_subtree_suppression() {
        let xml = "<complex><others><other>a</other><other>b</other></others><aString>s</aString></complex>";
        let generator = XmlStreamGenerator::new(Verbatim);
        let mut out = Vec::new();
        generator
            .produce(xml, &mut out, |_event, stack, _state, _sink| Ok(!stack.contains("others")))
            .unwrap();
        assert_eq!(out, b"<complex><aString>s</aString></complex>");
    }

    #[test]
    fn test_injection_replaces_event() {
        let xml = "<r><w/><k/></r>";
        let generator = XmlStreamGenerator::new(Verbatim);
        let mut out = Vec::new();
        generator
            .produce(xml, &mut out, |event, _stack, _state, sink| {
                if event.is_start_of("w") {
                    sink.start_element("a")?;
                    sink.text("b")?;
                    sink.end_element("a")?;
                    return Ok(false);
                }
                Ok(!event.is_end_of("w"))
            })
            .unwrap();
        assert_eq!(out, b"<r><a>b</a><k/></r>");
    }

    #[test]
    fn test_injection_ahead_of_kept_event() {
        let xml = "<r><k/></r>";
        let generator = XmlStreamGenerator::new(Verbatim);
        let mut out = Vec::new();
        generator
            .produce(xml, &mut out, |event, _stack, _state, sink| {
                if event.is_end_of("r") {
                    sink.comment("end")?;
                }
                Ok(true)
            })
            .unwrap();
        assert_eq!(out, b"<r><k/><!--end--></r>");
    }

    #[test]
    fn test_state_suppresses_first_block_only() {
        let xml = "<c><others><o>1</o></others><others><o>2</o></others></c>";
        let generator = XmlStreamGenerator::new(Verbatim);
        let mut out = Vec::new();
        generator
            .produce(xml, &mut out, |event, stack, state, _sink| {
                if event.is_start_of("others") && !state.contains_key("done") {
                    state.insert("skip", stack.depth());
                }
                if let Some(&depth) = state.get::<usize>("skip") {
                    if event.is_end_of("others") && stack.depth() == depth {
                        state.remove("skip");
                        state.insert("done", true);
                    }
                    return Ok(false);
                }
                Ok(true)
            })
            .unwrap();
        assert_eq!(out, b"<c><others><o>2</o></others></c>");
    }

    #[test]
    fn test_filter_failure_closes_both_once() {
        let mut source = MockSource::new(TEN_EVENTS);
        assert_eq!(source.events.len(), 10);
        let mut sink = MockSink::default();
        let mut calls = 0;

        let err = transform_events(&mut source, &mut sink, |_event, _stack, _state, _sink| {
            calls += 1;
            if calls == 3 {
                return Err(DecisionError::failed("third"));
            }
            Ok(true)
        })
        .unwrap_err();

        assert!(matches!(err, TransformError::Decision(DecisionError::Failed(ref m)) if m == "third"));
        assert_eq!(source.closes, 1);
        assert_eq!(sink.closes, 1);
        assert_eq!(sink.events.len(), 2);
    }

    #[test]
    fn test_panicking_filter_closes_both_once() {
        let mut source = MockSource::new(TEN_EVENTS);
        let mut sink = MockSink::default();

        let result = catch_unwind(AssertUnwindSafe(|| {
            transform_events(&mut source, &mut sink, |event, _stack, _state, _sink| {
                if event.is_start_of("i") {
                    panic!("filter bug");
                }
                Ok(true)
            })
        }));

        assert!(result.is_err());
        assert_eq!(source.closes, 1);
        assert_eq!(sink.closes, 1);
    }

    #[test]
    fn test_success_closes_both_once() {
        let mut source = MockSource::new(TEN_EVENTS);
        let mut sink = MockSink::default();
        transform_events_with(&mut source, &mut sink, PassThrough).unwrap();
        assert_eq!(source.closes, 1);
        assert_eq!(sink.closes, 1);
        assert_eq!(sink.events.len(), 10);
    }

    #[test]
    fn test_run_error_wins_over_close_errors() {
        let mut source = MockSource {
            fail_close: true,
            ..MockSource::new(TEN_EVENTS)
        };
        let mut sink = MockSink {
            fail_close: true,
            ..Default::default()
        };
        let err = transform_events(&mut source, &mut sink, |_event, _stack, _state, _sink| {
            Err(DecisionError::failed("first"))
        })
        .unwrap_err();
        assert!(matches!(err, TransformError::Decision(_)));
        assert_eq!(source.closes, 1);
        assert_eq!(sink.closes, 1);
    }

    #[test]
    fn test_source_close_error_wins_over_sink() {
        let mut source = MockSource {
            fail_close: true,
            ..MockSource::new(TEN_EVENTS)
        };
        let mut sink = MockSink {
            fail_close: true,
            ..Default::default()
        };
        let err = transform_events_with(&mut source, &mut sink, PassThrough).unwrap_err();
        assert!(matches!(err, TransformError::Parse(_)));
        assert_eq!(sink.closes, 1);
    }

    #[test]
    fn test_sink_close_error_reported() {
        let mut source = MockSource::new(TEN_EVENTS);
        let mut sink = MockSink {
            fail_close: true,
            ..Default::default()
        };
        let err = transform_events_with(&mut source, &mut sink, PassThrough).unwrap_err();
        assert!(matches!(err, TransformError::Write(WriteError::Closed)));
    }

    #[test]
    fn test_unbalanced_injection_is_write_error() {
        let generator = XmlStreamGenerator::new(Verbatim);
        let err = generator
            .produce("<r><a/></r>", io::sink(), |event, _stack, _state, sink| {
                if event.is_start_of("a") {
                    sink.end_element("zzz")?;
                }
                Ok(true)
            })
            .unwrap_err();
        assert!(matches!(err, TransformError::Write(WriteError::Unbalanced { .. })));
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let generator = XmlStreamGenerator::new(Verbatim);
        let mut out = Vec::new();
        let err = generator
            .produce_with("<r><a></r>", &mut out, PassThrough)
            .unwrap_err();
        assert!(matches!(err, TransformError::Parse(_)));
        // events before the failure were written
        assert!(out.starts_with(b"<r><a"));
    }

    #[test]
    fn test_character_references_are_not_lost() {
        let generator = XmlStreamGenerator::new(Verbatim);
        let mut out = Vec::new();
        generator
            .produce_with(r#"<r a="x&#10;y">&#65;&amp;&#9;</r>"#, &mut out, PassThrough)
            .unwrap();
        assert_eq!(out, b"<r a=\"x&#10;y\">A&amp;\t</r>");

        for (xml, message) in [
            ("<r>&custom;</r>", "Undeclared entity reference"),
            ("<r>&#0;z</r>", "Invalid character reference"),
            (r#"<r a="&#x1;"/>"#, "Invalid character reference"),
        ] {
            let err = generator.produce_with(xml, io::sink(), PassThrough).unwrap_err();
            assert!(
                matches!(err, TransformError::Parse(ref e) if e.message == message),
                "{xml}: {err}"
            );
        }
    }

    #[test]
    fn test_marshal_failure_writes_nothing() {
        let generator = XmlStreamGenerator::new(Unmarshallable);
        let mut out = Vec::new();
        let mut calls = 0;
        let err = generator
            .produce("ignored", &mut out, |_event, _stack, _state, _sink| {
                calls += 1;
                Ok(true)
            })
            .unwrap_err();
        assert!(matches!(err, TransformError::Marshal(_)));
        assert_eq!(calls, 0);
        assert!(out.is_empty());
    }

    struct BrokenOutput;

    impl io::Write for BrokenOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_open_failure_is_stream_init() {
        let mut config = GeneratorConfig::default();
        config.writer.write_declaration = true;
        let generator = XmlStreamGenerator::with_config(Verbatim, config);
        let err = generator.produce_with("<r/>", BrokenOutput, PassThrough).unwrap_err();
        assert!(matches!(err, TransformError::StreamInit(StreamInitError::Output(_))));
    }

    #[test]
    fn test_utf16_template_is_normalised() {
        struct Utf16;

        impl Marshaller<str> for Utf16 {
            fn marshal(&self, template: &str, out: &mut Vec<u8>) -> std::result::Result<(), MarshalError> {
                out.extend_from_slice(&[0xFF, 0xFE]);
                for unit in template.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                Ok(())
            }
        }

        let generator = XmlStreamGenerator::new(Utf16);
        let mut out = Vec::new();
        generator.produce_with("<r>ä</r>", &mut out, PassThrough).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<r>ä</r>");

        let mut out = Vec::new();
        generator
            .produce_with(r#"<?xml version="1.0" encoding="UTF-16"?><r>ä</r>"#, &mut out, PassThrough)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><r>ä</r>"#
        );
    }

    #[test]
    fn test_serde_marshaller_through_generator() {
        #[derive(serde::Serialize)]
        struct Doc {
            #[serde(rename = "@name")]
            name: String,
            other: Vec<String>,
        }

        let generator = XmlStreamGenerator::new(SerdeMarshaller::new().with_root("complex").with_declaration(true));
        let doc = Doc {
            name: "n".to_string(),
            other: vec!["a".to_string(), "b".to_string()],
        };
        let mut out = Vec::new();
        generator
            .produce(&doc, &mut out, |event, _stack, _state, _sink| Ok(!matches!(event, XmlEvent::XmlDeclaration { .. })))
            .unwrap();
        assert_eq!(out, br#"<complex name="n"><other>a</other><other>b</other></complex>"#);
        assert_eq!(generator.marshaller().root(), Some("complex"));
    }

    #[test]
    fn test_strict_mode_rejects_unbound_prefix() {
        let generator = XmlStreamGenerator::with_config(Verbatim, GeneratorConfig::strict());
        let err = generator
            .produce_with("<x:r/>", io::sink(), PassThrough)
            .unwrap_err();
        assert!(matches!(err, TransformError::Parse(_)));
    }
}
