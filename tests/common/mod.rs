//! Test infrastructure for the transformation scenarios
//!
//! Models of the `complex` document, deterministic fixtures and helpers for
//! running a filter and reading the result back.

#![allow(dead_code)]

mod models;

pub use models::{ComplexBean, ComplexThing, Others, Things};

use xmlsplice::{parse_events, Emitter, ElementStack, SerdeMarshaller, StateMap, XmlEvent, XmlStreamGenerator};

/// The words injected by the splicing scenarios
pub const NEW_OTHERS: &str = "This is a new set äöüß <>& of others";

pub const DATE: &str = "2024-05-01T12:00:00+02:00";

/// A thing with ten `other` values and `inner` levels of nested things
pub fn thing(inner: u32) -> ComplexThing {
    ComplexThing {
        others: Some(Others::new((0..10).map(|i| (inner * 20 + i).to_string()))),
        a_string: Some("Internal String".to_string()),
        a_number: Some(1_000_000 + i64::from(inner)),
        a_date_with_zone: Some(DATE.to_string()),
        complex_element: (inner > 0).then(|| Box::new(thing(inner - 1))),
    }
}

/// The document every scenario starts from
pub fn bean() -> ComplexBean {
    ComplexBean {
        name: Some("attribute Name".to_string()),
        number: Some(4711),
        date: Some(DATE.to_string()),
        things: Some(Things {
            thing: (0..10).map(|_| thing(3)).collect(),
        }),
        others: Some(Others::new((0..10).map(|i| (i * 2).to_string()))),
        a_string: Some("Element on String".to_string()),
        a_number: Some(4712),
        a_date_with_zone: Some(DATE.to_string()),
        complex_element: Some(Box::new(thing(3))),
    }
}

pub fn generator() -> XmlStreamGenerator<SerdeMarshaller> {
    XmlStreamGenerator::new(SerdeMarshaller::new().with_root("complex").with_declaration(true))
}

/// Marshal the bean without any filtering
pub fn marshalled(bean: &ComplexBean) -> String {
    let mut out = Vec::new();
    generator()
        .produce(bean, &mut out, |_event, _stack, _state, _sink| Ok(true))
        .expect("pass-through run");
    String::from_utf8(out).expect("utf-8 output")
}

/// Run `filter` over the marshalled bean and return the output
pub fn produce<F>(bean: &ComplexBean, filter: F) -> String
where
    F: FnMut(&XmlEvent<'_>, &ElementStack<'_>, &mut StateMap, &mut Emitter<'_>) -> Result<bool, xmlsplice::DecisionError>,
{
    let mut out = Vec::new();
    generator().produce(bean, &mut out, filter).expect("transformation run");
    String::from_utf8(out).expect("utf-8 output")
}

/// Read an output document back into the model
pub fn read_back(xml: &str) -> ComplexBean {
    quick_xml::de::from_str(xml).unwrap_or_else(|e| panic!("output does not deserialize: {e}\n{xml}"))
}

/// Owned events of a document, for comparing documents structurally
pub fn events_of(xml: &str) -> Vec<XmlEvent<'static>> {
    parse_events(xml.as_bytes())
        .unwrap_or_else(|e| panic!("not well formed: {e}\n{xml}"))
        .into_iter()
        .map(XmlEvent::into_owned)
        .collect()
}
