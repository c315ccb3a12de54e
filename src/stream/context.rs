//! Per-run context handed to the filter: the ancestor stack and the state store

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::reader::events::StartElement;

/// Start elements of the currently open ancestors, outermost first.
///
/// While the filter sees a start element it is already on top of the stack;
/// while it sees an end element the matching start is still on top.
#[derive(Debug, Clone, Default)]
pub struct ElementStack<'a> {
    elements: Vec<StartElement<'a>>,
}

impl<'a> ElementStack<'a> {
    pub fn new() -> Self {
        ElementStack {
            elements: Vec::with_capacity(32),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Same as [`len`](Self::len): the document element is depth 1
    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Innermost open element
    pub fn top(&self) -> Option<&StartElement<'a>> {
        self.elements.last()
    }

    /// Element directly below the top
    pub fn parent(&self) -> Option<&StartElement<'a>> {
        let len = self.elements.len();
        if len < 2 {
            return None;
        }
        self.elements.get(len - 2)
    }

    /// Element at `index`, counted from the document element (0)
    pub fn get(&self, index: usize) -> Option<&StartElement<'a>> {
        self.elements.get(index)
    }

    /// Outermost to innermost
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StartElement<'a>> + ExactSizeIterator {
        self.elements.iter()
    }

    /// Whether any open element has this local name
    pub fn contains(&self, local_name: &str) -> bool {
        self.elements
            .iter()
            .any(|e| e.local_name() == local_name.as_bytes())
    }

    /// `/complex/others/other` style path of the open elements
    pub fn path(&self) -> String {
        let mut path = String::new();
        for elem in &self.elements {
            path.push('/');
            path.push_str(&String::from_utf8_lossy(&elem.name));
        }
        path
    }

    pub(crate) fn push(&mut self, elem: StartElement<'a>) {
        self.elements.push(elem);
    }

    pub(crate) fn pop(&mut self) -> Option<StartElement<'a>> {
        self.elements.pop()
    }
}

/// Mutable key/value store that lives for one run.
///
/// Values are typed at the call site; a lookup with the wrong type behaves
/// like a missing key.
#[derive(Default)]
pub struct StateMap {
    values: HashMap<String, Box<dyn Any>>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn insert<V: Any>(&mut self, key: impl Into<String>, value: V) {
        self.values.insert(key.into(), Box::new(value));
    }

    pub fn get<V: Any>(&self, key: &str) -> Option<&V> {
        self.values.get(key).and_then(|v| v.downcast_ref::<V>())
    }

    pub fn get_mut<V: Any>(&mut self, key: &str) -> Option<&mut V> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut::<V>())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove a key whatever its type. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Remove and return a value of type `V`. A value of another type stays.
    pub fn take<V: Any>(&mut self, key: &str) -> Option<V> {
        let (key, value) = self.values.remove_entry(key)?;
        match value.downcast::<V>() {
            Ok(value) => Some(*value),
            Err(value) => {
                self.values.insert(key, value);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for StateMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("StateMap").field("keys", &keys).finish()
    }
}
