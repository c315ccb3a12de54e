//! Namespace Resolution
//!
//! Stack-based prefix → URI bindings, shared by the reader (to resolve
//! element namespaces) and the writer (to keep output prefixes bound).

use super::attributes::Attribute;

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &[u8] = b"http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &[u8] = b"http://www.w3.org/2000/xmlns/";
}

/// Namespace binding (prefix -> URI); the default namespace has an empty prefix
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: Vec<u8>,
    uri: Vec<u8>,
    depth: usize,
}

/// Stack-based namespace resolver
#[derive(Debug)]
pub struct NamespaceScope {
    bindings: Vec<NsBinding>,
    depth: usize,
}

impl Default for NamespaceScope {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceScope {
    /// Create a resolver with the xml and xmlns prefixes pre-bound
    pub fn new() -> Self {
        NamespaceScope {
            bindings: vec![
                NsBinding { prefix: b"xml".to_vec(), uri: ns::XML.to_vec(), depth: 0 },
                NsBinding { prefix: b"xmlns".to_vec(), uri: ns::XMLNS.to_vec(), depth: 0 },
            ],
            depth: 0,
        }
    }

    /// Enter an element scope and record the declarations among its attributes
    pub fn push_scope(&mut self, attributes: &[Attribute<'_>]) {
        self.depth += 1;
        for attr in attributes {
            if let Some(prefix) = attr.declared_prefix() {
                self.bindings.push(NsBinding {
                    prefix: prefix.to_vec(),
                    uri: attr.value.to_vec(),
                    depth: self.depth,
                });
            }
        }
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while let Some(binding) = self.bindings.last() {
            if binding.depth < self.depth {
                break;
            }
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Resolve a prefix (`None` for unprefixed names) to its URI.
    /// An unprefixed name with no default namespace, or one undeclared with
    /// `xmlns=""`, has no namespace.
    pub fn resolve(&self, prefix: Option<&[u8]>) -> Option<&[u8]> {
        let prefix = prefix.unwrap_or(b"");
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_slice())
            .filter(|uri| !uri.is_empty())
    }

    /// Whether a prefix is usable here
    pub fn is_bound(&self, prefix: &[u8]) -> bool {
        self.resolve(Some(prefix)).is_some()
    }
}
