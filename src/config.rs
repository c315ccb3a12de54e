//! Configuration
//!
//! Plain structs with defaults. They deserialize with `#[serde(default)]`,
//! so a caller's config file only needs the keys it changes.

use serde::{Deserialize, Serialize};

/// Output options for [`XmlWriter`](crate::writer::XmlWriter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Write a start tag directly followed by its end tag as `<name/>`
    pub collapse_empty: bool,
    /// Reject elements whose prefix has no in-scope `xmlns:` declaration
    pub check_namespaces: bool,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` when the writer opens
    pub write_declaration: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            collapse_empty: true,
            check_namespaces: true,
            write_declaration: false,
        }
    }
}

/// Options for a transformation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Read the marshalled document in strict mode
    pub strict: bool,
    pub writer: WriterConfig,
}

impl GeneratorConfig {
    pub fn strict() -> Self {
        GeneratorConfig {
            strict: true,
            ..Default::default()
        }
    }

    pub fn with_writer(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert!(!config.strict);
        assert!(config.writer.collapse_empty);
        assert!(config.writer.check_namespaces);
        assert!(!config.writer.write_declaration);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: GeneratorConfig =
            quick_xml::de::from_str("<config><strict>true</strict><writer><collapse_empty>false</collapse_empty></writer></config>")
                .unwrap();
        assert!(config.strict);
        assert!(!config.writer.collapse_empty);
        assert!(config.writer.check_namespaces);
    }
}
