//! XML Encoding Detection and Conversion
//!
//! Marshalled documents are normally UTF-8, but a custom marshaller may
//! produce UTF-16. Everything is normalised to BOM-less UTF-8 before the
//! reader sees it.

use crate::error::StreamInitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        match input {
            [0xFF, 0xFE, ..] => XmlEncoding::Utf16Le,
            [0xFE, 0xFF, ..] => XmlEncoding::Utf16Be,
            // No BOM: '<' next to a NUL byte
            [0x00, b'<', ..] => XmlEncoding::Utf16Be,
            [b'<', 0x00, ..] => XmlEncoding::Utf16Le,
            _ => XmlEncoding::Utf8,
        }
    }
}

/// Convert a document buffer to UTF-8, dropping any byte order mark
pub fn convert_to_utf8(input: Vec<u8>) -> Result<Vec<u8>, StreamInitError> {
    match XmlEncoding::detect(&input) {
        XmlEncoding::Utf8 => {
            let body = input.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&input);
            if let Err(err) = std::str::from_utf8(body) {
                return Err(StreamInitError::Encoding(format!("invalid UTF-8: {err}")));
            }
            if body.len() == input.len() {
                Ok(input)
            } else {
                Ok(body.to_vec())
            }
        }
        XmlEncoding::Utf16Le => decode_utf16(&input, [0xFF, 0xFE], u16::from_le_bytes, "UTF-16 LE"),
        XmlEncoding::Utf16Be => decode_utf16(&input, [0xFE, 0xFF], u16::from_be_bytes, "UTF-16 BE"),
    }
}

fn decode_utf16(
    input: &[u8],
    bom: [u8; 2],
    unit: fn([u8; 2]) -> u16,
    label: &str,
) -> Result<Vec<u8>, StreamInitError> {
    let bytes = input.strip_prefix(&bom).unwrap_or(input);

    if bytes.len() % 2 != 0 {
        return Err(StreamInitError::Encoding(format!("invalid {label}: odd number of bytes")));
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&code_units)
        .map(String::into_bytes)
        .map_err(|e| StreamInitError::Encoding(format!("invalid {label}: {e}")))
}
