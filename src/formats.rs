use std::fmt::Debug;

use crate::error::{SerializationError, SerializationResult};
use crate::models::Document;

/// A wire encoding for parsed documents.
pub trait DocumentFormat: Send + Sync + Debug {
    /// Name used to select this format, such as `cbor`
    fn name(&self) -> &'static str;

    /// Serialize a document into bytes
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::SerializationFailed`] if encoding fails.
    fn serialize(&self, doc: &Document) -> SerializationResult<Vec<u8>>;

    /// Deserialize bytes into a document
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::DeserializationFailed`] for malformed input.
    fn deserialize(&self, data: &[u8]) -> SerializationResult<Document>;
}

/// Compact binary encoding, used for caching parsed documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct CborFormat;

impl DocumentFormat for CborFormat {
    fn name(&self) -> &'static str {
        "cbor"
    }

    fn serialize(&self, doc: &Document) -> SerializationResult<Vec<u8>> {
        serde_cbor::to_vec(doc).map_err(|e| SerializationError::serialization_failed(e.to_string()))
    }

    fn deserialize(&self, data: &[u8]) -> SerializationResult<Document> {
        serde_cbor::from_slice(data)
            .map_err(|e| SerializationError::deserialization_failed(e.to_string()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl DocumentFormat for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn serialize(&self, doc: &Document) -> SerializationResult<Vec<u8>> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(doc)
        } else {
            serde_json::to_vec(doc)
        };
        encoded.map_err(|e| SerializationError::serialization_failed(e.to_string()))
    }

    fn deserialize(&self, data: &[u8]) -> SerializationResult<Document> {
        serde_json::from_slice(data)
            .map_err(|e| SerializationError::deserialization_failed(e.to_string()))
    }
}

/// Look up a format by name.
///
/// # Errors
///
/// Returns [`SerializationError::UnsupportedFormat`] for unknown names.
pub fn format_for(name: &str) -> SerializationResult<Box<dyn DocumentFormat>> {
    match name.to_ascii_lowercase().as_str() {
        "cbor" => Ok(Box::new(CborFormat)),
        "json" => Ok(Box::new(JsonFormat { pretty: false })),
        "json-pretty" => Ok(Box::new(JsonFormat { pretty: true })),
        _ => Err(SerializationError::unsupported_format(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    fn sample() -> Document {
        parse_document("#* Intro\n\nSome *text* with $x^2$.\n\n$$[eq1] a = b $$").unwrap()
    }

    #[test]
    fn test_cbor_preserves_document() {
        let doc = sample();
        let bytes = CborFormat.serialize(&doc).unwrap();
        assert_eq!(CborFormat.deserialize(&bytes).unwrap(), doc);
    }

    #[test]
    fn test_json_tags_blocks_by_kind() {
        let doc = sample();
        let text = String::from_utf8(JsonFormat::default().serialize(&doc).unwrap()).unwrap();
        assert!(text.contains("Heading"));
        assert!(text.contains("Equation"));
        assert_eq!(JsonFormat::default().deserialize(text.as_bytes()).unwrap(), doc);
    }

    #[test]
    fn test_malformed_input() {
        let err = CborFormat.deserialize(b"\xff\x00").unwrap_err();
        assert!(matches!(err, SerializationError::DeserializationFailed(_)));
    }

    #[test]
    fn test_format_lookup() {
        assert_eq!(format_for("CBOR").unwrap().name(), "cbor");
        assert_eq!(format_for("json-pretty").unwrap().name(), "json");
        assert!(matches!(
            format_for("yaml").unwrap_err(),
            SerializationError::UnsupportedFormat(_)
        ));
    }
}
