//! Pluggable per-type value codec tables.
//!
//! Every polymorphic column value encodes as a two-element array
//! `[<type-tag>, <payload>]`; the tag names the codec responsible for the
//! payload, so a decoder reconstructs the exact original type with no
//! external schema. The tables are assembled once at startup and treated as
//! immutable afterwards; concurrent encode/decode needs no caller locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::{CodecError, CodecResult};
use crate::value::CellValue;

/// Type identifiers of the built-in value codecs.
pub mod tags {
    pub const NULL: &str = "Null";
    pub const BOOL: &str = "Bool";
    pub const INT8: &str = "Int8";
    pub const INT16: &str = "Int16";
    pub const INT32: &str = "Int32";
    pub const INT64: &str = "Int64";
    pub const UINT8: &str = "UInt8";
    pub const UINT16: &str = "UInt16";
    pub const UINT32: &str = "UInt32";
    pub const UINT64: &str = "UInt64";
    pub const FLOAT32: &str = "Float32";
    pub const FLOAT64: &str = "Float64";
    pub const DECIMAL: &str = "Decimal";
    pub const STRING: &str = "String";
    pub const BLOB: &str = "Blob";
    pub const CLOB: &str = "Clob";
    pub const DATE: &str = "Date";
    pub const TIME: &str = "Time";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const DATE_TIME: &str = "DateTime";
    pub const JSON: &str = "Json";
}

/// Encodes one value kind into its JSON payload.
pub trait ValueEncoder: Send + Sync {
    fn encode(&self, value: &CellValue) -> CodecResult<JsonValue>;
}

/// Decodes one value kind from its JSON payload.
pub trait ValueDecoder: Send + Sync {
    fn decode(&self, payload: &JsonValue) -> CodecResult<CellValue>;
}

/// The per-type codec tables consulted for every polymorphic value.
#[derive(Default)]
pub struct CodecRegistry {
    encoders: HashMap<String, Arc<dyn ValueEncoder>>,
    decoders: HashMap<String, Arc<dyn ValueDecoder>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an encoder for `tag`, replacing any previous one.
    pub fn install_encoder(&mut self, tag: impl Into<String>, encoder: Arc<dyn ValueEncoder>) {
        self.encoders.insert(tag.into(), encoder);
    }

    /// Install a decoder for `tag`, replacing any previous one.
    pub fn install_decoder(&mut self, tag: impl Into<String>, decoder: Arc<dyn ValueDecoder>) {
        self.decoders.insert(tag.into(), decoder);
    }

    pub fn has_encoder(&self, tag: &str) -> bool {
        self.encoders.contains_key(tag)
    }

    pub fn has_decoder(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Encode a value into its tagged envelope.
    ///
    /// A value whose type has no installed encoder is a record-level error.
    /// A failure inside the codec itself degrades the field to null: the log
    /// entry records the loss and the rest of the record still encodes.
    pub fn encode_value(&self, value: &CellValue) -> CodecResult<JsonValue> {
        if value.is_null() {
            return Ok(JsonValue::Null);
        }
        let tag = value.type_tag();
        let encoder = self
            .encoders
            .get(tag)
            .ok_or_else(|| CodecError::NoEncoder(tag.to_owned()))?;
        match encoder.encode(value) {
            Ok(payload) => Ok(JsonValue::Array(vec![
                JsonValue::String(tag.to_owned()),
                payload,
            ])),
            Err(err) => {
                tracing::error!(tag, error = %err, "value encode failed, degrading field to null");
                Ok(JsonValue::Null)
            }
        }
    }

    /// Decode a tagged envelope back into a value.
    ///
    /// An unknown type tag or a malformed envelope is a record-level error;
    /// a failure inside an installed codec degrades the field to null.
    pub fn decode_value(&self, raw: &JsonValue) -> CodecResult<CellValue> {
        let parts = match raw {
            JsonValue::Null => return Ok(CellValue::Null),
            JsonValue::Array(parts) if parts.len() == 2 => parts,
            other => {
                return Err(CodecError::MalformedValue(format!(
                    "expected null or [tag, payload], got {other}"
                )));
            }
        };
        let tag = parts[0]
            .as_str()
            .ok_or_else(|| CodecError::MalformedValue("type tag is not a string".to_owned()))?;
        let decoder = self
            .decoders
            .get(tag)
            .ok_or_else(|| CodecError::UnknownTypeTag(tag.to_owned()))?;
        match decoder.decode(&parts[1]) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::error!(tag, error = %err, "value decode failed, degrading field to null");
                Ok(CellValue::Null)
            }
        }
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("encoders", &self.encoders.keys().collect::<Vec<_>>())
            .field("decoders", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

static ACTIVE_REGISTRY: LazyLock<RwLock<Arc<CodecRegistry>>> =
    LazyLock::new(|| RwLock::new(Arc::new(CodecRegistry::default())));

/// Swap the process-wide active registry. Called once at startup by the
/// envelope codec's `init`; the installed registry is immutable afterwards.
pub fn install_registry(registry: Arc<CodecRegistry>) {
    *ACTIVE_REGISTRY.write() = registry;
}

/// The registry consulted by [`CellValue`]'s serde implementations.
pub fn active_registry() -> Arc<CodecRegistry> {
    ACTIVE_REGISTRY.read().clone()
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tagged = active_registry()
            .encode_value(self)
            .map_err(serde::ser::Error::custom)?;
        tagged.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = JsonValue::deserialize(deserializer)?;
        active_registry()
            .decode_value(&raw)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FixedEncoder(JsonValue);

    impl ValueEncoder for FixedEncoder {
        fn encode(&self, _value: &CellValue) -> CodecResult<JsonValue> {
            Ok(self.0.clone())
        }
    }

    struct FailingEncoder;

    impl ValueEncoder for FailingEncoder {
        fn encode(&self, _value: &CellValue) -> CodecResult<JsonValue> {
            Err(CodecError::LobFreed)
        }
    }

    struct FailingDecoder;

    impl ValueDecoder for FailingDecoder {
        fn decode(&self, _payload: &JsonValue) -> CodecResult<CellValue> {
            Err(CodecError::MalformedValue("boom".to_owned()))
        }
    }

    #[test]
    fn test_null_bypasses_codec_lookup() {
        let registry = CodecRegistry::new();
        assert_eq!(
            registry.encode_value(&CellValue::Null).unwrap(),
            JsonValue::Null
        );
        assert_eq!(
            registry.decode_value(&JsonValue::Null).unwrap(),
            CellValue::Null
        );
    }

    #[test]
    fn test_missing_encoder_is_a_hard_error() {
        let registry = CodecRegistry::new();
        let err = registry.encode_value(&CellValue::Int32(1)).unwrap_err();
        assert!(matches!(err, CodecError::NoEncoder(tag) if tag == "Int32"));
    }

    #[test]
    fn test_unknown_tag_is_a_hard_error() {
        let registry = CodecRegistry::new();
        let err = registry.decode_value(&json!(["Mystery", 1])).unwrap_err();
        assert!(matches!(err, CodecError::UnknownTypeTag(tag) if tag == "Mystery"));
    }

    #[test]
    fn test_malformed_envelope_is_a_hard_error() {
        let registry = CodecRegistry::new();
        for raw in [json!(5), json!("x"), json!(["OnlyTag"]), json!([1, 2, 3])] {
            assert!(matches!(
                registry.decode_value(&raw),
                Err(CodecError::MalformedValue(_))
            ));
        }
    }

    #[test]
    fn test_codec_failure_degrades_to_null() {
        let mut registry = CodecRegistry::new();
        registry.install_encoder(tags::BLOB, Arc::new(FailingEncoder));
        registry.install_decoder(tags::INT32, Arc::new(FailingDecoder));

        let encoded = registry
            .encode_value(&CellValue::Blob(crate::value::Blob::new(vec![1u8])))
            .unwrap();
        assert_eq!(encoded, JsonValue::Null);

        let decoded = registry.decode_value(&json!(["Int32", "bad"])).unwrap();
        assert_eq!(decoded, CellValue::Null);
    }

    #[test]
    fn test_later_install_replaces_earlier() {
        let mut registry = CodecRegistry::new();
        registry.install_encoder(tags::INT32, Arc::new(FailingEncoder));
        registry.install_encoder(tags::INT32, Arc::new(FixedEncoder(json!(42))));
        let encoded = registry.encode_value(&CellValue::Int32(0)).unwrap();
        assert_eq!(encoded, json!(["Int32", 42]));
    }
}
