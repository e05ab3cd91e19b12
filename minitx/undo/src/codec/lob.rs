//! Codecs for binary and character large objects.
//!
//! A large object can be invalidated by the driver between capture and
//! encode; that failure degrades the field instead of discarding the record.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use minitx_common::codec::{CodecRegistry, ValueDecoder, ValueEncoder, tags};
use minitx_common::error::{CodecError, CodecResult};
use minitx_common::value::{Blob, CellValue, Clob};
use serde_json::{Value as JsonValue, json};

struct BlobCodec;

impl ValueEncoder for BlobCodec {
    fn encode(&self, value: &CellValue) -> CodecResult<JsonValue> {
        match value {
            CellValue::Blob(blob) => Ok(json!(STANDARD.encode(blob.bytes()?))),
            _ => Err(CodecError::UnsupportedValue(tags::BLOB.to_owned())),
        }
    }
}

impl ValueDecoder for BlobCodec {
    fn decode(&self, payload: &JsonValue) -> CodecResult<CellValue> {
        let text = payload.as_str().ok_or_else(|| {
            CodecError::MalformedValue(format!("invalid `Blob` payload: {payload}"))
        })?;
        let bytes = STANDARD
            .decode(text)
            .map_err(|err| CodecError::MalformedValue(format!("invalid base64 payload: {err}")))?;
        Ok(CellValue::Blob(Blob::new(bytes)))
    }
}

struct ClobCodec;

impl ValueEncoder for ClobCodec {
    fn encode(&self, value: &CellValue) -> CodecResult<JsonValue> {
        match value {
            // The borrow scopes the character stream; it is released on
            // every exit path, including the freed-object failure.
            CellValue::Clob(clob) => Ok(json!(clob.chars()?)),
            _ => Err(CodecError::UnsupportedValue(tags::CLOB.to_owned())),
        }
    }
}

impl ValueDecoder for ClobCodec {
    fn decode(&self, payload: &JsonValue) -> CodecResult<CellValue> {
        let text = payload.as_str().ok_or_else(|| {
            CodecError::MalformedValue(format!("invalid `Clob` payload: {payload}"))
        })?;
        Ok(CellValue::Clob(Clob::new(text)))
    }
}

pub(crate) fn install(registry: &mut CodecRegistry) {
    let blob = Arc::new(BlobCodec);
    registry.install_encoder(tags::BLOB, blob.clone());
    registry.install_decoder(tags::BLOB, blob);

    let clob = Arc::new(ClobCodec);
    registry.install_encoder(tags::CLOB, clob.clone());
    registry.install_decoder(tags::CLOB, clob);
}
