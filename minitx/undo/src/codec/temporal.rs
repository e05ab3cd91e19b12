//! Codecs for absolute timestamps and zone-less local date-times.
//!
//! Most captured values carry no sub-millisecond data, so the common case
//! encodes as a bare epoch-millisecond integer. A value with a
//! sub-millisecond remainder encodes as `[epoch_millis, nanos_of_second]`,
//! carrying the original nanosecond-of-second component so the source value
//! reconstructs exactly.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use minitx_common::codec::{CodecRegistry, ValueDecoder, ValueEncoder, tags};
use minitx_common::error::{CodecError, CodecResult};
use minitx_common::value::CellValue;
use serde_json::{Value as JsonValue, json};

use super::zone_offset;

pub(crate) const NANOS_PER_MILLI: u32 = 1_000_000;

/// Scalar when the instant has no sub-millisecond remainder, otherwise
/// `[epoch_millis, nanos_of_second]`.
pub(crate) fn encode_instant(instant: &DateTime<Utc>) -> JsonValue {
    let millis = instant.timestamp_millis();
    let nanos = instant.timestamp_subsec_nanos();
    if nanos % NANOS_PER_MILLI == 0 {
        json!(millis)
    } else {
        json!([millis, nanos])
    }
}

/// Inverse of [`encode_instant`]. A one-element array carries no nanosecond
/// remainder and decodes like the scalar form.
pub(crate) fn decode_instant(payload: &JsonValue) -> CodecResult<DateTime<Utc>> {
    match payload {
        JsonValue::Number(_) => {
            let millis = payload.as_i64().ok_or_else(|| malformed(payload))?;
            instant_from_millis(millis)
        }
        JsonValue::Array(parts) => {
            let millis = parts
                .first()
                .and_then(JsonValue::as_i64)
                .ok_or_else(|| malformed(payload))?;
            let mut instant = instant_from_millis(millis)?;
            if let Some(nanos) = parts.get(1).and_then(JsonValue::as_i64) {
                instant = instant + Duration::nanoseconds(nanos % i64::from(NANOS_PER_MILLI));
            }
            Ok(instant)
        }
        _ => Err(malformed(payload)),
    }
}

fn instant_from_millis(millis: i64) -> CodecResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| CodecError::MalformedValue(format!("epoch millis {millis} out of range")))
}

fn malformed(payload: &JsonValue) -> CodecError {
    CodecError::MalformedValue(format!("invalid temporal payload: {payload}"))
}

struct TimestampCodec;

impl ValueEncoder for TimestampCodec {
    fn encode(&self, value: &CellValue) -> CodecResult<JsonValue> {
        match value {
            CellValue::Timestamp(instant) => Ok(encode_instant(instant)),
            _ => Err(CodecError::UnsupportedValue(tags::TIMESTAMP.to_owned())),
        }
    }
}

impl ValueDecoder for TimestampCodec {
    fn decode(&self, payload: &JsonValue) -> CodecResult<CellValue> {
        decode_instant(payload).map(CellValue::Timestamp)
    }
}

/// Local date-times do not carry a zone of their own; they are bound to the
/// process-wide configured zone on both sides, so historically encoded logs
/// read back consistently cluster-wide.
struct LocalDateTimeCodec;

impl ValueEncoder for LocalDateTimeCodec {
    fn encode(&self, value: &CellValue) -> CodecResult<JsonValue> {
        let CellValue::DateTime(local) = value else {
            return Err(CodecError::UnsupportedValue(tags::DATE_TIME.to_owned()));
        };
        let zone = zone_offset();
        let instant = local
            .and_local_timezone(zone)
            .single()
            .ok_or_else(|| {
                CodecError::MalformedValue(format!(
                    "local date-time {local} is ambiguous in zone {zone}"
                ))
            })?
            .with_timezone(&Utc);
        Ok(encode_instant(&instant))
    }
}

impl ValueDecoder for LocalDateTimeCodec {
    fn decode(&self, payload: &JsonValue) -> CodecResult<CellValue> {
        let instant = decode_instant(payload)?;
        Ok(CellValue::DateTime(
            instant.with_timezone(&zone_offset()).naive_local(),
        ))
    }
}

pub(crate) fn install(registry: &mut CodecRegistry) {
    let timestamp = Arc::new(TimestampCodec);
    registry.install_encoder(tags::TIMESTAMP, timestamp.clone());
    registry.install_decoder(tags::TIMESTAMP, timestamp);

    let local = Arc::new(LocalDateTimeCodec);
    registry.install_encoder(tags::DATE_TIME, local.clone());
    registry.install_decoder(tags::DATE_TIME, local);
}
