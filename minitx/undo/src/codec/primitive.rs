//! Built-in codecs for the scalar value variants.

use std::sync::Arc;

use minitx_common::codec::{CodecRegistry, ValueDecoder, ValueEncoder, tags};
use minitx_common::error::{CodecError, CodecResult};
use minitx_common::value::CellValue;
use serde_json::{Value as JsonValue, json};

fn unsupported(tag: &str) -> CodecError {
    CodecError::UnsupportedValue(tag.to_owned())
}

fn malformed(tag: &str, payload: &JsonValue) -> CodecError {
    CodecError::MalformedValue(format!("invalid `{tag}` payload: {payload}"))
}

macro_rules! scalar_codec {
    ($codec:ident, $tag:expr, $variant:ident, |$v:ident| $to_json:expr, |$p:ident| $from_json:expr) => {
        struct $codec;

        impl ValueEncoder for $codec {
            fn encode(&self, value: &CellValue) -> CodecResult<JsonValue> {
                match value {
                    CellValue::$variant($v) => Ok($to_json),
                    _ => Err(unsupported($tag)),
                }
            }
        }

        impl ValueDecoder for $codec {
            fn decode(&self, $p: &JsonValue) -> CodecResult<CellValue> {
                $from_json
                    .map(CellValue::$variant)
                    .ok_or_else(|| malformed($tag, $p))
            }
        }
    };
}

scalar_codec!(BoolCodec, tags::BOOL, Bool, |v| json!(v), |p| p.as_bool());
scalar_codec!(Int8Codec, tags::INT8, Int8, |v| json!(v), |p| p
    .as_i64()
    .and_then(|n| i8::try_from(n).ok()));
scalar_codec!(Int16Codec, tags::INT16, Int16, |v| json!(v), |p| p
    .as_i64()
    .and_then(|n| i16::try_from(n).ok()));
scalar_codec!(Int32Codec, tags::INT32, Int32, |v| json!(v), |p| p
    .as_i64()
    .and_then(|n| i32::try_from(n).ok()));
scalar_codec!(Int64Codec, tags::INT64, Int64, |v| json!(v), |p| p.as_i64());
scalar_codec!(UInt8Codec, tags::UINT8, UInt8, |v| json!(v), |p| p
    .as_u64()
    .and_then(|n| u8::try_from(n).ok()));
scalar_codec!(UInt16Codec, tags::UINT16, UInt16, |v| json!(v), |p| p
    .as_u64()
    .and_then(|n| u16::try_from(n).ok()));
scalar_codec!(UInt32Codec, tags::UINT32, UInt32, |v| json!(v), |p| p
    .as_u64()
    .and_then(|n| u32::try_from(n).ok()));
scalar_codec!(UInt64Codec, tags::UINT64, UInt64, |v| json!(v), |p| p.as_u64());
scalar_codec!(Float32Codec, tags::FLOAT32, Float32, |v| json!(v), |p| p
    .as_f64()
    .map(|n| n as f32));
scalar_codec!(Float64Codec, tags::FLOAT64, Float64, |v| json!(v), |p| p.as_f64());
scalar_codec!(DecimalCodec, tags::DECIMAL, Decimal, |v| json!(v), |p| p
    .as_str()
    .map(str::to_owned));
scalar_codec!(StringCodec, tags::STRING, String, |v| json!(v), |p| p
    .as_str()
    .map(str::to_owned));
scalar_codec!(DateCodec, tags::DATE, Date, |v| json!(v.to_string()), |p| p
    .as_str()
    .and_then(|s| s.parse().ok()));
scalar_codec!(TimeCodec, tags::TIME, Time, |v| json!(v.to_string()), |p| p
    .as_str()
    .and_then(|s| s.parse().ok()));
scalar_codec!(JsonCodec, tags::JSON, Json, |v| v.clone(), |p| Some(p.clone()));

pub(crate) fn install(registry: &mut CodecRegistry) {
    macro_rules! install_pair {
        ($tag:expr, $codec:expr) => {
            let codec = Arc::new($codec);
            registry.install_encoder($tag, codec.clone());
            registry.install_decoder($tag, codec);
        };
    }

    install_pair!(tags::BOOL, BoolCodec);
    install_pair!(tags::INT8, Int8Codec);
    install_pair!(tags::INT16, Int16Codec);
    install_pair!(tags::INT32, Int32Codec);
    install_pair!(tags::INT64, Int64Codec);
    install_pair!(tags::UINT8, UInt8Codec);
    install_pair!(tags::UINT16, UInt16Codec);
    install_pair!(tags::UINT32, UInt32Codec);
    install_pair!(tags::UINT64, UInt64Codec);
    install_pair!(tags::FLOAT32, Float32Codec);
    install_pair!(tags::FLOAT64, Float64Codec);
    install_pair!(tags::DECIMAL, DecimalCodec);
    install_pair!(tags::STRING, StringCodec);
    install_pair!(tags::DATE, DateCodec);
    install_pair!(tags::TIME, TimeCodec);
    install_pair!(tags::JSON, JsonCodec);
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_scalar_codecs_round_trip() {
        let mut registry = CodecRegistry::new();
        install(&mut registry);

        let values = [
            CellValue::Bool(true),
            CellValue::Int8(-8),
            CellValue::Int64(i64::MIN),
            CellValue::UInt64(u64::MAX),
            CellValue::Float32(2.5),
            CellValue::Float64(-0.125),
            CellValue::Decimal("12345678901234567890.000000001".to_owned()),
            CellValue::String("undo".to_owned()),
            CellValue::Json(json!({"nested": [1, 2, 3]})),
        ];
        for value in values {
            let encoded = registry.encode_value(&value).unwrap();
            assert_eq!(registry.decode_value(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn test_date_codec_uses_iso_payload() {
        let mut registry = CodecRegistry::new();
        install(&mut registry);

        let date = CellValue::Date(NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        let encoded = registry.encode_value(&date).unwrap();
        assert_eq!(encoded, json!(["Date", "2023-11-14"]));
        assert_eq!(registry.decode_value(&encoded).unwrap(), date);
    }

    #[test]
    fn test_out_of_range_integer_payload_is_rejected() {
        let codec = Int8Codec;
        let err = codec.decode(&json!(1000)).unwrap_err();
        assert!(matches!(err, CodecError::MalformedValue(_)));
    }
}
