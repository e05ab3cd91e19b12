use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::codec::tags;
use crate::error::{CodecError, CodecResult};

/// Binary large object captured from a row image.
///
/// The underlying buffer can be freed by the driver after the statement
/// completes; byte access on a freed blob fails with [`CodecError::LobFreed`]
/// instead of panicking, so the codec can degrade the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    bytes: Option<Vec<u8>>,
}

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
        }
    }

    /// Full byte range of the object.
    pub fn bytes(&self) -> CodecResult<&[u8]> {
        self.bytes.as_deref().ok_or(CodecError::LobFreed)
    }

    /// Reported length of the object.
    pub fn length(&self) -> CodecResult<usize> {
        Ok(self.bytes()?.len())
    }

    pub fn is_freed(&self) -> bool {
        self.bytes.is_none()
    }

    /// Invalidate the object. Subsequent byte access fails.
    pub fn free(&mut self) {
        self.bytes = None;
    }
}

/// Character large object captured from a row image.
///
/// Shares the freed-state behavior of [`Blob`].
#[derive(Debug, Clone, PartialEq)]
pub struct Clob {
    chars: Option<String>,
}

impl Clob {
    pub fn new(chars: impl Into<String>) -> Self {
        Self {
            chars: Some(chars.into()),
        }
    }

    /// Scoped view over the full character sequence.
    pub fn chars(&self) -> CodecResult<&str> {
        self.chars.as_deref().ok_or(CodecError::LobFreed)
    }

    /// Reported length of the object, in characters.
    pub fn length(&self) -> CodecResult<usize> {
        Ok(self.chars()?.chars().count())
    }

    pub fn is_freed(&self) -> bool {
        self.chars.is_none()
    }

    /// Invalidate the object. Subsequent character access fails.
    pub fn free(&mut self) {
        self.chars = None;
    }
}

/// Capability surface of a proprietary driver timestamp.
///
/// The concrete type lives in a driver integration crate that is not a
/// compile-time dependency of the codec; values reach the codec only behind
/// this trait, and new values are constructed through a vendor adapter
/// resolved by its fully qualified type name at startup.
pub trait VendorTimestamp: fmt::Debug + Send + Sync {
    /// Fully qualified name of the driver type, e.g. `dmdb.DmdbTimestamp`.
    fn type_name(&self) -> &str;

    /// Nanosecond-of-second component of the value.
    fn nanos_of_second(&self) -> u32;

    /// Convert the value to an absolute instant.
    fn to_instant(&self) -> CodecResult<DateTime<Utc>>;
}

/// A column value defined outside this workspace and handled by an
/// externally registered codec provider.
pub trait ExtensionValue: fmt::Debug + Send + Sync {
    /// Type identifier under which the owning provider registered its codec.
    fn type_tag(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn eq_value(&self, other: &dyn ExtensionValue) -> bool;
}

/// A single column value inside a row image.
///
/// The codec round-trips every variant without narrowing: the encoded form
/// carries an explicit type tag, so the decoder reconstructs the exact
/// original variant without any external schema.
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    /// Exact decimal literal. Kept as text so no precision is lost.
    Decimal(String),
    String(String),
    Blob(Blob),
    Clob(Clob),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Absolute instant with nanosecond precision.
    Timestamp(DateTime<Utc>),
    /// Zone-less local date-time with nanosecond precision.
    DateTime(NaiveDateTime),
    /// Proprietary driver timestamp, present only in some deployments.
    Vendor(Arc<dyn VendorTimestamp>),
    /// Externally defined value handled by a provider-registered codec.
    Extension(Arc<dyn ExtensionValue>),
    /// Structural degrade for values that encode as nested array/object data.
    Json(serde_json::Value),
}

impl CellValue {
    /// The type identifier this value encodes under.
    pub fn type_tag(&self) -> &str {
        match self {
            CellValue::Null => tags::NULL,
            CellValue::Bool(_) => tags::BOOL,
            CellValue::Int8(_) => tags::INT8,
            CellValue::Int16(_) => tags::INT16,
            CellValue::Int32(_) => tags::INT32,
            CellValue::Int64(_) => tags::INT64,
            CellValue::UInt8(_) => tags::UINT8,
            CellValue::UInt16(_) => tags::UINT16,
            CellValue::UInt32(_) => tags::UINT32,
            CellValue::UInt64(_) => tags::UINT64,
            CellValue::Float32(_) => tags::FLOAT32,
            CellValue::Float64(_) => tags::FLOAT64,
            CellValue::Decimal(_) => tags::DECIMAL,
            CellValue::String(_) => tags::STRING,
            CellValue::Blob(_) => tags::BLOB,
            CellValue::Clob(_) => tags::CLOB,
            CellValue::Date(_) => tags::DATE,
            CellValue::Time(_) => tags::TIME,
            CellValue::Timestamp(_) => tags::TIMESTAMP,
            CellValue::DateTime(_) => tags::DATE_TIME,
            CellValue::Vendor(value) => value.type_name(),
            CellValue::Extension(value) => value.type_tag(),
            CellValue::Json(_) => tags::JSON,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        use CellValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int8(a), Int8(b)) => a == b,
            (Int16(a), Int16(b)) => a == b,
            (Int32(a), Int32(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (UInt8(a), UInt8(b)) => a == b,
            (UInt16(a), UInt16(b)) => a == b,
            (UInt32(a), UInt32(b)) => a == b,
            (UInt64(a), UInt64(b)) => a == b,
            (Float32(a), Float32(b)) => a == b,
            (Float64(a), Float64(b)) => a == b,
            (Decimal(a), Decimal(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Blob(a), Blob(b)) => a == b,
            (Clob(a), Clob(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Vendor(a), Vendor(b)) => {
                a.type_name() == b.type_name()
                    && a.nanos_of_second() == b.nanos_of_second()
                    && matches!((a.to_instant(), b.to_instant()), (Ok(x), Ok(y)) if x == y)
            }
            (Extension(a), Extension(b)) => a.eq_value(b.as_ref()),
            (Json(a), Json(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! for_each_plain_variant {
    ($m:ident) => {
        $m!(try_as_bool, bool, Bool);
        $m!(try_as_int8, i8, Int8);
        $m!(try_as_int16, i16, Int16);
        $m!(try_as_int32, i32, Int32);
        $m!(try_as_int64, i64, Int64);
        $m!(try_as_uint8, u8, UInt8);
        $m!(try_as_uint16, u16, UInt16);
        $m!(try_as_uint32, u32, UInt32);
        $m!(try_as_uint64, u64, UInt64);
        $m!(try_as_float32, f32, Float32);
        $m!(try_as_float64, f64, Float64);
        $m!(try_as_string, String, String);
        $m!(try_as_blob, Blob, Blob);
        $m!(try_as_clob, Clob, Clob);
        $m!(try_as_date, NaiveDate, Date);
        $m!(try_as_time, NaiveTime, Time);
        $m!(try_as_datetime, NaiveDateTime, DateTime);
    };
}

macro_rules! impl_from_for_variant {
    ($_name:ident, $ty:ty, $variant:ident) => {
        impl From<$ty> for CellValue {
            #[inline]
            fn from(value: $ty) -> Self {
                CellValue::$variant(value)
            }
        }
    };
}

for_each_plain_variant!(impl_from_for_variant);

impl From<&str> for CellValue {
    #[inline]
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<DateTime<Utc>> for CellValue {
    #[inline]
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::Timestamp(value)
    }
}

macro_rules! impl_try_as_for_variant {
    ($name:ident, $ty:ty, $variant:ident) => {
        impl CellValue {
            #[doc = concat!(" Attempts to downcast `self` to borrowed `", stringify!($ty), "`, returning `None` if not possible.")]
            #[inline]
            pub fn $name(&self) -> Option<&$ty> {
                match self {
                    CellValue::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

for_each_plain_variant!(impl_try_as_for_variant);

impl CellValue {
    /// Attempts to downcast `self` to a borrowed decimal literal.
    #[inline]
    pub fn try_as_decimal(&self) -> Option<&str> {
        match self {
            CellValue::Decimal(value) => Some(value),
            _ => None,
        }
    }

    /// Attempts to downcast `self` to a borrowed absolute timestamp.
    #[inline]
    pub fn try_as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            CellValue::Timestamp(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_free_invalidates_access() {
        let mut blob = Blob::new(vec![1u8, 2, 3]);
        assert_eq!(blob.bytes().unwrap(), &[1, 2, 3]);
        assert_eq!(blob.length().unwrap(), 3);
        assert!(!blob.is_freed());

        blob.free();
        assert!(blob.is_freed());
        assert!(matches!(blob.bytes(), Err(CodecError::LobFreed)));
    }

    #[test]
    fn test_clob_length_counts_chars() {
        let clob = Clob::new("héllo");
        assert_eq!(clob.length().unwrap(), 5);
        assert_eq!(clob.chars().unwrap(), "héllo");
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(CellValue::from(42i32), CellValue::Int32(42));
        assert_eq!(CellValue::from("abc"), CellValue::String("abc".into()));
        assert_eq!(CellValue::from(true), CellValue::Bool(true));
    }

    #[test]
    fn test_try_as_downcasts() {
        let value = CellValue::Int64(7);
        assert_eq!(value.try_as_int64(), Some(&7));
        assert_eq!(value.try_as_int32(), None);
    }

    #[test]
    fn test_type_tags_are_distinct_per_variant() {
        assert_eq!(CellValue::Int32(1).type_tag(), "Int32");
        assert_eq!(CellValue::Int64(1).type_tag(), "Int64");
        assert_ne!(
            CellValue::Timestamp(Utc::now()).type_tag(),
            CellValue::Json(serde_json::Value::Null).type_tag()
        );
    }
}
