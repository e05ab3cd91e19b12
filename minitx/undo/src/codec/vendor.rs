//! Optional codec for a proprietary driver timestamp.
//!
//! The driver type is referenced only by its fully qualified name, never as
//! a compile-time dependency. At `init` the name is resolved against the
//! adapter registry; deployments without the driver integration resolve
//! nothing and the codec is simply never installed.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, FixedOffset, Utc};
use minitx_common::codec::{CodecRegistry, ValueDecoder, ValueEncoder};
use minitx_common::error::{CodecError, CodecResult};
use minitx_common::value::{CellValue, VendorTimestamp};
use parking_lot::RwLock;
use serde_json::{Value as JsonValue, json};

use super::temporal::{NANOS_PER_MILLI, decode_instant};
use super::zone_offset;

/// Fully qualified name of the vendor timestamp type this codec handles.
pub const DMDB_TIMESTAMP_TYPE: &str = "dmdb.DmdbTimestamp";

/// Constructs vendor timestamps from absolute instants.
///
/// Implemented by the driver integration crate and registered before the
/// envelope codec initializes.
pub trait VendorTimeAdapter: Send + Sync {
    /// Fully qualified name of the driver type this adapter constructs.
    fn type_name(&self) -> &str;

    /// Build a vendor timestamp from an instant bound to `zone`.
    fn from_zoned(
        &self,
        instant: DateTime<Utc>,
        zone: FixedOffset,
    ) -> CodecResult<Arc<dyn VendorTimestamp>>;
}

static VENDOR_ADAPTERS: LazyLock<RwLock<HashMap<String, Arc<dyn VendorTimeAdapter>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register an adapter under its fully qualified type name.
pub fn register_vendor_adapter(adapter: Arc<dyn VendorTimeAdapter>) {
    let name = adapter.type_name().to_owned();
    VENDOR_ADAPTERS.write().insert(name, adapter);
}

fn resolve_vendor_adapter(type_name: &str) -> Option<Arc<dyn VendorTimeAdapter>> {
    VENDOR_ADAPTERS.read().get(type_name).cloned()
}

/// Install the vendor codec if the driver type resolves.
///
/// Resolution failure means the driver integration is not deployed in this
/// process; that is an expected configuration and intentionally not logged.
pub(crate) fn register_optional_vendor_codec(registry: &mut CodecRegistry) {
    if let Some(adapter) = resolve_vendor_adapter(DMDB_TIMESTAMP_TYPE) {
        registry.install_encoder(DMDB_TIMESTAMP_TYPE, Arc::new(VendorTimestampEncoder));
        registry.install_decoder(
            DMDB_TIMESTAMP_TYPE,
            Arc::new(VendorTimestampDecoder { adapter }),
        );
    }
}

struct VendorTimestampEncoder;

impl ValueEncoder for VendorTimestampEncoder {
    fn encode(&self, value: &CellValue) -> CodecResult<JsonValue> {
        let CellValue::Vendor(vendor) = value else {
            return Err(CodecError::UnsupportedValue(DMDB_TIMESTAMP_TYPE.to_owned()));
        };
        // Same shape rule as the temporal codec, driven by the vendor
        // type's own accessors.
        let instant = vendor.to_instant()?;
        let millis = instant.timestamp_millis();
        if vendor.nanos_of_second() % NANOS_PER_MILLI == 0 {
            Ok(json!(millis))
        } else {
            Ok(json!([millis, instant.timestamp_subsec_nanos()]))
        }
    }
}

struct VendorTimestampDecoder {
    adapter: Arc<dyn VendorTimeAdapter>,
}

impl ValueDecoder for VendorTimestampDecoder {
    fn decode(&self, payload: &JsonValue) -> CodecResult<CellValue> {
        let instant = decode_instant(payload)?;
        let vendor = self.adapter.from_zoned(instant, zone_offset())?;
        Ok(CellValue::Vendor(vendor))
    }
}
