//! The undo-log envelope codec.
//!
//! [`UndoLogCodec`] is the public encode/decode entry point. `init` runs
//! once at startup: it discovers external codec providers, resolves the
//! optional vendor timestamp type, installs the built-in codecs, and
//! activates the assembled tables. After that, `encode` and `decode` are
//! safe to call from any number of threads with no caller locking.

mod extension;
mod lob;
mod primitive;
mod temporal;
mod vendor;

use std::sync::{Arc, LazyLock};

use chrono::{FixedOffset, Local};
pub use extension::{CodecProvider, register_codec_provider};
use minitx_common::codec::{CodecRegistry, install_registry};
use minitx_common::error::{CodecError, CodecResult};
use parking_lot::RwLock;
pub use vendor::{DMDB_TIMESTAMP_TYPE, VendorTimeAdapter, register_vendor_adapter};

use crate::record::BranchUndoLog;

/// Canonical encoding of an empty undo log: the UTF-8 bytes of `{}`.
pub const DEFAULT_CONTENT: &[u8] = b"{}";

static ZONE_OFFSET: LazyLock<RwLock<FixedOffset>> =
    LazyLock::new(|| RwLock::new(*Local::now().offset()));

/// Set the process-wide zone used to interpret zone-less date-times.
///
/// Expected to be set once at process startup. The change is not
/// transactional with respect to in-flight encode/decode calls; a call
/// already running may observe either value.
pub fn set_zone_offset(offset: FixedOffset) {
    *ZONE_OFFSET.write() = offset;
}

/// The currently configured zone offset.
pub fn zone_offset() -> FixedOffset {
    *ZONE_OFFSET.read()
}

/// JSON-based codec for [`BranchUndoLog`] records.
#[derive(Debug, Default)]
pub struct UndoLogCodec {
    registry: Option<Arc<CodecRegistry>>,
}

impl UndoLogCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble and activate the codec tables.
    ///
    /// Must complete before the first `encode`/`decode` call and is expected
    /// to run at most once per instance. External providers install first,
    /// then the optional vendor codec, then the built-ins; a built-in
    /// claiming the same tag as an extension wins.
    pub fn init(&mut self) {
        let mut registry = CodecRegistry::new();
        extension::discover_external_codecs(&mut registry);
        vendor::register_optional_vendor_codec(&mut registry);
        primitive::install(&mut registry);
        temporal::install(&mut registry);
        lob::install(&mut registry);

        let registry = Arc::new(registry);
        install_registry(Arc::clone(&registry));
        self.registry = Some(registry);
    }

    pub fn name(&self) -> &'static str {
        "json"
    }

    /// The codec tables assembled by `init`, if initialization has run.
    pub fn registry(&self) -> Option<&Arc<CodecRegistry>> {
        self.registry.as_ref()
    }

    /// The canonical empty-log token, written when a branch produced no row
    /// changes and recognized by `decode` before any structural parse.
    pub fn default_content(&self) -> &'static [u8] {
        DEFAULT_CONTENT
    }

    /// Serialize a rollback record to its portable byte encoding.
    pub fn encode(&self, log: &BranchUndoLog) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(log).map_err(|err| {
            tracing::error!(error = %err, "undo log encode failed");
            CodecError::EncodeFailed(err.to_string())
        })
    }

    /// Reconstruct a rollback record from its byte encoding.
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<BranchUndoLog> {
        if bytes == DEFAULT_CONTENT {
            return Ok(BranchUndoLog::default());
        }
        serde_json::from_slice(bytes).map_err(|err| {
            tracing::error!(error = %err, "undo log decode failed");
            CodecError::DecodeFailed(err.to_string())
        })
    }
}
