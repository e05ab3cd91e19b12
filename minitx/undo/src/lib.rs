//! Undo-log records and their portable byte encoding.
//!
//! When a branch statement executes under a global transaction, the
//! row-image capture layer hands a [`BranchUndoLog`] to this crate, which
//! turns it into a self-describing JSON document and back with no loss of
//! column type or precision. The encoding is read later, possibly by a
//! different process or runtime version, to rebuild the exact pre-image
//! rows needed to roll the branch back.

pub mod codec;
pub mod record;

pub use codec::{
    CodecProvider, DMDB_TIMESTAMP_TYPE, UndoLogCodec, VendorTimeAdapter, register_codec_provider,
    register_vendor_adapter, set_zone_offset, zone_offset,
};
pub use record::{
    BranchUndoLog, Field, KeyType, Row, SqlOp, SqlType, SqlUndoLog, TableMeta, TableRecords,
};
