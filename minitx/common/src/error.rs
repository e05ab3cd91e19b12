use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

/// Failures raised while encoding or decoding a branch undo log.
///
/// Record-level variants (`EncodeFailed`, `DecodeFailed`, `UnknownTypeTag`,
/// `NoEncoder`, `MalformedValue`) abort the whole operation and surface to the
/// caller. The remaining variants are raised by individual value codecs and
/// are recovered locally: the offending field is logged and degraded to null
/// so that one bad column does not discard a multi-row rollback record.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("undo log encode failed: {0}")]
    EncodeFailed(String),
    #[error("undo log decode failed: {0}")]
    DecodeFailed(String),
    #[error("no codec installed for type tag `{0}`")]
    UnknownTypeTag(String),
    #[error("no encoder installed for value of type `{0}`")]
    NoEncoder(String),
    #[error("malformed value envelope: {0}")]
    MalformedValue(String),
    #[error("large object has already been freed")]
    LobFreed,
    #[error("vendor adapter failure: {0}")]
    Vendor(String),
    #[error("codec for `{0}` was handed an unsupported value")]
    UnsupportedValue(String),
}
