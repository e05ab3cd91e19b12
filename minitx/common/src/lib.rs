//! Shared infrastructure for the minitx distributed transaction runtime:
//! the polymorphic column value model and the pluggable value codec tables
//! used by the undo-log codec.

pub mod codec;
pub mod error;
pub mod value;

pub use codec::{CodecRegistry, ValueDecoder, ValueEncoder};
pub use error::{CodecError, CodecResult};
pub use value::CellValue;
