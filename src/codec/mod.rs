//! Wire Codec Module
//!
//! Primitive encodings of the native protocol: base-128 varints,
//! length-prefixed strings, and little-endian fixed-width values.
//!
//! ```text
//! varint   ┌──────────┬──────────┬──────────┐   7 bits per byte, LSB
//!          │ 1xxxxxxx │ 1xxxxxxx │ 0xxxxxxx │   first, high bit set on
//!          └──────────┴──────────┴──────────┘   all but the last byte
//!
//! string   ┌────────────┬─────────────────┐
//!          │ len varint │    raw bytes    │    len ≤ 0x00FFFFFF
//!          └────────────┴─────────────────┘
//! ```

mod reader;
mod varint;
mod writer;

pub use reader::CodedReader;
pub use varint::{encode_varint64, varint_len, MAX_VARINT_LEN};
pub use writer::CodedWriter;

/// Longest string the codec will decode or encode (in bytes)
pub const MAX_STRING_LEN: usize = 0x00FF_FFFF;
