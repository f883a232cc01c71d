//! Encoder over any byte sink
//!
//! Writes the same primitives `CodedReader` decodes. The writer itself is
//! unbuffered and passes straight through; callers compose a
//! `std::io::BufWriter` underneath when batching matters.

use std::io::Write;

use crate::codec::{encode_varint64, MAX_STRING_LEN, MAX_VARINT_LEN};
use crate::error::{ColwireError, Result};

/// Encoder for protocol primitives over any `Write` sink.
pub struct CodedWriter<W> {
    sink: W,
}

impl<W: Write> CodedWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Access the underlying sink.
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Write raw bytes straight through.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write_all(bytes)?;
        Ok(())
    }

    /// Encode one unsigned varint.
    pub fn write_varint64(&mut self, value: u64) -> Result<()> {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let len = encode_varint64(value, &mut buf);
        self.write_raw(&buf[..len])
    }

    /// Encode one length-prefixed byte string.
    pub fn write_string(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_STRING_LEN {
            return Err(ColwireError::Codec(format!(
                "string length {} exceeds maximum {}",
                bytes.len(),
                MAX_STRING_LEN
            )));
        }
        self.write_varint64(bytes.len() as u64)?;
        self.write_raw(bytes)
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_raw(&[value])
    }

    pub fn write_i32_le(&mut self, value: i32) -> Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    pub fn write_u64_le(&mut self, value: u64) -> Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}
