//! Decoder over a zero-copy byte source
//!
//! Reads varints, strings and fixed-width values, plus the batched row
//! readers the column codecs are built on. Every operation either
//! consumes exactly its wire image or fails; after a failure the stream's
//! byte alignment is no longer trusted and the reader must be discarded.

use crate::codec::{MAX_STRING_LEN, MAX_VARINT_LEN};
use crate::error::{ColwireError, Result};
use crate::io::ZeroCopyRead;

/// Row counts come off the wire; preallocation is capped so a hostile
/// count cannot force a huge up-front reservation.
const MAX_PREALLOC_ROWS: usize = 1 << 16;

/// Decoder for protocol primitives over any `ZeroCopyRead` source.
pub struct CodedReader<R> {
    input: R,
}

impl<R: ZeroCopyRead> CodedReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Read exactly `buf.len()` raw bytes.
    pub fn read_raw(&mut self, buf: &mut [u8]) -> Result<()> {
        self.input.read_exact(buf)
    }

    /// Discard exactly `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.input.skip(n)
    }

    /// Decode one unsigned varint.
    pub fn read_varint64(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            match self.input.read_byte()? {
                Some(byte) => {
                    value |= u64::from(byte & 0x7F) << (7 * i);
                    if byte & 0x80 == 0 {
                        return Ok(value);
                    }
                }
                None => return Err(ColwireError::UnexpectedEof),
            }
        }
        Err(ColwireError::Codec(format!(
            "varint exceeds {} bytes",
            MAX_VARINT_LEN
        )))
    }

    /// Discard one varint without decoding its value.
    pub fn skip_varint64(&mut self) -> Result<()> {
        for _ in 0..MAX_VARINT_LEN {
            match self.input.read_byte()? {
                Some(byte) => {
                    if byte & 0x80 == 0 {
                        return Ok(());
                    }
                }
                None => return Err(ColwireError::UnexpectedEof),
            }
        }
        Err(ColwireError::Codec(format!(
            "varint exceeds {} bytes",
            MAX_VARINT_LEN
        )))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        match self.input.read_byte()? {
            Some(byte) => Ok(byte),
            None => Err(ColwireError::UnexpectedEof),
        }
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.input.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.input.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_string_len(&mut self) -> Result<usize> {
        let len = self.read_varint64()?;
        if len > MAX_STRING_LEN as u64 {
            return Err(ColwireError::Codec(format!(
                "string length {} exceeds maximum {}",
                len, MAX_STRING_LEN
            )));
        }
        Ok(len as usize)
    }

    /// Read one length-prefixed byte string.
    pub fn read_string(&mut self) -> Result<Vec<u8>> {
        let len = self.read_string_len()?;
        let mut buf = vec![0u8; len];
        self.input.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read one length-prefixed string, requiring valid UTF-8.
    pub fn read_utf8_string(&mut self) -> Result<String> {
        let bytes = self.read_string()?;
        String::from_utf8(bytes)
            .map_err(|_| ColwireError::Codec("string is not valid UTF-8".to_string()))
    }

    /// Discard one length-prefixed string.
    pub fn skip_string(&mut self) -> Result<()> {
        let len = self.read_string_len()?;
        self.input.skip(len)
    }

    /// Read `rows` length-prefixed strings in wire order.
    ///
    /// Any row failing aborts the whole call.
    pub fn read_string_rows(&mut self, rows: usize) -> Result<Vec<Vec<u8>>> {
        let mut out = Vec::with_capacity(rows.min(MAX_PREALLOC_ROWS));
        for _ in 0..rows {
            out.push(self.read_string()?);
        }
        Ok(out)
    }

    /// Read `rows` fixed-width strings of `size` bytes each, no prefixes.
    pub fn read_fixed_string_rows(&mut self, rows: usize, size: usize) -> Result<Vec<Vec<u8>>> {
        let mut out = Vec::with_capacity(rows.min(MAX_PREALLOC_ROWS));
        for _ in 0..rows {
            let mut item = vec![0u8; size];
            self.input.read_exact(&mut item)?;
            out.push(item);
        }
        Ok(out)
    }

    /// Read `rows * size` bytes of fixed-width data as one flat buffer.
    pub fn read_fixed_chars_rows(&mut self, rows: usize, size: usize) -> Result<Vec<u8>> {
        let total = rows.checked_mul(size).ok_or_else(|| {
            ColwireError::Codec(format!(
                "column byte size overflows: {} rows of {} bytes",
                rows, size
            ))
        })?;
        let mut buf = vec![0u8; total];
        self.input.read_exact(&mut buf)?;
        Ok(buf)
    }
}
