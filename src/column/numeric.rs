//! Fixed-width numeric column
//!
//! Rows are stored as raw little-endian bytes, the exact wire image:
//! loading is one flat copy and slicing shares the buffer. How a cell is
//! interpreted (signed, unsigned, float) follows the wire type it was
//! resolved from.

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{CodedReader, CodedWriter};
use crate::column::slice_range_error;
use crate::error::{ColwireError, Result};
use crate::io::ZeroCopyRead;

/// Column of fixed-width little-endian values.
#[derive(Debug, Clone)]
pub struct NumericColumn {
    width: usize,
    data: Bytes,
}

impl NumericColumn {
    /// Create an empty column of `width`-byte values (1, 2, 4 or 8).
    pub fn with_width(width: usize) -> Self {
        assert!(
            matches!(width, 1 | 2 | 4 | 8),
            "unsupported numeric width: {}",
            width
        );
        Self {
            width,
            data: Bytes::new(),
        }
    }

    /// Build a column of 8-byte values.
    pub fn from_u64s(values: &[u64]) -> Self {
        let mut data = BytesMut::with_capacity(values.len() * 8);
        for value in values {
            data.put_u64_le(*value);
        }
        Self {
            width: 8,
            data: data.freeze(),
        }
    }

    /// Width of one value in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.width
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data = Bytes::new();
    }

    fn cell(&self, row: usize) -> Option<&[u8]> {
        let start = row.checked_mul(self.width)?;
        let end = start.checked_add(self.width)?;
        if end <= self.data.len() {
            Some(&self.data[start..end])
        } else {
            None
        }
    }

    /// Cell at `row`, zero-extended to u64.
    pub fn u64_at(&self, row: usize) -> Option<u64> {
        self.cell(row).map(|cell| {
            let mut buf = [0u8; 8];
            buf[..cell.len()].copy_from_slice(cell);
            u64::from_le_bytes(buf)
        })
    }

    /// Cell at `row`, sign-extended to i64.
    pub fn i64_at(&self, row: usize) -> Option<i64> {
        self.cell(row).map(|cell| {
            let mut buf = [0u8; 8];
            buf[..cell.len()].copy_from_slice(cell);
            let raw = u64::from_le_bytes(buf) as i64;
            let shift = 64 - 8 * cell.len() as u32;
            (raw << shift) >> shift
        })
    }

    /// Cell at `row` as floating point: width 4 reads f32, width 8 f64.
    pub fn f64_at(&self, row: usize) -> Option<f64> {
        match self.width {
            4 => self
                .u64_at(row)
                .map(|raw| f64::from(f32::from_bits(raw as u32))),
            8 => self.u64_at(row).map(f64::from_bits),
            _ => None,
        }
    }

    /// Read `rows` values as one flat raw copy.
    pub fn load<R: ZeroCopyRead>(&mut self, reader: &mut CodedReader<R>, rows: usize) -> Result<()> {
        let total = rows.checked_mul(self.width).ok_or_else(|| {
            ColwireError::Codec(format!(
                "column byte size overflows: {} rows of width {}",
                rows, self.width
            ))
        })?;
        let mut buf = BytesMut::zeroed(total);
        reader.read_raw(&mut buf)?;
        self.data = buf.freeze();
        Ok(())
    }

    /// Write every value back out as raw little-endian bytes.
    pub fn save<W: Write>(&self, writer: &mut CodedWriter<W>) -> Result<()> {
        writer.write_raw(&self.data)
    }

    /// Concatenate `other`'s rows after this column's.
    pub fn append(&mut self, other: &NumericColumn) -> Result<()> {
        if other.width != self.width {
            return Err(ColwireError::Column(format!(
                "cannot append width-{} values to a width-{} column",
                other.width, self.width
            )));
        }
        let mut data = BytesMut::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        self.data = data.freeze();
        Ok(())
    }

    /// Rows `[begin, begin + len)` as a new column sharing this buffer.
    pub fn slice(&self, begin: usize, len: usize) -> Result<NumericColumn> {
        let end = begin
            .checked_add(len)
            .filter(|&end| end <= self.len())
            .ok_or_else(|| slice_range_error(begin, len, self.len()))?;
        Ok(NumericColumn {
            width: self.width,
            data: self.data.slice(begin * self.width..end * self.width),
        })
    }
}
