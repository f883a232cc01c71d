//! Variable-length and fixed-length string columns

use std::io::Write;

use bytes::{Bytes, BytesMut};

use crate::codec::{CodedReader, CodedWriter};
use crate::column::slice_range_error;
use crate::error::{ColwireError, Result};
use crate::io::ZeroCopyRead;

/// Column of arbitrary-length byte strings.
#[derive(Debug, Clone, Default)]
pub struct StringColumn {
    rows: Vec<Vec<u8>>,
}

impl StringColumn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_strs(values: &[&str]) -> Self {
        Self {
            rows: values.iter().map(|s| s.as_bytes().to_vec()).collect(),
        }
    }

    pub fn push(&mut self, value: impl Into<Vec<u8>>) {
        self.rows.push(value.into());
    }

    pub fn at(&self, row: usize) -> Option<&[u8]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Read `rows` length-prefixed strings through the batched path.
    pub fn load<R: ZeroCopyRead>(&mut self, reader: &mut CodedReader<R>, rows: usize) -> Result<()> {
        self.rows = reader.read_string_rows(rows)?;
        Ok(())
    }

    /// Write every row as varint length + raw bytes.
    pub fn save<W: Write>(&self, writer: &mut CodedWriter<W>) -> Result<()> {
        for row in &self.rows {
            writer.write_string(row)?;
        }
        Ok(())
    }

    pub fn append(&mut self, other: &StringColumn) {
        self.rows.extend(other.rows.iter().cloned());
    }

    pub fn slice(&self, begin: usize, len: usize) -> Result<StringColumn> {
        let end = begin
            .checked_add(len)
            .filter(|&end| end <= self.rows.len())
            .ok_or_else(|| slice_range_error(begin, len, self.rows.len()))?;
        Ok(StringColumn {
            rows: self.rows[begin..end].to_vec(),
        })
    }
}

/// Column of fixed-width strings stored as one contiguous buffer.
///
/// Values shorter than the declared width are zero-padded on push, the
/// same layout servers store them in.
#[derive(Debug, Clone)]
pub struct FixedStringColumn {
    size: usize,
    data: Bytes,
}

impl FixedStringColumn {
    /// Create an empty column of `size`-byte strings.
    pub fn with_size(size: usize) -> Self {
        assert!(size > 0, "fixed string width must be non-zero");
        Self {
            size,
            data: Bytes::new(),
        }
    }

    /// Width of one row in bytes.
    pub fn fixed_size(&self) -> usize {
        self.size
    }

    pub fn at(&self, row: usize) -> Option<&[u8]> {
        let start = row.checked_mul(self.size)?;
        let end = start.checked_add(self.size)?;
        if end <= self.data.len() {
            Some(&self.data[start..end])
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.size
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data = Bytes::new();
    }

    /// Append one value, zero-padded up to the column width.
    pub fn push(&mut self, value: &[u8]) -> Result<()> {
        if value.len() > self.size {
            return Err(ColwireError::Column(format!(
                "value of {} bytes exceeds fixed string width {}",
                value.len(),
                self.size
            )));
        }
        let mut data = BytesMut::with_capacity(self.data.len() + self.size);
        data.extend_from_slice(&self.data);
        data.extend_from_slice(value);
        data.resize(self.data.len() + self.size, 0);
        self.data = data.freeze();
        Ok(())
    }

    /// Read `rows * width` bytes as one flat copy.
    pub fn load<R: ZeroCopyRead>(&mut self, reader: &mut CodedReader<R>, rows: usize) -> Result<()> {
        let flat = reader.read_fixed_chars_rows(rows, self.size)?;
        self.data = Bytes::from(flat);
        Ok(())
    }

    pub fn save<W: Write>(&self, writer: &mut CodedWriter<W>) -> Result<()> {
        writer.write_raw(&self.data)
    }

    pub fn append(&mut self, other: &FixedStringColumn) -> Result<()> {
        if other.size != self.size {
            return Err(ColwireError::Column(format!(
                "cannot append width-{} strings to a width-{} column",
                other.size, self.size
            )));
        }
        let mut data = BytesMut::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        self.data = data.freeze();
        Ok(())
    }

    /// Rows `[begin, begin + len)` as a new column sharing this buffer.
    pub fn slice(&self, begin: usize, len: usize) -> Result<FixedStringColumn> {
        let end = begin
            .checked_add(len)
            .filter(|&end| end <= self.len())
            .ok_or_else(|| slice_range_error(begin, len, self.len()))?;
        Ok(FixedStringColumn {
            size: self.size,
            data: self.data.slice(begin * self.size..end * self.size),
        })
    }
}
