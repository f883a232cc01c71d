//! Result block
//!
//! A block is the unit of data exchange: named, typed columns of equal
//! row count, plus the side-channel info servers attach to each block.
//!
//! ```text
//! ┌──────────────┬───────────┬──────────────────────────────────┐
//! │ column count │ row count │ per column: name, type, row data │
//! └──────────────┴───────────┴──────────────────────────────────┘
//! ```

use std::io::Write;

use crate::codec::{CodedReader, CodedWriter};
use crate::column::{Column, TypeRegistry};
use crate::error::{ColwireError, Result};
use crate::io::ZeroCopyRead;

/// Server-attached block metadata, revision-gated on the wire.
///
/// Encoded as a field-tagged sequence: marker, overflow flag (u8),
/// marker, bucket number (i32), end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Whether this block carries rows that overflowed a limit
    pub is_overflows: bool,
    /// Shard bucket this block belongs to, -1 when not bucketed
    pub bucket_num: i32,
}

impl Default for BlockInfo {
    fn default() -> Self {
        Self {
            is_overflows: false,
            bucket_num: -1,
        }
    }
}

impl BlockInfo {
    const FIELD_OVERFLOWS: u64 = 1;
    const FIELD_BUCKET: u64 = 2;
    const FIELD_END: u64 = 0;

    /// Decode the fixed five-field sequence.
    pub fn load<R: ZeroCopyRead>(reader: &mut CodedReader<R>) -> Result<BlockInfo> {
        // Field markers are consumed but not interpreted.
        reader.read_varint64()?;
        let is_overflows = reader.read_u8()? != 0;
        reader.read_varint64()?;
        let bucket_num = reader.read_i32_le()?;
        reader.read_varint64()?;
        Ok(BlockInfo {
            is_overflows,
            bucket_num,
        })
    }

    /// Encode the fixed five-field sequence.
    pub fn save<W: Write>(&self, writer: &mut CodedWriter<W>) -> Result<()> {
        writer.write_varint64(Self::FIELD_OVERFLOWS)?;
        writer.write_u8(self.is_overflows as u8)?;
        writer.write_varint64(Self::FIELD_BUCKET)?;
        writer.write_i32_le(self.bucket_num)?;
        writer.write_varint64(Self::FIELD_END)
    }
}

/// One named, typed column inside a block.
#[derive(Debug, Clone)]
struct BlockColumn {
    name: String,
    type_name: String,
    data: Column,
}

/// An ordered set of equal-length named columns.
#[derive(Debug, Clone, Default)]
pub struct Block {
    info: BlockInfo,
    columns: Vec<BlockColumn>,
    rows: u64,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; its row count must match the block's.
    pub fn append_column(
        &mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        data: Column,
    ) -> Result<()> {
        let rows = data.len() as u64;
        if !self.columns.is_empty() && rows != self.rows {
            return Err(ColwireError::Block(format!(
                "column of {} rows appended to a block of {} rows",
                rows, self.rows
            )));
        }
        self.rows = rows;
        self.columns.push(BlockColumn {
            name: name.into(),
            type_name: type_name.into(),
            data,
        });
        Ok(())
    }

    pub fn row_count(&self) -> u64 {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn info(&self) -> &BlockInfo {
        &self.info
    }

    pub fn set_info(&mut self, info: BlockInfo) {
        self.info = info;
    }

    /// Column name at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    /// Wire type name at `index`.
    pub fn type_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.type_name.as_str())
    }

    /// Column data at `index`.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index).map(|c| &c.data)
    }

    /// Iterate columns as `(name, type name, data)` triples.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str, &Column)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.type_name.as_str(), &c.data))
    }

    /// Decode column count, row count and every column body.
    ///
    /// Type names resolve through `registry` before the row-count branch,
    /// so an unknown type fails even for a zero-row column.
    pub fn load<R: ZeroCopyRead>(
        reader: &mut CodedReader<R>,
        registry: &TypeRegistry,
    ) -> Result<Block> {
        let num_columns = reader.read_varint64()?;
        let num_rows = reader.read_varint64()?;
        let row_count = usize::try_from(num_rows)
            .map_err(|_| ColwireError::Codec(format!("row count {} is not addressable", num_rows)))?;

        let mut block = Block::new();
        block.rows = num_rows;
        for _ in 0..num_columns {
            let name = reader.read_utf8_string()?;
            let type_name = reader.read_utf8_string()?;
            let mut data = registry.resolve(&type_name)?;
            if row_count > 0 {
                data.load(reader, row_count)?;
            }
            block.columns.push(BlockColumn {
                name,
                type_name,
                data,
            });
        }
        Ok(block)
    }

    /// Encode the mirror image of `load`'s framing.
    pub fn save<W: Write>(&self, writer: &mut CodedWriter<W>) -> Result<()> {
        writer.write_varint64(self.columns.len() as u64)?;
        writer.write_varint64(self.rows)?;
        for column in &self.columns {
            writer.write_string(column.name.as_bytes())?;
            writer.write_string(column.type_name.as_bytes())?;
            if self.rows > 0 {
                column.data.save(writer)?;
            }
        }
        Ok(())
    }
}
