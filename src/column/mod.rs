//! Column Module
//!
//! Decoded column data and the per-type wire codecs. Every column type
//! obeys the same contract: `load` consumes exactly the wire bytes for
//! the requested row count, `save` re-emits them, `slice` hands out row
//! ranges. Wire type names resolve to columns through `TypeRegistry`; an
//! unknown name is a hard error, because a column whose byte width is
//! unknown cannot be skipped without desynchronizing the stream.

mod numeric;
mod registry;
mod string;

pub use numeric::NumericColumn;
pub use registry::TypeRegistry;
pub use string::{FixedStringColumn, StringColumn};

use std::io::Write;

use crate::codec::{CodedReader, CodedWriter};
use crate::error::{ColwireError, Result};
use crate::io::ZeroCopyRead;

pub(crate) fn slice_range_error(begin: usize, len: usize, rows: usize) -> ColwireError {
    ColwireError::Column(format!(
        "slice of {} rows at {} out of range for column of {} rows",
        len, begin, rows
    ))
}

/// A decoded column of one wire type.
#[derive(Debug, Clone)]
pub enum Column {
    Numeric(NumericColumn),
    String(StringColumn),
    FixedString(FixedStringColumn),
}

impl Column {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(c) => c.len(),
            Column::String(c) => c.len(),
            Column::FixedString(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every row, keeping the column's type.
    pub fn clear(&mut self) {
        match self {
            Column::Numeric(c) => c.clear(),
            Column::String(c) => c.clear(),
            Column::FixedString(c) => c.clear(),
        }
    }

    /// Decode exactly `rows` values from the reader.
    ///
    /// On failure the column's contents are unspecified and the caller
    /// must discard it.
    pub fn load<R: ZeroCopyRead>(&mut self, reader: &mut CodedReader<R>, rows: usize) -> Result<()> {
        match self {
            Column::Numeric(c) => c.load(reader, rows),
            Column::String(c) => c.load(reader, rows),
            Column::FixedString(c) => c.load(reader, rows),
        }
    }

    /// Encode every value in wire order, no framing.
    pub fn save<W: Write>(&self, writer: &mut CodedWriter<W>) -> Result<()> {
        match self {
            Column::Numeric(c) => c.save(writer),
            Column::String(c) => c.save(writer),
            Column::FixedString(c) => c.save(writer),
        }
    }

    /// Concatenate a same-typed column's rows after this one's.
    pub fn append(&mut self, other: &Column) -> Result<()> {
        match (self, other) {
            (Column::Numeric(a), Column::Numeric(b)) => a.append(b),
            (Column::String(a), Column::String(b)) => {
                a.append(b);
                Ok(())
            }
            (Column::FixedString(a), Column::FixedString(b)) => a.append(b),
            (a, b) => Err(ColwireError::Column(format!(
                "cannot append a {} column to a {} column",
                b.kind(),
                a.kind()
            ))),
        }
    }

    /// Rows `[begin, begin + len)` as a new column of the same type.
    pub fn slice(&self, begin: usize, len: usize) -> Result<Column> {
        match self {
            Column::Numeric(c) => c.slice(begin, len).map(Column::Numeric),
            Column::String(c) => c.slice(begin, len).map(Column::String),
            Column::FixedString(c) => c.slice(begin, len).map(Column::FixedString),
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericColumn> {
        match self {
            Column::Numeric(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringColumn> {
        match self {
            Column::String(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_fixed_string(&self) -> Option<&FixedStringColumn> {
        match self {
            Column::FixedString(c) => Some(c),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Column::Numeric(_) => "numeric",
            Column::String(_) => "string",
            Column::FixedString(_) => "fixed string",
        }
    }
}
