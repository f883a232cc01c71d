//! Zero-copy read abstraction
//!
//! A `ZeroCopyRead` source lends out borrowed views into bytes it already
//! owns instead of copying into caller storage. Callers that need a
//! contiguous copy anyway go through `read_exact`, which walks views.

use crate::error::{ColwireError, Result};

/// Byte source that serves borrowed views of its internal storage.
pub trait ZeroCopyRead {
    /// Borrow the next run of bytes, at most `max` long.
    ///
    /// Returns a view of length `1..=max` while data remains, and an
    /// empty view once the source is exhausted (or when `max` is 0). The
    /// view is only valid until the next call on the reader.
    fn next(&mut self, max: usize) -> Result<&[u8]>;

    /// Read exactly `buf.len()` bytes, copying across view boundaries.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let view = self.next(buf.len() - filled)?;
            if view.is_empty() {
                return Err(ColwireError::UnexpectedEof);
            }
            buf[filled..filled + view.len()].copy_from_slice(view);
            filled += view.len();
        }
        Ok(())
    }

    /// Discard exactly `n` bytes.
    fn skip(&mut self, n: usize) -> Result<()> {
        let mut left = n;
        while left > 0 {
            let view = self.next(left)?;
            if view.is_empty() {
                return Err(ColwireError::UnexpectedEof);
            }
            left -= view.len();
        }
        Ok(())
    }

    /// Read a single byte; `None` at end of source.
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let view = self.next(1)?;
        Ok(view.first().copied())
    }
}

/// In-memory source over a byte slice.
///
/// Serves the remaining range in one view and never blocks.
#[derive(Debug)]
pub struct ArrayReader<'a> {
    data: &'a [u8],
}

impl<'a> ArrayReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl ZeroCopyRead for ArrayReader<'_> {
    fn next(&mut self, max: usize) -> Result<&[u8]> {
        let take = max.min(self.data.len());
        let (view, rest) = self.data.split_at(take);
        self.data = rest;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_serves_at_most_max() {
        let mut reader = ArrayReader::new(&[1, 2, 3, 4, 5]);
        assert_eq!(reader.next(2).unwrap(), &[1, 2]);
        assert_eq!(reader.next(100).unwrap(), &[3, 4, 5]);
        assert_eq!(reader.next(1).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn read_exact_and_skip() {
        let mut reader = ArrayReader::new(&[1, 2, 3, 4, 5]);
        reader.skip(2).unwrap();
        let mut buf = [0u8; 2];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [3, 4]);
        assert_eq!(reader.remaining(), 1);
        assert!(reader.skip(2).is_err());
    }

    #[test]
    fn read_byte_returns_none_at_end() {
        let mut reader = ArrayReader::new(&[7]);
        assert_eq!(reader.read_byte().unwrap(), Some(7));
        assert_eq!(reader.read_byte().unwrap(), None);
    }
}
