//! I/O Module
//!
//! Byte-source abstractions underneath the codec layer: a zero-copy read
//! trait served by in-memory and streaming sources, and a pooled
//! prefetching reader that overlaps network receipt with decoding.

mod prefetch;
mod zero_copy;

pub use prefetch::{PrefetchReader, DEFAULT_BUFFER_COUNT, DEFAULT_BUFFER_SIZE};
pub use zero_copy::{ArrayReader, ZeroCopyRead};
