//! Prefetching buffered reader
//!
//! Overlaps network receipt with decoding: a background thread reads from
//! the underlying source into a fixed pool of buffers while the consumer
//! drains previously filled ones.
//!
//! ```text
//!                 free buffers (capacity N)
//!          ┌───────────────◀───────────────┐
//!          │                               │
//!     ┌────▼─────┐   filled frames    ┌────┴─────┐
//!     │   fill   │───(capacity N−1)──▶│ consumer │
//!     │  thread  │                    │  (next)  │
//!     └────┬─────┘                    └──────────┘
//!          │ read()
//!     ┌────▼─────┐
//!     │  source  │
//!     └──────────┘
//! ```
//!
//! Buffers move whole through the channels; nothing is shared between the
//! threads. The bounded `filled` channel caps the producer at N−1
//! completed reads ahead of the buffer the consumer holds.

use std::io::{ErrorKind, Read};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{debug, trace, warn};

use crate::error::{ColwireError, Result};
use crate::io::ZeroCopyRead;

/// Default capacity of each pooled buffer (in bytes)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Default number of pooled buffers
pub const DEFAULT_BUFFER_COUNT: usize = 2;

/// Unit of transfer from the fill thread to the consumer
enum Frame {
    /// A buffer holding `len` freshly read bytes
    Filled { buf: Vec<u8>, len: usize },
    /// The source reached end of stream
    End,
    /// The source failed; the fill thread exits after sending this
    Failed(std::io::Error),
}

/// The buffer currently being drained
struct Chunk {
    buf: Vec<u8>,
    len: usize,
    pos: usize,
}

/// Where the stream stands once frames stop arriving
enum StreamState {
    Running,
    Finished,
    Failed(String),
}

/// Buffered reader that prefetches from a blocking source on a background
/// thread.
///
/// Dropping the reader hangs up the channels and joins the thread. If the
/// source can block indefinitely (a socket), close it first so any
/// in-flight `read` returns.
pub struct PrefetchReader {
    filled_rx: Receiver<Frame>,
    free_tx: Option<Sender<Vec<u8>>>,
    current: Option<Chunk>,
    state: StreamState,
    worker: Option<JoinHandle<()>>,
}

impl PrefetchReader {
    /// Create a reader with the default pool.
    pub fn new<R>(source: R) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        Self::with_pool(source, DEFAULT_BUFFER_SIZE, DEFAULT_BUFFER_COUNT)
    }

    /// Create a reader with `buffer_count` pooled buffers of
    /// `buffer_size` bytes each.
    ///
    /// At least two buffers are required: one held by the consumer while
    /// the fill thread works on another.
    pub fn with_pool<R>(source: R, buffer_size: usize, buffer_count: usize) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        if buffer_size == 0 {
            return Err(ColwireError::Config(
                "receive buffer size must be non-zero".to_string(),
            ));
        }
        if buffer_count < 2 {
            return Err(ColwireError::Config(format!(
                "receive buffer count must be at least 2, got {}",
                buffer_count
            )));
        }

        let (free_tx, free_rx) = bounded::<Vec<u8>>(buffer_count);
        let (filled_tx, filled_rx) = bounded::<Frame>(buffer_count - 1);
        for _ in 0..buffer_count {
            free_tx
                .send(vec![0u8; buffer_size])
                .expect("pool seeding stays within channel capacity");
        }

        let worker = thread::Builder::new()
            .name("colwire-prefetch".to_string())
            .spawn(move || fill_loop(source, free_rx, filled_tx))?;

        debug!(buffer_size, buffer_count, "prefetch pool started");

        Ok(Self {
            filled_rx,
            free_tx: Some(free_tx),
            current: None,
            state: StreamState::Running,
            worker: Some(worker),
        })
    }

    fn current_remaining(&self) -> usize {
        match &self.current {
            Some(chunk) => chunk.len - chunk.pos,
            None => 0,
        }
    }

    /// Recycle the drained buffer and pull the next frame. Does nothing
    /// further once the stream finished; keeps failing once it failed.
    fn advance(&mut self) -> Result<()> {
        if let Some(chunk) = self.current.take() {
            if let Some(free_tx) = &self.free_tx {
                // The fill thread may already be gone; the buffer just drops.
                let _ = free_tx.send(chunk.buf);
            }
        }

        match &self.state {
            StreamState::Finished => return Ok(()),
            StreamState::Failed(msg) => return Err(ColwireError::Network(msg.clone())),
            StreamState::Running => {}
        }

        match self.filled_rx.recv() {
            Ok(Frame::Filled { buf, len }) => {
                trace!(len, "frame dequeued");
                self.current = Some(Chunk { buf, len, pos: 0 });
                Ok(())
            }
            Ok(Frame::End) => {
                debug!("source reached end of stream");
                self.state = StreamState::Finished;
                Ok(())
            }
            Ok(Frame::Failed(err)) => {
                warn!(error = %err, "source read failed");
                let msg = err.to_string();
                self.state = StreamState::Failed(msg.clone());
                Err(ColwireError::Network(msg))
            }
            Err(_) => {
                let msg = "prefetch thread terminated unexpectedly".to_string();
                self.state = StreamState::Failed(msg.clone());
                Err(ColwireError::Network(msg))
            }
        }
    }
}

impl ZeroCopyRead for PrefetchReader {
    fn next(&mut self, max: usize) -> Result<&[u8]> {
        if max == 0 {
            return Ok(&[]);
        }
        if self.current_remaining() == 0 {
            self.advance()?;
        }
        match &mut self.current {
            Some(chunk) if chunk.pos < chunk.len => {
                let take = max.min(chunk.len - chunk.pos);
                let start = chunk.pos;
                chunk.pos += take;
                Ok(&chunk.buf[start..start + take])
            }
            _ => Ok(&[]),
        }
    }
}

impl Drop for PrefetchReader {
    fn drop(&mut self) {
        // Hanging up the free channel stops the fill thread at its next
        // buffer request; draining lets a blocked publish complete.
        self.free_tx.take();
        if let Some(worker) = self.worker.take() {
            while self.filled_rx.recv().is_ok() {}
            if worker.join().is_err() {
                warn!("prefetch thread panicked");
            }
        }
    }
}

fn fill_loop<R: Read>(mut source: R, free_rx: Receiver<Vec<u8>>, filled_tx: Sender<Frame>) {
    loop {
        let mut buf = match free_rx.recv() {
            Ok(buf) => buf,
            // Consumer hung up; nothing left to fill for.
            Err(_) => return,
        };

        let frame = loop {
            match source.read(&mut buf) {
                Ok(0) => break Frame::End,
                Ok(len) => break Frame::Filled { buf, len },
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => break Frame::Failed(err),
            }
        };

        let terminal = !matches!(frame, Frame::Filled { .. });
        if filled_tx.send(frame).is_err() || terminal {
            return;
        }
    }
}
