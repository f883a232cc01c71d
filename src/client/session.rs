//! Query session over a native-protocol connection
//!
//! Drives the wire exchange: handshake, query dispatch, and the packet
//! receive loop. The session is fail-closed: any framing violation or
//! transport failure tears the connection down, because packet alignment
//! past a malformed byte cannot be trusted.
//!
//! ```text
//! Disconnected ──new──▶ Connected ──handshake──▶ Ready
//!       ▲                                         │ ▲
//!       │                                 execute │ │ EndOfStream
//!       │                                         ▼ │
//!       └─────────────── error ─────────────── Querying
//! ```

use std::io::{BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};

use tracing::{debug, trace, warn};

use crate::block::{Block, BlockInfo};
use crate::client::info::{
    BlockCollector, ClientInfo, Progress, ProfileInfo, QueryEvents, ServerInfo,
};
use crate::client::packet::{
    ClientPacket, ServerPacket, CLIENT_REVISION, CLIENT_VERSION_MAJOR, CLIENT_VERSION_MINOR,
    COMPRESSION_DISABLED, MIN_REVISION_WITH_BLOCK_INFO, MIN_REVISION_WITH_CLIENT_INFO,
    MIN_REVISION_WITH_TEMPORARY_TABLES, MIN_REVISION_WITH_TOTAL_ROWS_IN_PROGRESS, STAGE_COMPLETE,
};
use crate::codec::{CodedReader, CodedWriter};
use crate::column::TypeRegistry;
use crate::config::ClientOptions;
use crate::error::{ColwireError, Result};
use crate::io::PrefetchReader;

/// Query id attached to every query packet
const QUERY_ID: &str = "1";

/// Connection endpoints the session drives.
///
/// The engine never dials; callers establish the transport and hand it
/// over. `split` yields an owned read half for the prefetch thread and a
/// write half that can also close the connection underneath it.
pub trait Transport {
    type Reader: Read + Send + 'static;
    type Writer: TransportWriter;

    fn split(self) -> Result<(Self::Reader, Self::Writer)>;
}

/// Write half of a transport.
pub trait TransportWriter: Write {
    /// Shut the connection down in both directions, unblocking any
    /// in-flight read on the other half.
    fn close(&mut self) -> std::io::Result<()>;
}

impl Transport for TcpStream {
    type Reader = TcpStream;
    type Writer = TcpStream;

    fn split(self) -> Result<(TcpStream, TcpStream)> {
        let reader = self.try_clone()?;
        Ok((reader, self))
    }
}

impl TransportWriter for TcpStream {
    fn close(&mut self) -> std::io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// Where a session stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Torn down; a new session is required
    Disconnected,
    /// Transport split, handshake not yet performed
    Connected,
    /// Handshake done, no query in flight
    Ready,
    /// A query's packet stream is being consumed
    Querying,
}

/// Outcome of one received packet.
enum PacketFlow {
    Continue,
    Finished,
}

struct SessionIo<T: Transport> {
    reader: CodedReader<PrefetchReader>,
    writer: CodedWriter<BufWriter<T::Writer>>,
}

fn disconnected() -> ColwireError {
    ColwireError::InvalidState("session is disconnected".to_string())
}

/// A native-protocol client session.
///
/// Created over an established transport; the receive side runs through
/// the prefetch pool so decoding overlaps with network receipt.
pub struct Session<T: Transport> {
    io: Option<SessionIo<T>>,
    state: SessionState,
    options: ClientOptions,
    registry: TypeRegistry,
    server_info: Option<ServerInfo>,
    progress: Progress,
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("server_info", &self.server_info)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Session<T> {
    /// Split the transport and stand up the receive pipeline.
    pub fn new(transport: T, options: ClientOptions) -> Result<Self> {
        let (read_half, write_half) = transport.split()?;
        let prefetch = PrefetchReader::with_pool(
            read_half,
            options.receive_buffer_size,
            options.receive_buffer_count,
        )?;
        Ok(Self {
            io: Some(SessionIo {
                reader: CodedReader::new(prefetch),
                writer: CodedWriter::new(BufWriter::new(write_half)),
            }),
            state: SessionState::Connected,
            options,
            registry: TypeRegistry::new(),
            server_info: None,
            progress: Progress::default(),
        })
    }

    /// `new` followed by `handshake`.
    pub fn connect(transport: T, options: ClientOptions) -> Result<Self> {
        let mut session = Self::new(transport, options)?;
        session.handshake()?;
        Ok(session)
    }

    /// Exchange hellos. On success the session is `Ready`.
    pub fn handshake(&mut self) -> Result<()> {
        if self.state != SessionState::Connected {
            return Err(ColwireError::InvalidState(format!(
                "handshake requires a freshly connected session, state is {:?}",
                self.state
            )));
        }
        self.send_hello()?;
        match self.receive_hello() {
            Ok(info) => {
                debug!(
                    server = %info.name,
                    version = format_args!("{}.{}", info.version_major, info.version_minor),
                    revision = info.revision,
                    timezone = %info.timezone,
                    "handshake complete"
                );
                self.server_info = Some(info);
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(err) => {
                self.teardown();
                Err(err)
            }
        }
    }

    /// Run `query` to completion, streaming results into `events`.
    ///
    /// Any wire-level failure disconnects the session; the caller must
    /// build a new one to continue.
    pub fn execute_query(&mut self, query: &str, events: &mut dyn QueryEvents) -> Result<()> {
        if self.state != SessionState::Ready {
            return Err(ColwireError::InvalidState(format!(
                "query requires a ready session, state is {:?}",
                self.state
            )));
        }
        self.state = SessionState::Querying;
        self.progress = Progress::default();
        trace!(query, "query dispatched");
        match self.run_query(query, events) {
            Ok(()) => {
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "query failed, disconnecting");
                self.teardown();
                Err(err)
            }
        }
    }

    /// Convenience wrapper collecting every result block.
    pub fn query(&mut self, query: &str) -> Result<Vec<Block>> {
        let mut collector = BlockCollector::new();
        self.execute_query(query, &mut collector)?;
        Ok(collector.into_blocks())
    }

    /// Tear the session down. Idempotent.
    pub fn disconnect(&mut self) {
        if self.state != SessionState::Disconnected {
            debug!("session disconnecting");
            self.teardown();
        }
    }

    /// What the server reported in the handshake, once `Ready`.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Running totals for the most recent query.
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// The type registry consulted when decoding blocks.
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    // -------------------------------------------------------------------------
    // Wire plumbing
    // -------------------------------------------------------------------------

    /// Revision both sides agreed to speak.
    fn effective_revision(&self) -> u64 {
        match &self.server_info {
            Some(info) => CLIENT_REVISION.min(info.revision),
            None => CLIENT_REVISION,
        }
    }

    fn send_hello(&mut self) -> Result<()> {
        let io = self.io.as_mut().ok_or_else(disconnected)?;
        let w = &mut io.writer;
        w.write_varint64(ClientPacket::Hello.code())?;
        w.write_string(self.options.client_name.as_bytes())?;
        w.write_varint64(CLIENT_VERSION_MAJOR)?;
        w.write_varint64(CLIENT_VERSION_MINOR)?;
        w.write_varint64(CLIENT_REVISION)?;
        w.write_string(self.options.database.as_bytes())?;
        w.write_string(self.options.username.as_bytes())?;
        w.write_string(self.options.password.as_bytes())?;
        w.flush()
    }

    fn receive_hello(&mut self) -> Result<ServerInfo> {
        let io = self.io.as_mut().ok_or_else(disconnected)?;
        let code = io.reader.read_varint64()?;
        match ServerPacket::from_code(code) {
            Some(ServerPacket::Hello) => ServerInfo::load(&mut io.reader),
            Some(ServerPacket::Exception) => Err(ColwireError::Protocol(
                "server rejected the handshake with an exception".to_string(),
            )),
            _ => Err(ColwireError::Protocol(format!(
                "unexpected packet {} in place of server hello",
                code
            ))),
        }
    }

    fn run_query(&mut self, query: &str, events: &mut dyn QueryEvents) -> Result<()> {
        self.send_query(query)?;
        loop {
            match self.receive_packet(events)? {
                PacketFlow::Continue => {}
                PacketFlow::Finished => return Ok(()),
            }
        }
    }

    fn send_query(&mut self, query: &str) -> Result<()> {
        let revision = self.effective_revision();
        let client_info = ClientInfo::for_initial_query(self.options.client_name.clone());
        let io = self.io.as_mut().ok_or_else(disconnected)?;
        let w = &mut io.writer;

        w.write_varint64(ClientPacket::Query.code())?;
        w.write_string(QUERY_ID.as_bytes())?;
        if revision >= MIN_REVISION_WITH_CLIENT_INFO {
            client_info.save(w, revision)?;
        }
        // Per-query settings, none serialized.
        w.write_string(b"")?;
        w.write_varint64(STAGE_COMPLETE)?;
        w.write_varint64(COMPRESSION_DISABLED)?;
        w.write_string(query.as_bytes())?;

        // An empty trailing data block signals no client-supplied input.
        Self::write_data_packet(w, revision, &Block::new())?;
        w.flush()
    }

    /// Encode one data packet: code, gated table name and info, body.
    fn write_data_packet<W: Write>(
        w: &mut CodedWriter<W>,
        revision: u64,
        block: &Block,
    ) -> Result<()> {
        w.write_varint64(ClientPacket::Data.code())?;
        if revision >= MIN_REVISION_WITH_TEMPORARY_TABLES {
            w.write_string(b"")?;
        }
        if revision >= MIN_REVISION_WITH_BLOCK_INFO {
            block.info().save(w)?;
        }
        block.save(w)
    }

    fn receive_packet(&mut self, events: &mut dyn QueryEvents) -> Result<PacketFlow> {
        let revision = self.effective_revision();
        let io = self.io.as_mut().ok_or_else(disconnected)?;
        let code = io.reader.read_varint64()?;
        let packet = ServerPacket::from_code(code)
            .ok_or_else(|| ColwireError::Protocol(format!("unknown packet code {}", code)))?;
        trace!(?packet, "packet received");

        match packet {
            ServerPacket::Data => {
                if revision >= MIN_REVISION_WITH_TEMPORARY_TABLES {
                    // Temporary table name, unused by this client.
                    io.reader.read_utf8_string()?;
                }
                let info = if revision >= MIN_REVISION_WITH_BLOCK_INFO {
                    BlockInfo::load(&mut io.reader)?
                } else {
                    BlockInfo::default()
                };
                let mut block = Block::load(&mut io.reader, &self.registry)?;
                block.set_info(info);
                trace!(
                    rows = block.row_count(),
                    columns = block.column_count(),
                    "block decoded"
                );
                events.on_block(block);
                Ok(PacketFlow::Continue)
            }
            ServerPacket::Progress => {
                let rows = io.reader.read_varint64()?;
                let bytes = io.reader.read_varint64()?;
                let total_rows = if revision >= MIN_REVISION_WITH_TOTAL_ROWS_IN_PROGRESS {
                    io.reader.read_varint64()?
                } else {
                    0
                };
                self.progress.observe(rows, bytes, total_rows);
                events.on_progress(&self.progress);
                Ok(PacketFlow::Continue)
            }
            ServerPacket::ProfileInfo => {
                let profile = ProfileInfo::load(&mut io.reader)?;
                events.on_profile(&profile);
                Ok(PacketFlow::Continue)
            }
            ServerPacket::EndOfStream => Ok(PacketFlow::Finished),
            ServerPacket::Hello => Err(ColwireError::Protocol(
                "server hello outside a handshake".to_string(),
            )),
            ServerPacket::Exception => Err(ColwireError::Protocol(
                "server reported an exception; stream alignment is no longer trusted".to_string(),
            )),
        }
    }

    /// Close the transport, stop the fill thread, mark disconnected.
    fn teardown(&mut self) {
        self.state = SessionState::Disconnected;
        if let Some(mut io) = self.io.take() {
            // Closing first unblocks the fill thread's in-flight read;
            // dropping the reader afterwards joins it.
            if let Err(err) = io.writer.sink_mut().get_mut().close() {
                debug!(error = %err, "transport close failed");
            }
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
