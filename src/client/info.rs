//! Session metadata and query callbacks

use std::io::Write;

use crate::block::Block;
use crate::client::packet::{
    CLIENT_REVISION, CLIENT_VERSION_MAJOR, CLIENT_VERSION_MINOR,
    MIN_REVISION_WITH_QUOTA_KEY_IN_CLIENT_INFO, MIN_REVISION_WITH_SERVER_TIMEZONE,
};
use crate::codec::{CodedReader, CodedWriter};
use crate::error::Result;
use crate::io::ZeroCopyRead;

/// Marks a query initiated by this client rather than forwarded
const QUERY_KIND_INITIAL: u8 = 1;

/// Native TCP interface marker
const INTERFACE_TCP: u8 = 1;

/// What the server reported about itself in the handshake.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version_major: u64,
    pub version_minor: u64,
    pub revision: u64,
    /// Empty when the server predates timezone reporting
    pub timezone: String,
}

impl ServerInfo {
    /// Decode the server hello payload (packet code already consumed).
    ///
    /// The timezone field gates on the server's own revision: it is the
    /// only optional field read before a negotiated revision exists.
    pub fn load<R: ZeroCopyRead>(reader: &mut CodedReader<R>) -> Result<ServerInfo> {
        let name = reader.read_utf8_string()?;
        let version_major = reader.read_varint64()?;
        let version_minor = reader.read_varint64()?;
        let revision = reader.read_varint64()?;
        let timezone = if revision >= MIN_REVISION_WITH_SERVER_TIMEZONE {
            reader.read_utf8_string()?
        } else {
            String::new()
        };
        Ok(ServerInfo {
            name,
            version_major,
            version_minor,
            revision,
            timezone,
        })
    }
}

/// Per-query client identification, sent revision-gated.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub query_kind: u8,
    pub initial_user: String,
    pub initial_query_id: String,
    pub initial_address: String,
    pub interface: u8,
    pub os_user: String,
    pub client_hostname: String,
    pub client_name: String,
    pub version_major: u64,
    pub version_minor: u64,
    pub revision: u64,
    pub quota_key: String,
}

impl ClientInfo {
    /// Info block for a query initiated here over TCP.
    pub fn for_initial_query(client_name: impl Into<String>) -> Self {
        Self {
            query_kind: QUERY_KIND_INITIAL,
            initial_user: String::new(),
            initial_query_id: String::new(),
            initial_address: "[::ffff:127.0.0.1]:0".to_string(),
            interface: INTERFACE_TCP,
            os_user: String::new(),
            client_hostname: String::new(),
            client_name: client_name.into(),
            version_major: CLIENT_VERSION_MAJOR,
            version_minor: CLIENT_VERSION_MINOR,
            revision: CLIENT_REVISION,
            quota_key: String::new(),
        }
    }

    /// Encode in wire order; the quota key only at new enough revisions.
    pub fn save<W: Write>(&self, writer: &mut CodedWriter<W>, revision: u64) -> Result<()> {
        writer.write_u8(self.query_kind)?;
        writer.write_string(self.initial_user.as_bytes())?;
        writer.write_string(self.initial_query_id.as_bytes())?;
        writer.write_string(self.initial_address.as_bytes())?;
        writer.write_u8(self.interface)?;
        writer.write_string(self.os_user.as_bytes())?;
        writer.write_string(self.client_hostname.as_bytes())?;
        writer.write_string(self.client_name.as_bytes())?;
        writer.write_varint64(self.version_major)?;
        writer.write_varint64(self.version_minor)?;
        writer.write_varint64(self.revision)?;
        if revision >= MIN_REVISION_WITH_QUOTA_KEY_IN_CLIENT_INFO {
            writer.write_string(self.quota_key.as_bytes())?;
        }
        Ok(())
    }
}

/// Monotonic execution counters for the active query.
///
/// Wire packets carry deltas; the session folds them into these running
/// totals before reporting them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub rows: u64,
    pub bytes: u64,
    /// Server's latest estimate of rows to read in total, 0 if unknown
    pub total_rows: u64,
}

impl Progress {
    /// Fold one wire delta into the totals.
    pub fn observe(&mut self, rows: u64, bytes: u64, total_rows: u64) {
        self.rows = self.rows.saturating_add(rows);
        self.bytes = self.bytes.saturating_add(bytes);
        self.total_rows = self.total_rows.max(total_rows);
    }
}

/// Server-side execution statistics, sent once per query.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileInfo {
    pub rows: u64,
    pub blocks: u64,
    pub bytes: u64,
    pub applied_limit: bool,
    pub rows_before_limit: u64,
    pub calculated_rows_before_limit: bool,
}

impl ProfileInfo {
    /// Decode the fixed field sequence of a profile packet.
    pub fn load<R: ZeroCopyRead>(reader: &mut CodedReader<R>) -> Result<ProfileInfo> {
        let rows = reader.read_varint64()?;
        let blocks = reader.read_varint64()?;
        let bytes = reader.read_varint64()?;
        let applied_limit = reader.read_u8()? != 0;
        let rows_before_limit = reader.read_varint64()?;
        let calculated_rows_before_limit = reader.read_u8()? != 0;
        Ok(ProfileInfo {
            rows,
            blocks,
            bytes,
            applied_limit,
            rows_before_limit,
            calculated_rows_before_limit,
        })
    }
}

/// Callbacks driven while a query streams results.
///
/// `on_block` receives every data block, including the zero-row header
/// block most servers send first.
pub trait QueryEvents {
    fn on_block(&mut self, block: Block);

    fn on_progress(&mut self, _progress: &Progress) {}

    fn on_profile(&mut self, _profile: &ProfileInfo) {}
}

/// `QueryEvents` implementation that keeps every received block.
#[derive(Debug, Default)]
pub struct BlockCollector {
    blocks: Vec<Block>,
}

impl BlockCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand over the collected blocks.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl QueryEvents for BlockCollector {
    fn on_block(&mut self, block: Block) {
        self.blocks.push(block);
    }
}
