//! Packet codes and protocol revision constants
//!
//! The numeric vocabulary of the native protocol. Optional wire fields
//! appeared at specific server revisions; both sides omit a field
//! entirely (no zero-filled placeholder) when the negotiated revision
//! predates it.

/// Protocol revision this client speaks
pub const CLIENT_REVISION: u64 = 54126;

/// Client version advertised in the handshake
pub const CLIENT_VERSION_MAJOR: u64 = 1;
pub const CLIENT_VERSION_MINOR: u64 = 1;

// -----------------------------------------------------------------------------
// Revision thresholds for optional fields
// -----------------------------------------------------------------------------

/// Data packets carry a temporary table name
pub const MIN_REVISION_WITH_TEMPORARY_TABLES: u64 = 50264;

/// Progress packets carry an estimated total row count
pub const MIN_REVISION_WITH_TOTAL_ROWS_IN_PROGRESS: u64 = 51554;

/// Data packets carry block info
pub const MIN_REVISION_WITH_BLOCK_INFO: u64 = 51903;

/// Query packets carry client info
pub const MIN_REVISION_WITH_CLIENT_INFO: u64 = 54032;

/// The server hello carries the server timezone
pub const MIN_REVISION_WITH_SERVER_TIMEZONE: u64 = 54058;

/// Client info carries a quota key
pub const MIN_REVISION_WITH_QUOTA_KEY_IN_CLIENT_INFO: u64 = 54060;

// -----------------------------------------------------------------------------
// Packet codes
// -----------------------------------------------------------------------------

/// Packets a client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPacket {
    Hello = 0,
    Query = 1,
    Data = 2,
}

impl ClientPacket {
    /// Wire code of this packet.
    pub fn code(self) -> u64 {
        self as u64
    }
}

/// Packets a server sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPacket {
    Hello = 0,
    Data = 1,
    Exception = 2,
    Progress = 3,
    EndOfStream = 5,
    ProfileInfo = 6,
}

impl ServerPacket {
    /// Decode a wire code. Unknown codes are `None` and fatal to the
    /// session: framing past them cannot be trusted.
    pub fn from_code(code: u64) -> Option<ServerPacket> {
        match code {
            0 => Some(ServerPacket::Hello),
            1 => Some(ServerPacket::Data),
            2 => Some(ServerPacket::Exception),
            3 => Some(ServerPacket::Progress),
            5 => Some(ServerPacket::EndOfStream),
            6 => Some(ServerPacket::ProfileInfo),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Query markers
// -----------------------------------------------------------------------------

/// Run the query to completion, the only stage this client requests
pub const STAGE_COMPLETE: u64 = 2;

/// No wire compression
pub const COMPRESSION_DISABLED: u64 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_codes_round_trip() {
        for packet in [
            ServerPacket::Hello,
            ServerPacket::Data,
            ServerPacket::Exception,
            ServerPacket::Progress,
            ServerPacket::EndOfStream,
            ServerPacket::ProfileInfo,
        ] {
            assert_eq!(ServerPacket::from_code(packet as u64), Some(packet));
        }
        assert_eq!(ServerPacket::from_code(4), None);
        assert_eq!(ServerPacket::from_code(7), None);
    }
}
