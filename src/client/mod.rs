//! Client Module
//!
//! The protocol-facing surface: packet vocabulary, session metadata, and
//! the query session state machine.
//!
//! ## Packet exchange
//!
//! ```text
//! client ──▶ Hello {name, version, revision, database, user, password}
//! server ──▶ Hello {name, version, revision, [timezone]}
//! client ──▶ Query {id, [client info], settings, stage, compression,
//!                   text} + empty Data
//! server ──▶ Data* / Progress* / ProfileInfo? ... EndOfStream
//! ```
//!
//! Fields in brackets are revision-gated and omitted entirely below
//! their threshold.

pub mod packet;

mod info;
mod session;

pub use info::{BlockCollector, ClientInfo, Progress, ProfileInfo, QueryEvents, ServerInfo};
pub use session::{Session, SessionState, Transport, TransportWriter};
