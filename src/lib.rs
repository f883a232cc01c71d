//! # colwire
//!
//! A client engine for the native wire protocol of columnar database
//! servers, with:
//! - Pooled background prefetch overlapping network wait with decoding
//! - Strict binary framing (varints, length-prefixed strings, columns)
//! - Revision-gated optional fields negotiated in the handshake
//! - A fail-closed session state machine
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Session                              │
//! │         (handshake / query / packet dispatch)                │
//! └──────────┬─────────────────────────────────────┬────────────┘
//!            │ decode                              │ encode
//! ┌──────────▼──────────┐               ┌──────────▼──────────┐
//! │     CodedReader     │               │     CodedWriter     │
//! │ (varints, strings,  │               │  (mirror image of   │
//! │   column batches)   │               │     the reader)     │
//! └──────────┬──────────┘               └──────────┬──────────┘
//!            │ ZeroCopyRead                        │
//! ┌──────────▼──────────┐               ┌──────────▼──────────┐
//! │   PrefetchReader    │               │  BufWriter<writer>  │
//! │ (N pooled buffers,  │               └──────────┬──────────┘
//! │    fill thread)     │                          │
//! └──────────┬──────────┘                          │
//!            └──────────────┬─────────────────────┘
//!                    ┌──────▼──────┐
//!                    │  transport  │
//!                    └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod io;
pub mod codec;
pub mod column;
pub mod block;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use block::{Block, BlockInfo};
pub use client::{BlockCollector, Progress, ProfileInfo, QueryEvents, ServerInfo, Session};
pub use column::Column;
pub use config::ClientOptions;
pub use error::{ColwireError, Result};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of colwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
