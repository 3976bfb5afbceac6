//! # ash-rpc-engine
//!
//! A strict, transport-agnostic JSON-RPC 2.0 message engine.
//!
//! ## Features
//!
//! - **Strict message model** - Requests, notifications and responses validated field by field
//! - **Typed codecs** - Every decode failure carries the exact text sent back to the peer
//! - **Channel-driven dispatch** - A pull loop over any [`JsonRpcChannel`], replying on the same channel
//! - **Batch support** - Arrays processed element by element, with optional size limits
//! - **Channels included** - In-memory queue, linked in-process pair, and byte streams with
//!   newline or `Content-Length` framing
//! - **Type-safe builders** - Fluent API for constructing messages
//! - **Macro support** - Convenient macros for common response patterns
//!
//! ## Quick Start
//!
//! ```rust
//! use ash_rpc_engine::*;
//! use serde_json::json;
//!
//! let mut channel = MemoryChannel::new();
//! channel.push(json!({"jsonrpc": "2.0", "method": "ping", "id": 1}));
//!
//! channel.json_rpc(|message, outbox| {
//!     message.request(|request| {
//!         outbox.send_response(&Response::success(json!("pong"), Some(request.id.clone())))?;
//!         Ok(())
//!     })
//! })?;
//!
//! assert_eq!(channel.sent()[0], json!({"jsonrpc": "2.0", "id": 1, "result": "pong"}));
//! # Ok::<(), ChannelError>(())
//! ```

// Module declarations
pub mod builders;
pub mod channel;
pub mod codec;
pub mod dispatch;
pub mod kind;
pub mod macros;
pub mod types;

// Re-export all core types
pub use types::*;

// Re-export all builders
pub use builders::*;

// Re-export the dispatch loop
pub use dispatch::*;

pub use channel::{
    ChannelError, Framing, JsonRpcChannel, LinkedChannel, MemoryChannel, StreamChannel,
    StreamChannelBuilder, StreamConfig,
};
pub use codec::{CodecError, JsonCodec, JsonObject, NonEmpty};
pub use kind::{Kind, kind_of};
