//! Message channels the dispatcher pulls from and replies into.
//!
//! A channel moves whole JSON values. Framing, buffering and text parsing belong to the
//! implementation; the dispatcher only sees decoded values or a [`ChannelError`].

pub mod config;
pub mod memory;
pub mod stream;

pub use config::{Framing, StreamConfig};
pub use memory::{LinkedChannel, MemoryChannel, pair};
pub use stream::{StreamChannel, StreamChannelBuilder, stdio};

use serde_json::Value;

/// Errors raised by channel implementations
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Incoming text was not valid JSON. The channel stays usable.
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Channel is closed")]
    Closed,

    #[error("Message of {size} bytes exceeds the limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("Invalid framing: {0}")]
    Framing(String),
}

impl ChannelError {
    /// Whether the dispatcher can answer the peer and keep reading
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ChannelError::Parse(_))
    }
}

/// Bidirectional transport of JSON values
pub trait JsonRpcChannel {
    /// Send one JSON value to the peer
    fn send(&mut self, message: Value) -> Result<(), ChannelError>;

    /// Receive the next JSON value, or `None` once the input is exhausted
    fn receive(&mut self) -> Result<Option<Value>, ChannelError>;

    /// Close the channel; later sends fail with [`ChannelError::Closed`]
    fn close(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

impl<C: JsonRpcChannel + ?Sized> JsonRpcChannel for &mut C {
    fn send(&mut self, message: Value) -> Result<(), ChannelError> {
        (**self).send(message)
    }

    fn receive(&mut self) -> Result<Option<Value>, ChannelError> {
        (**self).receive()
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        (**self).close()
    }
}

impl<C: JsonRpcChannel + ?Sized> JsonRpcChannel for Box<C> {
    fn send(&mut self, message: Value) -> Result<(), ChannelError> {
        (**self).send(message)
    }

    fn receive(&mut self) -> Result<Option<Value>, ChannelError> {
        (**self).receive()
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_errors_are_recoverable() {
        let parse = serde_json::from_str::<Value>("{").unwrap_err();
        assert!(ChannelError::from(parse).is_recoverable());
        assert!(!ChannelError::Closed.is_recoverable());
        assert!(
            !ChannelError::MessageTooLarge {
                size: 10,
                limit: 5
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ChannelError::Closed.to_string(), "Channel is closed");
        assert_eq!(
            ChannelError::MessageTooLarge { size: 10, limit: 5 }.to_string(),
            "Message of 10 bytes exceeds the limit of 5 bytes"
        );
    }

    #[test]
    fn test_boxed_channel_forwards() {
        let mut channel: Box<dyn JsonRpcChannel> = Box::new(MemoryChannel::new());
        channel.send(json!(1)).unwrap();
        assert_eq!(channel.receive().unwrap(), None);
        channel.close().unwrap();
        assert!(matches!(channel.send(json!(2)), Err(ChannelError::Closed)));
    }
}
