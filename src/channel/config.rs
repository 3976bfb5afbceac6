//! Byte-stream channel configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// How messages are delimited on a byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// One JSON document per line
    #[default]
    Newline,
    /// `Content-Length: <n>` header block followed by `n` bytes of JSON
    ContentLength,
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::Newline => f.write_str("newline"),
            Framing::ContentLength => f.write_str("content-length"),
        }
    }
}

/// Stream channel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Message delimiting scheme
    pub framing: Framing,
    /// Maximum message size in bytes (0 = unlimited)
    pub max_message_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            framing: Framing::Newline,
            max_message_size: 1024 * 1024, // 1 MB
        }
    }
}

impl StreamConfig {
    /// Check a message size against the limit
    pub(crate) fn allows(&self, size: usize) -> bool {
        self.max_message_size == 0 || size <= self.max_message_size
    }
}
