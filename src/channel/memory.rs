//! In-memory channels.
//!
//! [`MemoryChannel`] is a scripted queue for driving a dispatcher from tests.
//! [`pair`] links two endpoints across threads.

use super::{ChannelError, JsonRpcChannel};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};

enum Inbound {
    Json(Value),
    Text(String),
}

/// Queue-backed channel: pushed input is received in order, sent values are recorded
#[derive(Default)]
pub struct MemoryChannel {
    input: VecDeque<Inbound>,
    output: Vec<Value>,
    closed: bool,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel preloaded with input values
    pub fn with_input(input: impl IntoIterator<Item = Value>) -> Self {
        let mut channel = Self::new();
        channel.input.extend(input.into_iter().map(Inbound::Json));
        channel
    }

    /// Queue a JSON value for `receive`
    pub fn push(&mut self, value: Value) {
        self.input.push_back(Inbound::Json(value));
    }

    /// Queue raw text; it is parsed when received, so malformed text surfaces as
    /// [`ChannelError::Parse`]
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.input.push_back(Inbound::Text(text.into()));
    }

    /// Values sent so far
    pub fn sent(&self) -> &[Value] {
        &self.output
    }

    /// Drain the values sent so far
    pub fn take_sent(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.output)
    }

    pub fn pending(&self) -> usize {
        self.input.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl JsonRpcChannel for MemoryChannel {
    fn send(&mut self, message: Value) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.output.push(message);
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<Value>, ChannelError> {
        if self.closed {
            return Ok(None);
        }
        match self.input.pop_front() {
            None => Ok(None),
            Some(Inbound::Json(value)) => Ok(Some(value)),
            Some(Inbound::Text(text)) => Ok(Some(serde_json::from_str(&text)?)),
        }
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        self.closed = true;
        Ok(())
    }
}

/// One end of a linked in-memory channel pair
pub struct LinkedChannel {
    tx: Option<Sender<String>>,
    rx: Receiver<String>,
}

/// Create two connected endpoints. What one sends, the other receives.
///
/// `receive` blocks until the peer sends a message. It returns `None` once the peer is
/// closed or dropped and every message it sent has been received.
pub fn pair() -> (LinkedChannel, LinkedChannel) {
    let (client_tx, server_rx) = mpsc::channel();
    let (server_tx, client_rx) = mpsc::channel();
    (
        LinkedChannel {
            tx: Some(client_tx),
            rx: client_rx,
        },
        LinkedChannel {
            tx: Some(server_tx),
            rx: server_rx,
        },
    )
}

impl LinkedChannel {
    /// Send raw text to the peer without validating it
    pub fn send_text(&mut self, text: impl Into<String>) -> Result<(), ChannelError> {
        let tx = self.tx.as_ref().ok_or(ChannelError::Closed)?;
        tx.send(text.into()).map_err(|_| ChannelError::Closed)
    }
}

impl JsonRpcChannel for LinkedChannel {
    fn send(&mut self, message: Value) -> Result<(), ChannelError> {
        self.send_text(message.to_string())
    }

    fn receive(&mut self) -> Result<Option<Value>, ChannelError> {
        match self.rx.recv() {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(mpsc::RecvError) => Ok(None),
        }
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        self.tx = None;
        Ok(())
    }
}
