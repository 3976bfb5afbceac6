//! Channel-driven dispatch loop.
//!
//! The dispatcher pulls JSON values from a [`JsonRpcChannel`], validates them into
//! [`Message`]s and hands each one to a [`MessageHandler`] together with an [`Outbox`]
//! bound to the same channel. Protocol failures are answered on the channel; only
//! transport faults leave the loop.

use crate::channel::{ChannelError, JsonRpcChannel};
use crate::codec::{CodecError, JsonCodec};
use crate::kind::kind_of;
use crate::types::{DecodeError, ErrorObject, Identifier, Message, Notification, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dispatch loop configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum number of messages in one batch (0 = unlimited)
    pub max_batch_size: usize,
    /// Answer an empty batch with an `InvalidRequest` error instead of ignoring it
    pub reject_empty_batch: bool,
}

/// Failure reported by a message handler
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The channel failed while the handler was using it. Ends the dispatch loop.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The handler could not process the message. The peer receives an
    /// `InternalError` reply carrying this text.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

impl From<CodecError> for HandlerError {
    fn from(error: CodecError) -> Self {
        HandlerError::Failed(error.to_string())
    }
}

/// Receives every valid message read from a channel
pub trait MessageHandler {
    fn handle(&mut self, message: &Message, outbox: &mut Outbox<'_>) -> Result<(), HandlerError>;
}

impl<F> MessageHandler for F
where
    F: FnMut(&Message, &mut Outbox<'_>) -> Result<(), HandlerError>,
{
    fn handle(&mut self, message: &Message, outbox: &mut Outbox<'_>) -> Result<(), HandlerError> {
        self(message, outbox)
    }
}

/// Sending half of the channel, handed to handlers alongside each message
pub struct Outbox<'a> {
    channel: &'a mut dyn JsonRpcChannel,
}

impl<'a> Outbox<'a> {
    pub fn new(channel: &'a mut dyn JsonRpcChannel) -> Self {
        Self { channel }
    }

    /// Send any message
    pub fn send(&mut self, message: &Message) -> Result<(), ChannelError> {
        self.channel.send(message.to_json())
    }

    /// Send a request; `params` is omitted from the wire when `None`
    pub fn send_request(
        &mut self,
        method: impl Into<String>,
        id: impl Into<Identifier>,
        params: Option<Value>,
    ) -> Result<(), ChannelError> {
        let request = Request {
            method: method.into(),
            id: id.into(),
            params,
        };
        self.channel.send(request.to_json())
    }

    pub fn send_notification(
        &mut self,
        method: impl Into<String>,
        params: Option<Value>,
    ) -> Result<(), ChannelError> {
        let notification = Notification {
            method: method.into(),
            params,
        };
        self.channel.send(notification.to_json())
    }

    pub fn send_response(&mut self, response: &Response) -> Result<(), ChannelError> {
        self.channel.send(response.to_json())
    }

    /// Send several messages as one JSON array
    pub fn send_batch(&mut self, messages: &[Message]) -> Result<(), ChannelError> {
        self.channel.send(messages.iter().map(JsonCodec::to_json).collect())
    }

    /// The underlying channel
    pub fn channel(&mut self) -> &mut dyn JsonRpcChannel {
        &mut *self.channel
    }
}

pub struct DispatcherBuilder {
    config: DispatchConfig,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            config: DispatchConfig::default(),
        }
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_batch_size(mut self, max: usize) -> Self {
        self.config.max_batch_size = max;
        self
    }

    pub fn reject_empty_batch(mut self, reject: bool) -> Self {
        self.config.reject_empty_batch = reject;
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            config: self.config,
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull loop over a channel
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Process messages until the channel is exhausted.
    ///
    /// Returns `Ok(())` at end of input. Any channel error other than a parse failure
    /// is returned unchanged.
    pub fn run<C, H>(&self, channel: &mut C, handler: &mut H) -> Result<(), ChannelError>
    where
        C: JsonRpcChannel,
        H: MessageHandler + ?Sized,
    {
        loop {
            let value = match channel.receive() {
                Ok(Some(value)) => value,
                Ok(None) => {
                    tracing::debug!("channel exhausted");
                    return Ok(());
                }
                Err(ChannelError::Parse(e)) => {
                    tracing::warn!(error = %e, "received malformed JSON");
                    reply(channel, DecodeError::Parse(e).to_response())?;
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "receive failed");
                    return Err(e);
                }
            };

            self.process_value(channel, handler, value)?;
        }
    }

    /// Same as [`Dispatcher::run`] for a closure handler
    pub fn run_fn<C, F>(&self, channel: &mut C, mut handler: F) -> Result<(), ChannelError>
    where
        C: JsonRpcChannel,
        F: FnMut(&Message, &mut Outbox<'_>) -> Result<(), HandlerError>,
    {
        self.run(channel, &mut handler)
    }

    fn process_value<C, H>(
        &self,
        channel: &mut C,
        handler: &mut H,
        value: Value,
    ) -> Result<(), ChannelError>
    where
        C: JsonRpcChannel,
        H: MessageHandler + ?Sized,
    {
        match value {
            Value::Array(items) => self.process_batch(channel, handler, items),
            object @ Value::Object(_) => process_message(channel, handler, &object),
            other => {
                tracing::trace!(kind = %kind_of(&other), "ignoring non-object value");
                Ok(())
            }
        }
    }

    fn process_batch<C, H>(
        &self,
        channel: &mut C,
        handler: &mut H,
        items: Vec<Value>,
    ) -> Result<(), ChannelError>
    where
        C: JsonRpcChannel,
        H: MessageHandler + ?Sized,
    {
        if items.is_empty() {
            if self.config.reject_empty_batch {
                tracing::warn!("rejecting empty batch");
                let error = ErrorObject::invalid_request(CodecError::EmptyArray.to_string());
                return reply(channel, Response::error(error, None));
            }
            tracing::trace!("ignoring empty batch");
            return Ok(());
        }

        let max = self.config.max_batch_size;
        if max > 0 && items.len() > max {
            tracing::warn!(size = items.len(), max_batch_size = max, "rejecting oversized batch");
            let error = ErrorObject::invalid_request(format!(
                "The batch of {} messages exceeds the limit of {}",
                items.len(),
                max
            ));
            return reply(channel, Response::error(error, None));
        }

        tracing::debug!(size = items.len(), "dispatching batch");
        for item in &items {
            if item.is_object() {
                process_message(channel, handler, item)?;
            } else {
                tracing::trace!(kind = %kind_of(item), "ignoring non-object batch element");
            }
        }
        Ok(())
    }
}

/// Run the dispatch loop with the default configuration
pub fn json_rpc<C, F>(channel: &mut C, handler: F) -> Result<(), ChannelError>
where
    C: JsonRpcChannel,
    F: FnMut(&Message, &mut Outbox<'_>) -> Result<(), HandlerError>,
{
    Dispatcher::default().run_fn(channel, handler)
}

/// `channel.json_rpc(handler)` for every channel
pub trait JsonRpcChannelExt: JsonRpcChannel + Sized {
    fn json_rpc<F>(&mut self, handler: F) -> Result<(), ChannelError>
    where
        F: FnMut(&Message, &mut Outbox<'_>) -> Result<(), HandlerError>,
    {
        json_rpc(self, handler)
    }
}

impl<C: JsonRpcChannel> JsonRpcChannelExt for C {}

fn process_message<C, H>(channel: &mut C, handler: &mut H, value: &Value) -> Result<(), ChannelError>
where
    C: JsonRpcChannel,
    H: MessageHandler + ?Sized,
{
    let message = match Message::from_json(value) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting invalid message");
            return reply(channel, DecodeError::Invalid(e).to_response());
        }
    };

    tracing::debug!(
        kind = kind_name(&message),
        method = ?message.method(),
        id = ?message.id(),
        "dispatching message"
    );

    let reason = match handler.handle(&message, &mut Outbox::new(channel)) {
        Ok(()) => return Ok(()),
        Err(HandlerError::Channel(e)) => {
            tracing::error!(error = %e, "channel failed inside handler");
            return Err(e);
        }
        Err(HandlerError::Failed(reason)) => reason,
    };

    let id = match &message {
        Message::Notification(notification) => {
            tracing::warn!(
                method = %notification.method,
                error = %reason,
                "notification handler failed"
            );
            return Ok(());
        }
        Message::Request(request) => Some(request.id.clone()),
        Message::Response(response) => response.id.clone(),
    };

    tracing::warn!(id = ?id, error = %reason, "handler failed");
    reply(channel, Response::error(ErrorObject::internal_error(reason), id))
}

fn reply<C: JsonRpcChannel>(channel: &mut C, response: Response) -> Result<(), ChannelError> {
    channel
        .send(response.to_json())
        .inspect_err(|e| tracing::error!(error = %e, "failed to send reply"))
}

fn kind_name(message: &Message) -> &'static str {
    match message {
        Message::Request(_) => "request",
        Message::Notification(_) => "notification",
        Message::Response(_) => "response",
    }
}
