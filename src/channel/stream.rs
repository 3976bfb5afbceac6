//! Byte-stream channel over any reader/writer pair.
//!
//! Supports newline-delimited JSON and `Content-Length` header framing.

use super::{ChannelError, Framing, JsonRpcChannel, StreamConfig};
use serde_json::Value;
use std::io::{self, BufRead, Read, Write};

const CONTENT_LENGTH: &str = "Content-Length";

pub struct StreamChannelBuilder<R, W> {
    reader: R,
    writer: W,
    config: StreamConfig,
}

impl<R: BufRead, W: Write> StreamChannelBuilder<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            config: StreamConfig::default(),
        }
    }

    pub fn config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    pub fn framing(mut self, framing: Framing) -> Self {
        self.config.framing = framing;
        self
    }

    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    pub fn build(self) -> StreamChannel<R, W> {
        tracing::debug!(
            framing = %self.config.framing,
            max_message_size = self.config.max_message_size,
            "stream channel created"
        );
        StreamChannel {
            reader: self.reader,
            writer: self.writer,
            config: self.config,
            closed: false,
        }
    }
}

/// Channel reading framed JSON from `R` and writing framed JSON to `W`
pub struct StreamChannel<R, W> {
    reader: R,
    writer: W,
    config: StreamConfig,
    closed: bool,
}

impl<R: BufRead, W: Write> StreamChannel<R, W> {
    /// Create a channel with the default configuration
    pub fn new(reader: R, writer: W) -> Self {
        Self::builder(reader, writer).build()
    }

    pub fn builder(reader: R, writer: W) -> StreamChannelBuilder<R, W> {
        StreamChannelBuilder::new(reader, writer)
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn check_size(&self, size: usize) -> Result<(), ChannelError> {
        if self.config.allows(size) {
            Ok(())
        } else {
            Err(ChannelError::MessageTooLarge {
                size,
                limit: self.config.max_message_size,
            })
        }
    }

    fn read_frame(&mut self) -> Result<Option<Vec<u8>>, ChannelError> {
        match self.config.framing {
            Framing::Newline => self.read_line_frame(),
            Framing::ContentLength => self.read_content_length_frame(),
        }
    }

    fn read_line_frame(&mut self) -> Result<Option<Vec<u8>>, ChannelError> {
        let limit = self.config.max_message_size;
        // Payload plus a CRLF terminator
        let cap = limit.saturating_add(2);
        loop {
            let mut line = Vec::new();
            let read = if limit == 0 {
                self.reader.read_until(b'\n', &mut line)?
            } else {
                (&mut self.reader)
                    .take(cap as u64)
                    .read_until(b'\n', &mut line)?
            };
            if read == 0 {
                return Ok(None);
            }

            if limit != 0 && line.len() == cap && line.last() != Some(&b'\n') {
                let rest = self.reader.skip_until(b'\n')?;
                return Err(ChannelError::MessageTooLarge {
                    size: line.len() + rest,
                    limit,
                });
            }

            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                tracing::trace!("skipping blank line");
                continue;
            }

            self.check_size(line.len())?;
            return Ok(Some(line));
        }
    }

    fn read_content_length_frame(&mut self) -> Result<Option<Vec<u8>>, ChannelError> {
        let mut content_length = None;
        let mut seen_header = false;

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                if seen_header {
                    return Err(ChannelError::Framing(
                        "unexpected end of stream in header block".into(),
                    ));
                }
                return Ok(None);
            }

            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if seen_header {
                    break;
                }
                continue;
            }
            seen_header = true;

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ChannelError::Framing(format!("malformed header '{}'", line)))?;
            if name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
                let value = value.trim();
                let length = value.parse::<usize>().map_err(|_| {
                    ChannelError::Framing(format!("invalid {} '{}'", CONTENT_LENGTH, value))
                })?;
                content_length = Some(length);
            } else {
                tracing::trace!(header = name.trim(), "ignoring header");
            }
        }

        let length = content_length
            .ok_or_else(|| ChannelError::Framing(format!("missing {} header", CONTENT_LENGTH)))?;
        self.check_size(length)?;

        let mut body = Vec::new();
        (&mut self.reader)
            .take(length as u64)
            .read_to_end(&mut body)?;
        if body.len() != length {
            return Err(ChannelError::Framing(format!(
                "expected {} body bytes, got {}",
                length,
                body.len()
            )));
        }
        Ok(Some(body))
    }
}

impl<R: BufRead, W: Write> JsonRpcChannel for StreamChannel<R, W> {
    fn send(&mut self, message: Value) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }

        let body = message.to_string();
        self.check_size(body.len())?;

        match self.config.framing {
            Framing::Newline => {
                self.writer.write_all(body.as_bytes())?;
                self.writer.write_all(b"\n")?;
            }
            Framing::ContentLength => {
                write!(self.writer, "{}: {}\r\n\r\n", CONTENT_LENGTH, body.len())?;
                self.writer.write_all(body.as_bytes())?;
            }
        }
        self.writer.flush()?;

        tracing::trace!(framing = %self.config.framing, bytes = body.len(), "frame written");
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<Value>, ChannelError> {
        if self.closed {
            return Ok(None);
        }

        let Some(frame) = self.read_frame()? else {
            tracing::trace!("end of stream");
            return Ok(None);
        };
        tracing::trace!(framing = %self.config.framing, bytes = frame.len(), "frame read");
        Ok(Some(serde_json::from_slice(&frame)?))
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        if !self.closed {
            self.closed = true;
            self.writer.flush()?;
        }
        Ok(())
    }
}

/// Channel over the process's standard input and output
pub fn stdio() -> StreamChannel<io::StdinLock<'static>, io::Stdout> {
    StreamChannel::new(io::stdin().lock(), io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn channel(input: &str, framing: Framing) -> StreamChannel<Cursor<Vec<u8>>, Vec<u8>> {
        StreamChannel::builder(Cursor::new(input.as_bytes().to_vec()), Vec::new())
            .framing(framing)
            .build()
    }

    fn written(channel: StreamChannel<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        let (_, writer) = channel.into_inner();
        String::from_utf8(writer).unwrap()
    }

    #[test]
    fn test_newline_receive() {
        let mut channel = channel("{\"a\":1}\r\n\n  \n[2]\n3", Framing::Newline);
        assert_eq!(channel.receive().unwrap(), Some(json!({"a": 1})));
        assert_eq!(channel.receive().unwrap(), Some(json!([2])));
        assert_eq!(channel.receive().unwrap(), Some(json!(3)));
        assert_eq!(channel.receive().unwrap(), None);
    }

    #[test]
    fn test_newline_parse_error_keeps_stream_aligned() {
        let mut channel = channel("{oops\n{\"ok\":true}\n", Framing::Newline);
        assert!(matches!(channel.receive(), Err(ChannelError::Parse(_))));
        assert_eq!(channel.receive().unwrap(), Some(json!({"ok": true})));
    }

    #[test]
    fn test_newline_send() {
        let mut channel = channel("", Framing::Newline);
        channel.send(json!({"jsonrpc": "2.0", "method": "ping"})).unwrap();
        channel.send(json!(1)).unwrap();
        assert_eq!(
            written(channel),
            "{\"jsonrpc\":\"2.0\",\"method\":\"ping\"}\n1\n"
        );
    }

    #[test]
    fn test_content_length_receive() {
        let input = "Content-Length: 7\r\nContent-Type: application/json\r\n\r\n{\"a\":1}\
                     content-length:3\r\n\r\n[2]";
        let mut channel = channel(input, Framing::ContentLength);
        assert_eq!(channel.receive().unwrap(), Some(json!({"a": 1})));
        assert_eq!(channel.receive().unwrap(), Some(json!([2])));
        assert_eq!(channel.receive().unwrap(), None);
    }

    #[test]
    fn test_content_length_send() {
        let mut channel = channel("", Framing::ContentLength);
        channel.send(json!({"id": 1})).unwrap();
        assert_eq!(written(channel), "Content-Length: 8\r\n\r\n{\"id\":1}");
    }

    #[test]
    fn test_content_length_framing_errors() {
        let mut missing = channel("Content-Type: x\r\n\r\n{}", Framing::ContentLength);
        assert!(matches!(missing.receive(), Err(ChannelError::Framing(_))));

        let mut invalid = channel("Content-Length: ten\r\n\r\n", Framing::ContentLength);
        assert_eq!(
            invalid.receive().unwrap_err().to_string(),
            "Invalid framing: invalid Content-Length 'ten'"
        );

        let mut truncated = channel("Content-Length: 2\r\n", Framing::ContentLength);
        assert!(matches!(truncated.receive(), Err(ChannelError::Framing(_))));

        let mut short_body = channel("Content-Length: 10\r\n\r\n{}", Framing::ContentLength);
        assert_eq!(
            short_body.receive().unwrap_err().to_string(),
            "Invalid framing: expected 10 body bytes, got 2"
        );
    }

    #[test]
    fn test_content_length_beyond_input_without_limit() {
        let input = format!("Content-Length: {}\r\n\r\n{{}}", usize::MAX);
        let mut channel = StreamChannel::builder(Cursor::new(input.into_bytes()), Vec::new())
            .framing(Framing::ContentLength)
            .max_message_size(0)
            .build();
        assert!(matches!(channel.receive(), Err(ChannelError::Framing(_))));
    }

    #[test]
    fn test_message_size_limit() {
        let mut channel = StreamChannel::builder(Cursor::new(b"[1,2,3]\n".to_vec()), Vec::new())
            .max_message_size(4)
            .build();
        assert!(matches!(
            channel.receive(),
            Err(ChannelError::MessageTooLarge { size: 8, limit: 4 })
        ));
        assert!(matches!(
            channel.send(json!("long")),
            Err(ChannelError::MessageTooLarge { size: 6, limit: 4 })
        ));
        channel.send(json!(1)).unwrap();
    }

    #[test]
    fn test_newline_limit_bounds_line_read() {
        let input = format!("{}\n[1]\r\n\"abcd\"\n", "x".repeat(64));
        let mut channel = StreamChannel::builder(Cursor::new(input.into_bytes()), Vec::new())
            .max_message_size(6)
            .build();
        assert!(matches!(
            channel.receive(),
            Err(ChannelError::MessageTooLarge { size: 65, limit: 6 })
        ));
        assert_eq!(channel.receive().unwrap(), Some(json!([1])));
        assert_eq!(channel.receive().unwrap(), Some(json!("abcd")));
        assert_eq!(channel.receive().unwrap(), None);
    }

    #[test]
    fn test_close() {
        let mut channel = channel("1\n", Framing::Newline);
        channel.close().unwrap();
        channel.close().unwrap();
        assert_eq!(channel.receive().unwrap(), None);
        assert!(matches!(channel.send(json!(1)), Err(ChannelError::Closed)));
    }
}
