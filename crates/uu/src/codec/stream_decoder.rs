//! Decoder for a complete uuencoded unit.
//!
//! Coordinates [`HeaderDecoder`] and [`LineDecoder`] and remembers the first
//! validation failure, so a broken stream keeps reporting the same error.
//!
//! # Example
//!
//! ```
//! use micro_uu::codec::StreamDecoder;
//! use micro_uu::protocol::{Message, PayloadItem};
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = StreamDecoder::new();
//! let mut buffer = BytesMut::from(&b"begin 644 cat.txt\n#0V%T\n`\nend\n"[..]);
//!
//! let header = decoder.decode(&mut buffer).unwrap().unwrap().into_header().unwrap();
//! assert_eq!(header.name(), "cat.txt");
//!
//! let line = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(line, Message::Payload(PayloadItem::Chunk("Cat".into())));
//! ```

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::warn;

use crate::codec::header::HeaderDecoder;
use crate::codec::line::LineDecoder;
use crate::protocol::{DecodeError, Message};

/// A decoder for a uuencoded stream that yields the header and then the data
///
/// # State Machine
///
/// The decoder maintains its state through the `line_decoder` field:
/// - `None`: currently parsing the header
/// - `Some(LineDecoder)`: currently parsing data lines and the trailer
///
/// Once a validation error is returned, every later call returns a clone of it.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    header_decoder: HeaderDecoder,
    line_decoder: Option<LineDecoder>,
    failed: Option<DecodeError>,
}

impl StreamDecoder {
    /// Creates a new `StreamDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns true once the header has been yielded.
    #[inline]
    pub fn is_header_parsed(&self) -> bool {
        self.line_decoder.is_some()
    }

    /// Returns true once `end` has been validated.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.line_decoder.as_ref().is_some_and(LineDecoder::is_done)
    }

    /// Returns the error that ended this stream, if any.
    #[inline]
    pub fn failure(&self) -> Option<&DecodeError> {
        self.failed.as_ref()
    }

    fn step(&mut self, src: &mut BytesMut, eof: bool) -> Result<Option<Message>, DecodeError> {
        if let Some(line_decoder) = &mut self.line_decoder {
            let item = if eof { line_decoder.decode_eof(src)? } else { line_decoder.decode(src)? };
            return Ok(item.map(Message::Payload));
        }

        let header = if eof { self.header_decoder.decode_eof(src)? } else { self.header_decoder.decode(src)? };

        let message = match header {
            Some(header) => {
                self.line_decoder = Some(LineDecoder::new());
                Some(Message::Header(header))
            }
            None => None,
        };

        Ok(message)
    }

    fn guard(&mut self, result: Result<Option<Message>, DecodeError>) -> Result<Option<Message>, DecodeError> {
        if let Err(e) = &result {
            if e.is_fatal() {
                warn!(cause = %e, "uudecode failed, stream is unusable");
                self.failed = Some(e.clone());
            }
        }
        result
    }
}

impl Decoder for StreamDecoder {
    type Item = Message;
    type Error = DecodeError;

    /// Attempts to decode the next message from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: the header, always first
    /// - `Ok(Some(Message::Payload(PayloadItem::Chunk(_))))`: the bytes of one data line
    /// - `Ok(Some(Message::Payload(PayloadItem::Eof)))`: `end` was read, yielded once
    /// - `Ok(None)`: need more data, or the stream is complete
    /// - `Err(_)`: the stream is invalid
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }

        let result = self.step(src, false);
        self.guard(result)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }

        let result = self.step(buf, true);
        self.guard(result)
    }
}
