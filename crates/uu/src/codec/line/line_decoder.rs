//! Decoder for the data lines and the terminator of a uuencoded stream.
//!
//! Every data line is a length character followed by groups of four symbols
//! and a newline. A line whose length character is zero ends the data and must
//! be followed by `end`.

use bytes::{Buf, Bytes, BytesMut};
use std::task::Poll;
use tokio_util::codec::Decoder;
use tracing::{debug, trace};
use LineState::*;

use crate::ensure;
use crate::protocol::alphabet::{self, MAX_ENCODED_CHARS};
use crate::protocol::{DecodeError, PayloadItem};

/// Token of the line closing the stream
const END_TOKEN: &[u8] = b"end";

/// A decoder for uuencoded data lines.
///
/// Each decoded line is yielded as one [`PayloadItem::Chunk`] holding exactly
/// the number of bytes declared by its length character. After the `end`
/// line has been validated a single [`PayloadItem::Eof`] is yielded and the
/// decoder stops consuming input; anything after `end` stays in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDecoder {
    state: LineState,
    declared_len: usize,
}

impl LineDecoder {
    /// Creates a decoder positioned at the length character of the first line.
    pub fn new() -> Self {
        Self { state: Length, declared_len: 0 }
    }

    /// Returns true once the terminator has been validated.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == Done
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    /// Read the length character
    Length,
    /// Read the encoded symbols up to the newline
    Line,
    /// Skip empty lines until `end`
    End,
    /// `end` has been read
    Done,
}

impl Decoder for LineDecoder {
    type Item = PayloadItem;
    type Error = DecodeError;

    /// Decodes the next line from the input buffer.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` when a data line is decoded
    /// - `Ok(Some(PayloadItem::Eof))` once, when `end` is read
    /// - `Ok(None)` when more data is needed, or after `Eof` was returned
    /// - `Err(DecodeError)` if the line is invalid
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == Done {
                return Ok(None);
            }

            let mut buf = None;

            self.state = match self.state.step(src, &mut self.declared_len, &mut buf) {
                Poll::Pending => return Ok(None),
                Poll::Ready(Ok(new_state)) => new_state,
                Poll::Ready(Err(e)) => return Err(e),
            };

            if let Some(bytes) = buf {
                trace!(len = bytes.len(), "decoded line");
                return Ok(Some(PayloadItem::Chunk(bytes)));
            }

            if self.state == Done {
                debug!("finished reading uuencoded data");
                return Ok(Some(PayloadItem::Eof));
            }
        }
    }

    /// Called once the input is exhausted; maps the current state to the
    /// error describing what is missing.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(buf)? {
            return Ok(Some(item));
        }

        match self.state {
            Done => Ok(None),
            Length => Err(DecodeError::PrematureEof),
            Line => Err(DecodeError::MissingLineTerminator),
            End => {
                // `end` may be the last bytes of the input
                let line = buf.strip_suffix(b"\r").unwrap_or(&buf[..]);
                if line == END_TOKEN {
                    buf.clear();
                    self.state = Done;
                    debug!("finished reading uuencoded data");
                    Ok(Some(PayloadItem::Eof))
                } else if line.is_empty() {
                    Err(DecodeError::PrematureEof)
                } else {
                    Err(DecodeError::unexpected_trailer(line))
                }
            }
        }
    }
}

impl LineState {
    fn step(&self, src: &mut BytesMut, declared_len: &mut usize, buf: &mut Option<Bytes>) -> Poll<Result<LineState, DecodeError>> {
        match self {
            Length => LineState::read_length(src, declared_len),
            Line => LineState::read_line(src, *declared_len, buf),
            End => LineState::read_end(src),
            Done => Poll::Ready(Ok(Done)),
        }
    }

    /// Reads the length character of the next line.
    ///
    /// # State Transitions
    /// - On zero (`` ` `` or space): move to End
    /// - On any other symbol: move to Line
    /// - On a byte outside the alphabet: return error
    fn read_length(src: &mut BytesMut, declared_len: &mut usize) -> Poll<Result<LineState, DecodeError>> {
        if src.is_empty() {
            return Poll::Pending;
        }

        let len = match alphabet::decode_symbol(src.get_u8()) {
            Ok(len) => usize::from(len),
            Err(e) => return Poll::Ready(Err(e)),
        };

        *declared_len = len;
        if len == 0 { Poll::Ready(Ok(End)) } else { Poll::Ready(Ok(Line)) }
    }

    /// Reads and decodes the encoded symbols of a line.
    ///
    /// The whole line is validated before anything is decoded, and nothing is
    /// consumed from `src` until the line ending is present.
    ///
    /// # State Transitions
    /// - On a valid line: move back to Length
    /// - On a line ending not yet buffered: stay in Line
    /// - On an invalid line: return error
    fn read_line(src: &mut BytesMut, declared_len: usize, buf: &mut Option<Bytes>) -> Poll<Result<LineState, DecodeError>> {
        let Some(nl) = src.iter().position(|&b| b == b'\n') else {
            // more than 64 symbols plus a CR can never become a valid line
            if src.len() > MAX_ENCODED_CHARS + 1 {
                return Poll::Ready(Err(DecodeError::line_too_long(src.len(), MAX_ENCODED_CHARS)));
            }
            return Poll::Pending;
        };

        let encoded = src[..nl].strip_suffix(b"\r").unwrap_or(&src[..nl]);

        match decode_line(encoded, declared_len) {
            Ok(bytes) => {
                src.advance(nl + 1);
                *buf = Some(bytes);
                Poll::Ready(Ok(Length))
            }
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    /// Reads the lines between the zero length line and `end`.
    ///
    /// # State Transitions
    /// - On an empty line or a lone zero symbol: stay in End
    /// - On `end`: move to Done
    /// - On anything else: return error
    fn read_end(src: &mut BytesMut) -> Poll<Result<LineState, DecodeError>> {
        let Some(nl) = src.iter().position(|&b| b == b'\n') else {
            // longer than "end\r" without a newline, this can't be a valid trailer
            if src.len() > END_TOKEN.len() + 1 {
                return Poll::Ready(Err(DecodeError::unexpected_trailer(&src[..])));
            }
            return Poll::Pending;
        };

        let line = src[..nl].strip_suffix(b"\r").unwrap_or(&src[..nl]);

        let next_state = match line {
            b"" | b"`" | b" " => End,
            END_TOKEN => Done,
            other => return Poll::Ready(Err(DecodeError::unexpected_trailer(other))),
        };

        src.advance(nl + 1);
        Poll::Ready(Ok(next_state))
    }
}

/// Validates and decodes the symbols of one line, without the length character.
fn decode_line(encoded: &[u8], declared_len: usize) -> Result<Bytes, DecodeError> {
    ensure!(encoded.len() <= MAX_ENCODED_CHARS, DecodeError::line_too_long(encoded.len(), MAX_ENCODED_CHARS));
    ensure!(encoded.len() % 4 == 0, DecodeError::bad_framing(encoded.len()));

    let implied_len = encoded.len() / 4 * 3;
    ensure!(implied_len >= declared_len, DecodeError::length_mismatch(declared_len, implied_len));

    let mut decoded = BytesMut::with_capacity(implied_len);
    for group in encoded.chunks_exact(4) {
        decoded.extend_from_slice(&alphabet::unpack([group[0], group[1], group[2], group[3]])?);
    }

    decoded.truncate(declared_len);
    Ok(decoded.freeze())
}
