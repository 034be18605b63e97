use std::cmp;
use std::io::{self, Read};

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder as _;
use tracing::{debug, trace};

use crate::codec::StreamDecoder;
use crate::protocol::{DecodeError, Header, Message, PayloadItem};

const DEFAULT_READ_SIZE: usize = 8 * 1024;

/// A pull based uudecoder over a blocking reader.
///
/// The header is parsed lazily, on the first call to [`header`](Self::header)
/// or to a read method, and kept afterwards. Decoded data is handed out in
/// whatever amounts the caller asks for; a data line that does not fit into
/// the caller's buffer is kept and returned by the next read.
///
/// A format violation ends the session: the failing call returns the error
/// and so does every call after it. Errors of the underlying reader are
/// passed through and the call may be retried.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use micro_uu::Decoder;
///
/// let input = b"begin 644 cat.txt\n#0V%T\n`\nend\n";
/// let mut decoder = Decoder::new(&input[..]);
///
/// assert_eq!(decoder.name().unwrap(), "cat.txt");
/// assert_eq!(decoder.mode().unwrap(), 0o644);
///
/// let mut data = String::new();
/// decoder.read_to_string(&mut data).unwrap();
/// assert_eq!(data, "Cat");
/// ```
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    buffer: BytesMut,
    read_size: usize,
    codec: StreamDecoder,
    header: Option<Header>,
    remaining: Bytes,
    eof: bool,
    done: bool,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_READ_SIZE)
    }

    /// Creates a decoder that reads at most `capacity` bytes from `reader` at a time.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        let read_size = cmp::max(capacity, 1);
        Self {
            reader,
            buffer: BytesMut::with_capacity(read_size),
            read_size,
            codec: StreamDecoder::new(),
            header: None,
            remaining: Bytes::new(),
            eof: false,
            done: false,
        }
    }

    /// Returns the header, parsing it first if needed.
    ///
    /// Input is only consumed by the first successful call.
    pub fn header(&mut self) -> Result<&Header, DecodeError> {
        if let Some(header) = self.header.take() {
            return Ok(self.header.insert(header));
        }

        match self.next_message(true)? {
            Some(Message::Header(header)) => {
                debug!(name = header.name(), "session header ready");
                Ok(self.header.insert(header))
            }
            _ => Err(DecodeError::malformed_header("missing begin line")),
        }
    }

    /// Returns the mode field of the header, parsing it first if needed.
    pub fn mode(&mut self) -> Result<u16, DecodeError> {
        self.header().map(Header::mode)
    }

    /// Returns the file name of the header, parsing it first if needed.
    pub fn name(&mut self) -> Result<&str, DecodeError> {
        self.header().map(Header::name)
    }

    /// Reads decoded bytes into `buf`, returning how many were written.
    ///
    /// Returns `Ok(0)` for a non empty `buf` only after `end` has been
    /// validated. Fewer bytes than requested may be returned even though more
    /// data follows. If the input turns out to be invalid after some bytes
    /// were copied, those bytes are returned and the error is reported by the
    /// next call.
    pub fn read_decoded(&mut self, buf: &mut [u8]) -> Result<usize, DecodeError> {
        if self.header.is_none() {
            self.header()?;
        }

        let mut n = self.copy_remaining(buf);

        while n < buf.len() && !self.done {
            // once something was copied only already buffered input is decoded
            match self.next_message(n == 0) {
                Ok(Some(Message::Payload(PayloadItem::Chunk(bytes)))) => {
                    self.remaining = bytes;
                    n += self.copy_remaining(&mut buf[n..]);
                }
                Ok(Some(Message::Payload(PayloadItem::Eof))) => {
                    self.done = true;
                }
                Ok(Some(Message::Header(_))) | Ok(None) => break,
                Err(_) if n > 0 => break,
                Err(e) => return Err(e),
            }
        }

        trace!(len = n, "read decoded bytes");
        Ok(n)
    }

    /// Returns true once `end` was validated and every decoded byte was read.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done && self.remaining.is_empty()
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Returns the underlying reader.
    ///
    /// Input that was read but not consumed, such as bytes after `end`, is lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn copy_remaining(&mut self, buf: &mut [u8]) -> usize {
        let n = cmp::min(self.remaining.len(), buf.len());
        buf[..n].copy_from_slice(&self.remaining[..n]);
        self.remaining.advance(n);
        n
    }

    /// Decodes the next message, reading from the source while more input is
    /// needed and `allow_io` is set.
    fn next_message(&mut self, allow_io: bool) -> Result<Option<Message>, DecodeError> {
        loop {
            if let Some(message) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(message));
            }

            if self.eof {
                return self.codec.decode_eof(&mut self.buffer);
            }

            if !allow_io {
                return Ok(None);
            }

            self.fill_buf()?;
        }
    }

    fn fill_buf(&mut self) -> io::Result<()> {
        let len = self.buffer.len();
        self.buffer.resize(len + self.read_size, 0);

        loop {
            match self.reader.read(&mut self.buffer[len..]) {
                Ok(n) => {
                    self.buffer.truncate(len + n);
                    if n == 0 {
                        debug!("source exhausted");
                        self.eof = true;
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buffer.truncate(len);
                    return Err(e);
                }
            }
        }
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_decoded(buf).map_err(io::Error::from)
    }
}
