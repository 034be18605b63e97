use std::io::{self, Write};

use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder as _;
use tracing::{debug, warn};

use crate::codec::StreamEncoder;
use crate::ensure;
use crate::protocol::alphabet::LINE_CHARS;
use crate::protocol::{EncodeError, Header, Message, PayloadItem};

/// A uuencoder over a blocking writer.
///
/// The header line is written together with the first data. Every complete
/// line of input is framed and written out right away; a partial line stays
/// buffered until more data arrives or [`finalize`](Self::finalize) is called.
///
/// # Example
///
/// ```
/// use std::io::Write;
/// use micro_uu::{Encoder, Header};
///
/// let header = Header::new(0o644, "cat.txt").unwrap();
/// let mut encoder = Encoder::new(Vec::new(), header);
///
/// encoder.write_all(b"Cat").unwrap();
/// let output = encoder.finish().unwrap();
///
/// assert_eq!(output, b"begin 644 cat.txt\n#0V%T\n`\nend\n");
/// ```
#[derive(Debug)]
pub struct Encoder<W> {
    writer: W,
    buffer: BytesMut,
    codec: StreamEncoder,
    header: Header,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W, header: Header) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(4 * (LINE_CHARS + 2)), codec: StreamEncoder::new(), header }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns true once the trailer has been produced.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.codec.is_finalized()
    }

    /// Encodes `data`, returning the number of bytes consumed, which is always
    /// the whole slice.
    ///
    /// Text left over from an earlier call is written first; if that fails the
    /// error is returned and `data` is not consumed. Once `data` is encoded the
    /// call succeeds; text the writer did not take stays buffered and goes out
    /// with the next write, flush or finalize.
    ///
    /// # Errors
    ///
    /// [`EncodeError::AlreadyFinalized`] after [`finalize`](Self::finalize),
    /// or [`EncodeError::Io`] if buffered text can't be written.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize, EncodeError> {
        ensure!(!self.is_finalized(), EncodeError::AlreadyFinalized);
        self.flush_buf()?;

        self.write_header()?;
        self.codec.encode(Message::Payload(PayloadItem::Chunk(data)), &mut self.buffer)?;

        if let Err(e) = self.flush_buf() {
            debug!(cause = %e, pending = self.buffer.len(), "writer refused encoded text, kept for the next call");
        }
        Ok(data.len())
    }

    /// Writes the buffered remainder, the zero length line and `end`, then
    /// flushes the writer.
    ///
    /// The encoder counts as finalized even when writing fails.
    pub fn finalize(&mut self) -> Result<(), EncodeError> {
        ensure!(!self.is_finalized(), EncodeError::AlreadyFinalized);

        self.write_header()?;
        self.codec.encode(Message::<&[u8]>::Payload(PayloadItem::Eof), &mut self.buffer)?;

        if let Err(e) = self.flush_buf().and_then(|_| self.writer.flush().map_err(EncodeError::from)) {
            warn!(cause = %e, "failed to write trailer");
            return Err(e);
        }

        debug!(name = self.header.name(), "uuencoded stream finished");
        Ok(())
    }

    /// Finalizes the stream unless that already happened and returns the writer.
    pub fn finish(mut self) -> Result<W, EncodeError> {
        if !self.is_finalized() {
            self.finalize()?;
        }
        Ok(self.writer)
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Returns the writer without finalizing; buffered text is dropped.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> Result<(), EncodeError> {
        if !self.codec.is_header_written() {
            self.codec.encode(Message::<&[u8]>::Header(self.header.clone()), &mut self.buffer)?;
        }
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<(), EncodeError> {
        while self.buffer.has_remaining() {
            match self.writer.write(&self.buffer) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero).into()),
                Ok(n) => self.buffer.advance(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::from)
    }

    /// Writes out framed lines and flushes the writer; the stream is not finalized.
    fn flush(&mut self) -> io::Result<()> {
        self.flush_buf().map_err(io::Error::from)?;
        self.writer.flush()
    }
}
