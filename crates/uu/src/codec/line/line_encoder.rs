use std::cmp;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::{debug, trace};

use crate::ensure;
use crate::protocol::alphabet::{self, LINE_BYTES, ZERO_SYMBOL};
use crate::protocol::{EncodeError, PayloadItem};

const TRAILER: &[u8] = b"end\n";

/// Frames raw bytes into uuencoded data lines.
///
/// Input is collected until a full line of [`LINE_BYTES`] bytes is available;
/// each full line is written to `dst` at once. [`PayloadItem::Eof`] writes the
/// remaining bytes as a short, zero padded line followed by the zero length
/// line and `end`. Nothing is accepted after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEncoder {
    pending: BytesMut,
    eof: bool,
}

impl LineEncoder {
    pub fn new() -> Self {
        Self { pending: BytesMut::with_capacity(LINE_BYTES), eof: false }
    }

    /// Number of raw bytes waiting for a full line.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.eof
    }
}

impl Default for LineEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LineEncoder {
    type Error = EncodeError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        ensure!(!self.eof, EncodeError::AlreadyFinalized);

        match item {
            PayloadItem::Chunk(mut data) => {
                while data.has_remaining() {
                    let chunk = data.chunk();

                    // whole lines straight from the input
                    if self.pending.is_empty() && chunk.len() >= LINE_BYTES {
                        encode_line(&chunk[..LINE_BYTES], dst);
                        data.advance(LINE_BYTES);
                        continue;
                    }

                    let n = cmp::min(LINE_BYTES - self.pending.len(), chunk.len());
                    self.pending.extend_from_slice(&chunk[..n]);
                    data.advance(n);

                    if self.pending.len() == LINE_BYTES {
                        encode_line(&self.pending, dst);
                        self.pending.clear();
                    }
                }
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;

                if !self.pending.is_empty() {
                    encode_line(&self.pending, dst);
                    self.pending.clear();
                }

                dst.reserve(2 + TRAILER.len());
                dst.put_u8(ZERO_SYMBOL);
                dst.put_u8(b'\n');
                dst.put_slice(TRAILER);

                debug!("finished writing uuencoded data");
                Ok(())
            }
        }
    }
}

/// Writes one data line for up to [`LINE_BYTES`] raw bytes.
///
/// A trailing partial group is padded with zero bytes; the length character
/// still carries the unpadded count.
fn encode_line(raw: &[u8], dst: &mut BytesMut) {
    debug_assert!(!raw.is_empty() && raw.len() <= LINE_BYTES);

    dst.reserve(alphabet::encoded_len(raw.len()) + 2);
    dst.put_u8(alphabet::encode_length(raw.len()));

    for group in raw.chunks(3) {
        let mut padded = [0u8; 3];
        padded[..group.len()].copy_from_slice(group);
        dst.put_slice(&alphabet::pack(padded));
    }

    dst.put_u8(b'\n');
    trace!(len = raw.len(), "encoded line");
}
