//! Encoder for the `begin <mode> <name>` line.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::debug;

use crate::ensure;
use crate::protocol::{EncodeError, Header};

/// Initial buffer size reserved for the header line
const INIT_HEADER_SIZE: usize = 256;

/// Encoder for the header line implementing the [`Encoder`] trait.
///
/// Writes `begin <mode> <name>\n` with the mode as zero padded, three digit octal.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderEncoder;

impl Encoder<Header> for HeaderEncoder {
    type Error = EncodeError;

    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidHeader`] if the name would break the line.
    fn encode(&mut self, header: Header, dst: &mut BytesMut) -> Result<(), Self::Error> {
        ensure!(!header.name().contains('\n'), EncodeError::invalid_header("file name contains a line break"));

        dst.reserve(INIT_HEADER_SIZE.max(header.name().len() + 16));
        writeln!(FastWrite(dst), "{header}")?;

        debug!(name = header.name(), "wrote header, mode {:03o}", header.mode());
        Ok(())
    }
}

/// Writer over a [`BytesMut`] that has already reserved enough space.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
