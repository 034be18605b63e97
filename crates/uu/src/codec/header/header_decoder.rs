//! Decoder for the `begin <mode> <name>` line that opens a uuencoded stream.
//!
//! # Limits
//!
//! - The header line must fit in [`MAX_HEADER_BYTES`] bytes
//! - The mode must be octal digits only and fit in 16 bits
//! - The name is the rest of the line after the mode, it must be non-empty UTF-8

use std::str;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::ensure;
use crate::protocol::{BEGIN_TOKEN, DecodeError, Header};

/// Maximum size in bytes allowed for the header line, newline included
pub const MAX_HEADER_BYTES: usize = 2 * 1024;

/// Decoder for the header line implementing the [`Decoder`] trait.
///
/// The marker is checked as soon as enough bytes are available, so garbage
/// input fails fast instead of waiting for a newline.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = Header;
    type Error = DecodeError;

    /// Attempts to parse the header line from `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(header))` once a full line has been parsed; the line is removed from `src`
    /// - `Ok(None)` when the line is not complete yet
    /// - `Err(DecodeError)` on a malformed line or an invalid mode
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let check_len = src.len().min(BEGIN_TOKEN.len());
        ensure!(src[..check_len] == BEGIN_TOKEN[..check_len], DecodeError::malformed_header("header missing magic"));

        let Some(nl) = src.iter().position(|&b| b == b'\n') else {
            ensure!(src.len() < MAX_HEADER_BYTES, DecodeError::malformed_header("header missing delimiter"));
            return Ok(None);
        };
        ensure!(nl < MAX_HEADER_BYTES, DecodeError::malformed_header("header too long"));

        let header = parse_header_line(&src[..nl])?;
        src.advance(nl + 1);

        debug!(name = header.name(), "parsed header, mode {:03o}", header.mode());
        Ok(Some(header))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(header) => Ok(Some(header)),
            None if buf.is_empty() => Err(DecodeError::PrematureEof),
            None => Err(DecodeError::malformed_header("header missing delimiter")),
        }
    }
}

fn parse_header_line(line: &[u8]) -> Result<Header, DecodeError> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    ensure!(line.len() > BEGIN_TOKEN.len(), DecodeError::malformed_header("missing file mode"));

    // BEGIN_TOKEN includes the first space, so the next one ends the mode
    let fields = &line[BEGIN_TOKEN.len()..];
    let Some(space) = fields.iter().position(|&b| b == b' ') else {
        return Err(DecodeError::malformed_header("missing file name"));
    };

    let mode = parse_mode(&fields[..space])?;

    let name = &fields[space + 1..];
    ensure!(!name.is_empty(), DecodeError::malformed_header("missing file name"));
    let name = str::from_utf8(name).map_err(|e| DecodeError::malformed_header(format!("file name is not utf-8: {e}")))?;

    Ok(Header::from_parts(mode, name.to_owned()))
}

fn parse_mode(field: &[u8]) -> Result<u16, DecodeError> {
    let invalid = || DecodeError::invalid_mode(String::from_utf8_lossy(field));

    ensure!(!field.is_empty() && field.iter().all(|b| (b'0'..=b'7').contains(b)), invalid());

    field
        .iter()
        .try_fold(0u16, |mode, &digit| mode.checked_mul(8)?.checked_add(u16::from(digit - b'0')))
        .ok_or_else(invalid)
}
