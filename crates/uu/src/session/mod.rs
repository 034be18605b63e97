//! Blocking encode and decode sessions
//!
//! This module drives the [`codec`](crate::codec) state machines against
//! `std::io` sources and sinks. Each session owns its buffers and handles
//! exactly one uuencoded unit.
//!
//! # Components
//!
//! - [`Encoder`]: frames raw bytes written to it and emits text to a [`Write`](std::io::Write)
//! - [`Decoder`]: pulls text from a [`Read`](std::io::Read) and hands out decoded bytes
//!
//! For data that is already in memory, [`encode_to_vec`] and [`decode_slice`]
//! run a whole session in one call.

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;

use crate::protocol::alphabet::{self, LINE_BYTES};
use crate::protocol::{DecodeError, EncodeError, Header};

/// Encodes `data` as a complete uuencoded unit.
pub fn encode_to_vec(header: Header, data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let lines = data.len() / LINE_BYTES + 1;
    let capacity = alphabet::encoded_len(data.len()) + 2 * lines + header.name().len() + 32;
    let mut encoder = Encoder::new(Vec::with_capacity(capacity), header);
    encoder.write_bytes(data)?;
    encoder.finish()
}

/// Decodes a complete uuencoded unit held in memory.
///
/// Input after the `end` line is ignored.
pub fn decode_slice(input: &[u8]) -> Result<(Header, Vec<u8>), DecodeError> {
    let mut decoder = Decoder::new(input);
    let header = decoder.header()?.clone();

    let mut data = Vec::with_capacity(input.len() * 3 / 4);
    let mut buf = [0u8; 4 * 1024];
    loop {
        let n = decoder.read_decoded(&mut buf)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }

    debug_assert!(decoder.is_done());
    Ok((header, data))
}
