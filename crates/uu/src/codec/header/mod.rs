//! Codecs for the header line of a uuencoded stream.
//!
//! - [`HeaderDecoder`]: parses `begin <mode> <name>` into a [`Header`](crate::protocol::Header)
//! - [`HeaderEncoder`]: writes a [`Header`](crate::protocol::Header) as a `begin` line

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_decoder::MAX_HEADER_BYTES;
pub use header_encoder::HeaderEncoder;
