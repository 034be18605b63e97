//! A streaming uuencode / uudecode implementation
//!
//! This crate converts arbitrary binary data into the printable uuencode text
//! format and back. The file name and permission bits travel in-band in the
//! `begin` line. Input can be fed in chunks of any size on both sides and
//! malformed input is rejected as soon as it is seen.
//!
//! # Features
//!
//! - Incremental encoding and decoding across arbitrary chunk boundaries
//! - Strict validation of every line before any of it is decoded
//! - Blocking `std::io::{Read, Write}` sessions
//! - `tokio_util` codecs usable with `FramedRead` / `FramedWrite`
//! - No filesystem access; file handling is left to the caller
//!
//! # Example
//!
//! ```
//! use std::io::{Read, Write};
//! use micro_uu::{Decoder, Encoder, Header};
//!
//! let header = Header::new(0o644, "cat.txt").unwrap();
//! let mut encoder = Encoder::new(Vec::new(), header);
//! encoder.write_all(b"Cat").unwrap();
//! let text = encoder.finish().unwrap();
//! assert_eq!(text, b"begin 644 cat.txt\n#0V%T\n`\nend\n");
//!
//! let mut decoder = Decoder::new(&text[..]);
//! assert_eq!(decoder.name().unwrap(), "cat.txt");
//!
//! let mut data = Vec::new();
//! decoder.read_to_end(&mut data).unwrap();
//! assert_eq!(data, b"Cat");
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: wire types, the symbol alphabet and the error types
//! - [`codec`]: I/O free state machines implementing `tokio_util::codec`
//! - [`session`]: blocking [`Encoder`] and [`Decoder`] built on the codecs
//!
//! # Wire format
//!
//! ```text
//! begin 644 cat.txt
//! #0V%T
//! `
//! end
//! ```
//!
//! Data lines carry up to 45 bytes as 60 symbols. The symbol for value `v` is
//! `0x20 + v`, except that zero is written as `` ` ``; both `` ` `` and space
//! are read as zero. A trailing `\r` before `\n` is accepted when decoding.
//!
//! # Error Handling
//!
//! - [`DecodeError`]: the input is not valid uuencode, or the reader failed
//! - [`EncodeError`]: the encoder was misused, or the writer failed
//! - [`UuError`]: wraps both
//!
//! A decode error caused by the input ends the session; later calls return
//! the same error.

pub mod codec;
pub mod protocol;
pub mod session;

mod utils;
pub(crate) use utils::ensure;

pub use protocol::{DecodeError, EncodeError, ErrorKind, Header, UuError};
pub use session::{Decoder, Encoder};
