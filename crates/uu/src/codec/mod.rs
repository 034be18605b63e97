//! Codec module for encoding and decoding uuencoded streams
//!
//! Everything in here works on in-memory buffers only: bytes go in through a
//! [`BytesMut`](bytes::BytesMut) and [`Message`](crate::protocol::Message)
//! items come out, or the other way round. No I/O is performed, which makes
//! the codecs usable both from the blocking [`session`](crate::session) types
//! and from `tokio_util::codec::{FramedRead, FramedWrite}`.
//!
//! # Architecture
//!
//! - Decoding:
//!   - [`StreamDecoder`]: decodes a complete stream into messages
//!   - [`HeaderDecoder`]: the `begin <mode> <name>` line
//!   - [`LineDecoder`]: length prefixed data lines and the `end` trailer
//!
//! - Encoding:
//!   - [`StreamEncoder`]: encodes messages into a complete stream
//!   - [`HeaderEncoder`]: the `begin` line
//!   - [`LineEncoder`]: framing of raw bytes into lines, then the trailer
//!
//! # Example
//!
//! ```
//! use micro_uu::codec::StreamEncoder;
//! use micro_uu::protocol::{Header, Message, PayloadItem};
//! use tokio_util::codec::Encoder;
//! use bytes::{Bytes, BytesMut};
//!
//! let mut encoder = StreamEncoder::new();
//! let mut buffer = BytesMut::new();
//!
//! let header = Header::new(0o644, "cat.txt").unwrap();
//! encoder.encode(Message::<Bytes>::Header(header), &mut buffer).unwrap();
//! encoder.encode(Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"Cat"))), &mut buffer).unwrap();
//! encoder.encode(Message::<Bytes>::Payload(PayloadItem::Eof), &mut buffer).unwrap();
//!
//! assert_eq!(&buffer[..], b"begin 644 cat.txt\n#0V%T\n`\nend\n");
//! ```

mod header;
mod line;
mod stream_decoder;
mod stream_encoder;

pub use header::{HeaderDecoder, HeaderEncoder, MAX_HEADER_BYTES};
pub use line::{LineDecoder, LineEncoder};
pub use stream_decoder::StreamDecoder;
pub use stream_encoder::StreamEncoder;
