use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::codec::header::HeaderEncoder;
use crate::codec::line::LineEncoder;
use crate::ensure;
use crate::protocol::{EncodeError, Message};

/// Encoder for a complete uuencoded unit.
///
/// Accepts exactly one [`Message::Header`], then any number of payload chunks,
/// then [`PayloadItem::Eof`](crate::protocol::PayloadItem::Eof). Out of order
/// messages are rejected with [`EncodeError::InvalidMessage`] and nothing is
/// written to `dst`.
#[derive(Debug, Default)]
pub struct StreamEncoder {
    header_encoder: HeaderEncoder,
    line_encoder: LineEncoder,
    header_written: bool,
}

impl StreamEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn is_header_written(&self) -> bool {
        self.header_written
    }

    /// Returns true once the trailer has been written.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.line_encoder.is_finalized()
    }
}

impl<D: Buf> Encoder<Message<D>> for StreamEncoder {
    type Error = EncodeError;

    fn encode(&mut self, item: Message<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        ensure!(!self.is_finalized(), EncodeError::AlreadyFinalized);

        match item {
            Message::Header(header) => {
                if self.header_written {
                    error!("expect payload item but receive header");
                    return Err(EncodeError::invalid_message("header already written"));
                }

                self.header_encoder.encode(header, dst)?;
                self.header_written = true;
                Ok(())
            }

            Message::Payload(payload_item) => {
                if !self.header_written {
                    error!("expect header but receive payload item");
                    return Err(EncodeError::invalid_message("payload before header"));
                }

                self.line_encoder.encode(payload_item, dst)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Header, PayloadItem};
    use bytes::Bytes;

    fn header() -> Message<Bytes> {
        Message::Header(Header::new(0o644, "cat.txt").unwrap())
    }

    #[test]
    fn test_basic() {
        let mut encoder = StreamEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(header(), &mut dst).unwrap();
        encoder.encode(Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"Cat"))), &mut dst).unwrap();
        encoder.encode(Message::<Bytes>::Payload(PayloadItem::Eof), &mut dst).unwrap();

        assert_eq!(&dst[..], b"begin 644 cat.txt\n#0V%T\n`\nend\n");
        assert!(encoder.is_finalized());
    }

    #[test]
    fn test_empty_payload() {
        let mut encoder = StreamEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(Message::<Bytes>::Header(Header::new(0o600, "empty").unwrap()), &mut dst).unwrap();
        encoder.encode(Message::<Bytes>::Payload(PayloadItem::Eof), &mut dst).unwrap();

        assert_eq!(&dst[..], b"begin 600 empty\n`\nend\n");
    }

    #[test]
    fn test_payload_before_header() {
        let mut encoder = StreamEncoder::new();
        let mut dst = BytesMut::new();

        let err = encoder.encode(Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"x"))), &mut dst).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidMessage { .. }));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_second_header() {
        let mut encoder = StreamEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(header(), &mut dst).unwrap();
        let written = dst.len();

        let err = encoder.encode(header(), &mut dst).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidMessage { .. }));
        assert_eq!(dst.len(), written);
    }

    #[test]
    fn test_rejects_after_finalize() {
        let mut encoder = StreamEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(header(), &mut dst).unwrap();
        encoder.encode(Message::<Bytes>::Payload(PayloadItem::Eof), &mut dst).unwrap();

        let err = encoder.encode(header(), &mut dst).unwrap_err();
        assert!(matches!(err, EncodeError::AlreadyFinalized));

        let err = encoder.encode(Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"x"))), &mut dst).unwrap_err();
        assert!(matches!(err, EncodeError::AlreadyFinalized));
    }
}
