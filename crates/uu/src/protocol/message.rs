use bytes::{Buf, Bytes};

use crate::protocol::Header;

/// An item flowing through the stream codecs: either the header or payload.
///
/// `Data` is the payload buffer type; the decoder always yields `Bytes`, the
/// encoder accepts anything implementing [`Buf`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<Data: Buf = Bytes> {
    /// The `begin` line of the stream
    Header(Header),
    /// Raw bytes of the stream or the end marker
    Payload(PayloadItem<Data>),
}

/// Represents an item in the raw byte stream.
///
/// Produced by the decoder once per data line, consumed by the encoder as
/// arbitrary slices of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of raw data
    Chunk(Data),
    /// Marks the end of the stream: a validated `end` on decode, finalization on encode
    Eof,
}

impl<D: Buf> Message<D> {
    /// Returns true if this message contains the header
    #[inline]
    pub fn is_header(&self) -> bool {
        matches!(self, Message::Header(_))
    }

    /// Converts the message into a PayloadItem if it contains payload data
    pub fn into_payload_item(self) -> Option<PayloadItem<D>> {
        match self {
            Message::Header(_) => None,
            Message::Payload(payload_item) => Some(payload_item),
        }
    }

    pub fn into_header(self) -> Option<Header> {
        match self {
            Message::Header(header) => Some(header),
            Message::Payload(_) => None,
        }
    }
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }
}

impl PayloadItem {
    /// Consumes the PayloadItem and returns the contained bytes if this is a Chunk
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}
