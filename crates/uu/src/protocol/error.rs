use std::io;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UuError {
    #[error("decode error: {source}")]
    DecodeError {
        #[from]
        source: DecodeError,
    },

    #[error("encode error: {source}")]
    EncodeError {
        #[from]
        source: EncodeError,
    },
}

/// The error taxonomy as a plain, matchable value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedHeader,
    InvalidMode,
    PrematureEof,
    BadFraming,
    LineTooLong,
    LengthMismatch,
    InvalidSymbol,
    MissingLineTerminator,
    UnexpectedTrailer,
    AlreadyFinalized,
    InvalidHeader,
    InvalidMessage,
    Io,
}

/// Errors raised while decoding a uuencoded stream.
///
/// Every variant except [`DecodeError::Io`] is a validation failure and ends the
/// decode session for good. The type is `Clone` so a failed session can hand
/// the same error back on every later call.
#[derive(Error, Debug, Clone)]
pub enum DecodeError {
    #[error("malformed header: {reason}")]
    MalformedHeader { reason: String },

    #[error("invalid file mode: {mode:?}")]
    InvalidMode { mode: String },

    #[error("premature end of data stream")]
    PrematureEof,

    #[error("encoded line length {encoded_len} is not a multiple of 4")]
    BadFraming { encoded_len: usize },

    #[error("encoded line too long, current: {encoded_len} exceed the limit {max_len}")]
    LineTooLong { encoded_len: usize, max_len: usize },

    #[error("line declares {declared} bytes but only carries {implied}")]
    LengthMismatch { declared: usize, implied: usize },

    #[error("unexpected encoded byte: {symbol:#04x}")]
    InvalidSymbol { symbol: u8 },

    #[error("missing line ending")]
    MissingLineTerminator,

    #[error("unexpected trailer: {found:?}")]
    UnexpectedTrailer { found: String },

    #[error("io error: {source}")]
    Io { source: Arc<io::Error> },
}

impl DecodeError {
    pub fn malformed_header<S: ToString>(str: S) -> Self {
        Self::MalformedHeader { reason: str.to_string() }
    }

    pub fn invalid_mode<S: ToString>(str: S) -> Self {
        Self::InvalidMode { mode: str.to_string() }
    }

    pub fn bad_framing(encoded_len: usize) -> Self {
        Self::BadFraming { encoded_len }
    }

    pub fn line_too_long(encoded_len: usize, max_len: usize) -> Self {
        Self::LineTooLong { encoded_len, max_len }
    }

    pub fn length_mismatch(declared: usize, implied: usize) -> Self {
        Self::LengthMismatch { declared, implied }
    }

    pub fn invalid_symbol(symbol: u8) -> Self {
        Self::InvalidSymbol { symbol }
    }

    pub fn unexpected_trailer(found: &[u8]) -> Self {
        Self::UnexpectedTrailer { found: String::from_utf8_lossy(found).into_owned() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: Arc::new(e.into()) }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::MalformedHeader { .. } => ErrorKind::MalformedHeader,
            DecodeError::InvalidMode { .. } => ErrorKind::InvalidMode,
            DecodeError::PrematureEof => ErrorKind::PrematureEof,
            DecodeError::BadFraming { .. } => ErrorKind::BadFraming,
            DecodeError::LineTooLong { .. } => ErrorKind::LineTooLong,
            DecodeError::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            DecodeError::InvalidSymbol { .. } => ErrorKind::InvalidSymbol,
            DecodeError::MissingLineTerminator => ErrorKind::MissingLineTerminator,
            DecodeError::UnexpectedTrailer { .. } => ErrorKind::UnexpectedTrailer,
            DecodeError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Returns true for the format violations that permanently end a session.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DecodeError::Io { .. })
    }
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        Self::io(e)
    }
}

impl From<DecodeError> for io::Error {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Io { source } => match Arc::try_unwrap(source) {
                Ok(e) => e,
                Err(source) => io::Error::new(source.kind(), DecodeError::Io { source }),
            },
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

/// Errors raised while encoding.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("encoder already finalized")]
    AlreadyFinalized,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid message: {reason}")]
    InvalidMessage { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl EncodeError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_message<S: ToString>(str: S) -> Self {
        Self::InvalidMessage { reason: str.to_string() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EncodeError::AlreadyFinalized => ErrorKind::AlreadyFinalized,
            EncodeError::InvalidHeader { .. } => ErrorKind::InvalidHeader,
            EncodeError::InvalidMessage { .. } => ErrorKind::InvalidMessage,
            EncodeError::Io { .. } => ErrorKind::Io,
        }
    }
}

impl From<EncodeError> for io::Error {
    fn from(e: EncodeError) -> Self {
        match e {
            EncodeError::Io { source } => source,
            e @ EncodeError::AlreadyFinalized => io::Error::other(e),
            e => io::Error::new(io::ErrorKind::InvalidInput, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_invalid_data() {
        let e: io::Error = DecodeError::bad_framing(5).into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);

        let inner = e.into_inner().unwrap().downcast::<DecodeError>().unwrap();
        assert_eq!(inner.kind(), ErrorKind::BadFraming);
    }

    #[test]
    fn io_error_keeps_its_kind() {
        let e = DecodeError::io(io::Error::from(io::ErrorKind::Interrupted));
        assert!(!e.is_fatal());

        let cloned = e.clone();
        let e: io::Error = e.into();
        assert_eq!(e.kind(), io::ErrorKind::Interrupted);

        let e: io::Error = cloned.into();
        assert_eq!(e.kind(), io::ErrorKind::Interrupted);
    }

    #[test]
    fn question_mark_wraps_both_directions() {
        fn decode_step() -> Result<(), UuError> {
            Err(DecodeError::PrematureEof)?
        }

        fn encode_step() -> Result<(), UuError> {
            Err(EncodeError::AlreadyFinalized)?
        }

        let e = decode_step().unwrap_err();
        assert!(matches!(e, UuError::DecodeError { source: DecodeError::PrematureEof }));
        assert_eq!(e.to_string(), "decode error: premature end of data stream");

        let e = encode_step().unwrap_err();
        assert!(matches!(e, UuError::EncodeError { source: EncodeError::AlreadyFinalized }));
        assert_eq!(e.to_string(), "encode error: encoder already finalized");
    }

    #[test]
    fn display_carries_context() {
        let e = DecodeError::line_too_long(68, 64);
        assert_eq!(e.to_string(), "encoded line too long, current: 68 exceed the limit 64");

        let e = DecodeError::invalid_symbol(b'~');
        assert_eq!(e.to_string(), "unexpected encoded byte: 0x7e");
    }
}
