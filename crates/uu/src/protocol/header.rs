use std::fmt;

use crate::ensure;
use crate::protocol::EncodeError;

/// Marker that opens every uuencoded unit, including the separating space.
pub(crate) const BEGIN_TOKEN: &[u8] = b"begin ";

/// The `{mode, name}` pair announced once, on the first line of a stream.
///
/// Headers built with [`Header::new`] keep only the permission bits of `mode`.
/// Headers parsed from a stream keep the mode exactly as written, use
/// [`Header::permissions`] to get the bits that should be applied to a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    mode: u16,
    name: String,
}

impl Header {
    /// Mask of the POSIX permission bits.
    pub const PERMISSION_BITS: u16 = 0o777;

    /// Creates a header for encoding.
    ///
    /// The name must be non-empty and must not contain a line break, since it is
    /// written verbatim into the `begin` line.
    pub fn new<S: Into<String>>(mode: u16, name: S) -> Result<Self, EncodeError> {
        let name = name.into();
        ensure!(!name.is_empty(), EncodeError::invalid_header("file name is empty"));
        ensure!(!name.contains(['\n', '\r']), EncodeError::invalid_header("file name contains a line break"));

        Ok(Self { mode: mode & Self::PERMISSION_BITS, name })
    }

    pub(crate) fn from_parts(mode: u16, name: String) -> Self {
        Self { mode, name }
    }

    #[inline]
    pub fn mode(&self) -> u16 {
        self.mode
    }

    /// The permission bits of [`Header::mode`].
    #[inline]
    pub fn permissions(&self) -> u16 {
        self.mode & Self::PERMISSION_BITS
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Renders the `begin` line without its trailing newline.
impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "begin {:03o} {}", self.mode, self.name)
    }
}
