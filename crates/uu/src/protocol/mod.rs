//! Core uuencode protocol types.
//!
//! This module holds the pieces shared by both directions of the codec:
//!
//! - **Alphabet** ([`alphabet`]): the 64 symbol table, the bit packing of
//!   3 raw bytes into 4 symbols and the line shape constants
//! - **Header** ([`Header`]): the `{mode, name}` pair carried by the `begin` line
//! - **Messages** ([`Message`], [`PayloadItem`]): the items exchanged with the
//!   stream codecs
//! - **Errors** ([`DecodeError`], [`EncodeError`], [`UuError`]): the error taxonomy
//!
//! The wire format produced and accepted is:
//!
//! ```text
//! begin <mode-octal> <filename>\n
//! <length-char><encoded-chars>\n
//! ...
//! `\n
//! end\n
//! ```

pub mod alphabet;

mod header;
pub(crate) use header::BEGIN_TOKEN;
pub use header::Header;

mod message;
pub use message::Message;
pub use message::PayloadItem;

mod error;
pub use error::DecodeError;
pub use error::EncodeError;
pub use error::ErrorKind;
pub use error::UuError;
