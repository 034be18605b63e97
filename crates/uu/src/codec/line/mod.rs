//! Codecs for the data lines and the `end` trailer.
//!
//! - [`LineDecoder`]: validates and decodes one line at a time, then the trailer
//! - [`LineEncoder`]: frames raw bytes into 45 byte lines, then writes the trailer

mod line_decoder;
mod line_encoder;

pub use line_decoder::LineDecoder;
pub use line_encoder::LineEncoder;
