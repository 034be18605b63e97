//! The 64 symbol alphabet shared by the encoder and the decoder.
//!
//! Values are offset from the space character (`0x20`). The value zero is
//! always written as a backtick (`` ` ``, `0x60`) so that a line never ends in
//! whitespace a mail transport could strip, while the decoder still accepts
//! a plain space for zero.

use crate::protocol::DecodeError;

/// Raw bytes carried by one full data line.
pub const LINE_BYTES: usize = 45;

/// Encoded characters of one full data line, length character excluded.
pub const LINE_CHARS: usize = LINE_BYTES / 3 * 4;

/// Longest encoded payload a decoder accepts on a single line.
pub const MAX_ENCODED_CHARS: usize = 64;

/// Symbol written for the value zero, and the body of the terminating empty line.
pub const ZERO_SYMBOL: u8 = b'`';

const BASE: u8 = b' ';

const ENCODE_TABLE: [u8; 64] = {
    let mut table = [0u8; 64];
    table[0] = ZERO_SYMBOL;
    let mut i = 1;
    while i < 64 {
        #[expect(clippy::cast_possible_truncation, reason = "i is below 64")]
        let value = i as u8;
        table[i] = BASE + value;
        i += 1;
    }
    table
};

/// Maps the low six bits of `value` to its printable symbol.
#[inline]
pub fn encode_symbol(value: u8) -> u8 {
    ENCODE_TABLE[usize::from(value & 0x3F)]
}

/// Maps a printable symbol back to its six bit value.
///
/// Both `' '` and `` ` `` decode to zero; anything outside `' '..='`'` is rejected.
#[inline]
pub fn decode_symbol(symbol: u8) -> Result<u8, DecodeError> {
    match symbol {
        BASE..=ZERO_SYMBOL => Ok((symbol - BASE) & 0x3F),
        _ => Err(DecodeError::invalid_symbol(symbol)),
    }
}

/// The length character for a line carrying `len` raw bytes.
#[inline]
pub fn encode_length(len: usize) -> u8 {
    debug_assert!(len <= LINE_BYTES, "line length {len} out of range");
    encode_symbol(u8::try_from(len).unwrap_or(u8::MAX))
}

/// Number of encoded characters needed for `len` raw bytes.
#[inline]
pub const fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

/// Packs three raw bytes into four symbols.
#[inline]
pub fn pack(group: [u8; 3]) -> [u8; 4] {
    let [b0, b1, b2] = group;
    [
        encode_symbol(b0 >> 2),
        encode_symbol(((b0 & 0x03) << 4) | (b1 >> 4)),
        encode_symbol(((b1 & 0x0F) << 2) | (b2 >> 6)),
        encode_symbol(b2 & 0x3F),
    ]
}

/// Unpacks four symbols into three raw bytes.
#[inline]
pub fn unpack(symbols: [u8; 4]) -> Result<[u8; 3], DecodeError> {
    let e0 = decode_symbol(symbols[0])?;
    let e1 = decode_symbol(symbols[1])?;
    let e2 = decode_symbol(symbols[2])?;
    let e3 = decode_symbol(symbols[3])?;

    // dec: 111111 112222 222233 333333
    // enc: 111111 222222 333333 444444
    Ok([e0 << 2 | e1 >> 4, e1 << 4 | e2 >> 2, e2 << 6 | e3])
}
