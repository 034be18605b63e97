//! Internal helper macros shared by the codecs.

/// Returns early with `Err($error)` when `$predicate` does not hold.
///
/// Used by the decoders to reject a line before any of it is decoded:
///
/// ```ignore
/// ensure!(encoded_len % 4 == 0, DecodeError::bad_framing(encoded_len));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
