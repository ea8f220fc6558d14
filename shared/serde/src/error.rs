use thiserror::Error;

/// Structural failures while reading a byte stream. Once one of these is hit
/// the remainder of the stream can no longer be framed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Fewer bytes remain than the value being read requires
    #[error("Unexpected end of stream at offset {offset}: needed {needed} bytes but only {remaining} remain")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A declared length cannot possibly fit in the rest of the stream
    #[error("Declared length {length} at offset {offset} exceeds the {remaining} bytes left in the stream")]
    LengthOutOfBounds {
        offset: usize,
        length: usize,
        remaining: usize,
    },

    /// A length-prefixed string did not hold valid UTF-8
    #[error("String of {length} bytes at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize, length: usize },
}
