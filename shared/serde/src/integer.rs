use crate::{serde::Serde, SerdeErr, StreamReader, StreamWriter};

/// Largest value representable in the 3 byte type id field
const U24_MAX: u32 = 0x00FF_FFFF;

/// Index into a session's reference table, written as 2 bytes
pub type RefIndex = u16;

/// An unsigned integer that occupies exactly 3 bytes on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct UnsignedInteger24 {
    inner: u32,
}

impl UnsignedInteger24 {
    /// Returns `None` when `value` does not fit in 24 bits
    pub fn new(value: u32) -> Option<Self> {
        if value > U24_MAX {
            return None;
        }
        Some(Self { inner: value })
    }

    /// Keeps the low 24 bits of `value`
    pub const fn truncate(value: u32) -> Self {
        Self {
            inner: value & U24_MAX,
        }
    }

    pub const fn max() -> Self {
        Self { inner: U24_MAX }
    }

    pub fn get(&self) -> u32 {
        self.inner
    }
}

impl Serde for UnsignedInteger24 {
    fn ser(&self, writer: &mut StreamWriter) {
        writer.write_u24(self.inner);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            inner: reader.read_u24()?,
        })
    }

    fn byte_length(&self) -> usize {
        3
    }
}
