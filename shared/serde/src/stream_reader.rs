use crate::SerdeErr;

/// Reads the byte layout produced by [`StreamWriter`](crate::StreamWriter).
/// Every read is bounds-checked; running off the end yields a `SerdeErr`
/// instead of a panic.
pub struct StreamReader<'b> {
    buffer: &'b [u8],
    offset: usize,
}

impl<'b> StreamReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    pub fn has_remaining(&self) -> bool {
        self.offset < self.buffer.len()
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], SerdeErr> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(SerdeErr::UnexpectedEnd {
                offset: self.offset,
                needed: count,
                remaining,
            });
        }
        let bytes = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let mut output = [0; N];
        output.copy_from_slice(self.read_bytes(N)?);
        Ok(output)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, SerdeErr> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u24(&mut self) -> Result<u32, SerdeErr> {
        let [b1, b2, b3] = self.read_array::<3>()?;
        Ok(u32::from_be_bytes([0, b1, b2, b3]))
    }

    pub fn read_u32(&mut self) -> Result<u32, SerdeErr> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, SerdeErr> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, SerdeErr> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, SerdeErr> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, SerdeErr> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Reads a 4 byte length and checks that at least `length * min_item_size`
    /// bytes follow, so a corrupt length never drives a huge allocation.
    pub fn read_length(&mut self, min_item_size: usize) -> Result<usize, SerdeErr> {
        let offset = self.offset;
        let length = self.read_u32()? as usize;
        let remaining = self.remaining();
        if length.saturating_mul(min_item_size) > remaining {
            return Err(SerdeErr::LengthOutOfBounds {
                offset,
                length,
                remaining,
            });
        }
        Ok(length)
    }
}
