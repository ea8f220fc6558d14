use crate::{SerdeErr, StreamReader, StreamWriter};

/// A value with a fixed, self-describing wire layout.
pub trait Serde: Sized {
    /// Append this value's bytes to the writer
    fn ser(&self, writer: &mut StreamWriter);
    /// Parse a value from the reader
    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr>;
    /// Number of bytes `ser` will write
    fn byte_length(&self) -> usize;
}

impl Serde for bool {
    fn ser(&self, writer: &mut StreamWriter) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        Ok(reader.read_byte()? != 0)
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl Serde for i32 {
    fn ser(&self, writer: &mut StreamWriter) {
        writer.write_i32(*self);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        reader.read_i32()
    }

    fn byte_length(&self) -> usize {
        4
    }
}

impl Serde for i64 {
    fn ser(&self, writer: &mut StreamWriter) {
        writer.write_i64(*self);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        reader.read_i64()
    }

    fn byte_length(&self) -> usize {
        8
    }
}

impl Serde for f32 {
    fn ser(&self, writer: &mut StreamWriter) {
        writer.write_f32(*self);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        reader.read_f32()
    }

    fn byte_length(&self) -> usize {
        4
    }
}

impl Serde for f64 {
    fn ser(&self, writer: &mut StreamWriter) {
        writer.write_f64(*self);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        reader.read_f64()
    }

    fn byte_length(&self) -> usize {
        8
    }
}

// Strings are a 4 byte length followed by that many UTF-8 bytes
impl Serde for String {
    fn ser(&self, writer: &mut StreamWriter) {
        writer.write_u32(self.len() as u32);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        let length = reader.read_length(1)?;
        let offset = reader.offset();
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr::InvalidUtf8 { offset, length })
    }

    fn byte_length(&self) -> usize {
        4 + self.len()
    }
}
