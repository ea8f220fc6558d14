/// Leading byte of every serialized value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChunkType {
    /// A null reference, no payload
    Null = 22,
    /// A primitive value: 3 byte type id followed by the value bytes
    Primitive = 33,
    /// An object written earlier in the same session: 2 byte reference index
    IdRef = 44,
    /// First occurrence of an object: 3 byte type id followed by its body
    NewRef = 55,
}

impl ChunkType {
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Returns `None` for any byte that is not a chunk tag
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            22 => Some(ChunkType::Null),
            33 => Some(ChunkType::Primitive),
            44 => Some(ChunkType::IdRef),
            55 => Some(ChunkType::NewRef),
            _ => None,
        }
    }
}
