use lockstep_serde::{ChunkType, RefIndex, Serde, SerdeErr, StreamReader};

use crate::{codec::Serializer, ErrorBuffer, LockstepError, NetId, TypeRegistry, Value};

/// State of one deserialization pass.
///
/// Every new-ref chunk with a known non-primitive type takes the next slot in
/// the object table as soon as its header is read, mirroring the numbering of
/// [`WriteSession`](crate::codec::WriteSession).
pub struct ReadSession<'r, 'b> {
    registry: &'r TypeRegistry,
    errors: &'r mut ErrorBuffer,
    reader: StreamReader<'b>,
    objects: Vec<Option<Value>>,
    halted: bool,
}

impl<'r, 'b> ReadSession<'r, 'b> {
    pub fn new(registry: &'r TypeRegistry, errors: &'r mut ErrorBuffer, bytes: &'b [u8]) -> Self {
        Self {
            registry,
            errors,
            reader: StreamReader::new(bytes),
            objects: Vec::new(),
            halted: false,
        }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn reader(&mut self) -> &mut StreamReader<'b> {
        &mut self.reader
    }

    pub fn report(&mut self, error: LockstepError) {
        self.errors.push(error);
    }

    /// True once the stream hit a chunk whose extent cannot be known. Every
    /// read after that yields null without consuming input.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn has_remaining(&self) -> bool {
        !self.halted && self.reader.has_remaining()
    }

    /// Reads one chunk and everything its serializer reads after it
    pub fn read_value(&mut self) -> Result<Value, SerdeErr> {
        if self.halted {
            return Ok(Value::Null);
        }

        let offset = self.reader.offset();
        let tag = self.reader.read_byte()?;
        let Some(chunk) = ChunkType::from_byte(tag) else {
            self.report(LockstepError::IllegalChunkTag { tag, offset });
            self.halted = true;
            return Ok(Value::Null);
        };

        match chunk {
            ChunkType::Null => Ok(Value::Null),
            ChunkType::IdRef => {
                let index: RefIndex = self.reader.read_u16()?;
                match self.objects.get(usize::from(index)) {
                    Some(Some(object)) => Ok(object.clone()),
                    _ => {
                        self.report(LockstepError::UnknownReference { index });
                        Ok(Value::Null)
                    }
                }
            }
            ChunkType::Primitive => {
                let net_id = NetId::de(&mut self.reader)?;
                match self.resolve(chunk, net_id) {
                    Some(serializer) if serializer.is_primitive() => serializer.create(self),
                    Some(_) => {
                        // an object body only makes sense after a new-ref header
                        self.report(LockstepError::IllegalChunkTag { tag, offset });
                        self.halted = true;
                        Ok(Value::Null)
                    }
                    None => Ok(Value::Null),
                }
            }
            ChunkType::NewRef => {
                let net_id = NetId::de(&mut self.reader)?;
                let Some(serializer) = self.resolve(chunk, net_id) else {
                    return Ok(Value::Null);
                };
                if serializer.is_primitive() {
                    return serializer.create(self);
                }

                let slot = self.objects.len();
                self.objects.push(None);
                let value = serializer.create(self)?;
                self.objects[slot] = Some(value.clone());
                serializer.read_into(self, &value)?;
                Ok(value)
            }
        }
    }

    fn resolve(&mut self, chunk: ChunkType, net_id: NetId) -> Option<&'r dyn Serializer> {
        let registry = self.registry;
        if let Some(serializer) = registry.serializer(net_id) {
            return Some(serializer);
        }

        self.report(LockstepError::DeserializeUnknownType {
            net_id: net_id.get(),
        });
        // an unknown-type new-ref is written without a body; any other
        // unresolved chunk is followed by bytes of unknown length
        if !(chunk == ChunkType::NewRef && net_id.is_unknown()) {
            self.halted = true;
        }
        None
    }
}
