use std::collections::HashMap;

use lockstep_serde::{ChunkType, RefIndex, Serde, StreamWriter};

use crate::{ErrorBuffer, LockstepError, NetId, ObjectRef, TypeRegistry, Value};

/// State of one serialization pass.
///
/// Objects are numbered in the order their first occurrence is written. Every
/// handle written is retained until the session ends so that no address is
/// reused by a temporary while it is still in the reference table.
pub struct WriteSession<'r> {
    registry: &'r TypeRegistry,
    errors: &'r mut ErrorBuffer,
    writer: StreamWriter,
    references: HashMap<usize, RefIndex>,
    retained: Vec<ObjectRef>,
    next_index: usize,
}

impl<'r> WriteSession<'r> {
    pub fn new(registry: &'r TypeRegistry, errors: &'r mut ErrorBuffer) -> Self {
        Self {
            registry,
            errors,
            writer: StreamWriter::new(),
            references: HashMap::new(),
            retained: Vec::new(),
            next_index: 0,
        }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn writer(&mut self) -> &mut StreamWriter {
        &mut self.writer
    }

    pub fn report(&mut self, error: LockstepError) {
        self.errors.push(error);
    }

    /// Writes one chunk and, through its serializer, everything it contains
    pub fn write_value(&mut self, value: &Value) {
        let registry = self.registry;

        let Some(kind) = value.kind() else {
            self.writer.write_chunk(ChunkType::Null);
            return;
        };

        if let Value::Object(object) = value {
            if let Some(index) = self.references.get(&object.address()) {
                self.writer.write_chunk(ChunkType::IdRef);
                self.writer.write_u16(*index);
                return;
            }
        }

        let Some((net_id, serializer)) = registry.lookup(&kind) else {
            self.writer.write_chunk(ChunkType::NewRef);
            NetId::UNKNOWN.ser(&mut self.writer);
            self.report(LockstepError::SerializeUnknownType {
                type_name: kind.name(),
            });
            return;
        };

        if let Err(error) = serializer.check(value) {
            self.report(error);
            self.writer.write_chunk(ChunkType::Null);
            return;
        }

        if serializer.is_primitive() {
            self.writer.write_chunk(ChunkType::Primitive);
            net_id.ser(&mut self.writer);
            serializer.write(self, value);
            return;
        }

        let index = self.next_index;
        if let Value::Object(object) = value {
            // past the last nameable index an object could not be referenced
            // again, so a cycle through it would never terminate
            let Ok(index) = RefIndex::try_from(index) else {
                self.report(LockstepError::ReferenceLimitExceeded {
                    type_name: kind.name(),
                });
                self.writer.write_chunk(ChunkType::Null);
                return;
            };
            self.references.insert(object.address(), index);
            self.retained.push(object.clone());
        }
        self.next_index += 1;

        // numbered before the body so the body can point back at it
        self.writer.write_chunk(ChunkType::NewRef);
        net_id.ser(&mut self.writer);
        serializer.write(self, value);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.to_bytes()
    }
}
