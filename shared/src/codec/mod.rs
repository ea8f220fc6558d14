//! Reference-deduplicating object graph codec.
//!
//! Every value is one chunk: a tag byte, then for primitives and new objects a
//! 3 byte type id and a body. An object seen earlier in the same session is
//! written as a 2 byte back reference instead, so shared objects stay shared
//! and cycles terminate.

mod class;
mod collection;
mod primitive;
mod read_session;
mod serializer;
mod unit;
mod write_session;

pub use class::{Class, ClassSerializer, Field, FieldGetter, FieldSetter, Schema};
pub use collection::{Array, ArraySerializer, List, ListSerializer};
pub use primitive::PrimitiveSerializer;
pub use read_session::ReadSession;
pub use serializer::Serializer;
pub use unit::UnitSerializer;
pub use write_session::WriteSession;

use log::trace;

use crate::{ErrorBuffer, LockstepError, TypeRegistry, Value};

/// Encodes one value graph in a fresh session
pub fn serialize(registry: &TypeRegistry, errors: &mut ErrorBuffer, value: &Value) -> Vec<u8> {
    serialize_all(registry, errors, std::slice::from_ref(value))
}

/// Encodes several values back to back in one session, so references may
/// cross from one value into the next
pub fn serialize_all(registry: &TypeRegistry, errors: &mut ErrorBuffer, values: &[Value]) -> Vec<u8> {
    let mut session = WriteSession::new(registry, errors);
    for value in values {
        session.write_value(value);
    }
    let bytes = session.into_bytes();
    trace!("serialized {} values into {} bytes", values.len(), bytes.len());
    bytes
}

/// Decodes every value in `bytes`.
///
/// Problems are recorded in `errors`. Values that could not be decoded come
/// back as null where the stream allows reading past them; a truncated or
/// unframeable stream ends decoding early.
pub fn deserialize(registry: &TypeRegistry, errors: &mut ErrorBuffer, bytes: &[u8]) -> Vec<Value> {
    let mut session = ReadSession::new(registry, errors, bytes);
    let mut values = Vec::new();
    while session.has_remaining() {
        match session.read_value() {
            Ok(value) => {
                if !session.is_halted() {
                    values.push(value);
                }
            }
            Err(source) => {
                session.report(LockstepError::MalformedStream { source });
                break;
            }
        }
    }
    trace!("deserialized {} values from {} bytes", values.len(), bytes.len());
    values
}
