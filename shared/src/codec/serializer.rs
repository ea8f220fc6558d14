use lockstep_serde::SerdeErr;

use crate::{
    codec::{ReadSession, WriteSession},
    LockstepError, Value,
};

/// Encodes and decodes the body of one registered type.
///
/// The session writes the chunk header; a serializer only handles what
/// follows it. Decoding is split in two so that a non-primitive object can be
/// entered into the reference table between [`Serializer::create`] and
/// [`Serializer::read_into`], which is what lets a body refer back to the
/// object that contains it.
pub trait Serializer: 'static {
    /// Primitives are re-encoded on every occurrence and never referenced
    fn is_primitive(&self) -> bool {
        false
    }

    /// Rejects a value this serializer cannot encode. Runs before the chunk
    /// header is written; a rejected value is written as null.
    fn check(&self, _value: &Value) -> Result<(), LockstepError> {
        Ok(())
    }

    fn write(&self, session: &mut WriteSession<'_>, value: &Value);

    /// Reads a primitive completely, or produces the blank instance of an
    /// object (reading at most a fixed header)
    fn create(&self, session: &mut ReadSession<'_, '_>) -> Result<Value, SerdeErr>;

    /// Fills an instance produced by `create`
    fn read_into(
        &self,
        _session: &mut ReadSession<'_, '_>,
        _value: &Value,
    ) -> Result<(), SerdeErr> {
        Ok(())
    }
}
