use std::marker::PhantomData;

use lockstep_serde::{Serde, SerdeErr};

use crate::{
    codec::{ReadSession, Serializer, WriteSession},
    LockstepError, Value, ValueMismatch,
};

/// Encodes a plain [`Value`] variant with its [`Serde`] layout
pub struct PrimitiveSerializer<T> {
    phantom_t: PhantomData<fn() -> T>,
}

impl<T> PrimitiveSerializer<T> {
    pub fn new() -> Self {
        Self {
            phantom_t: PhantomData,
        }
    }
}

impl<T> Default for PrimitiveSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Serializer for PrimitiveSerializer<T>
where
    T: Serde + Into<Value> + TryFrom<Value, Error = ValueMismatch> + 'static,
{
    fn is_primitive(&self) -> bool {
        true
    }

    fn check(&self, value: &Value) -> Result<(), LockstepError> {
        T::try_from(value.clone())
            .map(drop)
            .map_err(|source| LockstepError::SerializerMismatch {
                type_name: std::any::type_name::<T>(),
                source,
            })
    }

    fn write(&self, session: &mut WriteSession<'_>, value: &Value) {
        match T::try_from(value.clone()) {
            Ok(inner) => inner.ser(session.writer()),
            Err(source) => session.report(LockstepError::SerializerMismatch {
                type_name: std::any::type_name::<T>(),
                source,
            }),
        }
    }

    fn create(&self, session: &mut ReadSession<'_, '_>) -> Result<Value, SerdeErr> {
        Ok(T::de(session.reader())?.into())
    }
}
