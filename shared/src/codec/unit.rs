use std::{any::Any, marker::PhantomData};

use lockstep_serde::SerdeErr;

use crate::{
    codec::{ReadSession, Serializer, WriteSession},
    Value,
};

/// Objects with no body: only the type travels, the receiver gets
/// `T::default()`
pub struct UnitSerializer<T> {
    phantom_t: PhantomData<fn() -> T>,
}

impl<T> UnitSerializer<T> {
    pub fn new() -> Self {
        Self {
            phantom_t: PhantomData,
        }
    }
}

impl<T> Default for UnitSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + Any> Serializer for UnitSerializer<T> {
    fn write(&self, _session: &mut WriteSession<'_>, _value: &Value) {}

    fn create(&self, _session: &mut ReadSession<'_, '_>) -> Result<Value, SerdeErr> {
        Ok(Value::object(T::default()))
    }
}
