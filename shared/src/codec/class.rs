use std::any::{type_name, Any};

use lockstep_serde::SerdeErr;

use crate::{
    codec::{ReadSession, Serializer, WriteSession},
    LockstepError, Value, ValueMismatch,
};

pub type FieldGetter<T> = fn(&T) -> Value;
pub type FieldSetter<T> = fn(&mut T, Value) -> Result<(), ValueMismatch>;

pub struct Field<T> {
    name: &'static str,
    get: FieldGetter<T>,
    set: FieldSetter<T>,
}

impl<T> Field<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The ordered field list of a class type. Fields are written and read in
/// the order they are added, so every participant must build the schema the
/// same way.
pub struct Schema<T> {
    fields: Vec<Field<T>>,
}

impl<T> Schema<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn field(mut self, name: &'static str, get: FieldGetter<T>, set: FieldSetter<T>) -> Self {
        self.fields.push(Field { name, get, set });
        self
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A type serialized as its schema's fields, in schema order
pub trait Class: Default + Any {
    fn schema() -> Schema<Self>;
}

pub struct ClassSerializer<T> {
    schema: Schema<T>,
}

impl<T: Class> ClassSerializer<T> {
    pub fn new() -> Self {
        Self {
            schema: T::schema(),
        }
    }
}

impl<T: Class> Default for ClassSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Class> ClassSerializer<T> {
    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }
}

impl<T: Class> Serializer for ClassSerializer<T> {
    fn write(&self, session: &mut WriteSession<'_>, value: &Value) {
        let instance = value.as_object().and_then(|object| object.borrow::<T>());
        let values: Vec<Value> = match instance {
            Some(instance) => self
                .schema
                .fields
                .iter()
                .map(|field| (field.get)(&instance))
                .collect(),
            None => {
                // keep the stream shaped like the schema
                session.report(LockstepError::ObjectBorrowed {
                    type_name: type_name::<T>(),
                });
                vec![Value::Null; self.schema.len()]
            }
        };

        for field_value in &values {
            session.write_value(field_value);
        }
    }

    fn create(&self, _session: &mut ReadSession<'_, '_>) -> Result<Value, SerdeErr> {
        Ok(Value::object(T::default()))
    }

    fn read_into(&self, session: &mut ReadSession<'_, '_>, value: &Value) -> Result<(), SerdeErr> {
        for field in &self.schema.fields {
            let field_value = session.read_value()?;
            let Some(object) = value.as_object() else {
                continue;
            };
            let result = match object.borrow_mut::<T>() {
                Some(mut instance) => (field.set)(&mut instance, field_value),
                None => {
                    session.report(LockstepError::ObjectBorrowed {
                        type_name: type_name::<T>(),
                    });
                    continue;
                }
            };
            if let Err(source) = result {
                session.report(LockstepError::FieldTypeMismatch {
                    type_name: type_name::<T>(),
                    field: field.name,
                    source,
                });
            }
        }
        Ok(())
    }
}
