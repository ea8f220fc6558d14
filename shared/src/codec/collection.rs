use std::{
    any::Any,
    fmt,
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use lockstep_serde::SerdeErr;

use crate::{
    codec::{ReadSession, Serializer, WriteSession},
    Kind, LockstepError, Value,
};

// Every element occupies at least its chunk tag
const MIN_ELEMENT_SIZE: usize = 1;

macro_rules! value_collection {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<E> {
            items: Vec<Value>,
            phantom_e: PhantomData<fn() -> E>,
        }

        impl<E> $name<E> {
            pub fn new() -> Self {
                Self::from(Vec::new())
            }

            pub fn into_inner(self) -> Vec<Value> {
                self.items
            }
        }

        impl<E> Default for $name<E> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<E> Clone for $name<E> {
            fn clone(&self) -> Self {
                Self::from(self.items.clone())
            }
        }

        impl<E> fmt::Debug for $name<E> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list().entries(self.items.iter()).finish()
            }
        }

        impl<E> From<Vec<Value>> for $name<E> {
            fn from(items: Vec<Value>) -> Self {
                Self {
                    items,
                    phantom_e: PhantomData,
                }
            }
        }

        impl<E> FromIterator<Value> for $name<E> {
            fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
                Self::from(iter.into_iter().collect::<Vec<_>>())
            }
        }

        impl<E> Deref for $name<E> {
            type Target = Vec<Value>;

            fn deref(&self) -> &Self::Target {
                &self.items
            }
        }

        impl<E> DerefMut for $name<E> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.items
            }
        }
    };
}

value_collection!(
    /// Fixed-length sequence whose elements are declared to be `E`. On the
    /// wire it carries the element type id ahead of its length.
    Array
);

value_collection!(
    /// Growable ordered sequence of `E`
    List
);

pub struct ArraySerializer<E> {
    phantom_e: PhantomData<fn() -> E>,
}

impl<E> ArraySerializer<E> {
    pub fn new() -> Self {
        Self {
            phantom_e: PhantomData,
        }
    }
}

impl<E> Default for ArraySerializer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Any> Serializer for ArraySerializer<E> {
    fn write(&self, session: &mut WriteSession<'_>, value: &Value) {
        let element_id = session.registry().net_id_of(&Kind::of::<E>());
        let Some(items) = collection_items::<Array<E>>(session, value) else {
            session.writer().write_u32(element_id.get());
            session.writer().write_u32(0);
            return;
        };

        session.writer().write_u32(element_id.get());
        session.writer().write_u32(items.len() as u32);
        for item in &items {
            session.write_value(item);
        }
    }

    fn create(&self, session: &mut ReadSession<'_, '_>) -> Result<Value, SerdeErr> {
        // the element id is informational; each element names its own type
        let _element_id = session.reader().read_u32()?;
        let length = session.reader().read_length(MIN_ELEMENT_SIZE)?;
        Ok(Value::object(Array::<E>::from(vec![Value::Null; length])))
    }

    fn read_into(&self, session: &mut ReadSession<'_, '_>, value: &Value) -> Result<(), SerdeErr> {
        let Some(object) = value.as_object() else {
            return Ok(());
        };
        let length = object.borrow::<Array<E>>().map_or(0, |array| array.len());
        for index in 0..length {
            let item = session.read_value()?;
            if let Some(mut array) = object.borrow_mut::<Array<E>>() {
                array[index] = item;
            }
        }
        Ok(())
    }
}

pub struct ListSerializer<E> {
    phantom_e: PhantomData<fn() -> E>,
}

impl<E> ListSerializer<E> {
    pub fn new() -> Self {
        Self {
            phantom_e: PhantomData,
        }
    }
}

impl<E> Default for ListSerializer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Any> Serializer for ListSerializer<E> {
    fn write(&self, session: &mut WriteSession<'_>, value: &Value) {
        let items = collection_items::<List<E>>(session, value).unwrap_or_default();
        session.writer().write_u32(items.len() as u32);
        for item in &items {
            session.write_value(item);
        }
    }

    fn create(&self, _session: &mut ReadSession<'_, '_>) -> Result<Value, SerdeErr> {
        Ok(Value::object(List::<E>::new()))
    }

    fn read_into(&self, session: &mut ReadSession<'_, '_>, value: &Value) -> Result<(), SerdeErr> {
        let count = session.reader().read_length(MIN_ELEMENT_SIZE)?;
        let Some(object) = value.as_object() else {
            return Ok(());
        };
        for _ in 0..count {
            let item = session.read_value()?;
            if let Some(mut list) = object.borrow_mut::<List<E>>() {
                list.push(item);
            }
        }
        Ok(())
    }
}

// Copies the elements out so no borrow is held while they are written; an
// element may be the collection itself.
fn collection_items<C>(session: &mut WriteSession<'_>, value: &Value) -> Option<Vec<Value>>
where
    C: Any + Deref<Target = Vec<Value>>,
{
    let object = value.as_object()?;
    match object.borrow::<C>() {
        Some(collection) => Some(collection.to_vec()),
        None => {
            session.report(LockstepError::ObjectBorrowed {
                type_name: std::any::type_name::<C>(),
            });
            None
        }
    }
}
