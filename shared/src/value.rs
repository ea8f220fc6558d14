use std::{
    any::Any,
    cell::{Ref, RefCell, RefMut},
    convert::Infallible,
    fmt,
    rc::Rc,
};

use thiserror::Error;

use crate::Kind;

/// A dynamically typed value as it travels through the codec.
///
/// Primitives are plain values and are always re-encoded. Everything else is
/// an [`ObjectRef`], a shared handle whose *identity* is what the codec
/// deduplicates: two fields holding clones of the same `ObjectRef` are written
/// once and come back as the same instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Object(ObjectRef),
}

impl Value {
    /// Wraps `value` in a fresh object handle
    pub fn object<T: Any>(value: T) -> Self {
        Value::Object(ObjectRef::new(value))
    }

    /// The runtime type used to look up a serializer, `None` for null
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(Kind::of::<bool>()),
            Value::I32(_) => Some(Kind::of::<i32>()),
            Value::I64(_) => Some(Kind::of::<i64>()),
            Value::F32(_) => Some(Kind::of::<f32>()),
            Value::F64(_) => Some(Kind::of::<f64>()),
            Value::String(_) => Some(Kind::of::<String>()),
            Value::Object(object) => Some(object.kind()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "String",
            Value::Object(object) => object.kind().name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(inner) => Some(inner),
            _ => None,
        }
    }
}

/// A [`Value`] did not hold the shape the caller asked for
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected a value of type {expected} but found {found}")]
pub struct ValueMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl ValueMismatch {
    pub fn new(expected: &'static str, found: &Value) -> Self {
        Self {
            expected,
            found: found.type_name(),
        }
    }
}

// lets `Value` itself stand wherever a `TryFrom<Value>` with this error is expected
impl From<Infallible> for ValueMismatch {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

macro_rules! impl_value_conversions {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl From<$ty> for Value {
            fn from(inner: $ty) -> Self {
                Value::$variant(inner)
            }
        }

        impl TryFrom<Value> for $ty {
            type Error = ValueMismatch;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(ValueMismatch::new($name, &other)),
                }
            }
        }
    };
}

impl_value_conversions!(bool, Bool, "bool");
impl_value_conversions!(i32, I32, "i32");
impl_value_conversions!(i64, I64, "i64");
impl_value_conversions!(f32, F32, "f32");
impl_value_conversions!(f64, F64, "f64");
impl_value_conversions!(String, String, "String");
impl_value_conversions!(ObjectRef, Object, "object");

impl From<&str> for Value {
    fn from(inner: &str) -> Self {
        Value::String(inner.to_string())
    }
}

impl From<Option<ObjectRef>> for Value {
    fn from(inner: Option<ObjectRef>) -> Self {
        match inner {
            Some(object) => Value::Object(object),
            None => Value::Null,
        }
    }
}

impl TryFrom<Value> for Option<ObjectRef> {
    type Error = ValueMismatch;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(None),
            Value::Object(object) => Ok(Some(object)),
            other => Err(ValueMismatch::new("object or null", &other)),
        }
    }
}

/// Shared, interior-mutable handle to a value of some registered type.
///
/// Equality is identity. Objects that point at each other form `Rc` cycles
/// and stay alive until one of the links is cleared.
#[derive(Clone)]
pub struct ObjectRef {
    inner: Rc<RefCell<dyn Any>>,
    kind: Kind,
}

impl ObjectRef {
    pub fn new<T: Any>(value: T) -> Self {
        let inner: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(value));
        Self {
            inner,
            kind: Kind::of::<T>(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is<T: Any>(&self) -> bool {
        self.kind == Kind::of::<T>()
    }

    /// Borrows the object as `T`. Returns `None` if it is some other type or
    /// is currently borrowed mutably.
    pub fn borrow<T: Any>(&self) -> Option<Ref<'_, T>> {
        let any = self.inner.try_borrow().ok()?;
        Ref::filter_map(any, |any| any.downcast_ref::<T>()).ok()
    }

    /// Mutably borrows the object as `T`. Returns `None` if it is some other
    /// type or is currently borrowed.
    pub fn borrow_mut<T: Any>(&self) -> Option<RefMut<'_, T>> {
        let any = self.inner.try_borrow_mut().ok()?;
        RefMut::filter_map(any, |any| any.downcast_mut::<T>()).ok()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.address() == other.address()
    }

    /// Stable for as long as any handle to the object is alive
    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({} @ {:#x})", self.kind.name(), self.address())
    }
}
