use std::{any::Any, time::Duration};

use lockstep_serde::Serde;

use crate::{
    codec::{
        Array, ArraySerializer, Class, ClassSerializer, List, ListSerializer, PrimitiveSerializer,
        Serializer, UnitSerializer,
    },
    messages::{DomainEvent, LockStepMessage, NetworkData, RawData, RemoteCall},
    ErrorBuffer, Kind, LockstepError, TypeRegistry, Value, ValueMismatch,
};

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

// Protocol
pub struct Protocol {
    registry: TypeRegistry,
    /// The duration between each flush of the outgoing batch
    pub tick_interval: Duration,
    errors: ErrorBuffer,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        let mut protocol = Self {
            registry: TypeRegistry::new(),
            tick_interval: Duration::from_millis(250),
            errors: ErrorBuffer::new(),
            locked: false,
        };

        // this order fixes the wire ids every participant relies on
        protocol
            .add_primitive::<i32>()
            .add_array::<i32>()
            .add_primitive::<i64>()
            .add_array::<i64>()
            .add_primitive::<f32>()
            .add_array::<f32>()
            .add_primitive::<f64>()
            .add_array::<f64>()
            .add_primitive::<bool>()
            .add_array::<bool>()
            .add_primitive::<String>()
            .add_array::<String>()
            .add_array::<Value>()
            .add_list::<Value>()
            .add_list::<String>()
            .add_list::<NetworkData>()
            .add_class::<RawData>()
            .add_class::<RemoteCall>()
            .add_class::<DomainEvent>()
            .add_class::<LockStepMessage>();

        protocol
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Registration failures (duplicates, a full registry) collected while
    /// building
    pub fn errors(&self) -> &ErrorBuffer {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<LockstepError> {
        self.errors.drain()
    }

    pub fn into_parts(self) -> (TypeRegistry, Duration, ErrorBuffer) {
        (self.registry, self.tick_interval, self.errors)
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn tick_interval(&mut self, duration: Duration) -> &mut Self {
        self.check_lock();
        self.tick_interval = duration;
        self
    }

    /// Registers `T` with a custom serializer
    pub fn add_type<T: Any, S: Serializer>(&mut self, serializer: S) -> &mut Self {
        self.check_lock();
        self.register(Kind::of::<T>(), Box::new(serializer));
        self
    }

    pub fn add_primitive<T>(&mut self) -> &mut Self
    where
        T: Serde + Into<Value> + TryFrom<Value, Error = ValueMismatch> + 'static,
    {
        self.add_type::<T, _>(PrimitiveSerializer::<T>::new())
    }

    pub fn add_array<E: Any>(&mut self) -> &mut Self {
        self.add_type::<Array<E>, _>(ArraySerializer::<E>::new())
    }

    pub fn add_list<E: Any>(&mut self) -> &mut Self {
        self.add_type::<List<E>, _>(ListSerializer::<E>::new())
    }

    pub fn add_class<T: Class>(&mut self) -> &mut Self {
        self.add_type::<T, _>(ClassSerializer::<T>::new())
    }

    pub fn add_unit<T: Default + Any>(&mut self) -> &mut Self {
        self.add_type::<T, _>(UnitSerializer::<T>::new())
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_tick_interval(&mut self, duration: Duration) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.tick_interval = duration;
        Ok(self)
    }

    pub fn try_add_type<T: Any, S: Serializer>(&mut self, serializer: S) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.register(Kind::of::<T>(), Box::new(serializer));
        Ok(self)
    }

    pub fn try_add_class<T: Class>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_add_type::<T, _>(ClassSerializer::<T>::new())
    }

    pub fn try_add_unit<T: Default + Any>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_add_type::<T, _>(UnitSerializer::<T>::new())
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }

    fn register(&mut self, kind: Kind, serializer: Box<dyn Serializer>) {
        if let Err(error) = self.registry.register(kind, serializer) {
            self.errors.push(error);
        }
    }
}
