use std::rc::Rc;

use crate::{
    dispatch::{EventDispatcher, EventHandlers, RemoteProcedures, RpcError, RpcTarget},
    Value,
};

/// Receives every raw data batch as it is executed
pub trait RawDataObserver {
    fn on_raw_data(&self, values: &[Value]);
}

/// Where executed payload items end up: raw data observers, the remote
/// procedure table and the domain event dispatcher.
pub struct Dispatcher {
    observers: Vec<Rc<dyn RawDataObserver>>,
    procedures: RemoteProcedures,
    events: Box<dyn EventDispatcher>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_events(EventHandlers::new())
    }

    pub fn with_events<D: EventDispatcher + 'static>(events: D) -> Self {
        Self {
            observers: Vec::new(),
            procedures: RemoteProcedures::new(),
            events: Box::new(events),
        }
    }

    /// Observers are notified in the order they were added. Adding the same
    /// observer twice notifies it twice.
    pub fn add_observer(&mut self, observer: Rc<dyn RawDataObserver>) {
        self.observers.push(observer);
    }

    /// Removes the first registration of this exact observer
    pub fn remove_observer(&mut self, observer: &Rc<dyn RawDataObserver>) -> bool {
        let target = Rc::as_ptr(observer) as *const ();
        let position = self
            .observers
            .iter()
            .position(|existing| Rc::as_ptr(existing) as *const () == target);
        match position {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn procedures(&self) -> &RemoteProcedures {
        &self.procedures
    }

    pub fn procedures_mut(&mut self) -> &mut RemoteProcedures {
        &mut self.procedures
    }

    pub fn set_event_dispatcher<D: EventDispatcher + 'static>(&mut self, events: D) {
        self.events = Box::new(events);
    }

    pub fn notify_raw_data(&self, values: &[Value]) {
        for observer in &self.observers {
            observer.on_raw_data(values);
        }
    }

    pub fn invoke(&mut self, target: &RpcTarget, args: &[Value]) -> Result<(), RpcError> {
        self.procedures.invoke(target, args)
    }

    pub fn dispatch_event(&mut self, event: &Value) {
        self.events.dispatch(event);
    }
}
