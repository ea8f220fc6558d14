use std::{any::Any, collections::HashMap};

use log::debug;

use crate::{Kind, Value};

/// Applies a decoded domain event to the running simulation
pub trait EventDispatcher {
    fn dispatch(&mut self, event: &Value);
}

impl<F: FnMut(&Value)> EventDispatcher for F {
    fn dispatch(&mut self, event: &Value) {
        self(event)
    }
}

type Handler = Box<dyn FnMut(&Value)>;

/// Event callbacks keyed by event type. Handlers for one type run in the
/// order they were added.
#[derive(Default)]
pub struct EventHandlers {
    handlers: HashMap<Kind, Vec<Handler>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<E: Any>(&mut self, mut handler: impl FnMut(&E) + 'static) -> &mut Self {
        let wrapped: Handler = Box::new(move |event: &Value| {
            if let Some(event) = event.as_object().and_then(|object| object.borrow::<E>()) {
                handler(&*event);
            }
        });
        self.handlers
            .entry(Kind::of::<E>())
            .or_default()
            .push(wrapped);
        self
    }

    pub fn handles(&self, kind: &Kind) -> bool {
        self.handlers.contains_key(kind)
    }
}

impl EventDispatcher for EventHandlers {
    fn dispatch(&mut self, event: &Value) {
        let Some(kind) = event.kind() else {
            return;
        };
        match self.handlers.get_mut(&kind) {
            Some(handlers) => {
                for handler in handlers.iter_mut() {
                    handler(event);
                }
            }
            None => debug!("no handler for event {}", kind),
        }
    }
}
